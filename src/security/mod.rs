//! Security watch
//!
//! An armed/disarmed monitor that, while armed, answers keyboard and
//! pointer activity with a cooldown-gated webcam snapshot.

mod camera;
mod monitor;
mod watch;

pub use camera::{SnapshotDevice, Webcam};
pub use monitor::SecurityMonitor;
pub use watch::{ActivityHandler, ActivityKind, ActivitySource, InputListener};
