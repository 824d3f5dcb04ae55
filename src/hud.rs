//! Presentation surface
//!
//! A channel-fed status line and append-only transcript, plus a quit
//! affordance that feeds the daemon's shutdown path. The renderer is a
//! plain terminal printer; the handle is the only thing the rest of the
//! program sees, so a richer front end can replace the consumer without
//! touching any caller.

use tokio::sync::mpsc;

/// One display update
#[derive(Debug)]
enum HudEvent {
    /// Replace the status line
    Status(String),
    /// Append a transcript line
    Append(String),
}

/// Cloneable handle to the presentation surface
#[derive(Clone)]
pub struct HudHandle {
    tx: mpsc::UnboundedSender<HudEvent>,
    quit_tx: mpsc::Sender<()>,
}

impl HudHandle {
    /// Replace the status line
    pub fn set_status(&self, text: impl Into<String>) {
        let _ = self.tx.send(HudEvent::Status(text.into()));
    }

    /// Append a transcript line
    pub fn append(&self, text: impl Into<String>) {
        let _ = self.tx.send(HudEvent::Append(text.into()));
    }

    /// Trigger the same shutdown sequence as a spoken stop command
    pub async fn request_quit(&self) {
        let _ = self.quit_tx.send(()).await;
    }
}

/// Spawn the renderer task
///
/// `quit_tx` is the daemon's shutdown channel; the handle's quit
/// affordance feeds it. The task exits when every handle is dropped.
pub fn spawn(quit_tx: mpsc::Sender<()>) -> HudHandle {
    let (tx, mut rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                HudEvent::Status(text) => println!("── {text}"),
                HudEvent::Append(text) => println!("{text}"),
            }
        }
    });

    HudHandle { tx, quit_tx }
}
