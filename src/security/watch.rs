//! Global input-activity listeners

use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};

use rdev::EventType;

use crate::Result;

/// What kind of input produced an activity event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// A key press
    Key,
    /// Pointer move, click, or scroll
    Pointer,
}

/// Callback invoked for each delivered activity event
pub type ActivityHandler = Arc<dyn Fn(ActivityKind) + Send + Sync>;

/// A start/stop-able stream of input-activity events
pub trait ActivitySource: Send + Sync {
    /// Begin delivering events to `handler`
    ///
    /// Calling `start` on a source that is already delivering replaces
    /// the handler without registering anything twice.
    ///
    /// # Errors
    ///
    /// Returns error if the OS hook cannot be installed
    fn start(&self, handler: ActivityHandler) -> Result<()>;

    /// Stop delivering events
    ///
    /// Honored at the next event: the hook thread stays parked but drops
    /// everything once the handler is gone.
    fn stop(&self);
}

/// Global input listener built on the OS event hook
///
/// One hook thread per listener, installed lazily on the first `start`
/// and reused across arm/disarm cycles; the hook cannot be torn down
/// once installed, so stopping just unregisters the handler and the
/// thread goes quiet.
pub struct InputListener {
    filter: ActivityKind,
    handler: Arc<RwLock<Option<ActivityHandler>>>,
    hook_installed: AtomicBool,
}

impl InputListener {
    /// Listener for key presses
    #[must_use]
    pub fn keyboard() -> Self {
        Self::new(ActivityKind::Key)
    }

    /// Listener for pointer moves, clicks, and scrolls
    #[must_use]
    pub fn pointer() -> Self {
        Self::new(ActivityKind::Pointer)
    }

    fn new(filter: ActivityKind) -> Self {
        Self {
            filter,
            handler: Arc::new(RwLock::new(None)),
            hook_installed: AtomicBool::new(false),
        }
    }
}

impl ActivitySource for InputListener {
    fn start(&self, handler: ActivityHandler) -> Result<()> {
        if let Ok(mut slot) = self.handler.write() {
            *slot = Some(handler);
        }

        if self.hook_installed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let filter = self.filter;
        let slot = Arc::clone(&self.handler);
        std::thread::Builder::new()
            .name(format!("input-watch-{filter:?}").to_lowercase())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    let Some(kind) = classify(&event.event_type) else {
                        return;
                    };
                    if kind != filter {
                        return;
                    }
                    let handler = slot.read().ok().and_then(|g| g.clone());
                    if let Some(h) = handler {
                        h(kind);
                    }
                });
                if let Err(e) = result {
                    tracing::error!(?e, "input hook failed");
                }
            })
            .map_err(|e| crate::Error::Listener(format!("failed to spawn hook thread: {e}")))?;

        tracing::debug!(filter = ?self.filter, "input hook installed");
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.handler.write() {
            if slot.take().is_some() {
                tracing::debug!(filter = ?self.filter, "input listener stopped");
            }
        }
    }
}

/// Map a raw OS event to an activity kind; releases don't count
const fn classify(event_type: &EventType) -> Option<ActivityKind> {
    match event_type {
        EventType::KeyPress(_) => Some(ActivityKind::Key),
        EventType::MouseMove { .. } | EventType::ButtonPress(_) | EventType::Wheel { .. } => {
            Some(ActivityKind::Pointer)
        }
        EventType::KeyRelease(_) | EventType::ButtonRelease(_) => None,
    }
}
