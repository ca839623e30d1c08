use std::sync::Arc;

use super::capture_sink::Snapshot;

/// Hands snapshots off without blocking the tick loop.
pub trait CaptureDispatcher: Send {
    /// Returns `false` if the snapshot was dropped instead of queued.
    fn dispatch(&self, snapshot: Snapshot) -> bool;
}

/// Lets the owner keep a handle for shutdown while a session dispatches.
impl<T: CaptureDispatcher + Sync> CaptureDispatcher for Arc<T> {
    fn dispatch(&self, snapshot: Snapshot) -> bool {
        (**self).dispatch(snapshot)
    }
}
