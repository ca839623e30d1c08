use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::capture::domain::capture_dispatcher::CaptureDispatcher;
use crate::capture::domain::capture_sink::{CaptureSink, Snapshot};

const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// Totals reported when the dispatcher shuts down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: usize,
    pub failed: usize,
    pub dropped: usize,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicUsize,
    failed: AtomicUsize,
    dropped: AtomicUsize,
}

/// Fire-and-forget delivery on a dedicated worker thread.
///
/// Layout: `session tick → bounded queue → worker [sink.deliver]`
///
/// Failures are logged and counted, never retried. A full queue drops the
/// new snapshot rather than stalling the tick loop.
pub struct BackgroundCaptureDispatcher {
    tx: Option<Sender<Snapshot>>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl BackgroundCaptureDispatcher {
    pub fn spawn(sink: Box<dyn CaptureSink>) -> Self {
        Self::with_capacity(sink, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(sink: Box<dyn CaptureSink>, capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<Snapshot>(capacity.max(1));
        let counters = Arc::new(Counters::default());
        let worker_counters = counters.clone();

        let handle = std::thread::spawn(move || {
            let target = sink.describe();
            for snapshot in rx {
                match sink.deliver(&snapshot) {
                    Ok(()) => {
                        worker_counters.delivered.fetch_add(1, Ordering::Relaxed);
                        log::debug!(
                            "Capture #{} reached {target} {} ms after the gate fired",
                            snapshot.number,
                            snapshot.taken_at.elapsed().as_millis()
                        );
                    }
                    Err(e) => {
                        worker_counters.failed.fetch_add(1, Ordering::Relaxed);
                        log::error!("Capture #{} to {target} failed: {e}", snapshot.number);
                    }
                }
            }
        });

        Self {
            tx: Some(tx),
            handle: Some(handle),
            counters,
        }
    }

    /// Closes the queue, waits for queued snapshots, and returns totals.
    pub fn finish(mut self) -> DeliveryStats {
        self.shutdown();
        self.stats()
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    fn shutdown(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Capture worker thread panicked");
            }
        }
    }
}

impl CaptureDispatcher for BackgroundCaptureDispatcher {
    fn dispatch(&self, snapshot: Snapshot) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        match tx.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(s)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("Capture queue full, dropping capture #{}", s.number);
                false
            }
            Err(TrySendError::Disconnected(s)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::error!("Capture worker gone, dropping capture #{}", s.number);
                false
            }
        }
    }
}

impl Drop for BackgroundCaptureDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
