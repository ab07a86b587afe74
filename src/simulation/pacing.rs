use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wall-clock pacing applied after every step.
///
/// Pacing never changes simulated outcomes; it only decides how fast they play.
pub trait Pacer {
    fn pace(&mut self, timestep: Duration);
}

/// Block the calling thread for one timestep
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTimePacer;

impl Pacer for RealTimePacer {
    fn pace(&mut self, timestep: Duration) {
        std::thread::sleep(timestep);
    }
}

/// Run as fast as the backend steps
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pace(&mut self, _timestep: Duration) {}
}

/// Cooperative cancellation, observed by the driver between two steps
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
