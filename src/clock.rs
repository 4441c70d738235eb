// Time source for the engine. The engine only reads time, never advances it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait Clock {
    /// Current Unix time in seconds
    fn now(&self) -> u64;
}

/// Clock picked at runtime, shared across tasks
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Externally driven clock. Clones share the same instant, so a driver can
/// keep one handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(start)) }
    }

    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();

        handle.advance(60);
        assert_eq!(clock.now(), 1_060);

        handle.set(5);
        assert_eq!(clock.now(), 5);
    }

    #[test]
    fn test_shared_clock_delegates() {
        let manual = ManualClock::new(42);
        let shared: SharedClock = Arc::new(manual.clone());
        manual.advance(8);
        assert_eq!(shared.now(), 50);
    }
}
