//! Minimum spacing between outbound summarization calls.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Enforces `min_interval` between the end of one call and the start of
/// the next.
///
/// The lock is held for the whole wait-call-record sequence, so callers
/// sharing one limiter are serialized.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait out the remaining interval, run `call`, and record its end
    /// time whether it succeeded or not.
    pub fn run<T>(&self, call: impl FnOnce() -> T) -> T {
        // A poisoned lock still holds a valid timestamp
        let mut last_call = self
            .last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Throttling summarizer");
                std::thread::sleep(wait);
            }
        }

        let result = call();
        *last_call = Some(Instant::now());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        assert_eq!(limiter.run(|| 1), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_second_call_waits() {
        let limiter = RateLimiter::new(Duration::from_millis(120));
        limiter.run(|| ());
        let start = Instant::now();
        limiter.run(|| ());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..20 {
            limiter.run(|| ());
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_concurrent_callers_are_spaced() {
        let limiter = std::sync::Arc::new(RateLimiter::new(Duration::from_millis(50)));
        let ends = std::sync::Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                let ends = ends.clone();
                std::thread::spawn(move || {
                    limiter.run(|| ends.lock().unwrap().push(Instant::now()));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut ends = ends.lock().unwrap().clone();
        ends.sort();
        for pair in ends.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(40));
        }
    }
}
