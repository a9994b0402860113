use std::time::Duration;

/// Longest pause a strategy is allowed to make before responding.
pub const MAX_PAUSE: Duration = Duration::from_secs(1);

/// Synchronous delay before sending an offer. Used by strategies to signal
/// hesitation to the opponent. It doesn't change offer content.
pub trait Pause: Send {
    fn pause(&self, duration: Duration);
}

/// Blocks current thread for the requested duration, capped at `MAX_PAUSE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration.min(MAX_PAUSE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_sleep_is_bounded() {
        let start = Instant::now();
        ThreadSleep.pause(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
