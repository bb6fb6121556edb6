//! Leading-edge debounce with build-failure retry.

use std::{
    thread,
    time::{Duration, Instant},
};

use crate::build::BuildError;
use crate::core;
use crate::log;

/// Drop window after a fired build.
const DEBOUNCE_MS: u64 = 300;

/// Wait between retries after a failed build.
const RETRY_BACKOFF_MS: u64 = 5000;

/// Slice of the retry backoff, so shutdown is observed promptly.
const BACKOFF_SLICE_MS: u64 = 50;

/// Coalesces change bursts into single builds.
///
/// Debounce is leading-edge: the first trigger after a quiet period runs
/// immediately, and further triggers inside the window are dropped rather
/// than deferred. A failed build is retried in place until it succeeds or
/// shutdown is requested; the window only restarts after a success.
pub struct DebouncedTrigger {
    last_run: Option<Instant>,
    interval: Duration,
    backoff: Duration,
}

impl DebouncedTrigger {
    pub fn new() -> Self {
        Self::with_timing(
            Duration::from_millis(DEBOUNCE_MS),
            Duration::from_millis(RETRY_BACKOFF_MS),
        )
    }

    pub fn with_timing(interval: Duration, backoff: Duration) -> Self {
        Self {
            last_run: None,
            interval,
            backoff,
        }
    }

    /// Run `build` unless inside the debounce window.
    ///
    /// Returns true if a build ran to success, false if the trigger was
    /// dropped or shutdown interrupted the retry loop.
    pub fn fire(&mut self, build: &mut dyn FnMut() -> Result<(), BuildError>) -> bool {
        if let Some(last) = self.last_run
            && last.elapsed() < self.interval
        {
            return false;
        }

        loop {
            match build() {
                Ok(()) => {
                    self.last_run = Some(Instant::now());
                    return true;
                }
                Err(e) => {
                    log!("error"; "build failed: {e}");
                    log!("watch"; "retrying in {}s", self.backoff.as_secs_f32());
                    if !self.sleep_backoff() {
                        return false;
                    }
                }
            }
        }
    }

    /// Sleep out the retry backoff in slices. Returns false on shutdown.
    fn sleep_backoff(&self) -> bool {
        let deadline = Instant::now() + self.backoff;
        while Instant::now() < deadline {
            if core::is_shutdown() {
                return false;
            }
            thread::sleep(Duration::from_millis(BACKOFF_SLICE_MS));
        }
        !core::is_shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_trigger() -> DebouncedTrigger {
        DebouncedTrigger::with_timing(Duration::from_millis(100), Duration::from_millis(20))
    }

    #[test]
    fn test_first_fire_builds_immediately() {
        let mut trigger = fast_trigger();
        let mut runs = 0;
        assert!(trigger.fire(&mut || {
            runs += 1;
            Ok(())
        }));
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_fires_inside_window_are_dropped() {
        let mut trigger = fast_trigger();
        let mut runs = 0;
        let mut build = || {
            runs += 1;
            Ok(())
        };

        assert!(trigger.fire(&mut build));
        assert!(!trigger.fire(&mut build));
        assert!(!trigger.fire(&mut build));
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_fires_after_window_build_again() {
        let mut trigger = fast_trigger();
        let mut runs = 0;
        let mut build = || {
            runs += 1;
            Ok(())
        };

        assert!(trigger.fire(&mut build));
        thread::sleep(Duration::from_millis(120));
        assert!(trigger.fire(&mut build));
        assert_eq!(runs, 2);
    }

    #[test]
    fn test_failed_build_retries_until_success() {
        let mut trigger = fast_trigger();
        let mut attempts = 0;
        let fired = trigger.fire(&mut || {
            attempts += 1;
            if attempts < 3 {
                Err(BuildError::Io(std::io::Error::other("disk on fire")))
            } else {
                Ok(())
            }
        });

        assert!(fired);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_window_restarts_only_after_success() {
        let mut trigger = fast_trigger();
        let mut attempts = 0;

        trigger.fire(&mut || {
            attempts += 1;
            if attempts < 2 {
                Err(BuildError::Io(std::io::Error::other("nope")))
            } else {
                Ok(())
            }
        });

        // Immediately after the successful retry the window is active.
        assert!(!trigger.fire(&mut || Ok(())));
    }
}
