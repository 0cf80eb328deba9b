use core::convert::Infallible;
use core::ops::RangeInclusive;
use std::time::{Duration, Instant};

use rand::Rng;

/// A non-blocking timer that allows a fixed-delay or exponential-backoff
/// retry, that lives alongside some operation to retry.
///
/// It does not _contain_ the work to be done (e.g. `Box<fn()>`); the
/// caller keeps polling and the timer just answers "now?".
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use newt::retry;
///
/// let mut called = false;
/// let mut fails_once = || -> Result<(), ()> {
///   if !called {
///     called = true;
///     Err(())
///   } else {
///     Ok(())
///   }
/// };
///
/// let strategy = retry::Strategy::Delay { min: Duration::from_millis(1),
///                                         max: Duration::from_millis(2) };
/// let mut retry = retry::RetryTimer::new(Instant::now(), strategy, retry::Attempts(2));
///
/// while let Err(_) = fails_once() {
///   match nb::block!(retry.what_should_i_do(Instant::now())) {
///     | Ok(retry::YouShould::Retry) => continue,
///     | Ok(retry::YouShould::Cry) => panic!("no more attempts! it failed more than once!!"),
///     | Err(_) => unreachable!(),
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryTimer {
  start: Instant,
  init: Duration,
  strategy: Strategy,
  attempts: Attempts,
  max_attempts: Attempts,
}

/// A number of attempts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempts(pub u16);

/// Result of [`RetryTimer::what_should_i_do`].
///
/// This tells you if a retry should be attempted or not.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum YouShould {
  /// Attempts have been exhausted and the work that is
  /// being retried should be considered poisoned.
  Cry,
  /// A retry should be performed
  Retry,
}

impl RetryTimer {
  /// Create a new retrier
  pub fn new(start: Instant, strategy: Strategy, max_attempts: Attempts) -> Self {
    Self { start,
           strategy,
           init: if strategy.has_jitter() {
             Duration::from_millis(rand::thread_rng().gen_range(strategy.range()))
           } else {
             Duration::from_millis(*strategy.range().start())
           },
           max_attempts,
           attempts: Attempts(1) }
  }

  /// When the thing we keep trying fails, invoke this to
  /// tell the retrytimer "it failed again! what do I do??"
  ///
  /// Returns `nb::Error::WouldBlock` when we have not yet
  /// waited the appropriate amount of time to retry.
  pub fn what_should_i_do(&mut self, now: Instant) -> nb::Result<YouShould, Infallible> {
    if self.attempts >= self.max_attempts {
      Ok(YouShould::Cry)
    } else {
      let ready = self.is_ready(now - self.start, self.attempts.0);
      if ready {
        self.attempts.0 += 1;
        Ok(YouShould::Retry)
      } else {
        Err(nb::Error::WouldBlock)
      }
    }
  }

  /// Check if the strategy says an appropriate time has passed
  pub fn is_ready(&self, time_passed: Duration, attempts: u16) -> bool {
    if attempts == 0 {
      return true;
    }

    match self.strategy {
      | Strategy::Delay { .. } => time_passed >= self.init * u32::from(attempts),
      | Strategy::Exponential { .. } => time_passed >= Strategy::total_delay_exp(self.init, attempts),
    }
  }
}

/// Strategy to employ when retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  /// Generate a random delay between `init_min` and `init_max`,
  /// and wait until this delay has passed between attempts.
  ///
  /// After each failed attempt, double the delay before retrying again.
  Exponential {
    /// Minimum (inclusive) delay for second attempt
    init_min: Duration,
    /// Maximum (inclusive) delay for second attempt
    init_max: Duration,
  },
  /// Generate a random delay between `min` and `max`,
  /// and wait until this delay has passed between attempts.
  Delay {
    /// Minimum (inclusive) delay for attempts
    min: Duration,
    /// Maximum (inclusive) delay for attempts
    max: Duration,
  },
}

impl Strategy {
  /// Are min & max delays the same? if so, we should probably skip the random number generation.
  pub fn has_jitter(&self) -> bool {
    let rng = self.range();
    rng.start() != rng.end()
  }

  /// Get the min & max delays as an inclusive range of milliseconds
  pub fn range(&self) -> RangeInclusive<u64> {
    match self {
      | Self::Delay { min, max } => (min.as_millis() as u64)..=(max.as_millis() as u64),
      | Self::Exponential { init_min, init_max } => {
        (init_min.as_millis() as u64)..=(init_max.as_millis() as u64)
      },
    }
  }

  /// Given the initial delay and number of attempts that have been performed,
  /// yields the delay until the next retry should be attempted.
  fn total_delay_exp(init: Duration, attempt: u16) -> Duration {
    // | attempt | total delay      |
    // | 1       | init             |
    // | 2       | init * 2         |
    // | 3       | init * 4         |
    // | ...     | ...              |
    // | n       | init * 2^(n-1)   |
    init * 2u32.pow(u32::from(attempt) - 1)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn millis(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[test]
  fn delay_retrier() {
    let start = Instant::now();
    let at = |ms| start + millis(ms);
    let mut retry = RetryTimer::new(start,
                                    Strategy::Delay { min: millis(1000),
                                                      max: millis(1000) },
                                    Attempts(5));

    // attempt 1 happens before asking what_should_i_do

    assert_eq!(retry.what_should_i_do(at(999)).unwrap_err(),
               nb::Error::WouldBlock);

    assert_eq!(retry.what_should_i_do(at(1000)).unwrap(), YouShould::Retry);
    // Fails again (attempt 2)

    assert_eq!(retry.what_should_i_do(at(1999)).unwrap_err(),
               nb::Error::WouldBlock);

    assert_eq!(retry.what_should_i_do(at(2000)).unwrap(), YouShould::Retry);
    // Fails again (attempt 3)

    assert_eq!(retry.what_should_i_do(at(10_000)).unwrap(), YouShould::Retry);
    // Fails again (attempt 4)

    assert_eq!(retry.what_should_i_do(at(10_000)).unwrap(), YouShould::Retry);
    // Fails again (attempt 5)

    assert_eq!(retry.what_should_i_do(at(10_000)).unwrap(), YouShould::Cry);
  }

  #[test]
  fn exponential_retrier() {
    let start = Instant::now();
    let at = |ms| start + millis(ms);
    let mut retry = RetryTimer::new(start,
                                    Strategy::Exponential { init_min: millis(1000),
                                                            init_max: millis(1000) },
                                    Attempts(6));

    // attempt 1 happens before asking what_should_i_do

    assert_eq!(retry.what_should_i_do(at(999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(at(1000)).unwrap(), YouShould::Retry);

    assert_eq!(retry.what_should_i_do(at(1999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(at(2000)).unwrap(), YouShould::Retry);

    assert_eq!(retry.what_should_i_do(at(3999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(at(4000)).unwrap(), YouShould::Retry);

    assert_eq!(retry.what_should_i_do(at(8000)).unwrap(), YouShould::Retry);
    assert_eq!(retry.what_should_i_do(at(16_000)).unwrap(), YouShould::Retry);

    assert_eq!(retry.what_should_i_do(at(16_000)).unwrap(), YouShould::Cry);
  }

  #[test]
  fn exp_calculation() {
    let init = millis(100);
    assert_eq!(Strategy::total_delay_exp(init, 1), millis(100));
    assert_eq!(Strategy::total_delay_exp(init, 2), millis(200));
    assert_eq!(Strategy::total_delay_exp(init, 3), millis(400));
  }
}
