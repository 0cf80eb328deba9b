use std::time::Duration;

use crate::retry::{Attempts, Strategy};

/// Runtime behavior of the [`blocking::Client`](crate::blocking::Client)
/// retransmit loop.
///
/// The defaults mirror the classic CoAP transmission parameters: an
/// initial ack timeout of 500ms..1000ms doubled after every miss, and 4
/// transmissions total before the request is written off.
///
/// ```
/// use newt::config::Config;
/// use newt::retry::Attempts;
///
/// assert_eq!(Config::default().max_attempts, Attempts(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
  /// How long to wait between retransmissions of an unanswered request
  pub retry_strategy: Strategy,
  /// How many times to transmit a request before giving up and
  /// synthesizing a `5.03 ServiceUnavailable` response
  pub max_attempts: Attempts,
}

impl Default for Config {
  fn default() -> Self {
    Config { retry_strategy: Strategy::Exponential { init_min: Duration::from_millis(500),
                                                     init_max: Duration::from_millis(1000) },
             max_attempts: Attempts(4) }
  }
}
