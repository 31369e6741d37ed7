use embedded_time::duration::Milliseconds;

use crate::retry::{Attempts, Strategy};
use crate::time::Millis;

/// Configuration options related to outbound CON messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Con {
  /// Retry strategy for CON messages that
  /// have not yet been ACKed.
  ///
  /// Defaults to an exponential retry strategy:
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use croak::config::Con;
  /// use croak::retry::Strategy;
  ///
  /// assert_eq!(Con::default().unacked_retry_strategy,
  ///            Strategy::Exponential { init_min: Milliseconds(500),
  ///                                    init_max: Milliseconds(1_000) });
  /// ```
  pub unacked_retry_strategy: Strategy,
  /// How long we are willing to wait for a separate response
  /// once our request has been ACKed.
  ///
  /// The total wait is [`Strategy::max_time`] of this strategy
  /// over [`Con::max_attempts`].
  ///
  /// Defaults to a lazy exponential retry strategy:
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use croak::config::Con;
  /// use croak::retry::Strategy;
  ///
  /// assert_eq!(Con::default().acked_retry_strategy,
  ///            Strategy::Exponential { init_min: Milliseconds(1_000),
  ///                                    init_max: Milliseconds(2_000) });
  /// ```
  pub acked_retry_strategy: Strategy,
  /// Number of times we are allowed to send a CON message
  /// before erroring.
  ///
  /// Defaults to 4 attempts.
  /// ```
  /// use croak::config::Con;
  /// use croak::retry::Attempts;
  ///
  /// assert_eq!(Con::default().max_attempts, Attempts(4));
  /// ```
  pub max_attempts: Attempts,
}

/// Configuration options related to building & exchanging messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msg {
  /// Mixed into the generator behind message [`Token`](croak_msg::Token)s
  /// and [`Id`](croak_msg::Id)s, alongside the wall clock.
  /// Setting it per device (a machine identifier, say) keeps two
  /// devices started in the same instant apart.
  ///
  /// ```
  /// use croak::config::Msg;
  ///
  /// assert_eq!(Msg::default().token_seed, 0);
  /// ```
  pub token_seed: u16,

  /// See [`Con`]
  pub con: Con,
}

impl Default for Con {
  fn default() -> Self {
    Con { unacked_retry_strategy: Strategy::Exponential { init_min: Milliseconds(500),
                                                          init_max: Milliseconds(1_000) },
          acked_retry_strategy: Strategy::Exponential { init_min: Milliseconds(1_000),
                                                        init_max: Milliseconds(2_000) },
          max_attempts: Attempts(4) }
  }
}

impl Default for Msg {
  fn default() -> Self {
    Msg { token_seed: 0,
          con: Con::default() }
  }
}

/// Runtime config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// See [`Msg`]
  pub msg: Msg,
  /// Size of the buffer the registration client renders
  /// the response's Uri-Path into.
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// assert_eq!(Config::default().path_buffer_len, 32);
  /// ```
  pub path_buffer_len: usize,
  /// Size of the buffer inbound datagrams are read into.
  ///
  /// Datagrams longer than this are truncated and will usually
  /// fail to parse.
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// assert_eq!(Config::default().recv_buffer_len, 1152);
  /// ```
  pub recv_buffer_len: usize,
  /// How long a socket read may block before
  /// retransmissions are checked again.
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use croak::config::Config;
  ///
  /// assert_eq!(Config::default().poll_interval, Milliseconds(10u64));
  /// ```
  pub poll_interval: Millis,
  /// Level that messages are dumped at by the server
  /// (see [`crate::logging::log_msg`]).
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// assert_eq!(Config::default().debug_level, log::Level::Info);
  /// ```
  pub debug_level: log::Level,
}

impl Default for Config {
  fn default() -> Self {
    Config { msg: Msg::default(),
             path_buffer_len: 32,
             recv_buffer_len: 1152,
             poll_interval: Milliseconds(10),
             debug_level: log::Level::Info }
  }
}

impl Config {
  /// Longest we will wait for a separate response after
  /// an empty ACK.
  pub fn separate_response_wait(&self) -> Millis {
    self.msg
        .con
        .acked_retry_strategy
        .max_time(self.msg.con.max_attempts)
  }

  /// [`Config::poll_interval`] as a [`std::time::Duration`]
  pub(crate) fn poll_interval_std(&self) -> std::time::Duration {
    // a zero read timeout is rejected by the OS
    std::time::Duration::from_millis(self.poll_interval.0.max(1))
  }
}
