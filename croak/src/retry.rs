use core::convert::Infallible;

use embedded_time::duration::Milliseconds;
use embedded_time::Instant;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::time::{millis_between, Clock, Millis};

/// Retransmission schedule of one confirmable message.
///
/// The timer is created when the message is first sent, and asked
/// [`what_should_i_do`](RetryTimer::what_should_i_do) whenever the sender
/// is idle. Each delay is measured from the most recent transmission,
/// so a sender that was not polled for a while gets one retransmission,
/// not a burst of them.
///
/// ```
/// use embedded_time::Clock;
/// use embedded_time::duration::Milliseconds;
/// use croak::retry::{Attempts, RetryTimer, Strategy, YouShould};
///
/// let clock = croak::time::SystemClock::new();
/// let strategy = Strategy::Delay { min: Milliseconds(1),
///                                  max: Milliseconds(1) };
/// let mut retry = RetryTimer::new(clock.try_now().unwrap(), strategy, Attempts(2));
///
/// let mut sent = 1;
/// loop {
///   match nb::block!(retry.what_should_i_do(clock.try_now().unwrap())) {
///     | Ok(YouShould::Retry) => sent += 1,
///     | Ok(YouShould::Cry) => break,
///     | Err(never) => match never {},
///   }
/// }
///
/// assert_eq!(sent, 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryTimer<C: Clock> {
  sent_at: Instant<C>,
  wait: Millis,
  strategy: Strategy,
  attempts: Attempts,
  max_attempts: Attempts,
}

/// A number of transmissions of the same message
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempts(pub u16);

/// Verdict of [`RetryTimer::what_should_i_do`]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum YouShould {
  /// Send the message again
  Retry,
  /// Every attempt went unanswered; give up on the message
  Cry,
}

impl<C: Clock> RetryTimer<C> {
  /// Start the schedule of a message first sent at `sent_at`
  pub fn new(sent_at: Instant<C>, strategy: Strategy, max_attempts: Attempts) -> Self {
    Self { sent_at,
           wait: strategy.first_wait(seed_of(sent_at)),
           strategy,
           attempts: Attempts(1),
           max_attempts }
  }

  /// Transmissions so far, including the first one
  pub fn attempts(&self) -> Attempts {
    self.attempts
  }

  /// How long the latest transmission gets before the next step
  pub fn wait(&self) -> Millis {
    self.wait
  }

  /// Yields `WouldBlock` until the latest transmission has gone
  /// unanswered for its full wait; then either another transmission
  /// is due, or every attempt is spent.
  pub fn what_should_i_do(&mut self, now: Instant<C>) -> nb::Result<YouShould, Infallible> {
    let waited = millis_between(self.sent_at, now).unwrap_or(Milliseconds(0));
    if waited < self.wait {
      return Err(nb::Error::WouldBlock);
    }

    if self.attempts >= self.max_attempts {
      return Ok(YouShould::Cry);
    }

    self.attempts.0 += 1;
    self.sent_at = now;
    self.wait = self.strategy.next_wait(self.wait);
    Ok(YouShould::Retry)
  }
}

fn seed_of<C: Clock>(at: Instant<C>) -> u64 {
  Millis::try_from(at.duration_since_epoch()).map(|Milliseconds(ms)| ms)
                                             .unwrap_or(0)
}

/// How long to wait for an answer before retransmitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
  /// The first wait is picked from `init_min..=init_max`,
  /// and every wait after that is twice the previous one.
  Exponential {
    #[allow(missing_docs)]
    init_min: Millis,
    #[allow(missing_docs)]
    init_max: Millis,
  },
  /// One wait, picked from `min..=max`, used for every attempt.
  Delay {
    #[allow(missing_docs)]
    min: Millis,
    #[allow(missing_docs)]
    max: Millis,
  },
}

impl Strategy {
  fn bounds(&self) -> (u64, u64) {
    match *self {
      | Strategy::Exponential { init_min, init_max } => (init_min.0, init_max.0),
      | Strategy::Delay { min, max } => (min.0, max.0),
    }
  }

  fn first_wait(&self, seed: u64) -> Millis {
    match self.bounds() {
      | (lo, hi) if lo < hi => Milliseconds(ChaCha8Rng::seed_from_u64(seed).gen_range(lo..=hi)),
      | (lo, _) => Milliseconds(lo),
    }
  }

  fn next_wait(&self, prev: Millis) -> Millis {
    match self {
      | Strategy::Exponential { .. } => Milliseconds(prev.0.saturating_mul(2)),
      | Strategy::Delay { .. } => prev,
    }
  }

  /// Longest time from the first transmission until giving up,
  /// when every wait comes out at its maximum.
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use croak::retry::{Attempts, Strategy};
  ///
  /// let exp = Strategy::Exponential { init_min: Milliseconds(100),
  ///                                   init_max: Milliseconds(200) };
  /// // 200 + 400 + 800
  /// assert_eq!(exp.max_time(Attempts(3)), Milliseconds(1_400u64));
  /// ```
  pub fn max_time(&self, max_attempts: Attempts) -> Millis {
    let (_, hi) = self.bounds();
    let (total, _) = (0..max_attempts.0).fold((0u64, Milliseconds(hi)), |(total, wait), _| {
                                           (total.saturating_add(wait.0), self.next_wait(wait))
                                         });
    Milliseconds(total)
  }
}
