use croak_msg::{CodeKind, Message, TryFromBytes, TryIntoBytes, Type};
use embedded_time::duration::Milliseconds;
use embedded_time::Instant;

use super::{Datagram, Provision, TransportError};
use crate::config::Config;
use crate::retry::{RetryTimer, YouShould};
use crate::time::{millis_between, Clock};

/// How an inbound message relates to the request we sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
  /// ACK carrying the response
  Piggybacked,
  /// ACK without a response; it will come separately
  EmptyAck,
  /// CON or NON response matching our token
  Separate,
  /// RST of our request
  Reset,
  /// Anything else
  Unrelated,
}

pub(crate) fn relation(req: &Message, msg: &Message) -> Relation {
  match (msg.ty, msg.code.kind()) {
    | (Type::Ack, CodeKind::Empty) if msg.id == req.id => Relation::EmptyAck,
    | (Type::Ack, CodeKind::Response) if msg.id == req.id && msg.token == req.token => {
      Relation::Piggybacked
    },
    | (Type::Reset, _) if msg.id == req.id => Relation::Reset,
    | (Type::Con | Type::Non, CodeKind::Response) if msg.token == req.token => Relation::Separate,
    | _ => Relation::Unrelated,
  }
}

fn now<C: Clock>(clock: &C) -> Result<Instant<C>, TransportError> {
  clock.try_now().map_err(|e| {
                   TransportError::Io(std::io::Error::new(std::io::ErrorKind::Other,
                                                          format!("clock failed: {:?}", e)))
                 })
}

/// Receive and parse one datagram, dropping anything that is not a CoAP message.
fn poll<D: Datagram>(dgram: &mut D, buf: &mut [u8]) -> nb::Result<Message, TransportError> {
  let n = dgram.recv(buf)?;
  Message::try_from_bytes(&buf[..n]).map_err(|e| {
                                      log::warn!("dropping unparseable datagram ({} bytes): {}", n, e);
                                      nb::Error::WouldBlock
                                    })
}

fn accept_separate<D: Datagram>(dgram: &mut D,
                                msg: Message,
                                resp: &mut Message)
                                -> Result<(), TransportError> {
  if msg.ty == Type::Con {
    let ack = msg.ack().try_into_bytes().map_err(TransportError::Encode)?;
    dgram.send(&ack)?;
  }

  *resp = msg;
  Ok(())
}

/// Perform a confirmable exchange over a connected datagram channel.
///
/// `req` is sent as a CON with a freshly provisioned id and token,
/// and retransmitted per [`Con.unacked_retry_strategy`](crate::config::Con::unacked_retry_strategy)
/// until it is acknowledged.
pub(crate) fn exchange<D: Datagram, C: Clock>(dgram: &mut D,
                                              clock: &C,
                                              config: &Config,
                                              provision: &mut Provision,
                                              req: &Message,
                                              resp: &mut Message)
                                              -> Result<(), TransportError> {
  let mut req = req.clone();
  req.ty = Type::Con;
  req.id = provision.next_id();
  req.token = provision.next_token();

  let bytes = req.clone()
                 .try_into_bytes()
                 .map_err(TransportError::Encode)?;
  let mut buf = vec![0u8; config.recv_buffer_len];

  dgram.send(&bytes)?;

  let mut retry = RetryTimer::new(now(clock)?,
                                  config.msg.con.unacked_retry_strategy,
                                  config.msg.con.max_attempts);

  loop {
    match poll(dgram, &mut buf) {
      | Ok(msg) => match relation(&req, &msg) {
        | Relation::Piggybacked => {
          *resp = msg;
          return Ok(());
        },
        // our ACK of a separate response may be the only sign the request arrived
        | Relation::Separate => return accept_separate(dgram, msg, resp),
        | Relation::Reset => {
          log::error!("request {:?} was reset", req.id);
          return Err(TransportError::Reset);
        },
        | Relation::EmptyAck => break,
        | Relation::Unrelated => {
          log::trace!("ignoring unrelated {:?} {} {:?}", msg.ty, msg.code, msg.id)
        },
      },
      | Err(nb::Error::Other(e)) => return Err(e),
      | Err(nb::Error::WouldBlock) => match retry.what_should_i_do(now(clock)?) {
        | Ok(YouShould::Retry) => {
          log::debug!("retransmitting {:?} (attempt {})", req.id, retry.attempts().0);
          dgram.send(&bytes)?;
        },
        | Ok(YouShould::Cry) => {
          log::error!("request {:?} was never acknowledged", req.id);
          return Err(TransportError::NeverAcked);
        },
        | Err(nb::Error::WouldBlock) => (),
        | Err(nb::Error::Other(never)) => match never {},
      },
    }
  }

  log::debug!("request {:?} acknowledged, waiting for separate response", req.id);

  let acked_at = now(clock)?;
  let wait = config.separate_response_wait();

  loop {
    match poll(dgram, &mut buf) {
      | Ok(msg) => match relation(&req, &msg) {
        | Relation::Separate => return accept_separate(dgram, msg, resp),
        | Relation::Reset => return Err(TransportError::Reset),
        | _ => log::trace!("ignoring {:?} {} {:?}", msg.ty, msg.code, msg.id),
      },
      | Err(nb::Error::Other(e)) => return Err(e),
      | Err(nb::Error::WouldBlock) => {
        let waited = millis_between(acked_at, now(clock)?).unwrap_or(Milliseconds(0));
        if waited >= wait {
          log::error!("timed out waiting for separate response to {:?}", req.id);
          return Err(TransportError::Timeout);
        }
      },
    }
  }
}
