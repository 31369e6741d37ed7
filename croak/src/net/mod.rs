use core::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use croak_msg::{Id, Message, MessageParseError, MessageToBytesError, Token};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::msg::Msg;
use crate::time::Millis;

mod con;

/// Plain UDP transport
pub mod udp;

/// DTLS transport
#[cfg(feature = "dtls")]
#[cfg_attr(any(docsrs, feature = "docs"), doc(cfg(feature = "dtls")))]
pub mod dtls;

pub use udp::UdpTransport;

#[cfg(feature = "dtls")]
pub use dtls::DtlsTransport;

/// Something that can perform one confirmable request / response exchange
pub trait Transport {
  /// The messages this transport sends & receives
  type Msg: Msg;

  /// Send `req` as a confirmable request and wait for its response.
  ///
  /// On success `resp` holds the response, whether it arrived
  /// piggybacked on the ACK or separately afterwards.
  fn exchange(&mut self, req: &Self::Msg, resp: &mut Self::Msg) -> Result<(), TransportError>;
}

impl<T: Transport> Transport for &mut T {
  type Msg = T::Msg;

  fn exchange(&mut self, req: &Self::Msg, resp: &mut Self::Msg) -> Result<(), TransportError> {
    T::exchange(self, req, resp)
  }
}

/// Errors encounterable while exchanging messages
#[derive(Debug)]
pub enum TransportError {
  /// The secure channel could not be established or used.
  ///
  /// `reported` is true when the transport has already logged
  /// the underlying cause.
  Secure {
    #[allow(missing_docs)]
    reported: bool,
  },
  /// The socket failed
  Io(io::Error),
  /// The request was sent the maximum number of times and never acknowledged
  NeverAcked,
  /// The request was acknowledged, but the separate response never came
  Timeout,
  /// The server rejected the request with a RST
  Reset,
  /// The request could not be serialized
  Encode(MessageToBytesError),
  /// The response could not be parsed
  Decode(MessageParseError),
}

impl TransportError {
  /// Whether the cause of this error has already been logged
  /// by the transport and should not be logged again.
  pub fn already_reported(&self) -> bool {
    matches!(self, TransportError::Secure { reported: true })
  }
}

impl fmt::Display for TransportError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | TransportError::Secure { .. } => write!(f, "secure channel failure"),
      | TransportError::Io(e) => write!(f, "{}", e),
      | TransportError::NeverAcked => write!(f, "request was never acknowledged"),
      | TransportError::Timeout => write!(f, "timed out waiting for response"),
      | TransportError::Reset => write!(f, "request was reset by the server"),
      | TransportError::Encode(e) => write!(f, "failed to serialize request: {}", e),
      | TransportError::Decode(e) => write!(f, "failed to parse response: {}", e),
    }
  }
}

impl std::error::Error for TransportError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      | TransportError::Io(e) => Some(e),
      | TransportError::Decode(e) => Some(e),
      | _ => None,
    }
  }
}

impl From<io::Error> for TransportError {
  fn from(e: io::Error) -> Self {
    TransportError::Io(e)
  }
}

/// Files needed to establish a DTLS session with a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  /// Our private key (PEM)
  pub key_file: PathBuf,
  /// Our certificate (PEM)
  pub cert_file: PathBuf,
  /// Certificates of the authorities we trust to sign the server's certificate (PEM)
  pub trust_file: PathBuf,
  /// Certificate revocation list (PEM), if revocation should be checked
  pub crl_file: Option<PathBuf>,
  /// The name the server's certificate must be issued to
  pub common_name: String,
}

/// A client connection; plain or secured by DTLS, chosen once
/// when it is opened.
#[derive(Debug)]
pub enum Connection {
  /// See [`UdpTransport`]
  Plain(UdpTransport),
  /// See [`DtlsTransport`]
  #[cfg(feature = "dtls")]
  #[cfg_attr(any(docsrs, feature = "docs"), doc(cfg(feature = "dtls")))]
  Secure(DtlsTransport),
}

impl Connection {
  /// Open a connection to `host:port`; a DTLS session when `credentials`
  /// are provided, plain UDP otherwise.
  pub fn open(host: &str,
              port: u16,
              credentials: Option<Credentials>,
              config: Config)
              -> Result<Self, TransportError> {
    match credentials {
      | None => UdpTransport::open(host, port, config).map(Connection::Plain),
      #[cfg(feature = "dtls")]
      | Some(creds) => DtlsTransport::open(host, port, &creds, config).map(Connection::Secure),
      #[cfg(not(feature = "dtls"))]
      | Some(_) => {
        log::error!("credentials were provided, but croak was built without DTLS support");
        Err(TransportError::Secure { reported: true })
      },
    }
  }
}

impl Transport for Connection {
  type Msg = Message;

  fn exchange(&mut self, req: &Message, resp: &mut Message) -> Result<(), TransportError> {
    match self {
      | Connection::Plain(t) => t.exchange(req, resp),
      #[cfg(feature = "dtls")]
      | Connection::Secure(t) => t.exchange(req, resp),
    }
  }
}

/// A connected, datagram-oriented channel to one peer
pub(crate) trait Datagram {
  fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

  /// Yields `WouldBlock` when nothing arrived within the poll interval
  fn recv(&mut self, buf: &mut [u8]) -> nb::Result<usize, TransportError>;
}

/// Resolve `host:port` and open a UDP socket connected to it
pub(crate) fn connect_udp(host: &str, port: u16, read_timeout: Millis) -> io::Result<UdpSocket> {
  let addr = (host, port).to_socket_addrs()?
                         .next()
                         .ok_or_else(|| {
                           io::Error::new(io::ErrorKind::NotFound,
                                          format!("could not resolve {}:{}", host, port))
                         })?;

  let local: SocketAddr = match addr {
    | SocketAddr::V4(_) => ([0u8; 4], 0).into(),
    | SocketAddr::V6(_) => ([0u16; 8], 0).into(),
  };

  let sock = UdpSocket::bind(local)?;
  sock.connect(addr)?;
  sock.set_read_timeout(Some(std::time::Duration::from_millis(read_timeout.0.max(1))))?;
  Ok(sock)
}

pub(crate) fn would_block(e: &io::Error) -> bool {
  matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Hands out message ids and tokens for outbound messages
#[derive(Debug)]
pub(crate) struct Provision {
  rng: ChaCha8Rng,
  next_id: u16,
}

impl Provision {
  /// Seed a generator from the configured token seed, the wall clock
  /// and a per-process counter
  pub(crate) fn new(seed: u16) -> Self {
    static OPENED: AtomicU64 = AtomicU64::new(0);

    let wall = SystemTime::now().duration_since(UNIX_EPOCH)
                                .map(|d| d.as_nanos() as u64)
                                .unwrap_or(0);
    Self::from_parts(seed, wall, OPENED.fetch_add(1, Ordering::Relaxed))
  }

  fn from_parts(seed: u16, wall: u64, opened: u64) -> Self {
    let mut bytes = [0u8; 32];
    bytes[0..2].copy_from_slice(&seed.to_be_bytes());
    bytes[8..16].copy_from_slice(&wall.to_be_bytes());
    bytes[16..24].copy_from_slice(&opened.to_be_bytes());

    let mut rng = ChaCha8Rng::from_seed(bytes);
    let next_id = rng.next_u32() as u16;

    Self { rng, next_id }
  }

  pub(crate) fn next_id(&mut self) -> Id {
    let id = Id(self.next_id);
    self.next_id = self.next_id.wrapping_add(1);
    id
  }

  pub(crate) fn next_token(&mut self) -> Token {
    let mut bytes = [0u8; 4];
    self.rng.fill_bytes(&mut bytes);
    Token::from_slice(&bytes).unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn provision_ids_increment() {
    let mut p = Provision::new(0);
    let a = p.next_id();
    let b = p.next_id();
    assert_eq!(b.0, a.0.wrapping_add(1));
  }

  #[test]
  fn provision_tokens_are_4_bytes_and_vary() {
    let mut p = Provision::new(0);
    let a = p.next_token();
    let b = p.next_token();
    assert_eq!(a.len(), 4);
    assert_ne!(a, b);
  }

  #[test]
  fn provision_depends_on_every_seed_part() {
    let token = |seed, wall, opened| Provision::from_parts(seed, wall, opened).next_token();

    assert_eq!(token(1, 7, 0), token(1, 7, 0));
    assert_ne!(token(1, 7, 0), token(2, 7, 0));
    assert_ne!(token(1, 7, 0), token(1, 8, 0));
    assert_ne!(token(1, 7, 0), token(1, 7, 1));
  }

  #[test]
  fn provisions_opened_back_to_back_differ() {
    let mut a = Provision::new(0);
    let mut b = Provision::new(0);

    assert_ne!((a.next_id(), a.next_token()), (b.next_id(), b.next_token()));
  }

  #[test]
  fn only_reported_secure_errors_are_silent() {
    assert!(TransportError::Secure { reported: true }.already_reported());
    assert!(!TransportError::Secure { reported: false }.already_reported());
    assert!(!TransportError::Timeout.already_reported());
    assert!(!TransportError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)).already_reported());
  }
}
