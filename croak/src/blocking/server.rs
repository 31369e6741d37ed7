use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use croak_msg::{CodeKind, Id, Message, TryFromBytes, TryIntoBytes, Type};
use embedded_time::{Clock as _, Instant};

use crate::code;
use crate::config::Config;
use crate::logging::{log_msg, type_name};
use crate::msg::Msg;
use crate::net::{would_block, Provision};
use crate::retry::{RetryTimer, YouShould};
use crate::server::{fill, respond, Disposition, Handler, InvalidPath, SeparatePaths};
use crate::time::SystemClock;

/// A separate CON response waiting to be ACKed
#[derive(Debug)]
struct Pending {
  addr: SocketAddr,
  id: Id,
  bytes: Vec<u8>,
  retry: RetryTimer<SystemClock>,
}

/// A blocking CoAP server, answering every request with a [`Handler`]
///
/// ```no_run
/// use croak::blocking::Server;
/// use croak::msg::Message;
/// use croak::server::Response;
///
/// let handler = |_: &Message, resp: &mut Response<'_, Message>| {
///   resp.set_code(croak::code::CREATED);
///   resp.set_payload(b"OK")
/// };
///
/// let mut server = Server::try_new("0.0.0.0:5683", handler).unwrap();
/// loop {
///   server.tick().unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct Server<H> {
  sock: UdpSocket,
  handler: H,
  separate: SeparatePaths,
  config: Config,
  clock: SystemClock,
  provision: Provision,
  pending: Vec<Pending>,
}

fn clock_err(e: embedded_time::clock::Error) -> io::Error {
  io::Error::new(io::ErrorKind::Other, format!("clock failed: {:?}", e))
}

impl<H: Handler<Message>> Server<H> {
  /// Bind a server to `addr`
  pub fn try_new(addr: impl ToSocketAddrs, handler: H) -> io::Result<Self> {
    Self::try_new_config(addr, handler, Config::default())
  }

  /// Bind a server to `addr` with a specific runtime config
  pub fn try_new_config(addr: impl ToSocketAddrs, handler: H, config: Config) -> io::Result<Self> {
    let sock = UdpSocket::bind(addr)?;
    sock.set_read_timeout(Some(config.poll_interval_std()))?;

    let clock = SystemClock::new();
    let provision = Provision::new(config.msg.token_seed);

    Ok(Self { sock,
              handler,
              separate: SeparatePaths::default(),
              config,
              clock,
              provision,
              pending: Vec::new() })
  }

  /// Mark requests to `path` as needing a separate response.
  ///
  /// Must be called before the server starts ticking.
  pub fn separate_response(&mut self, path: &str) -> Result<(), InvalidPath> {
    self.separate.add(path).map_err(|e| {
                              log::error!("{}", e);
                              e
                            })
  }

  /// The address the server is bound to
  pub fn local_addr(&self) -> io::Result<SocketAddr> {
    self.sock.local_addr()
  }

  fn now(&self) -> io::Result<Instant<SystemClock>> {
    self.clock.try_now().map_err(clock_err)
  }

  fn send(&self, msg: &Message, addr: SocketAddr) -> io::Result<Option<Vec<u8>>> {
    match msg.clone().try_into_bytes() {
      | Ok(bytes) => {
        self.sock.send_to(&bytes, addr)?;
        Ok(Some(bytes))
      },
      | Err(e) => {
        log::error!("failed to serialize {} {} {:?}: {}",
                    type_name(msg.ty),
                    msg.code,
                    msg.id,
                    e);
        Ok(None)
      },
    }
  }

  fn retransmit(&mut self) -> io::Result<()> {
    let now = self.now()?;
    let sock = &self.sock;

    let mut outcome = Ok(());
    self.pending.retain_mut(|p| match p.retry.what_should_i_do(now) {
                  | Ok(YouShould::Retry) => {
                    log::debug!("retransmitting separate response {:?} (attempt {})",
                                p.id,
                                p.retry.attempts().0);
                    if let Err(e) = sock.send_to(&p.bytes, p.addr) {
                      outcome = Err(e);
                    }
                    true
                  },
                  | Ok(YouShould::Cry) => {
                    log::warn!("separate response {:?} to {} was never acknowledged",
                               p.id,
                               p.addr);
                    false
                  },
                  | Err(nb::Error::WouldBlock) => true,
                  | Err(nb::Error::Other(never)) => match never {},
                });

    outcome
  }

  fn handle(&mut self, req: Message, addr: SocketAddr) -> io::Result<()> {
    log_msg(self.config.debug_level, "Received:", &req);

    let separate = self.separate.contains(&req);

    if separate && req.ty == Type::Con {
      self.send(&req.ack(), addr)?;
    }

    let mut resp = respond(&self.handler, &req).unwrap_or_else(|e| {
                                                 log::error!("{}", e);
                                                 let mut resp = <Message as Msg>::new();
                                                 resp.set_code(code::INTERNAL_SERVER_ERROR);
                                                 resp
                                               });

    let disposition = match req.ty {
      | Type::Con if separate => Disposition::Separate(self.provision.next_id()),
      | Type::Con => Disposition::Piggybacked,
      | _ => Disposition::Non(self.provision.next_id()),
    };

    fill(&req, &mut resp, disposition);
    log_msg(self.config.debug_level, "Sent:", &resp);

    if let Some(bytes) = self.send(&resp, addr)? {
      if let Disposition::Separate(id) = disposition {
        let retry = RetryTimer::new(self.now()?,
                                    self.config.msg.con.unacked_retry_strategy,
                                    self.config.msg.con.max_attempts);
        self.pending.push(Pending { addr,
                                    id,
                                    bytes,
                                    retry });
      }
    }

    Ok(())
  }

  /// Retransmit separate responses that are due, then wait up
  /// to [`Config.poll_interval`](Config::poll_interval) for one
  /// datagram and process it.
  pub fn tick(&mut self) -> io::Result<()> {
    self.retransmit()?;

    let mut buf = vec![0u8; self.config.recv_buffer_len];
    let (n, addr) = match self.sock.recv_from(&mut buf) {
      | Ok(got) => got,
      | Err(e) if would_block(&e) => return Ok(()),
      | Err(e) => return Err(e),
    };

    let msg = match Message::try_from_bytes(&buf[..n]) {
      | Ok(msg) => msg,
      | Err(e) => {
        log::warn!("dropping unparseable datagram from {} ({} bytes): {}", addr, n, e);
        return Ok(());
      },
    };

    match (msg.ty, msg.code.kind()) {
      | (Type::Ack | Type::Reset, _) => {
        self.pending
            .retain(|p| !(p.addr == addr && p.id == msg.id));
        Ok(())
      },
      | (Type::Con, CodeKind::Empty) => {
        log::debug!("ping from {}", addr);
        self.send(&msg.reset(), addr).map(|_| ())
      },
      | (_, CodeKind::Request) => self.handle(msg, addr),
      | _ => {
        log::trace!("ignoring {} {} from {}", type_name(msg.ty), msg.code, addr);
        Ok(())
      },
    }
  }

  /// Tick forever; only returns when the socket fails.
  pub fn run(&mut self) -> io::Result<()> {
    log::info!("serving on {}", self.local_addr()?);

    loop {
      self.tick()?;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use croak_msg::{OptNumber, Token};

  use super::*;
  use crate::server::Response;

  type Hello = fn(&Message, &mut Response<'_, Message>) -> Result<(), croak_msg::PayloadError>;

  fn hello(_: &Message, resp: &mut Response<'_, Message>) -> Result<(), croak_msg::PayloadError> {
    resp.set_code(code::CONTENT);
    resp.set_payload(b"Hello, Client!")
  }

  fn setup() -> (Server<Hello>, UdpSocket) {
    let mut server = Server::try_new("127.0.0.1:0", hello as Hello).unwrap();
    server.separate_response("/separate").unwrap();

    let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
    peer.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    peer.connect(server.local_addr().unwrap()).unwrap();

    (server, peer)
  }

  fn send(peer: &UdpSocket, msg: Message) {
    peer.send(&msg.try_into_bytes().unwrap()).unwrap();
  }

  fn recv(peer: &UdpSocket) -> Message {
    let mut buf = [0u8; 1152];
    let n = peer.recv(&mut buf).unwrap();
    Message::try_from_bytes(&buf[..n]).unwrap()
  }

  fn get(ty: Type, path: &str) -> Message {
    let mut req = Message::new(ty, code::GET, Id(77), Token::from_slice(&[7, 7]).unwrap());
    req.add(OptNumber::URI_PATH, path).unwrap();
    req
  }

  #[test]
  fn piggybacks_con_response() {
    let (mut server, peer) = setup();

    send(&peer, get(Type::Con, "hello"));
    server.tick().unwrap();

    let resp = recv(&peer);
    assert_eq!(resp.ty, Type::Ack);
    assert_eq!(resp.id, Id(77));
    assert_eq!(resp.token.as_bytes(), &[7, 7]);
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.payload(), b"Hello, Client!");
  }

  #[test]
  fn non_request_gets_non_response() {
    let (mut server, peer) = setup();

    send(&peer, get(Type::Non, "hello"));
    server.tick().unwrap();

    let resp = recv(&peer);
    assert_eq!(resp.ty, Type::Non);
    assert_eq!(resp.token.as_bytes(), &[7, 7]);
    assert!(server.pending.is_empty());
  }

  #[test]
  fn separate_path_acks_first() {
    let (mut server, peer) = setup();

    send(&peer, get(Type::Con, "separate"));
    server.tick().unwrap();

    let ack = recv(&peer);
    assert_eq!((ack.ty, ack.code, ack.id), (Type::Ack, code::EMPTY, Id(77)));

    let resp = recv(&peer);
    assert_eq!(resp.ty, Type::Con);
    assert_eq!(resp.token.as_bytes(), &[7, 7]);
    assert_eq!(resp.payload(), b"Hello, Client!");
    assert_eq!(server.pending.len(), 1);

    send(&peer, resp.ack());
    server.tick().unwrap();
    assert!(server.pending.is_empty());
  }

  #[test]
  fn ping_is_reset() {
    let (mut server, peer) = setup();

    send(&peer, Message::new(Type::Con, code::EMPTY, Id(5), Token::default()));
    server.tick().unwrap();

    let rst = recv(&peer);
    assert_eq!((rst.ty, rst.id), (Type::Reset, Id(5)));
  }

  #[test]
  fn handler_failure_falls_back_to_internal_error() {
    let failing = |_: &Message, _: &mut Response<'_, Message>| -> Result<(), &'static str> { Err("nope") };
    let mut server = Server::try_new("127.0.0.1:0", failing).unwrap();

    let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
    peer.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    peer.connect(server.local_addr().unwrap()).unwrap();

    send(&peer, get(Type::Con, "anything"));
    server.tick().unwrap();

    let resp = recv(&peer);
    assert_eq!(resp.code, code::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.id, Id(77));
  }

  #[test]
  fn idle_tick_returns() {
    let (mut server, _peer) = setup();
    server.tick().unwrap();
  }

  #[test]
  fn garbage_is_dropped() {
    let (mut server, peer) = setup();

    peer.send(&[0xFF, 0x00]).unwrap();
    server.tick().unwrap();

    send(&peer, get(Type::Con, "hello"));
    server.tick().unwrap();
    assert_eq!(recv(&peer).code, code::CONTENT);
  }
}
