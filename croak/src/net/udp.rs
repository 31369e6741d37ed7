use std::net::UdpSocket;

use croak_msg::Message;

use super::{con, connect_udp, would_block, Datagram, Provision, Transport, TransportError};
use crate::config::Config;
use crate::time::SystemClock;

impl Datagram for UdpSocket {
  fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
    UdpSocket::send(self, bytes).map(|_| ())
                                .map_err(TransportError::Io)
  }

  fn recv(&mut self, buf: &mut [u8]) -> nb::Result<usize, TransportError> {
    UdpSocket::recv(self, buf).map_err(|e| {
                                if would_block(&e) {
                                  nb::Error::WouldBlock
                                } else {
                                  nb::Error::Other(TransportError::Io(e))
                                }
                              })
  }
}

/// Exchanges CoAP messages with one server over plain UDP
///
/// ```no_run
/// use croak::config::Config;
/// use croak::msg::{Message, Msg};
/// use croak::net::{Transport, UdpTransport};
///
/// let mut udp = UdpTransport::open("127.0.0.1", 5683, Config::default()).unwrap();
///
/// let mut req = <Message as Msg>::new();
/// req.set_code(croak::code::GET);
///
/// let mut resp = <Message as Msg>::new();
/// udp.exchange(&req, &mut resp).unwrap();
/// ```
#[derive(Debug)]
pub struct UdpTransport {
  sock: UdpSocket,
  clock: SystemClock,
  config: Config,
  provision: Provision,
}

impl UdpTransport {
  /// Open a UDP socket connected to `host:port`
  pub fn open(host: &str, port: u16, config: Config) -> Result<Self, TransportError> {
    let sock = connect_udp(host, port, config.poll_interval).map_err(|e| {
                 log::error!("failed to connect to {}:{}: {}", host, port, e);
                 TransportError::Io(e)
               })?;

    let clock = SystemClock::new();
    let provision = Provision::new(config.msg.token_seed);

    Ok(Self { sock,
              clock,
              config,
              provision })
  }

  /// The local address of the underlying socket
  pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
    self.sock.local_addr()
  }
}

impl Transport for UdpTransport {
  type Msg = Message;

  fn exchange(&mut self, req: &Message, resp: &mut Message) -> Result<(), TransportError> {
    con::exchange(&mut self.sock,
                  &self.clock,
                  &self.config,
                  &mut self.provision,
                  req,
                  resp)
  }
}
