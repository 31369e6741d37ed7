use std::io::{self, Read, Write};
use std::net::UdpSocket;

use croak_msg::Message;
use openssl::error::ErrorStack;
use openssl::ssl::{SslConnector, SslFiletype, SslMethod, SslOptions, SslStream, SslVerifyMode};
use openssl::x509::store::X509Lookup;
use openssl::x509::verify::X509VerifyFlags;

use super::{con,
            connect_udp,
            would_block,
            Credentials,
            Datagram,
            Provision,
            Transport,
            TransportError};
use crate::config::Config;
use crate::time::SystemClock;

/// A connected UDP socket, presented as a stream so that openssl
/// can run a DTLS session over it.
///
/// Every `write` is sent as one datagram.
#[derive(Debug)]
pub struct UdpStream(UdpSocket);

impl Read for UdpStream {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.0.recv(buf)
  }
}

impl Write for UdpStream {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.send(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Datagram for SslStream<UdpStream> {
  fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
    self.ssl_write(bytes).map(|_| ()).map_err(|e| {
                                       log::error!("DTLS write failed: {}", e);
                                       TransportError::Secure { reported: true }
                                     })
  }

  fn recv(&mut self, buf: &mut [u8]) -> nb::Result<usize, TransportError> {
    self.ssl_read(buf).map_err(|e| match e.io_error() {
                        | Some(io) if would_block(io) => nb::Error::WouldBlock,
                        | _ => {
                          log::error!("DTLS read failed: {}", e);
                          nb::Error::Other(TransportError::Secure { reported: true })
                        },
                      })
  }
}

fn context_err(what: &'static str) -> impl Fn(ErrorStack) -> TransportError {
  move |e| {
    log::error!("{}: {}", what, e);
    TransportError::Secure { reported: true }
  }
}

/// Exchanges CoAP messages with one server over a DTLS session
///
/// The server's certificate must be signed by an authority in
/// [`Credentials.trust_file`](Credentials::trust_file), be issued to
/// [`Credentials.common_name`](Credentials::common_name), and (when a
/// revocation list is given) must not be revoked.
///
/// ```no_run
/// use croak::config::Config;
/// use croak::net::{Credentials, DtlsTransport};
///
/// let creds = Credentials { key_file: "client_privkey.pem".into(),
///                           cert_file: "client_cert.pem".into(),
///                           trust_file: "root_server_cert.pem".into(),
///                           crl_file: None,
///                           common_name: "dummy/server".into() };
///
/// let dtls = DtlsTransport::open("::1", 12436, &creds, Config::default()).unwrap();
/// ```
#[derive(Debug)]
pub struct DtlsTransport {
  stream: SslStream<UdpStream>,
  clock: SystemClock,
  config: Config,
  provision: Provision,
}

impl DtlsTransport {
  /// Connect to `host:port` and perform the DTLS handshake
  pub fn open(host: &str,
              port: u16,
              creds: &Credentials,
              config: Config)
              -> Result<Self, TransportError> {
    let mut ctx = SslConnector::builder(SslMethod::dtls()).map_err(context_err("failed to create DTLS context"))?;

    ctx.set_private_key_file(&creds.key_file, SslFiletype::PEM)
       .map_err(context_err("failed to load private key"))?;
    ctx.set_certificate_file(&creds.cert_file, SslFiletype::PEM)
       .map_err(context_err("failed to load certificate"))?;
    ctx.check_private_key()
       .map_err(context_err("private key does not match certificate"))?;
    ctx.set_ca_file(&creds.trust_file)
       .map_err(context_err("failed to load trust file"))?;

    if let Some(crl) = &creds.crl_file {
      let store = ctx.cert_store_mut();
      store.add_lookup(X509Lookup::file())
           .and_then(|lookup| lookup.load_crl_file(crl, SslFiletype::PEM))
           .map_err(context_err("failed to load certificate revocation list"))?;
      store.set_flags(X509VerifyFlags::CRL_CHECK)
           .map_err(context_err("failed to enable revocation checking"))?;
    }

    ctx.set_verify(SslVerifyMode::PEER);
    let opts = ctx.options();
    ctx.set_options(opts | SslOptions::NO_QUERY_MTU);

    let connector = ctx.build();

    // the handshake gets the whole unacked retransmission budget
    let handshake_timeout = config.msg
                                  .con
                                  .unacked_retry_strategy
                                  .max_time(config.msg.con.max_attempts);
    let sock = connect_udp(host, port, handshake_timeout).map_err(|e| {
                 log::error!("failed to connect to {}:{}: {}", host, port, e);
                 TransportError::Io(e)
               })?;

    let stream = connector.connect(&creds.common_name, UdpStream(sock))
                          .map_err(|e| {
                            log::error!("DTLS handshake with {}:{} failed: {}", host, port, e);
                            TransportError::Secure { reported: true }
                          })?;

    stream.get_ref()
          .0
          .set_read_timeout(Some(config.poll_interval_std()))?;

    let clock = SystemClock::new();
    let provision = Provision::new(config.msg.token_seed);

    log::info!("DTLS session established with {}:{} ({})",
               host,
               port,
               stream.ssl().version_str());

    Ok(Self { stream,
              clock,
              config,
              provision })
  }
}

impl Transport for DtlsTransport {
  type Msg = Message;

  fn exchange(&mut self, req: &Message, resp: &mut Message) -> Result<(), TransportError> {
    con::exchange(&mut self.stream,
                  &self.clock,
                  &self.config,
                  &mut self.provision,
                  req,
                  resp)
  }
}
