use crate::config::Config;
use crate::error::Error;
use crate::exchange::Exchange;
use crate::net::{Connection, Credentials, Transport, TransportError};
use crate::req::{self, REGISTRATION_PATH};
use crate::validate::validate;

/// A blocking registration client
///
/// ```no_run
/// use croak::blocking::Client;
/// use croak::net::Credentials;
///
/// let creds = Credentials { key_file: "client_privkey.pem".into(),
///                           cert_file: "client_cert.pem".into(),
///                           trust_file: "root_server_cert.pem".into(),
///                           crl_file: Some("root_server_crl.pem".into()),
///                           common_name: "dummy/server".into() };
///
/// let mut client = Client::connect("::1", 12436, Some(creds)).unwrap();
///
/// let mut ack = [0u8; 32];
/// client.register(b"device-42", &mut ack).unwrap();
/// ```
#[derive(Debug)]
pub struct Client<T: Transport> {
  transport: T,
  config: Config,
}

impl Client<Connection> {
  /// Connect to a server, over DTLS when `credentials` are provided
  pub fn connect(host: &str,
                 port: u16,
                 credentials: Option<Credentials>)
                 -> Result<Self, TransportError> {
    Self::connect_config(host, port, credentials, Config::default())
  }

  /// Connect to a server with a specific runtime config
  pub fn connect_config(host: &str,
                        port: u16,
                        credentials: Option<Credentials>,
                        config: Config)
                        -> Result<Self, TransportError> {
    Connection::open(host, port, credentials, config).map(|conn| Self::new_config(config, conn))
  }
}

impl<T: Transport> Client<T> {
  /// Create a client over an already-open transport
  pub fn new(transport: T) -> Self {
    Self::new_config(Config::default(), transport)
  }

  /// Create a client over an already-open transport with a specific runtime config
  pub fn new_config(config: Config, transport: T) -> Self {
    Self { transport, config }
  }

  /// Register `identity` with the server.
  ///
  /// On success, the server's acknowledgement is copied to the front of `dest`
  /// (the rest of `dest` is zeroed) and its length is returned.
  ///
  /// `dest` must have room for the acknowledgement plus a NUL byte.
  pub fn register(&mut self, identity: &[u8], dest: &mut [u8]) -> Result<usize, Error> {
    log::info!("Sending POST {} request with payload: '{}'",
               REGISTRATION_PATH,
               String::from_utf8_lossy(identity));

    let req = req::registration::<T::Msg>(identity)?;

    let mut exchange = Exchange::new(req);
    exchange.invoke(&mut self.transport)?;

    let accepted = validate(exchange.req(),
                            exchange.resp(),
                            dest,
                            self.config.path_buffer_len)?;

    log::info!("Received {} {} response with payload: '{}'",
               accepted.status,
               REGISTRATION_PATH,
               String::from_utf8_lossy(&dest[..accepted.len]));

    Ok(accepted.len)
  }
}

#[cfg(test)]
mod tests {
  use croak_msg::{Message, OptNumber, Version};

  use super::*;
  use crate::code;
  use crate::error::{Buffer, Malformed};
  use crate::msg::Msg;
  use crate::test::{teardowns, Tracked, TransportMock};

  fn answer(code: croak_msg::Code, path: &[&str], payload: &[u8]) -> Tracked {
    let mut resp = <Tracked as Msg>::new();
    resp.set_code(code);
    path.iter()
        .for_each(|s| resp.add_option(OptNumber::URI_PATH, s.as_bytes()).unwrap());
    resp.set_payload(payload).unwrap();
    resp
  }

  #[test]
  fn registers() {
    let before = teardowns();
    let mut client = Client::new(TransportMock::responding(|req| {
                                   assert_eq!(req.code(), code::POST);
                                   assert_eq!(req.payload(), Some(b"device-42".as_ref()));
                                   answer(code::CREATED, &["client", "id"], b"OK")
                                 }));

    let mut dest = [0xAAu8; 3];
    assert_eq!(client.register(b"device-42", &mut dest).unwrap(), 2);
    assert_eq!(&dest, b"OK\0");
    assert_eq!(teardowns() - before, 2);
  }

  #[test]
  fn transport_error_is_returned_as_is() {
    let before = teardowns();
    let mut client = Client::new(TransportMock::failing(TransportError::Secure { reported: true }));

    let mut dest = [0u8; 8];
    match client.register(b"device-42", &mut dest) {
      | Err(Error::Transport(TransportError::Secure { reported: true })) => (),
      | other => panic!("{:?}", other),
    }
    assert_eq!(dest, [0u8; 8]);
    assert_eq!(teardowns() - before, 2);
  }

  #[test]
  fn rejected_response_tears_down_both() {
    let before = teardowns();
    let mut client =
      Client::new(TransportMock::responding(|_| answer(code::CHANGED, &["client", "id"], b"FAIL")));

    let mut dest = [0xAAu8; 8];
    let err = client.register(b"device-42", &mut dest).unwrap_err();
    assert_eq!(err.to_string(),
               "received response message with unexpected payload: 'FAIL'");
    assert_eq!(dest, [0u8; 8]);
    assert_eq!(teardowns() - before, 2);
  }

  #[test]
  fn version_mismatch() {
    let mut client = Client::new(TransportMock::responding(|_| {
                                   let mut resp = answer(code::CREATED, &["client", "id"], b"OK");
                                   resp.set_version(Version(3));
                                   resp
                                 }));

    let mut dest = [0u8; 8];
    match client.register(b"device-42", &mut dest) {
      | Err(Error::Malformed(Malformed::Version(Version(3)))) => (),
      | other => panic!("{:?}", other),
    }
  }

  #[test]
  fn path_buffer_comes_from_config() {
    let config = Config { path_buffer_len: 4,
                          ..Default::default() };
    let mut client =
      Client::new_config(config,
                         TransportMock::responding(|_| answer(code::CREATED, &["client", "id"], b"OK")));

    let mut dest = [0u8; 8];
    match client.register(b"device-42", &mut dest) {
      | Err(Error::InsufficientBuffer { buffer: Buffer::Path,
                                        short_by, }) => assert_eq!(short_by, 11 - 4),
      | other => panic!("{:?}", other),
    }
  }

  #[test]
  fn oversized_identity_never_reaches_transport() {
    let before = teardowns();
    let mut transport = TransportMock::failing(TransportError::Timeout);

    {
      let mut client = Client::new(&mut transport);
      let identity = vec![b'x'; Message::MAX_PAYLOAD_LEN + 1];
      let mut dest = [0u8; 8];
      assert!(matches!(client.register(&identity, &mut dest), Err(Error::Build(_))));
    }

    assert_eq!(transport.calls(), 0);
    assert_eq!(teardowns() - before, 1);
  }
}
