use std::error::Error as StdError;
use std::net::UdpSocket;
use std::thread;

use croak::blocking::{Client, Server};
use croak::code;
use croak::config::{self, Config};
use croak::error::{Buffer, Error, Malformed};
use croak::msg::{Code, Message, OptNumber};
use croak::net::TransportError;
use croak::retry::{Attempts, Strategy};
use croak::server::Response;
use embedded_time::duration::Milliseconds;

type Handled = Result<(), Box<dyn StdError>>;

/// A registrar that echoes the request path and answers with `status` and `payload`
fn registrar(status: Code,
             payload: &'static [u8])
             -> impl Fn(&Message, &mut Response<'_, Message>) -> Handled + Send + 'static {
  move |req, resp| {
    req.path_segments()
       .try_for_each(|seg| resp.add_option(OptNumber::URI_PATH, seg))?;
    resp.set_code(status);
    resp.set_payload(payload)?;
    Ok(())
  }
}

fn serve<H>(handler: H, separate: Option<&str>) -> u16
  where H: croak::server::Handler<Message> + Send + 'static
{
  let mut server = Server::try_new("127.0.0.1:0", handler).unwrap();
  if let Some(path) = separate {
    server.separate_response(path).unwrap();
  }

  let port = server.local_addr().unwrap().port();
  thread::spawn(move || server.run());
  port
}

fn register(port: u16) -> (Result<usize, Error>, [u8; 8]) {
  let mut client = Client::connect("127.0.0.1", port, None).unwrap();
  let mut dest = [0xAAu8; 8];
  let result = client.register(b"device-42", &mut dest);
  (result, dest)
}

#[test]
fn piggybacked_registration() {
  let port = serve(registrar(code::CREATED, b"OK"), None);

  let (result, dest) = register(port);
  assert_eq!(result.unwrap(), 2);
  assert_eq!(&dest, b"OK\0\0\0\0\0\0");
}

#[test]
fn separate_registration() {
  let port = serve(registrar(code::CHANGED, b"OK"), Some("client/id"));

  let (result, dest) = register(port);
  assert_eq!(result.unwrap(), 2);
  assert_eq!(&dest[..3], b"OK\0");
}

#[test]
fn unexpected_payload_is_rejected() {
  let port = serve(registrar(code::CREATED, b"FAIL"), None);

  let (result, dest) = register(port);
  match result {
    | Err(Error::Malformed(Malformed::Payload(p))) => assert_eq!(p, b"FAIL".to_vec()),
    | other => panic!("{:?}", other),
  }
  assert_eq!(dest, [0u8; 8]);
}

#[test]
fn error_status_is_rejected() {
  let port = serve(registrar(code::NOT_FOUND, b"OK"), None);

  let (result, dest) = register(port);
  match result {
    | Err(Error::Malformed(Malformed::Status(c))) => assert_eq!(c, code::NOT_FOUND),
    | other => panic!("{:?}", other),
  }
  assert_eq!(dest, [0xAAu8; 8]);
}

#[test]
fn tiny_destination_reports_shortfall() {
  let port = serve(registrar(code::CREATED, b"OK"), None);

  let mut client = Client::connect("127.0.0.1", port, None).unwrap();
  let mut dest = [0u8; 1];
  match client.register(b"device-42", &mut dest) {
    | Err(Error::InsufficientBuffer { buffer: Buffer::Payload,
                                      short_by, }) => assert_eq!(short_by, 2),
    | other => panic!("{:?}", other),
  }
}

#[test]
fn silent_server_is_never_acked() {
  let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
  let port = silent.local_addr().unwrap().port();

  let con = config::Con { unacked_retry_strategy: Strategy::Delay { min: Milliseconds(10),
                                                                    max: Milliseconds(20) },
                          max_attempts: Attempts(3),
                          ..Default::default() };
  let config = Config { msg: config::Msg { con,
                                           ..Default::default() },
                        ..Default::default() };

  let mut client = Client::connect_config("127.0.0.1", port, None, config).unwrap();
  let mut dest = [0u8; 8];
  match client.register(b"device-42", &mut dest) {
    | Err(Error::Transport(TransportError::NeverAcked)) => (),
    | other => panic!("{:?}", other),
  }

  // every attempt reached the socket
  let mut buf = [0u8; 64];
  silent.set_nonblocking(true).unwrap();
  let mut received = 0;
  while silent.recv_from(&mut buf).is_ok() {
    received += 1;
  }
  assert_eq!(received, 3);
}
