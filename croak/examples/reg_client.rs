use std::process::ExitCode;

use croak::blocking::Client;
use croak::net::Credentials;

const USAGE: &str = "usage: reg_client host port identity [key cert trust crl common_name]
    host:        IP address or host name of the registration server
    port:        port number of the registration server
    identity:    identity to register
    key:         our private key (PEM)
    cert:        our certificate (PEM)
    trust:       certificates of trusted authorities (PEM)
    crl:         certificate revocation list (PEM), '-' for none
    common_name: name the server certificate must be issued to";

fn main() -> ExitCode {
  simple_logger::init_with_env().unwrap();

  let args = std::env::args().skip(1).collect::<Vec<_>>();

  let creds = match args.as_slice() {
    | [_, _, _] => None,
    | [_, _, _, key, cert, trust, crl, cn] => {
      Some(Credentials { key_file: key.into(),
                         cert_file: cert.into(),
                         trust_file: trust.into(),
                         crl_file: Some(crl).filter(|crl| *crl != "-").map(Into::into),
                         common_name: cn.clone() })
    },
    | _ => {
      eprintln!("{}", USAGE);
      return ExitCode::FAILURE;
    },
  };

  let port = match args[1].parse::<u16>() {
    | Ok(port) => port,
    | Err(e) => {
      eprintln!("invalid port '{}': {}", args[1], e);
      return ExitCode::FAILURE;
    },
  };

  let mut client = match Client::connect(&args[0], port, creds) {
    | Ok(client) => client,
    | Err(e) => {
      log::error!("{}", e);
      return ExitCode::FAILURE;
    },
  };

  let mut ack = [0u8; 32];
  match client.register(args[2].as_bytes(), &mut ack) {
    | Ok(n) => {
      println!("{}", String::from_utf8_lossy(&ack[..n]));
      ExitCode::SUCCESS
    },
    | Err(_) => ExitCode::FAILURE,
  }
}
