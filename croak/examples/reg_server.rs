use croak::blocking::Server;
use croak::code;
use croak::msg::{Message, Msg, OptNumber};
use croak::req::REGISTRATION_PATH;
use croak::server::Response;

type Handled = Result<(), Box<dyn std::error::Error>>;

fn register(req: &Message, resp: &mut Response<'_, Message>) -> Handled {
  let mut path = [0u8; 64];
  let n = req.render_path(&mut path);

  if req.code != code::POST || &path[..n.min(path.len())] != REGISTRATION_PATH.as_bytes() {
    resp.set_code(code::NOT_FOUND);
    return Ok(());
  }

  match Msg::payload(req) {
    | Some(identity) => {
      log::info!("registered '{}'", String::from_utf8_lossy(identity));
      req.path_segments()
         .try_for_each(|seg| resp.add_option(OptNumber::URI_PATH, seg))?;
      resp.set_code(code::CREATED);
      resp.set_payload(b"OK")?;
    },
    | None => resp.set_code(code::BAD_REQUEST),
  }

  Ok(())
}

fn main() {
  simple_logger::init_with_level(log::Level::Info).unwrap();

  let addr = std::env::args().nth(1)
                             .unwrap_or_else(|| "0.0.0.0:5683".to_string());

  let mut server = Server::try_new(addr, register).unwrap();
  server.run().unwrap();
}
