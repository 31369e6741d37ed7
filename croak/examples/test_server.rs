use croak::blocking::Server;
use croak::code;
use croak::msg::Message;
use croak::server::Response;

fn hello(_: &Message, resp: &mut Response<'_, Message>) -> Result<(), croak::msg::PayloadError> {
  resp.set_code(code::CONTENT);
  resp.set_payload(b"Hello, Client!")
}

fn main() {
  simple_logger::init_with_level(log::Level::Info).unwrap();

  let mut server = Server::try_new("[::1]:12436", hello).unwrap();
  server.separate_response("/separate").unwrap();
  server.run().unwrap();
}
