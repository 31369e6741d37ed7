use core::fmt;

use croak_msg::Type;

use crate::msg::Msg;

/// Renders every structural field of a message, one per line.
///
/// Rendering only reads the message.
///
/// ```
/// use croak::logging::Dump;
/// use croak::msg::{Id, Message, Msg, OptNumber, Token};
///
/// let mut msg = <Message as Msg>::new();
/// msg.set_code(croak::code::CONTENT);
/// msg.set_id(Id(0x1234));
/// msg.set_token(Token::from_slice(&[0xAB]).unwrap());
/// msg.add_option(OptNumber::URI_PATH, b"hi").unwrap();
/// Msg::set_payload(&mut msg, b"yo").unwrap();
///
/// assert_eq!(Dump(&msg).to_string(),
///            "ver:         0x01
/// type:        0x00
/// token_len:   1
/// code_class:  2
/// code_detail: 5
/// msg_id:      0x1234
/// token:       0xab
/// op[0].num:   11
/// op[0].len:   2
/// op[0].val:   0x68 0x69
/// payload:     yo
/// payload_len: 2");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dump<'a, M: Msg>(pub &'a M);

fn hex_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
  bytes.iter().try_for_each(|b| write!(f, " 0x{:02x}", b))
}

impl<'a, M: Msg> fmt::Display for Dump<'a, M> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let msg = self.0;
    let token = msg.token();
    let code = msg.code();
    let payload = msg.payload().unwrap_or_default();

    writeln!(f, "ver:         0x{:02x}", msg.version().0)?;
    writeln!(f, "type:        0x{:02x}", u8::from(msg.ty()))?;
    writeln!(f, "token_len:   {}", token.len())?;
    writeln!(f, "code_class:  {}", code.class)?;
    writeln!(f, "code_detail: {}", code.detail)?;
    writeln!(f, "msg_id:      0x{:04x}", msg.id().0)?;

    write!(f, "token:      ")?;
    hex_bytes(f, token.as_bytes())?;
    writeln!(f)?;

    for (ix, (num, val)) in msg.options().enumerate() {
      writeln!(f, "op[{}].num:   {}", ix, num.0)?;
      writeln!(f, "op[{}].len:   {}", ix, val.len())?;
      write!(f, "op[{}].val:  ", ix)?;
      hex_bytes(f, val)?;
      writeln!(f)?;
    }

    writeln!(f, "payload:     {}", String::from_utf8_lossy(payload))?;
    write!(f, "payload_len: {}", payload.len())
  }
}

/// Short human name of a message type
pub fn type_name(ty: Type) -> &'static str {
  match ty {
    | Type::Con => "CON",
    | Type::Non => "NON",
    | Type::Ack => "ACK",
    | Type::Reset => "RST",
  }
}

/// Log `label` followed by a [`Dump`] of `msg` at `level`.
///
/// Nothing is formatted unless `level` is enabled.
pub fn log_msg<M: Msg>(level: log::Level, label: &str, msg: &M) {
  if log::log_enabled!(level) {
    log::log!(level, "{}\n{}", label, Dump(msg));
  }
}

#[cfg(test)]
mod tests {
  use croak_msg::{Id, Message, OptNumber, Token};

  use super::*;
  use crate::test::Watched;

  #[test]
  fn dump_empty_message() {
    let msg = <Message as Msg>::new();
    let dump = Dump(&msg).to_string();
    let lines = dump.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 9);
    assert_eq!(lines[6], "token:      ");
    assert_eq!(lines[7], "payload:     ");
    assert_eq!(lines[8], "payload_len: 0");
  }

  #[test]
  fn dump_numbers_each_option() {
    let mut msg = Message::new(Type::Ack, crate::code::CREATED, Id(7), Token::default());
    msg.add(OptNumber::URI_PATH, "client").unwrap();
    msg.add(OptNumber::URI_PATH, "id").unwrap();
    msg.add(OptNumber::CONTENT_FORMAT, [0]).unwrap();

    let dump = Dump(&msg).to_string();

    assert!(dump.contains("type:        0x02\n"));
    assert!(dump.contains("msg_id:      0x0007\n"));
    assert!(dump.contains("op[1].val:   0x69 0x64\n"));
    assert!(dump.contains("op[2].num:   12\n"));
    assert!(dump.contains("op[2].len:   1\n"));
  }

  #[test]
  fn dump_does_not_modify() {
    let mut msg = <Message as Msg>::new();
    msg.add_option(OptNumber::URI_PATH, b"x").unwrap();
    let before = msg.clone();

    let _ = Dump(&msg).to_string();
    log_msg(log::Level::Trace, "dumped", &msg);

    assert_eq!(msg, before);
  }

  #[test]
  fn log_msg_below_threshold_reads_nothing() {
    log::set_max_level(log::LevelFilter::Error);

    let mut msg = Watched::new();
    msg.add_option(OptNumber::URI_PATH, b"client").unwrap();
    msg.set_payload(b"OK").unwrap();

    log_msg(log::Level::Debug, "request", &msg);
    assert_eq!(msg.reads.get(), 0);

    let _ = Dump(&msg).to_string();
    assert_eq!(msg.reads.get(), 3);
  }

  #[test]
  fn type_names() {
    assert_eq!(type_name(Type::Con), "CON");
    assert_eq!(type_name(Type::Reset), "RST");
  }
}
