pub use croak_msg::{Code,
                    CodeKind,
                    Id,
                    Message,
                    MessageParseError,
                    MessageToBytesError,
                    Opt,
                    OptError,
                    OptNumber,
                    OptValue,
                    PayloadError,
                    Token,
                    TryFromBytes,
                    TryIntoBytes,
                    Type,
                    Version};

/// Everything the registration client and the server contract
/// need from a CoAP message.
///
/// [`Message`] is the implementation used by the transports
/// in [`crate::net`]; other implementations (e.g. a message
/// that lives in a foreign allocator, or a test double) only
/// need to provide attribute access.
pub trait Msg: Sized + core::fmt::Debug {
  /// Iterator over `(number, value)` pairs, in wire order
  type Opts<'a>: Iterator<Item = (OptNumber, &'a [u8])>
    where Self: 'a;

  /// An empty message: version 1, CON, code 0.00,
  /// no token, no options and no payload.
  fn new() -> Self;

  /// Release whatever the message holds.
  ///
  /// Invoked exactly once, right before the message is dropped,
  /// by whoever owns it ([`crate::exchange::Exchange`] for client
  /// exchanges).
  fn teardown(&mut self) {}

  /// Get the protocol version
  fn version(&self) -> Version;
  /// Set the protocol version
  fn set_version(&mut self, ver: Version);

  /// Get the message type
  fn ty(&self) -> Type;
  /// Set the message type
  fn set_ty(&mut self, ty: Type);

  /// Get the request method / response status
  fn code(&self) -> Code;
  /// Set the request method / response status
  fn set_code(&mut self, code: Code);

  /// Get the message id
  fn id(&self) -> Id;
  /// Set the message id
  fn set_id(&mut self, id: Id);

  /// Get the token
  fn token(&self) -> Token;
  /// Set the token
  fn set_token(&mut self, token: Token);

  /// Add an option. Repeatable options keep the order they were added in.
  fn add_option(&mut self, number: OptNumber, value: &[u8]) -> Result<(), OptError>;

  /// Enumerate options
  fn options(&self) -> Self::Opts<'_>;

  /// Replace the payload
  fn set_payload(&mut self, bytes: &[u8]) -> Result<(), PayloadError>;

  /// The payload, or `None` if the message carries no payload
  fn payload(&self) -> Option<&[u8]>;

  /// Render the Uri-Path options of this message into `buf`.
  ///
  /// The path is `/` followed by the segments joined with `/`.
  ///
  /// The rendered path is truncated to fit `buf`, and is always followed
  /// by a NUL byte when `buf` is not empty. The return value is the length
  /// of the _whole_ path excluding the NUL byte, so the path was truncated
  /// iff `needed + 1 > buf.len()`.
  ///
  /// ```
  /// use croak::msg::{Message, Msg, OptNumber};
  ///
  /// let mut msg = <Message as Msg>::new();
  /// msg.add_option(OptNumber::URI_PATH, b"client").unwrap();
  /// msg.add_option(OptNumber::URI_PATH, b"id").unwrap();
  ///
  /// let mut buf = [0u8; 32];
  /// let n = msg.render_path(&mut buf);
  /// assert_eq!(&buf[..n], b"/client/id");
  /// assert_eq!(buf[n], 0);
  ///
  /// let mut small = [0u8; 4];
  /// assert_eq!(msg.render_path(&mut small), 10);
  /// assert_eq!(&small, b"/cl\0");
  /// ```
  fn render_path(&self, buf: &mut [u8]) -> usize {
    let segments = self.options()
                       .filter(|(n, _)| *n == OptNumber::URI_PATH)
                       .map(|(_, v)| v);

    render_segments(segments, buf)
  }
}

pub(crate) fn render_segments<'a>(segments: impl Iterator<Item = &'a [u8]>,
                                  buf: &mut [u8])
                                  -> usize {
  let cap = buf.len().saturating_sub(1);
  let mut len = 0usize;

  let mut push = |b: u8| {
    if len < cap {
      buf[len] = b;
    }
    len += 1;
  };

  let mut any = false;
  for seg in segments {
    any = true;
    push(b'/');
    seg.iter().copied().for_each(&mut push);
  }

  if !any {
    push(b'/');
  }

  if let Some(nul) = buf.get_mut(len.min(cap)) {
    *nul = 0;
  }

  len
}

impl Msg for Message {
  type Opts<'a> = core::iter::Map<core::slice::Iter<'a, Opt>, fn(&'a Opt) -> (OptNumber, &'a [u8])>;

  fn new() -> Self {
    Message::default()
  }

  fn version(&self) -> Version {
    self.ver
  }

  fn set_version(&mut self, ver: Version) {
    self.ver = ver;
  }

  fn ty(&self) -> Type {
    self.ty
  }

  fn set_ty(&mut self, ty: Type) {
    self.ty = ty;
  }

  fn code(&self) -> Code {
    self.code
  }

  fn set_code(&mut self, code: Code) {
    self.code = code;
  }

  fn id(&self) -> Id {
    self.id
  }

  fn set_id(&mut self, id: Id) {
    self.id = id;
  }

  fn token(&self) -> Token {
    self.token
  }

  fn set_token(&mut self, token: Token) {
    self.token = token;
  }

  fn add_option(&mut self, number: OptNumber, value: &[u8]) -> Result<(), OptError> {
    self.add(number, value)
  }

  fn options(&self) -> Self::Opts<'_> {
    fn pair(o: &Opt) -> (OptNumber, &[u8]) {
      (o.number, o.value.as_bytes())
    }

    self.opts.iter().map(pair as fn(&Opt) -> (OptNumber, &[u8]))
  }

  fn set_payload(&mut self, bytes: &[u8]) -> Result<(), PayloadError> {
    Message::set_payload(self, bytes)
  }

  fn payload(&self) -> Option<&[u8]> {
    Some(Message::payload(self)).filter(|p| !p.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn msg(path: &[&str]) -> Message {
    let mut msg = <Message as Msg>::new();
    path.iter()
        .for_each(|s| msg.add_option(OptNumber::URI_PATH, s.as_bytes()).unwrap());
    msg
  }

  #[test]
  fn new_is_empty_con() {
    let m = <Message as Msg>::new();
    assert_eq!(m.version(), Version(1));
    assert_eq!(m.ty(), Type::Con);
    assert_eq!(m.code(), Code::new(0, 0));
    assert!(m.token().is_empty());
    assert_eq!(m.options().count(), 0);
    assert_eq!(Msg::payload(&m), None);
  }

  #[test]
  fn render_path_without_segments_is_root() {
    let mut buf = [0xAAu8; 4];
    assert_eq!(msg(&[]).render_path(&mut buf), 1);
    assert_eq!(&buf[..2], b"/\0");
  }

  #[test]
  fn render_path_ignores_other_options() {
    let mut m = msg(&["client", "id"]);
    m.add_option(OptNumber::URI_QUERY, b"x=1").unwrap();
    m.add_option(OptNumber::URI_HOST, b"example.com").unwrap();

    let mut buf = [0u8; 32];
    let n = m.render_path(&mut buf);
    assert_eq!(&buf[..=n], b"/client/id\0");
  }

  #[test]
  fn render_path_exact_fit() {
    let m = msg(&["client", "id"]);

    let mut buf = [0xAAu8; 11];
    assert_eq!(m.render_path(&mut buf), 10);
    assert_eq!(&buf, b"/client/id\0");

    let mut buf = [0xAAu8; 10];
    assert_eq!(m.render_path(&mut buf), 10);
    assert_eq!(&buf, b"/client/i\0");
  }

  #[test]
  fn render_path_into_empty_buffer_still_measures() {
    assert_eq!(msg(&["separate"]).render_path(&mut []), 9);
  }

  #[test]
  fn options_are_in_wire_order() {
    let mut m = <Message as Msg>::new();
    m.add_option(OptNumber::CONTENT_FORMAT, &[0]).unwrap();
    m.add_option(OptNumber::URI_PATH, b"a").unwrap();

    let nums = m.options().map(|(n, _)| n).collect::<Vec<_>>();
    assert_eq!(nums, vec![OptNumber::URI_PATH, OptNumber::CONTENT_FORMAT]);
  }
}
