use std_alloc::vec::Vec;

use toad_macros::rfc_7252_doc;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

use crate::cursor::Cursor;
use crate::from_bytes::TryConsumeBytes;
use crate::TryFromBytes;

#[doc = rfc_7252_doc!("5.5")]
#[derive(Clone, Default, Hash, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Payload(pub Vec<u8>);

/// Errors encounterable while setting a message's payload
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PayloadError {
  /// The payload was longer than [`Message::MAX_PAYLOAD_LEN`]
  #[allow(missing_docs)]
  TooLong { max: usize, actual: usize },
}

impl core::fmt::Display for PayloadError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::TooLong { max, actual } => {
        write!(f,
               "payload is {} bytes, longer than the maximum of {}",
               actual, max)
      },
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for PayloadError {}

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl TryFrom<u8> for Byte1 {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Ok(Byte1 { ver: Version(ver),
               ty: Type::try_from(ty)?,
               tkl })
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}

/// # `Message` struct
/// Low-level representation of a message that has been parsed from the raw binary format.
///
/// Options are kept ordered by [`OptNumber`]; repeated options
/// (e.g. Uri-Path segments) keep the order they were added in.
///
/// <details>
/// <summary><b>RFC7252 - CoAP Messaging Model</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("2.1"))]
/// </details>
/// <details>
/// <summary><b>RFC7252 - CoAP Message Binary Format</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("3"))]
/// </details>
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Message {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`Opt`] for details
  pub opts: Vec<Opt>,
  /// see [`Payload`]
  pub payload: Payload,
}

impl Default for Message {
  fn default() -> Self {
    Self::new(Type::Con, Code::new(0, 0), Id(0), Token::default())
  }
}

impl Message {
  /// The most options a message may hold
  pub const MAX_OPTS: usize = 32;

  /// The longest payload a message may carry
  pub const MAX_PAYLOAD_LEN: usize = 1024;

  /// Create a message with no options and no payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           ty,
           ver: Version::default(),
           token,
           code,
           opts: Vec::new(),
           payload: Payload::default() }
  }

  /// Create a new message that ACKs this one.
  ///
  /// The ACK has the same [`Id`] as this message, and is EMPTY
  /// (no token, options, or payload).
  ///
  /// ```
  /// use croak_msg::*;
  ///
  /// let req = Message::new(Type::Con, Code::new(0, 1), Id(12), Token::from_slice(&[1]).unwrap());
  /// let ack = req.ack();
  ///
  /// assert_eq!(ack.ty, Type::Ack);
  /// assert_eq!(ack.id, Id(12));
  /// assert_eq!(ack.code, Code::new(0, 0));
  /// assert!(ack.token.is_empty());
  /// ```
  pub fn ack(&self) -> Self {
    Self::new(Type::Ack, Code::new(0, 0), self.id, Token::default())
  }

  /// Create a new message that resets this one.
  pub fn reset(&self) -> Self {
    Self::new(Type::Reset, Code::new(0, 0), self.id, Token::default())
  }

  /// Insert an option value.
  ///
  /// Repeated options (like Uri-Path) are kept in the order they were added.
  ///
  /// ```
  /// use croak_msg::*;
  ///
  /// let mut msg = Message::default();
  /// msg.add(OptNumber::CONTENT_FORMAT, [0]).unwrap();
  /// msg.add(OptNumber::URI_PATH, "client").unwrap();
  /// msg.add(OptNumber::URI_PATH, "id").unwrap();
  ///
  /// let numbers = msg.opts.iter().map(|o| o.number.0).collect::<Vec<_>>();
  /// assert_eq!(numbers, vec![11, 11, 12]);
  /// ```
  pub fn add(&mut self, number: OptNumber, value: impl AsRef<[u8]>) -> Result<(), OptError> {
    let value = value.as_ref();

    if number.0 > u16::MAX as u32 {
      return Err(OptError::InvalidNumber(number));
    }

    if value.len() > Opt::MAX_VALUE_LEN {
      return Err(OptError::ValueTooLong { number,
                                          max: Opt::MAX_VALUE_LEN,
                                          actual: value.len() });
    }

    if self.opts.len() >= Self::MAX_OPTS {
      return Err(OptError::TooManyOptions(self.opts.len()));
    }

    let ix = self.opts
                 .iter()
                 .position(|o| o.number > number)
                 .unwrap_or(self.opts.len());

    self.opts.insert(ix,
                     Opt { number,
                           value: OptValue(value.to_vec()) });
    Ok(())
  }

  /// Iterate over the values of all options with a given number
  pub fn get(&self, number: OptNumber) -> impl Iterator<Item = &OptValue> {
    self.opts
        .iter()
        .filter(move |o| o.number == number)
        .map(|o| &o.value)
  }

  /// Iterate over the Uri-Path segments of this message
  pub fn path_segments(&self) -> impl Iterator<Item = &[u8]> {
    self.get(OptNumber::URI_PATH).map(|v| v.as_bytes())
  }

  /// Replace the payload of this message
  pub fn set_payload(&mut self, bytes: impl AsRef<[u8]>) -> Result<(), PayloadError> {
    let bytes = bytes.as_ref();

    if bytes.len() > Self::MAX_PAYLOAD_LEN {
      return Err(PayloadError::TooLong { max: Self::MAX_PAYLOAD_LEN,
                                         actual: bytes.len() });
    }

    self.payload = Payload(bytes.to_vec());
    Ok(())
  }

  /// Borrow the payload bytes
  pub fn payload(&self) -> &[u8] {
    &self.payload.0
  }

  /// Number of bytes this message occupies on the wire
  pub fn wire_size(&self) -> usize {
    let header_size = 4;
    let token_size = self.token.len();
    let payload_size = match self.payload.0.len() {
      | 0 => 0,
      | n => n + 1, // payload marker
    };

    let (opts_size, _) = self.opts
                             .iter()
                             .fold((0, OptNumber(0)), |(size, prev), o| {
                               (size + o.wire_size(prev), o.number)
                             });

    header_size + token_size + opts_size + payload_size
  }
}

impl<Bytes: AsRef<[u8]>> TryFromBytes<Bytes> for Message {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: Bytes) -> Result<Self, Self::Error> {
    let mut bytes = Cursor::new(bytes);

    let Byte1 { tkl, ty, ver } = bytes.next()
                                      .ok_or_else(MessageParseError::eof)?
                                      .try_into()?;

    if tkl as usize > Token::MAX_LEN {
      return Err(Self::Error::InvalidTokenLength(tkl));
    }

    let code: Code = bytes.next().ok_or_else(MessageParseError::eof)?.into();
    let id: Id = Id::try_consume_bytes(&mut bytes)?;

    let token = bytes.take_exact(tkl as usize)
                     .and_then(Token::from_slice)
                     .ok_or_else(MessageParseError::eof)?;

    let opts = Vec::<Opt>::try_consume_bytes(&mut bytes).map_err(Self::Error::OptParseError)?;

    let payload = match bytes.next() {
      | None => Payload::default(),
      | Some(_marker) if bytes.is_exhausted() => {
        return Err(Self::Error::EmptyPayloadAfterMarker)
      },
      | Some(_marker) => {
        let rest = bytes.take_until_end();
        if rest.len() > Self::MAX_PAYLOAD_LEN {
          return Err(Self::Error::PayloadTooLong(rest.len()));
        }
        Payload(rest.to_vec())
      },
    };

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload })
  }
}

#[cfg(test)]
mod tests {
  use std_alloc::vec;

  use super::*;

  #[test]
  fn parse_msg() {
    let (expect, msg) = crate::test_msg();
    assert_eq!(Message::try_from_bytes(&msg).unwrap(), expect)
  }

  #[test]
  fn parse_byte1() {
    let byte = 0b_01_10_0011u8;
    let byte = Byte1::try_from(byte).unwrap();
    assert_eq!(byte,
               Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 })
  }

  #[test]
  fn parse_id() {
    let mut id_bytes = Cursor::new(34u16.to_be_bytes());
    let id = Id::try_consume_bytes(&mut id_bytes).unwrap();
    assert_eq!(id, Id(34));
  }

  #[test]
  fn parse_rejects_long_token() {
    let bytes = [0b_01_00_1001u8, 0, 0, 1];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::InvalidTokenLength(9)));
  }

  #[test]
  fn parse_rejects_marker_without_payload() {
    let bytes = [0b_01_00_0000u8, 0b_010_00001, 0, 1, 0b1111_1111];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::EmptyPayloadAfterMarker));
  }

  #[test]
  fn parse_empty_message() {
    let bytes = [0b_01_10_0000u8, 0, 0, 7];
    let msg = Message::try_from_bytes(bytes).unwrap();
    assert_eq!(msg, Message::new(Type::Ack, Code::new(0, 0), Id(7), Token::default()));
  }

  #[test]
  fn add_keeps_repeated_options_in_order() {
    let mut msg = Message::default();
    msg.add(OptNumber::URI_QUERY, "a=b").unwrap();
    msg.add(OptNumber::URI_PATH, "client").unwrap();
    msg.add(OptNumber::URI_PATH, "id").unwrap();

    assert_eq!(msg.path_segments().collect::<Vec<_>>(),
               vec![b"client".as_ref(), b"id".as_ref()]);
    assert_eq!(msg.opts.last().map(|o| o.number), Some(OptNumber::URI_QUERY));
  }

  #[test]
  fn add_rejects_oversized_values() {
    let mut msg = Message::default();
    let big = vec![0u8; Opt::MAX_VALUE_LEN + 1];
    assert_eq!(msg.add(OptNumber::URI_PATH, &big),
               Err(OptError::ValueTooLong { number: OptNumber::URI_PATH,
                                            max: Opt::MAX_VALUE_LEN,
                                            actual: Opt::MAX_VALUE_LEN + 1 }));
    assert!(msg.opts.is_empty());
  }

  #[test]
  fn add_rejects_too_many_options() {
    let mut msg = Message::default();
    (0..Message::MAX_OPTS).for_each(|_| msg.add(OptNumber::URI_PATH, "a").unwrap());
    assert_eq!(msg.add(OptNumber::URI_PATH, "a"),
               Err(OptError::TooManyOptions(Message::MAX_OPTS)));
  }

  #[test]
  fn set_payload_rejects_oversized() {
    let mut msg = Message::default();
    let big = vec![0u8; Message::MAX_PAYLOAD_LEN + 1];
    assert!(msg.set_payload(&big).is_err());
    assert!(msg.payload().is_empty());
    msg.set_payload("OK").unwrap();
    assert_eq!(msg.payload(), b"OK");
  }
}
