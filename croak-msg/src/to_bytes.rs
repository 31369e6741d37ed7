use std_alloc::vec::Vec;
use tinyvec::ArrayVec;

use crate::*;

/// Trait allowing fallible conversion into bytes
pub trait TryIntoBytes {
  /// Error yielded when the conversion fails
  type Error;

  /// Try to convert into a byte vector
  ///
  /// ```
  /// use croak_msg::{Code, Id, Message, Token, TryIntoBytes, Type};
  ///
  /// let msg = Message::new(Type::Con, Code::new(0, 1), Id(0), Token::default());
  /// let bytes: Vec<u8> = msg.try_into_bytes().unwrap();
  ///
  /// assert_eq!(bytes, vec![0b_01_00_0000, 0b_000_00001, 0, 0]);
  /// ```
  fn try_into_bytes(self) -> Result<Vec<u8>, Self::Error>;
}

/// Errors encounterable serializing to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageToBytesError {
  /// The token was longer than [`Token::MAX_LEN`]
  InvalidToken(usize),

  /// The payload was longer than [`Message::MAX_PAYLOAD_LEN`]
  #[allow(missing_docs)]
  TooLong { capacity: usize, size: usize },
}

impl core::fmt::Display for MessageToBytesError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::InvalidToken(n) => write!(f, "token of {} bytes is too long", n),
      | Self::TooLong { capacity, size } => {
        write!(f, "payload of {} bytes exceeds capacity of {}", size, capacity)
      },
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for MessageToBytesError {}

impl TryIntoBytes for Message {
  type Error = MessageToBytesError;

  fn try_into_bytes(self) -> Result<Vec<u8>, Self::Error> {
    if self.token.len() > Token::MAX_LEN {
      return Err(Self::Error::InvalidToken(self.token.len()));
    }

    if self.payload.0.len() > Message::MAX_PAYLOAD_LEN {
      return Err(Self::Error::TooLong { capacity: Message::MAX_PAYLOAD_LEN,
                                        size: self.payload.0.len() });
    }

    let mut bytes = Vec::with_capacity(self.wire_size());

    let byte1: u8 = Byte1 { tkl: self.token.len() as u8,
                            ver: self.ver,
                            ty: self.ty }.into();
    let code: u8 = self.code.into();
    let id: [u8; 2] = self.id.into();

    bytes.push(byte1);
    bytes.push(code);

    bytes.extend(id);
    bytes.extend(self.token.0);

    let mut prev = OptNumber(0);
    for opt in self.opts.iter() {
      opt.extend_bytes(prev, &mut bytes);
      prev = opt.number;
    }

    if !self.payload.0.is_empty() {
      bytes.push(0b11111111);
      bytes.extend(self.payload.0);
    }

    Ok(bytes)
  }
}

pub(crate) fn opt_len_or_delta(val: u16) -> (u8, Option<ArrayVec<[u8; 2]>>) {
  match val {
    | n if n >= 269 => {
      let mut bytes = ArrayVec::new();
      bytes.extend((n - 269).to_be_bytes());
      (14, Some(bytes))
    },
    | n if n >= 13 => {
      let mut bytes = ArrayVec::new();
      bytes.push((n as u8) - 13);
      (13, Some(bytes))
    },
    | n => (n as u8, None),
  }
}
