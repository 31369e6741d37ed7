/// Errors encounterable while parsing a message from bytes
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum MessageParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// Token length was > 8
  InvalidTokenLength(u8),

  /// Error parsing option
  OptParseError(super::opt::OptParseError),

  /// A payload marker (`0xFF`) was not followed by any payload bytes
  EmptyPayloadAfterMarker,

  /// The rest of the message contained more bytes than there was capacity for
  PayloadTooLong(usize),

  /// The message type is invalid (see [`Type`](super::Type) for information & valid values)
  InvalidType(u8),
}

impl MessageParseError {
  /// Shorthand for [`MessageParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}

impl core::fmt::Display for MessageParseError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::UnexpectedEndOfStream => write!(f, "message ended unexpectedly"),
      | Self::InvalidTokenLength(n) => write!(f, "token length {} exceeds 8", n),
      | Self::OptParseError(e) => write!(f, "invalid option: {}", e),
      | Self::EmptyPayloadAfterMarker => write!(f, "payload marker without payload"),
      | Self::PayloadTooLong(n) => write!(f, "payload of {} bytes is too long", n),
      | Self::InvalidType(t) => write!(f, "invalid message type {}", t),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for MessageParseError {}
