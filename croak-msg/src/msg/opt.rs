use std_alloc::vec::Vec;

use toad_macros::rfc_7252_doc;

use crate::cursor::Cursor;
use crate::from_bytes::TryConsumeBytes;

#[doc = rfc_7252_doc!("5.4")]
/// <details><summary><b>RFC7252 Section 3.1 Option binary format</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("3.1"))]
/// </details>
///
/// # `Opt` struct
/// An option along with its absolute [`OptNumber`].
///
/// On the wire options are stored as deltas from the previous
/// option's number; the deltas are computed when serializing
/// and summed when parsing.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Opt {
  /// See [`OptNumber`]
  pub number: OptNumber,
  /// See [`OptValue`]
  pub value: OptValue,
}

impl Opt {
  /// The longest option value that may be stored in a message.
  ///
  /// This is the maximum length of the largest registered option (Proxy-Uri).
  pub const MAX_VALUE_LEN: usize = 1034;

  /// Number of bytes this option occupies on the wire, given the number of the option before it.
  pub(crate) fn wire_size(&self, prev: OptNumber) -> usize {
    let ext = |n: usize| match n {
      | n if n >= 269 => 2,
      | n if n >= 13 => 1,
      | _ => 0,
    };

    let delta = (self.number.0 - prev.0) as usize;
    1 + ext(delta) + ext(self.value.0.len()) + self.value.0.len()
  }

  /// Given a collection to [`Extend`] and the number of the option
  /// preceding this one, add this Opt's bytes to the collection.
  pub(crate) fn extend_bytes(&self, prev: OptNumber, bytes: &mut impl Extend<u8>) {
    let (del, del_bytes) = crate::to_bytes::opt_len_or_delta((self.number.0 - prev.0) as u16);
    let (len, len_bytes) = crate::to_bytes::opt_len_or_delta(self.value.0.len() as u16);
    let del = del << 4;

    let header = del | len;

    bytes.extend(Some(header));

    if let Some(bs) = del_bytes {
      bytes.extend(bs);
    }

    if let Some(bs) = len_bytes {
      bytes.extend(bs);
    }

    bytes.extend(self.value.0.iter().copied());
  }
}

#[doc = rfc_7252_doc!("5.4.6")]
/// <details><summary><b>RFC7252 Section 12.2 Core CoAP Option Numbers</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("12.2"))]
/// </details>
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u32);

impl OptNumber {
  /// If-Match
  pub const IF_MATCH: Self = Self(1);
  /// Uri-Host
  pub const URI_HOST: Self = Self(3);
  /// ETag
  pub const ETAG: Self = Self(4);
  /// Uri-Port
  pub const URI_PORT: Self = Self(7);
  /// Location-Path
  pub const LOCATION_PATH: Self = Self(8);
  #[doc = rfc_7252_doc!("5.10.1")]
  pub const URI_PATH: Self = Self(11);
  /// Content-Format
  pub const CONTENT_FORMAT: Self = Self(12);
  /// Uri-Query
  pub const URI_QUERY: Self = Self(15);
  /// Accept
  pub const ACCEPT: Self = Self(17);
}

#[doc = rfc_7252_doc!("3.2")]
#[derive(Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct OptValue(pub Vec<u8>);

impl OptValue {
  /// Borrow the raw bytes of the value
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

/// Errors encounterable while adding an option to a message
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptError {
  /// The value was longer than [`Opt::MAX_VALUE_LEN`]
  #[allow(missing_docs)]
  ValueTooLong { number: OptNumber, max: usize, actual: usize },

  /// The message already holds the maximum number of options
  TooManyOptions(usize),

  /// Option numbers are 16-bit unsigned integers
  InvalidNumber(OptNumber),
}

impl core::fmt::Display for OptError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::ValueTooLong { number,
                             max,
                             actual, } => {
        write!(f,
               "option {} value is {} bytes, longer than the maximum of {}",
               number.0, actual, max)
      },
      | Self::TooManyOptions(n) => write!(f, "message already has {} options", n),
      | Self::InvalidNumber(n) => write!(f, "{} is not a valid option number", n.0),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for OptError {}

/// Errors encounterable while parsing an option from bytes
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum OptParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// Parsed more options than a message may hold
  TooManyOptions(usize),

  /// Option Delta was set to 15, which is invalid.
  OptionDeltaReservedValue(u8),

  /// Value Length was set to 15, which is invalid.
  ValueLengthReservedValue(u8),

  /// Not a true failure case; only means we tried to read the payload marker byte (0xFF)
  /// as an option header.
  OptionsExhausted,
}

impl OptParseError {
  /// Shorthand for [`OptParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}

impl core::fmt::Display for OptParseError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::UnexpectedEndOfStream => write!(f, "option ended unexpectedly"),
      | Self::TooManyOptions(n) => write!(f, "more than {} options", n),
      | Self::OptionDeltaReservedValue(n) => write!(f, "reserved option delta {}", n),
      | Self::ValueLengthReservedValue(n) => write!(f, "reserved option length {}", n),
      | Self::OptionsExhausted => write!(f, "no more options"),
    }
  }
}

pub(crate) fn parse_opt_len_or_delta<A: AsRef<[u8]>>(head: u8,
                                                     bytes: &mut Cursor<A>,
                                                     reserved_err: OptParseError)
                                                     -> Result<u32, OptParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok((n as u32) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]) as u32 + 269),
      | _ => Err(OptParseError::eof()),
    },
    | 15 => Err(reserved_err),
    | _ => Ok(head as u32),
  }
}

/// Parse a single option, given the number of the option parsed before it.
pub(crate) fn consume_opt<A: AsRef<[u8]>>(prev: OptNumber,
                                          bytes: &mut Cursor<A>)
                                          -> Result<Opt, OptParseError> {
  // the payload marker is left for the message to consume
  if matches!(bytes.peek(), None | Some(0b11111111)) {
    return Err(OptParseError::OptionsExhausted);
  }

  let byte1 = bytes.next().ok_or_else(OptParseError::eof)?;

  // NOTE: Delta **MUST** be consumed before Value.
  let delta = parse_opt_len_or_delta(byte1 >> 4,
                                     bytes,
                                     OptParseError::OptionDeltaReservedValue(15))?;

  let len = parse_opt_len_or_delta(byte1 & 0b00001111,
                                   bytes,
                                   OptParseError::ValueLengthReservedValue(15))?
            as usize;

  let value = bytes.take_exact(len)
                   .ok_or(OptParseError::UnexpectedEndOfStream)?
                   .to_vec();

  Ok(Opt { number: OptNumber(prev.0 + delta),
           value: OptValue(value) })
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for Vec<Opt> {
  type Error = OptParseError;

  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    let mut opts = Vec::new();
    let mut prev = OptNumber(0);

    loop {
      match consume_opt(prev, bytes) {
        | Ok(opt) => {
          if opts.len() >= crate::Message::MAX_OPTS {
            break Err(Self::Error::TooManyOptions(crate::Message::MAX_OPTS));
          }

          prev = opt.number;
          opts.push(opt);
        },
        | Err(OptParseError::OptionsExhausted) => break Ok(opts),
        | Err(e) => break Err(e),
      }
    }
  }
}
