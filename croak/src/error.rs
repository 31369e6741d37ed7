use core::fmt;

use croak_msg::{Code, OptError, PayloadError, Version};

use crate::net::TransportError;

/// Errors encounterable while registering
#[derive(Debug)]
pub enum Error {
  /// The request could not be built
  Build(BuildError),
  /// The exchange with the server failed
  Transport(TransportError),
  /// The server's response was received, but could not be trusted
  Malformed(Malformed),
  /// A buffer was too small to hold something it needed to hold
  InsufficientBuffer {
    /// The buffer that was too small
    buffer: Buffer,
    /// How many more bytes the buffer would have needed
    short_by: usize,
  },
}

/// The registration request could not be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
  /// An option could not be added
  Option(OptError),
  /// The payload could not be set
  Payload(PayloadError),
}

/// Reasons a response is rejected, each carrying the offending value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
  /// Response version differs from the request's
  Version(Version),
  /// Response code is not `2.01 Created` or `2.04 Changed`
  Status(Code),
  /// Response path is not `/client/id`
  Path(String),
  /// Response carries no payload
  NoPayload,
  /// Response payload is not `OK`
  Payload(Vec<u8>),
}

/// Caller-supplied buffers that may be too small
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
  /// The buffer the response's Uri-Path is rendered into
  /// (see [`Config.path_buffer_len`](crate::config::Config::path_buffer_len))
  Path,
  /// The buffer the response payload is copied into
  Payload,
}

impl Error {
  /// Is this [`Error::Malformed`]?
  pub fn is_malformed(&self) -> bool {
    matches!(self, Error::Malformed(_))
  }

  /// If this is [`Error::InsufficientBuffer`], how many bytes short the buffer was
  pub fn short_by(&self) -> Option<usize> {
    match self {
      | Error::InsufficientBuffer { short_by, .. } => Some(*short_by),
      | _ => None,
    }
  }
}

impl From<BuildError> for Error {
  fn from(e: BuildError) -> Self {
    Error::Build(e)
  }
}

impl From<TransportError> for Error {
  fn from(e: TransportError) -> Self {
    Error::Transport(e)
  }
}

impl From<Malformed> for Error {
  fn from(e: Malformed) -> Self {
    Error::Malformed(e)
  }
}

impl From<OptError> for BuildError {
  fn from(e: OptError) -> Self {
    BuildError::Option(e)
  }
}

impl From<PayloadError> for BuildError {
  fn from(e: PayloadError) -> Self {
    BuildError::Payload(e)
  }
}

impl fmt::Display for Buffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Buffer::Path => write!(f, "URI path"),
      | Buffer::Payload => write!(f, "Payload"),
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | BuildError::Option(e) => write!(f, "failed to set option in request message: {}", e),
      | BuildError::Payload(e) => write!(f, "failed to set payload in request message: {}", e),
    }
  }
}

impl fmt::Display for Malformed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Malformed::Version(v) => write!(f, "invalid version: {}", v.0),
      | Malformed::Status(c) => {
        write!(f, "invalid code class: {}, code detail: {}", c.class, c.detail)
      },
      | Malformed::Path(p) => write!(f, "invalid URI path: '{}'", p),
      | Malformed::NoPayload => write!(f, "invalid payload"),
      | Malformed::Payload(p) => {
        write!(f, "unexpected payload: '{}'", String::from_utf8_lossy(p))
      },
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Error::Build(e) => write!(f, "{}", e),
      | Error::Transport(e) => write!(f, "{}", e),
      | Error::Malformed(e) => write!(f, "received response message with {}", e),
      | Error::InsufficientBuffer { buffer, short_by } => {
        write!(f, "{} buffer too small by {} bytes", buffer, short_by)
      },
    }
  }
}

impl std::error::Error for BuildError {}
impl std::error::Error for Malformed {}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      | Error::Build(e) => Some(e),
      | Error::Transport(e) => Some(e),
      | Error::Malformed(e) => Some(e),
      | Error::InsufficientBuffer { .. } => None,
    }
  }
}
