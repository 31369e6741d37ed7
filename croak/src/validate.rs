use core::fmt;

use crate::code;
use crate::error::{Buffer, Error, Malformed};
use crate::msg::Msg;
use crate::req::REGISTRATION_PATH;

/// The payload a server must answer a registration with
pub const ACKNOWLEDGEMENT: &[u8] = b"OK";

/// Which of the acceptable statuses the server answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
  /// `2.01 Created`; the server did not know us yet
  Created,
  /// `2.04 Changed`; the server updated an existing registration
  Changed,
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Status::Created => write!(f, "CREATED"),
      | Status::Changed => write!(f, "CHANGED"),
    }
  }
}

/// A registration response that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accepted {
  /// Number of payload bytes copied into the destination buffer
  pub len: usize,
  /// See [`Status`]
  pub status: Status,
}

/// Decide whether `resp` is a trustworthy answer to the registration `req`,
/// copying its payload into `dest` if so.
///
/// Checks run in this order, stopping at the first failure:
///  1. the versions of `req` and `resp` match
///  2. `resp` is `2.01 Created` or `2.04 Changed`
///  3. the Uri-Path of `resp` fits in `path_buffer_len` bytes (plus a NUL byte)
///  4. the Uri-Path of `resp` is `/client/id`
///  5. `resp` has a payload
///  6. `dest` can hold the payload plus a NUL byte
///  7. the payload is `OK`
///
/// On success the payload is at the front of `dest` and the rest of `dest`
/// is zeroed. Nothing is written to `dest` when a check before 7 fails,
/// and `dest` is zeroed when 7 fails.
///
/// Neither message is modified.
///
/// ```
/// use croak::msg::{Message, Msg, OptNumber};
/// use croak::validate::{validate, Status};
///
/// let req = <Message as Msg>::new();
///
/// let mut resp = <Message as Msg>::new();
/// resp.set_code(croak::code::CREATED);
/// resp.add_option(OptNumber::URI_PATH, b"client").unwrap();
/// resp.add_option(OptNumber::URI_PATH, b"id").unwrap();
/// Msg::set_payload(&mut resp, b"OK").unwrap();
///
/// let mut dest = [0xFFu8; 4];
/// let accepted = validate(&req, &resp, &mut dest, 32).unwrap();
///
/// assert_eq!(accepted.len, 2);
/// assert_eq!(accepted.status, Status::Created);
/// assert_eq!(&dest, b"OK\0\0");
/// ```
pub fn validate<M: Msg>(req: &M,
                        resp: &M,
                        dest: &mut [u8],
                        path_buffer_len: usize)
                        -> Result<Accepted, Error> {
  let malformed = |m: Malformed| {
    log::error!("Received response message with {}", m);
    Error::Malformed(m)
  };

  let short = |buffer: Buffer, short_by: usize| {
    log::error!("{} buffer too small by {} bytes", buffer, short_by);
    Error::InsufficientBuffer { buffer, short_by }
  };

  if resp.version() != req.version() {
    return Err(malformed(Malformed::Version(resp.version())));
  }

  let status = match resp.code() {
    | c if c == code::CREATED => Status::Created,
    | c if c == code::CHANGED => Status::Changed,
    | c => return Err(malformed(Malformed::Status(c))),
  };

  let mut path = vec![0u8; path_buffer_len];
  let n = resp.render_path(&mut path);
  if n + 1 > path.len() {
    return Err(short(Buffer::Path, n + 1 - path.len()));
  }

  let path = &path[..n];
  if path != REGISTRATION_PATH.as_bytes() {
    return Err(malformed(Malformed::Path(String::from_utf8_lossy(path).into_owned())));
  }

  let payload = match resp.payload() {
    | Some(p) if !p.is_empty() => p,
    | _ => return Err(malformed(Malformed::NoPayload)),
  };

  let n = payload.len();
  if n + 1 > dest.len() {
    return Err(short(Buffer::Payload, n + 1 - dest.len()));
  }

  dest[..n].copy_from_slice(payload);
  dest[n..].iter_mut().for_each(|b| *b = 0);

  if &dest[..n] != ACKNOWLEDGEMENT {
    let unexpected = dest[..n].to_vec();
    dest.iter_mut().for_each(|b| *b = 0);
    return Err(malformed(Malformed::Payload(unexpected)));
  }

  Ok(Accepted { len: n, status })
}
