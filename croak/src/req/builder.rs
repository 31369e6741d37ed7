use croak_msg::{Code, OptNumber, Type};

use crate::code;
use crate::error::BuildError;
use crate::msg::Msg;

/// Build a confirmable request
///
/// The first failure sticks; the partially built message
/// is torn down and every later step is skipped.
///
/// ```
/// use croak::msg::{Message, Msg, OptNumber};
/// use croak::req::ReqBuilder;
///
/// let req: Message = ReqBuilder::post("/sensors/temp").option(OptNumber::CONTENT_FORMAT, [0])
///                                                     .payload(b"21.5")
///                                                     .build()
///                                                     .unwrap();
///
/// let mut path = [0u8; 32];
/// let n = req.render_path(&mut path);
/// assert_eq!(&path[..n], b"/sensors/temp");
/// ```
#[derive(Debug)]
pub struct ReqBuilder<M: Msg> {
  inner: Result<M, BuildError>,
}

impl<M: Msg> ReqBuilder<M> {
  fn new(method: Code, path: impl AsRef<str>) -> Self {
    let mut msg = M::new();
    msg.set_ty(Type::Con);
    msg.set_code(method);

    Self { inner: Ok(msg) }.path(path)
  }

  /// Creates a GET request
  pub fn get(path: impl AsRef<str>) -> Self {
    Self::new(code::GET, path)
  }

  /// Creates a PUT request
  pub fn put(path: impl AsRef<str>) -> Self {
    Self::new(code::PUT, path)
  }

  /// Creates a POST request
  pub fn post(path: impl AsRef<str>) -> Self {
    Self::new(code::POST, path)
  }

  /// Creates a DELETE request
  pub fn delete(path: impl AsRef<str>) -> Self {
    Self::new(code::DELETE, path)
  }

  fn attempt(mut self, f: impl FnOnce(&mut M) -> Result<(), BuildError>) -> Self {
    if let Ok(msg) = self.inner.as_mut() {
      if let Err(e) = f(msg) {
        log::error!("{}", e);
        msg.teardown();
        self.inner = Err(e);
      }
    }

    self
  }

  /// Add one Uri-Path option per `/`-separated segment of `path`
  fn path(self, path: impl AsRef<str>) -> Self {
    self.attempt(|msg| {
          path.as_ref()
              .split('/')
              .filter(|seg| !seg.is_empty())
              .try_for_each(|seg| msg.add_option(OptNumber::URI_PATH, seg.as_bytes()))
              .map_err(BuildError::Option)
        })
  }

  /// Insert an option value
  pub fn option(self, number: OptNumber, value: impl AsRef<[u8]>) -> Self {
    self.attempt(|msg| {
          msg.add_option(number, value.as_ref())
             .map_err(BuildError::Option)
        })
  }

  /// Set the payload of the request
  pub fn payload(self, value: impl AsRef<[u8]>) -> Self {
    self.attempt(|msg| {
          msg.set_payload(value.as_ref())
             .map_err(BuildError::Payload)
        })
  }

  /// Unwrap the builder into the built request
  pub fn build(self) -> Result<M, BuildError> {
    self.inner
  }
}

#[cfg(test)]
mod tests {
  use croak_msg::{Message, Opt, OptError, PayloadError};

  use super::*;
  use crate::test::{teardowns, Tracked};

  #[test]
  fn builds_con_post() {
    let req: Message = ReqBuilder::post("client/id").payload("device-42")
                                                    .build()
                                                    .unwrap();
    assert_eq!(req.ty, Type::Con);
    assert_eq!(req.code, code::POST);
    assert_eq!(req.path_segments().collect::<Vec<_>>(),
               vec![b"client".as_ref(), b"id".as_ref()]);
    assert_eq!(req.payload(), b"device-42");
  }

  #[test]
  fn leading_trailing_and_doubled_slashes_are_ignored() {
    let req: Message = ReqBuilder::get("//a//b/").build().unwrap();
    assert_eq!(req.path_segments().count(), 2);
  }

  #[test]
  fn payload_failure_tears_down_partial_request() {
    let before = teardowns();
    let too_big = vec![0u8; Message::MAX_PAYLOAD_LEN + 1];

    let err = ReqBuilder::<Tracked>::post("client/id").payload(&too_big)
                                                      .build()
                                                      .unwrap_err();

    assert_eq!(err,
               BuildError::Payload(PayloadError::TooLong { max: Message::MAX_PAYLOAD_LEN,
                                                           actual: too_big.len() }));
    assert_eq!(teardowns() - before, 1);
  }

  #[test]
  fn option_failure_sticks() {
    let before = teardowns();
    let too_long = vec![0u8; Opt::MAX_VALUE_LEN + 1];

    let err = ReqBuilder::<Tracked>::post("client/id").option(OptNumber::URI_QUERY, &too_long)
                                                      .payload("never set")
                                                      .build()
                                                      .unwrap_err();

    assert!(matches!(err, BuildError::Option(OptError::ValueTooLong { .. })));
    assert_eq!(teardowns() - before, 1);
  }
}
