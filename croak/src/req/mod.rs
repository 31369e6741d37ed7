use crate::error::BuildError;
use crate::msg::Msg;

/// Request builder
pub mod builder;

#[doc(inline)]
pub use builder::ReqBuilder;

/// The path a device registers itself at
pub const REGISTRATION_PATH: &str = "/client/id";

/// Build the confirmable `POST /client/id` carrying `identity` verbatim.
///
/// ```
/// use croak::msg::{Message, Msg, OptNumber, Type};
///
/// let req = croak::req::registration::<Message>(b"device-42").unwrap();
///
/// assert_eq!(req.ty(), Type::Con);
/// assert_eq!(req.code(), croak::code::POST);
/// assert_eq!(Msg::payload(&req), Some(b"device-42".as_ref()));
///
/// let mut path = [0u8; 16];
/// let n = req.render_path(&mut path);
/// assert_eq!(&path[..n], b"/client/id");
/// ```
pub fn registration<M: Msg>(identity: &[u8]) -> Result<M, BuildError> {
  ReqBuilder::post(REGISTRATION_PATH).payload(identity)
                                     .build()
}
