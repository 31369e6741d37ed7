use core::fmt;

use croak_msg::{Code, CodeKind, Id, OptError, OptNumber, PayloadError, Type};

use crate::msg::Msg;

/// Registry of paths whose responses are deferred
pub mod separate;

#[doc(inline)]
pub use separate::{InvalidPath, SeparatePaths};

/// Something that answers requests.
///
/// Handlers are invoked once per request, must not retain state
/// between invocations, and may only touch the parts of the
/// response exposed by [`Response`].
///
/// Any `Fn(&M, &mut Response<M>) -> Result<(), E>` is a handler:
/// ```
/// use croak::msg::Message;
/// use croak::server::{respond, Response};
///
/// let hello = |_: &Message, resp: &mut Response<'_, Message>| {
///   resp.set_code(croak::code::CONTENT);
///   resp.set_payload(b"Hello, Client!")
/// };
///
/// let resp = respond(&hello, &Message::default()).unwrap();
/// assert_eq!(resp.payload(), b"Hello, Client!");
/// ```
pub trait Handler<M: Msg> {
  /// Reason the handler declined to respond
  type Error: fmt::Debug + fmt::Display;

  /// Fill out `resp` in answer to `req`
  fn handle(&self, req: &M, resp: &mut Response<'_, M>) -> Result<(), Self::Error>;
}

impl<M, E, F> Handler<M> for F
  where M: Msg,
        E: fmt::Debug + fmt::Display,
        F: Fn(&M, &mut Response<'_, M>) -> Result<(), E>
{
  type Error = E;

  fn handle(&self, req: &M, resp: &mut Response<'_, M>) -> Result<(), E> {
    self(req, resp)
  }
}

/// The parts of a response a [`Handler`] is allowed to set
#[derive(Debug)]
pub struct Response<'a, M: Msg> {
  msg: &'a mut M,
  code_set: bool,
}

impl<'a, M: Msg> Response<'a, M> {
  fn new(msg: &'a mut M) -> Self {
    Self { msg,
           code_set: false }
  }

  /// Set the response status. Every handler must call this,
  /// with a response code rather than a request code or 0.00.
  pub fn set_code(&mut self, code: Code) {
    self.msg.set_code(code);
    self.code_set = true;
  }

  /// Set the response payload
  pub fn set_payload(&mut self, payload: &[u8]) -> Result<(), PayloadError> {
    self.msg.set_payload(payload)
  }

  /// Add an option to the response
  pub fn add_option(&mut self, number: OptNumber, value: &[u8]) -> Result<(), OptError> {
    self.msg.add_option(number, value)
  }
}

/// A handler did not produce a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError<E> {
  /// The handler returned an error
  Handler(E),
  /// The handler returned `Ok` without setting a response code
  CodeNotSet,
  /// The handler set a request code or the empty code
  NotAResponse(Code),
}

impl<E: fmt::Display> fmt::Display for ContractError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | ContractError::Handler(e) => write!(f, "handler failed: {}", e),
      | ContractError::CodeNotSet => write!(f, "handler did not set a response code"),
      | ContractError::NotAResponse(code) => {
        write!(f, "handler set {} which is not a response code", code)
      },
    }
  }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ContractError<E> {}

/// Invoke `handler` with `req` and a fresh response.
///
/// On failure the response is torn down and no response
/// should be sent for this invocation.
pub fn respond<M, H>(handler: &H, req: &M) -> Result<M, ContractError<H::Error>>
  where M: Msg,
        H: Handler<M>
{
  let mut msg = M::new();
  let mut resp = Response::new(&mut msg);

  let outcome = handler.handle(req, &mut resp)
                       .map_err(ContractError::Handler)
                       .and_then(|_| match resp.msg.code() {
                         | _ if !resp.code_set => Err(ContractError::CodeNotSet),
                         | code if code.kind() != CodeKind::Response => {
                           Err(ContractError::NotAResponse(code))
                         },
                         | _ => Ok(()),
                       });

  match outcome {
    | Ok(()) => Ok(msg),
    | Err(e) => {
      msg.teardown();
      Err(e)
    },
  }
}

/// How a response will be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
  /// Piggybacked on the ACK of a CON request; reuses the request's id
  Piggybacked,
  /// A NON response with its own id
  Non(Id),
  /// A CON response sent after the request was ACKed, with its own id
  Separate(Id),
}

/// Fill in the header fields a handler may not set: version and token
/// are taken from `req`, type and id from `disposition`.
pub fn fill<M: Msg>(req: &M, resp: &mut M, disposition: Disposition) {
  let (ty, id) = match disposition {
    | Disposition::Piggybacked => (Type::Ack, req.id()),
    | Disposition::Non(id) => (Type::Non, id),
    | Disposition::Separate(id) => (Type::Con, id),
  };

  resp.set_version(req.version());
  resp.set_token(req.token());
  resp.set_ty(ty);
  resp.set_id(id);
}

#[cfg(test)]
mod tests {
  use croak_msg::{Message, Token, Version};

  use super::*;
  use crate::code;
  use crate::test::{teardowns, Tracked};

  fn req() -> Message {
    let mut req = Message::new(Type::Con,
                               code::GET,
                               Id(12),
                               Token::from_slice(&[1, 2, 3]).unwrap());
    req.add(OptNumber::URI_PATH, "hello").unwrap();
    req
  }

  #[test]
  fn handler_sets_code_and_payload() {
    let handler = |_: &Message, resp: &mut Response<'_, Message>| {
      resp.set_code(code::CONTENT);
      resp.add_option(OptNumber::CONTENT_FORMAT, &[0]).unwrap();
      resp.set_payload(b"Hello, Client!")
    };

    let resp = respond(&handler, &req()).unwrap();
    assert_eq!(resp.code, code::CONTENT);
    assert_eq!(resp.payload(), b"Hello, Client!");
    assert_eq!(resp.get(OptNumber::CONTENT_FORMAT).count(), 1);

    // header fields are left for `fill`
    assert_eq!(resp.id, Id(0));
    assert!(resp.token.is_empty());
  }

  #[test]
  fn handler_error_tears_down() {
    let before = teardowns();
    let handler = |_: &Tracked, _: &mut Response<'_, Tracked>| -> Result<(), &'static str> { Err("nope") };

    let err = respond(&handler, &<Tracked as Msg>::new()).unwrap_err();
    assert_eq!(err, ContractError::Handler("nope"));
    assert_eq!(teardowns() - before, 1);
  }

  #[test]
  fn code_must_be_set() {
    let before = teardowns();
    let handler = |_: &Tracked, resp: &mut Response<'_, Tracked>| resp.set_payload(b"no code");

    let err = respond(&handler, &<Tracked as Msg>::new()).unwrap_err();
    assert_eq!(err, ContractError::CodeNotSet);
    assert_eq!(teardowns() - before, 1);
  }

  #[test]
  fn code_must_be_a_response_code() {
    let before = teardowns();
    let get = |_: &Tracked, resp: &mut Response<'_, Tracked>| -> Result<(), &'static str> {
      resp.set_code(code::GET);
      Ok(())
    };
    let empty = |_: &Tracked, resp: &mut Response<'_, Tracked>| -> Result<(), &'static str> {
      resp.set_code(code::EMPTY);
      Ok(())
    };

    let req = <Tracked as Msg>::new();
    assert_eq!(respond(&get, &req).unwrap_err(), ContractError::NotAResponse(code::GET));
    assert_eq!(respond(&empty, &req).unwrap_err(), ContractError::NotAResponse(code::EMPTY));
    assert_eq!(teardowns() - before, 2);
  }

  #[test]
  fn handler_is_reusable() {
    let handler = |req: &Message, resp: &mut Response<'_, Message>| {
      resp.set_code(code::CONTENT);
      resp.set_payload(Msg::payload(req).unwrap_or(&b"none"[..]))
    };

    let mut a = req();
    a.set_payload("a").unwrap();

    assert_eq!(respond(&handler, &a).unwrap().payload(), b"a");
    assert_eq!(respond(&handler, &req()).unwrap().payload(), b"none");
  }

  #[test]
  fn fill_piggybacked() {
    let req = req();
    let mut resp = <Message as Msg>::new();
    fill(&req, &mut resp, Disposition::Piggybacked);

    assert_eq!(resp.ty, Type::Ack);
    assert_eq!(resp.id, req.id);
    assert_eq!(resp.token, req.token);
    assert_eq!(resp.ver, Version(1));
  }

  #[test]
  fn fill_separate_and_non() {
    let req = req();

    let mut resp = <Message as Msg>::new();
    fill(&req, &mut resp, Disposition::Separate(Id(99)));
    assert_eq!((resp.ty, resp.id, resp.token), (Type::Con, Id(99), req.token));

    let mut resp = <Message as Msg>::new();
    fill(&req, &mut resp, Disposition::Non(Id(100)));
    assert_eq!((resp.ty, resp.id), (Type::Non, Id(100)));
  }

  #[test]
  fn contract_error_display() {
    assert_eq!(ContractError::Handler("boom").to_string(), "handler failed: boom");
    assert_eq!(ContractError::<&str>::CodeNotSet.to_string(),
               "handler did not set a response code");
    assert_eq!(ContractError::<&str>::NotAResponse(code::POST).to_string(),
               "handler set 0.02 which is not a response code");
  }
}
