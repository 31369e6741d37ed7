use crate::msg::Msg;
use crate::net::{Transport, TransportError};

/// A request and the (initially empty) response to it.
///
/// Both messages are torn down when the exchange is dropped,
/// no matter how far the exchange got.
///
/// ```
/// use croak::exchange::Exchange;
/// use croak::msg::{Message, Msg};
///
/// let ex = Exchange::new(<Message as Msg>::new());
/// assert_eq!(Msg::payload(ex.resp()), None);
/// ```
#[derive(Debug)]
pub struct Exchange<M: Msg> {
  req: M,
  resp: M,
}

impl<M: Msg> Exchange<M> {
  /// Take ownership of a request, pairing it with a new empty response
  pub fn new(req: M) -> Self {
    Self { req, resp: M::new() }
  }

  /// The request
  pub fn req(&self) -> &M {
    &self.req
  }

  /// The response
  pub fn resp(&self) -> &M {
    &self.resp
  }

  /// Perform the exchange over `transport`.
  ///
  /// Transport failures are logged here unless the transport
  /// already reported them.
  pub fn invoke<T>(&mut self, transport: &mut T) -> Result<(), TransportError>
    where T: Transport<Msg = M>
  {
    transport.exchange(&self.req, &mut self.resp).map_err(|e| {
                                                   if !e.already_reported() {
                                                     log::error!("{}", e);
                                                   }
                                                   e
                                                 })
  }
}

impl<M: Msg> Drop for Exchange<M> {
  fn drop(&mut self) {
    self.resp.teardown();
    self.req.teardown();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::{teardowns, Tracked, TransportMock};

  #[test]
  fn drop_tears_down_both() {
    let before = teardowns();
    {
      let _ex = Exchange::new(<Tracked as Msg>::new());
    }
    assert_eq!(teardowns() - before, 2);
  }

  #[test]
  fn invoke_propagates_transport_error() {
    let before = teardowns();
    {
      let mut transport = TransportMock::failing(TransportError::NeverAcked);
      let mut ex = Exchange::new(<Tracked as Msg>::new());
      let err = ex.invoke(&mut transport).unwrap_err();
      assert!(matches!(err, TransportError::NeverAcked));
      assert_eq!(transport.calls(), 1);
    }
    assert_eq!(teardowns() - before, 2);
  }

  #[test]
  fn invoke_fills_response() {
    let mut transport = TransportMock::responding(|req| {
                          let mut resp = <Tracked as Msg>::new();
                          resp.set_code(crate::code::CHANGED);
                          resp.set_id(req.id());
                          resp
                        });
    let mut ex = Exchange::new(<Tracked as Msg>::new());
    ex.invoke(&mut transport).unwrap();
    assert_eq!(ex.resp().code(), crate::code::CHANGED);
  }
}
