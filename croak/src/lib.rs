//! `croak` is a small, blocking CoAP stack for devices that
//! register themselves with a management server.
//!
//! ## Registering
//! A device registers by sending a confirmable `POST /client/id`
//! carrying its identity. The server must answer `2.01 Created` or
//! `2.04 Changed` with the path echoed back and the payload `OK`;
//! anything else is rejected before the payload reaches the caller.
//!
//! ```no_run
//! use croak::blocking::Client;
//!
//! let mut client = Client::connect("127.0.0.1", 5683, None).unwrap();
//!
//! let mut ack = [0u8; 16];
//! let n = client.register(b"device-42", &mut ack).unwrap();
//!
//! assert_eq!(&ack[..n], b"OK");
//! ```
//!
//! ## Serving
//! A server is a [`Handler`](server::Handler): a function that looks at a
//! request and fills out a [`Response`](server::Response). Handlers may
//! only set the response code, payload and options; the message type,
//! id and token are filled in by the server once the handler returns.
//!
//! ```no_run
//! use croak::blocking::Server;
//! use croak::code;
//! use croak::msg::Message;
//! use croak::server::Response;
//!
//! let handler = |_: &Message, resp: &mut Response<'_, Message>| {
//!   resp.set_code(code::CONTENT);
//!   resp.set_payload(b"Hello, Client!")
//! };
//!
//! let mut server = Server::try_new("[::1]:12436", handler).unwrap();
//! server.separate_response("/separate").unwrap();
//! server.run().unwrap();
//! ```

// x-release-please-start-version
#![doc(html_root_url = "https://docs.rs/croak/0.3.0")]
// x-release-please-end
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]


/// Blocking registration client & CoAP server
pub mod blocking;

/// configuring runtime behavior
pub mod config;

/// errors surfaced by the registration client
pub mod error;

/// owning a request / response pair for the length of one exchange
pub mod exchange;

/// diagnostic rendering of messages
pub mod logging;

/// the message capabilities `croak` depends on
pub mod msg;

/// transports: plain UDP & DTLS
pub mod net;

/// requests
pub mod req;

/// response codes
pub mod code;

/// customizable retrying of fallible operations
pub mod retry;

/// the contract between a server and its request handler
pub mod server;

/// time abstractions
pub mod time;

/// checking that a registration response can be trusted
pub mod validate;

#[doc(inline)]
pub use error::Error;

macro_rules! code_const {
  (rfc7252($section:literal) $name:ident = $c:literal.$d:literal) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: croak_msg::Code = croak_msg::Code::new($c, $d);
  };
}

pub(crate) use code_const;
