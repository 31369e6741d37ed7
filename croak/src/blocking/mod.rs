/// Registration client
pub mod client;

/// UDP server loop
pub mod server;

#[doc(inline)]
pub use client::Client;
#[doc(inline)]
pub use server::Server;
