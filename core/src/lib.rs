//! Blocking REST client exchanging JSON over HTTP(S).
//!
//! # Overview
//! `SecureJsonClient` assembles a URL with query parameters, sends a JSON
//! body with an arbitrary method, and parses the response body as JSON. In
//! secure mode it verifies TLS against a locally cached CA bundle which it
//! refreshes from the network on construction. An optional session log
//! records every request, response and error with a timestamp.
//!
//! # Design
//! - Requests are plain data (`HttpRequest`) executed by a `Transport`; the
//!   client owns exactly one transport for its lifetime.
//! - All I/O is synchronous. There are no timeouts, retries or pooling
//!   guarantees beyond what the transport does on its own.
//! - Every path and URL comes from `ClientConfig`, so independent clients
//!   (and tests) can use separate directories.
//! - Diagnostics go through `tracing`; installing a subscriber is left to
//!   the host application.

pub mod certs;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session_log;
pub mod sink;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::SecureJsonClient;
pub use config::{ClientConfig, ReplaceStrategy};
pub use error::{ClientError, TransportError};
pub use http::{build_url, HttpRequest, TlsMode};
pub use sink::{FileSink, ResponseSink};
pub use transport::{Transport, UreqTransport};
pub use serde_json::Value;
