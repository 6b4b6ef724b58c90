//! Error types for the REST/JSON client.
//!
//! # Design
//! `TransportError` covers everything that can go wrong while a request is
//! on the wire. `ClientError` is the taxonomy the client reports to callers:
//! an unusable session, refresh requested without secure mode, a transport
//! failure, either half of the bundle replace, or an unparseable body.
//! None of these leave the client unusable.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`Transport`](crate::transport::Transport) while
/// executing a single request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The method token could not be used as an HTTP method.
    #[error("invalid request method {0:?}")]
    InvalidMethod(String),

    /// The certificate bundle required for verification could not be loaded.
    #[error("certificate bundle {path}: {message}")]
    Certificate { path: PathBuf, message: String },

    /// The underlying HTTP exchange failed (DNS, connect, TLS, protocol).
    #[error("{0}")]
    Request(String),

    /// A download completed with a non-success HTTP status.
    #[error("server responded with HTTP {0}")]
    Status(u16),

    /// The response body could not be written to its sink.
    #[error("failed writing received data: {0}")]
    Sink(#[source] io::Error),
}

/// Errors reported by [`SecureJsonClient`](crate::SecureJsonClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// No transfer session exists; every operation is a no-op.
    #[error("transfer session not initialized")]
    SessionNotInitialized,

    /// Certificate refresh was requested on a client built without secure mode.
    #[error("client was constructed without secure mode; certificates cannot be updated")]
    SecureModeDisabled,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The staging file for a certificate download could not be created.
    #[error("failed to create {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The existing certificate bundle could not be removed.
    #[error("failed to remove the existing bundle {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The downloaded bundle could not be renamed into place.
    #[error("failed to rename {from} to {to}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
