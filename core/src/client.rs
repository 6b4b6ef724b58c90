//! The client handle and request executor.
//!
//! # Design
//! `SecureJsonClient` owns one transfer session (a boxed [`Transport`]) and
//! an optional session log for its whole lifetime. Every call is blocking and
//! sequential. Failures never poison the client: each one is reported and
//! the next call starts from the same state.
//!
//! Two request entry points exist. `try_request` returns a `Result` for
//! callers that want the error; `make_request` reports the error through
//! `tracing` and yields `Value::Null`, the empty JSON value, for every
//! failure, including a body that is not JSON.

use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, error};

use crate::certs;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{build_url, HttpRequest, TlsMode};
use crate::session_log::SessionLog;
use crate::transport::{Transport, UreqTransport};

/// Blocking REST client exchanging JSON, optionally verifying TLS against a
/// locally cached certificate bundle.
pub struct SecureJsonClient {
    session: Option<Box<dyn Transport>>,
    secure: bool,
    config: ClientConfig,
    log: SessionLog,
}

impl SecureJsonClient {
    /// Client using the default working-directory layout.
    ///
    /// With `secure` the certificate bundle is refreshed immediately; with
    /// `logging` a session log is opened under `logs/`.
    pub fn new(secure: bool, logging: bool) -> Self {
        Self::with_config(ClientConfig::default(), secure, logging)
    }

    pub fn with_config(config: ClientConfig, secure: bool, logging: bool) -> Self {
        let session: Box<dyn Transport> = Box::new(UreqTransport::new());
        Self::with_transport(config, Some(session), secure, logging)
    }

    /// Client driving `session`. `None` stands for a session that could not
    /// be allocated; every operation then fails with
    /// [`ClientError::SessionNotInitialized`].
    ///
    /// Construction itself never fails. Refresh and logging problems are
    /// reported and the client is returned in a degraded state.
    pub fn with_transport(
        config: ClientConfig,
        session: Option<Box<dyn Transport>>,
        secure: bool,
        logging: bool,
    ) -> Self {
        if session.is_none() {
            error!("failed to initialize transfer session");
        }
        let mut client = Self {
            session,
            secure,
            config,
            log: SessionLog::new(),
        };
        if secure {
            if let Err(e) = client.refresh_certificates() {
                error!(error = %e, "failed to download or update certificate bundle");
            }
        }
        if logging {
            if let Err(e) = client.start_logging() {
                error!(error = %e, "failed to start session log");
            }
        }
        client
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_logging(&self) -> bool {
        self.log.is_active()
    }

    /// Path of the open session log, if logging was started.
    pub fn log_path(&self) -> Option<&Path> {
        self.log.path()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Download a fresh certificate bundle and install it.
    ///
    /// Requires a live session and secure mode. Failures leave whatever
    /// bundle was present before (see [`certs::replace_bundle`] for the one
    /// exception).
    pub fn refresh_certificates(&mut self) -> Result<(), ClientError> {
        let session = self
            .session
            .as_deref_mut()
            .ok_or(ClientError::SessionNotInitialized)?;
        if !self.secure {
            return Err(ClientError::SecureModeDisabled);
        }
        certs::refresh_bundle(session, &self.config)
    }

    /// Start the session log. Calling it again while logging is a no-op.
    pub fn start_logging(&mut self) -> io::Result<()> {
        self.log.start(&self.config.log_dir)
    }

    /// Issue one request and parse the response body as JSON.
    ///
    /// `query` is appended verbatim (see [`build_url`]); `method` is sent
    /// as given; `body` is serialized and sent for every method with
    /// `Content-Type: application/json`. The HTTP status is not inspected.
    pub fn try_request<I, K, V>(
        &mut self,
        url: &str,
        method: &str,
        query: I,
        body: &Value,
    ) -> Result<Value, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let session = self
            .session
            .as_deref_mut()
            .ok_or(ClientError::SessionNotInitialized)?;

        let tls = if self.secure {
            TlsMode::Verify {
                ca_bundle: self.config.ca_bundle.clone(),
            }
        } else {
            TlsMode::Unverified
        };
        let request = HttpRequest::json(method, build_url(url, query), body.to_string(), tls);

        let mut response = Vec::new();
        let outcome = session.execute(&request, &mut response);
        self.log.log(&format!("API Request: {method} {url}"));

        let status = match outcome {
            Ok(status) => status,
            Err(e) => {
                self.log.log(&format!("API Request Error: {e}"));
                return Err(e.into());
            }
        };
        debug!(status, bytes = response.len(), "response received");

        match serde_json::from_slice(&response) {
            Ok(value) => {
                self.log.log(&format!(
                    "API Response: {}",
                    String::from_utf8_lossy(&response)
                ));
                Ok(value)
            }
            Err(e) => {
                self.log.log(&format!("JSON Parse Error: {e}"));
                Err(e.into())
            }
        }
    }

    /// Like [`try_request`](Self::try_request), but reports any failure and
    /// returns `Value::Null`.
    pub fn make_request<I, K, V>(&mut self, url: &str, method: &str, query: I, body: &Value) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.try_request(url, method, query, body)
            .unwrap_or_else(|e| {
                error!(%url, %method, error = %e, "API request failed");
                Value::Null
            })
    }
}

impl Drop for SecureJsonClient {
    fn drop(&mut self) {
        if self.session.take().is_some() {
            debug!("transfer session released");
        }
    }
}
