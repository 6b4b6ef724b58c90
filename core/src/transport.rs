//! The transfer session: executes one `HttpRequest` at a time.
//!
//! # Design
//! `Transport` is the seam between the client and the network. The client
//! owns exactly one boxed transport for its whole lifetime and drives it
//! sequentially; implementations are not expected to be reentrant.
//! `UreqTransport` is the production implementation.

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::debug;
use ureq::http::{self, Method};
use ureq::tls::{parse_pem, PemItem, RootCerts, TlsConfig};
use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpRequest, TlsMode};
use crate::sink::ResponseSink;

const READ_CHUNK: usize = 16 * 1024;

/// Executes a request, streaming the body into `sink`, and returns the
/// HTTP status code. Non-2xx statuses are data, not errors.
pub trait Transport {
    fn execute(
        &mut self,
        request: &HttpRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<u16, TransportError>;
}

/// Blocking transport on top of `ureq`.
///
/// No timeout is configured, any method token is accepted, the body is sent
/// for every method and the response body is read without a size cap. In
/// [`TlsMode::Verify`] the bundle file is read on every call and only its
/// certificates are trusted.
pub struct UreqTransport {
    unverified: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let tls = TlsConfig::builder().disable_verification(true).build();
        Self {
            unverified: build_agent(tls),
        }
    }

    fn agent_for(&self, tls: &TlsMode) -> Result<Agent, TransportError> {
        match tls {
            TlsMode::Unverified => Ok(self.unverified.clone()),
            TlsMode::Verify { ca_bundle } => {
                let roots = load_root_certs(ca_bundle)?;
                let tls = TlsConfig::builder().root_certs(roots).build();
                Ok(build_agent(tls))
            }
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(
        &mut self,
        request: &HttpRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<u16, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;
        let agent = self.agent_for(&request.tls)?;

        let mut builder = http::Request::builder().method(method).uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // `Agent::run` sends the body regardless of method.
        let outgoing = builder
            .body(request.body.clone().unwrap_or_default())
            .map_err(|e| TransportError::Request(e.to_string()))?;

        debug!(method = %request.method, url = %request.url, "executing request");
        let mut response = agent
            .run(outgoing)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();

        let mut reader = response.body_mut().with_config().limit(u64::MAX).reader();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = reader
                .read(&mut buf)
                .map_err(|e| TransportError::Request(e.to_string()))?;
            if n == 0 {
                break;
            }
            sink.write_chunk(&buf[..n]).map_err(TransportError::Sink)?;
        }

        debug!(status, "request complete");
        Ok(status)
    }
}

fn build_agent(tls: TlsConfig) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .allow_non_standard_methods(true)
        .tls_config(tls)
        .build()
        .new_agent()
}

/// Read every certificate in the PEM bundle at `path`.
fn load_root_certs(path: &Path) -> Result<RootCerts, TransportError> {
    let cert_error = |message: String| TransportError::Certificate {
        path: path.to_path_buf(),
        message,
    };

    let pem = fs::read(path).map_err(|e| cert_error(e.to_string()))?;
    let mut certs = Vec::new();
    for item in parse_pem(&pem) {
        match item {
            Ok(PemItem::Certificate(cert)) => certs.push(cert.to_owned()),
            Ok(_) => {}
            Err(e) => return Err(cert_error(e.to_string())),
        }
    }
    if certs.is_empty() {
        return Err(cert_error("no certificates found".to_string()));
    }
    Ok(RootCerts::new_with_certs(&certs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_with_whitespace_is_rejected_before_any_io() {
        let mut transport = UreqTransport::new();
        let req = HttpRequest::get("http://127.0.0.1:9/", TlsMode::Unverified);
        let req = HttpRequest {
            method: "NOT A METHOD".to_string(),
            ..req
        };
        let mut sink = Vec::new();
        let err = transport.execute(&req, &mut sink).unwrap_err();
        assert!(matches!(err, TransportError::InvalidMethod(m) if m == "NOT A METHOD"));
        assert!(sink.is_empty());
    }

    #[test]
    fn verify_with_missing_bundle_is_a_certificate_error() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("cacert.pem");
        let mut transport = UreqTransport::new();
        let req = HttpRequest::get(
            "https://127.0.0.1:9/",
            TlsMode::Verify {
                ca_bundle: bundle.clone(),
            },
        );
        let err = transport.execute(&req, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, TransportError::Certificate { path, .. } if path == bundle));
    }

    #[test]
    fn verify_with_bundle_lacking_certificates_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("cacert.pem");
        fs::write(&bundle, "no pem blocks in here\n").unwrap();

        let err = load_root_certs(&bundle).unwrap_err();
        assert!(err.to_string().contains("no certificates found"));
    }
}
