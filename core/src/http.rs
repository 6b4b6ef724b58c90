//! HTTP transport types for a single blocking exchange.
//!
//! # Design
//! Requests and responses are plain data. The client assembles an
//! `HttpRequest` and hands it to a `Transport`, which is the only code that
//! touches the network. Keeping the request as data lets tests assert on
//! exactly what would be sent without a server.

use std::path::PathBuf;

/// Certificate verification requested for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Verify peer and host against the certificates in `ca_bundle` only.
    Verify { ca_bundle: PathBuf },
    /// No certificate validation is requested.
    Unverified,
}

/// An HTTP request described as plain data.
///
/// `method` is passed through verbatim; any token the transport accepts is
/// sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub tls: TlsMode,
}

impl HttpRequest {
    /// A request carrying a JSON payload with `Content-Type: application/json`.
    pub fn json(method: &str, url: String, body: String, tls: TlsMode) -> Self {
        Self {
            method: method.to_string(),
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
            tls,
        }
    }

    /// A body-less `GET`.
    pub fn get(url: &str, tls: TlsMode) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            tls,
        }
    }
}

/// Append `query` to `url` as `?k1=v1&k2=v2`.
///
/// Keys and values are inserted verbatim in iteration order; nothing is
/// percent-encoded. An empty query leaves `url` unchanged.
pub fn build_url<I, K, V>(url: &str, query: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut full = url.to_string();
    for (i, (key, value)) in query.into_iter().enumerate() {
        full.push(if i == 0 { '?' } else { '&' });
        full.push_str(key.as_ref());
        full.push('=');
        full.push_str(value.as_ref());
    }
    full
}
