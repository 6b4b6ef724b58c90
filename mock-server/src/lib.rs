//! Stub HTTP server for exercising the REST/JSON client end to end.
//!
//! Routes:
//! - `GET /ping` answers `{"status":"ok"}`.
//! - `ANY /echo` describes the request it received as JSON.
//! - `GET /not-json` answers plain text.
//! - `GET /status/{code}` answers `{"status":code}` with that status.
//! - `GET /ca/cacert.pem` serves a PEM bundle.
//!
//! `run` serves plain HTTP; `tls::run_tls` serves the same routes over TLS.

pub mod tls;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

/// A public root certificate (Amazon Root CA 3) served as the downloadable
/// bundle.
pub const CA_BUNDLE_PEM: &str = "\
-----BEGIN CERTIFICATE-----
MIIBtjCCAVugAwIBAgITBmyf1XSXNmY/Owua2eiedgPySjAKBggqhkjOPQQDAjA5
MQswCQYDVQQGEwJVUzEPMA0GA1UEChMGQW1hem9uMRkwFwYDVQQDExBBbWF6b24g
Um9vdCBDQSAzMB4XDTE1MDUyNjAwMDAwMFoXDTQwMDUyNjAwMDAwMFowOTELMAkG
A1UEBhMCVVMxDzANBgNVBAoTBkFtYXpvbjEZMBcGA1UEAxMQQW1hem9uIFJvb3Qg
Q0EgMzBZMBMGByqGSM49AgEGCCqGSM49AwEHA0IABCmXp8ZBf8ANm+gBG1bG8lKl
ui2yEujSLtf6ycXYqm0fc4E7O5hrOXwzpcVOho6AF2hiRVd9RFgdszflZwjrZt6j
QjBAMA8GA1UdEwEB/wQFMAMBAf8wDgYDVR0PAQH/BAQDAgGGMB0GA1UdDgQWBBSr
ttvXBp43rDCGB5Fwx5zEGbF4wDAKBggqhkjOPQQDAgNJADBGAiEA4IWSoxe3jfkr
BqWTrBqYaGFy+uGh0PsceGCmQ5nFuMQCIQCcAu/xlJyzlvnrxir4tiz+OpAUFteM
YyRIHN8wfdVoOw==
-----END CERTIFICATE-----
";

/// What `/echo` saw. `body` is the parsed JSON body, the raw text when it
/// is not JSON, or null when empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

pub fn app() -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/echo", any(echo))
        .route("/not-json", get(not_json))
        .route("/status/{code}", get(status))
        .route("/ca/cacert.pem", get(ca_bundle))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    info!(%method, ?query, "echo");
    Json(Echo {
        method: method.to_string(),
        query,
        content_type,
        body,
    })
}

async fn not_json() -> &'static str {
    "definitely not json"
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

async fn ca_bundle() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    (
        [(header::CONTENT_TYPE, "application/x-pem-file")],
        CA_BUNDLE_PEM,
    )
}
