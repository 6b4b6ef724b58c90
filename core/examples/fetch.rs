//! Fetch a JSON document with certificate verification and print it.
//!
//! ```text
//! cargo run -p restjson-core --example fetch -- https://api.publicapis.org/entries
//! ```
//!
//! Secure mode expects a seeded `cacert.pem` in the working directory; it
//! is refreshed from curl.se before the request is made.

use std::collections::BTreeMap;
use std::process::ExitCode;

use restjson_core::{SecureJsonClient, Value};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("restjson_core=info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://api.publicapis.org/entries".to_string());

    let mut client = SecureJsonClient::new(true, false);

    // Query parameters are appended verbatim, e.g. `key=abcxyz123`.
    let query: BTreeMap<String, String> = BTreeMap::new();
    let response = client.make_request(&url, "GET", &query, &Value::Null);

    if response.is_null() {
        eprintln!("API request failed.");
        return ExitCode::FAILURE;
    }
    println!("Response Data: {response:#}");
    ExitCode::SUCCESS
}
