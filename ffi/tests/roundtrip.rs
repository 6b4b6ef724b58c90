//! Drives the C ABI against the live mock server.

use std::ffi::{CStr, CString};
use std::net::SocketAddr;

use restjson_ffi::*;
use serde_json::{json, Value};

fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn request(client: *mut types::FfiClient, url: &str, method: &str, query: &str, body: &str) -> Value {
    let url = CString::new(url).unwrap();
    let method = CString::new(method).unwrap();
    let query = CString::new(query).unwrap();
    let body = CString::new(body).unwrap();
    let out = restjson_make_request(client, url.as_ptr(), method.as_ptr(), query.as_ptr(), body.as_ptr());
    assert!(!out.is_null());
    let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
    restjson_free_string(out);
    serde_json::from_str(&text).unwrap()
}

#[test]
fn echo_roundtrip_through_c_abi() {
    let addr = spawn_server();
    let dir = tempfile::tempdir().unwrap();
    let dir_c = CString::new(dir.path().to_str().unwrap()).unwrap();
    let client = restjson_client_new_in_dir(dir_c.as_ptr(), false, true);
    assert!(!client.is_null());

    let echo = request(
        client,
        &format!("http://{addr}/echo"),
        "PUT",
        r#"{"z": "last", "a": "first"}"#,
        r#"{"title": "Buy milk"}"#,
    );
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["query"], "a=first&z=last");
    assert_eq!(echo["body"], json!({"title": "Buy milk"}));

    let ping = request(client, &format!("http://{addr}/ping"), "GET", "{}", "null");
    assert_eq!(ping, json!({"status": "ok"}));

    let not_json = request(client, &format!("http://{addr}/not-json"), "GET", "{}", "null");
    assert_eq!(not_json, Value::Null);

    restjson_client_free(client);
    assert_eq!(std::fs::read_dir(dir.path().join("logs")).unwrap().count(), 1);
}
