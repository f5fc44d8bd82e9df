//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP with `ReqwestTransport`, checking what the server
//! actually received and how statuses map to results.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use serde::{Deserialize, Serialize};
use typed_http_client::{
    ClientError, HttpClientConfig, HttpMethod, HttpRequest, ReqwestTransport, StaticConnectivity,
    TracingLogger, Transport, TransportError, TypedHttpClient,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u32,
    item: String,
    #[serde(default)]
    notes: Option<String>,
    lines: Vec<u16>,
}

fn order() -> Order {
    Order {
        id: 42,
        item: "flat white ☕".to_string(),
        notes: Some("oat \"milk\"".to_string()),
        lines: vec![1, 2, 3],
    }
}

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

/// Serve one connection with a fixed raw HTTP/1.1 response.
async fn start_raw_server(response: &'static str) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await.unwrap();
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    addr
}

fn client_over<T>(transport: ReqwestTransport, addr: SocketAddr) -> TypedHttpClient<T>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    TypedHttpClient::new(
        Arc::new(transport),
        Arc::new(TracingLogger::for_type::<T>()),
        Arc::new(StaticConnectivity::online()),
        &HttpClientConfig::new(format!("http://{addr}")),
    )
}

fn client<T>(addr: SocketAddr) -> TypedHttpClient<T>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    TypedHttpClient::with_defaults(&HttpClientConfig::new(format!("http://{addr}")))
}

#[tokio::test]
async fn body_round_trips_through_every_mutating_verb() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    assert_eq!(c.post_typed("/echo", &order(), None).await.unwrap(), order());
    assert_eq!(c.put_typed("/echo", &order(), "t").await.unwrap(), order());
    assert_eq!(c.delete_typed("/echo", &order(), "t").await.unwrap(), order());
}

#[tokio::test]
async fn get_without_token_sends_no_client_headers() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    let text = c.get("/headers", None).await.unwrap();
    let headers: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
    assert!(!headers.contains_key("authorization"));
    assert!(!headers.contains_key("cache-control"));
    // reqwest adds its own `accept: */*` default.
    assert_ne!(headers.get("accept").map(String::as_str), Some("application/json"));
}

#[tokio::test]
async fn get_with_token_sends_auth_and_negotiation_headers() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    let text = c.get("/headers", Some("abc")).await.unwrap();
    let headers: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
    assert_eq!(headers["authorization"], "Bearer abc");
    assert_eq!(headers["accept"], "application/json");
    assert_eq!(headers["cache-control"], "no-cache");
}

#[tokio::test]
async fn mutating_verbs_always_send_negotiation_headers() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    for text in [
        c.post("/headers", &order(), None).await.unwrap(),
        c.put("/headers", &order(), "").await.unwrap(),
        c.delete("/headers", &order(), "").await.unwrap(),
    ] {
        let headers: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers["cache-control"], "no-cache");
        assert_eq!(headers["content-type"], "application/json; charset=utf-8");
        assert!(!headers.contains_key("authorization"));
    }
}

#[tokio::test]
async fn bearer_token_unlocks_secure_route() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    let err = c.get("/secure", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Unauthorized");
    assert_eq!(err.status(), Some(401));

    assert_eq!(c.get("/secure", Some("s3cret")).await.unwrap(), "s3cret");
    assert_eq!(c.put("/secure", &order(), "p").await.unwrap(), "p");
}

#[tokio::test]
async fn not_found_surfaces_reason_phrase() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    let err = c.get("/status/404", None).await.unwrap_err();
    assert!(matches!(err, ClientError::HttpRequest { status: 404, .. }));
    assert_eq!(err.to_string(), "Not Found");

    let err = c.post("/status/500", &order(), None).await.unwrap_err();
    assert_eq!(err.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn item_lifecycle() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    let stored = c.put_typed("/items/42", &order(), "t").await.unwrap();
    assert_eq!(stored, order());

    let fetched = c.get_typed("/items/42", Some("t")).await.unwrap();
    assert_eq!(fetched, order());

    let removed = c.delete_typed("/items/42", &order(), "t").await.unwrap();
    assert_eq!(removed, order());

    let err = c.get("/items/42", None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = c.delete("/items/42", &order(), "t").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn concurrent_calls_do_not_share_tokens() {
    let addr = start_server().await;
    let c: TypedHttpClient<Order> = client(addr);

    let calls = (0..16).map(|i| {
        let c = c.clone();
        tokio::spawn(async move {
            let token = format!("token-{i}");
            let echoed = c.get("/secure", Some(token.as_str())).await.unwrap();
            (token, echoed)
        })
    });
    for call in calls.collect::<Vec<_>>() {
        let (token, echoed) = call.await.unwrap();
        assert_eq!(token, echoed);
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let c: TypedHttpClient<Order> = TypedHttpClient::new(
        Arc::new(ReqwestTransport::new()),
        Arc::new(TracingLogger::for_type::<Order>()),
        Arc::new(StaticConnectivity::online()),
        &HttpClientConfig::new(format!("http://{addr}")),
    );

    let err = c.get("/echo", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Connect(_))), "{err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn custom_reason_phrase_from_the_wire_is_kept() {
    let addr = start_raw_server("HTTP/1.1 404 Item Missing\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
    let c: TypedHttpClient<Order> = client_over(ReqwestTransport::with_client(reqwest::Client::new()), addr);

    let err = c.get("/x", None).await.unwrap_err();
    assert!(matches!(err, ClientError::HttpRequest { status: 404, .. }));
    assert_eq!(err.to_string(), "Item Missing");
}

#[tokio::test]
async fn empty_reason_phrase_on_unknown_status_falls_back_to_code() {
    let addr = start_raw_server("HTTP/1.1 599 \r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
    let c: TypedHttpClient<Order> = client_over(ReqwestTransport::new(), addr);

    let err = c.get("/x", None).await.unwrap_err();
    assert_eq!(err.status(), Some(599));
    assert_eq!(err.to_string(), "HTTP 599");
}

#[tokio::test]
async fn silent_server_times_out_as_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept and hold the connection without ever answering.
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let transport = ReqwestTransport::with_timeout(Duration::from_millis(50)).unwrap();
    let c: TypedHttpClient<Order> = client_over(transport, addr);

    let err = c.get("/slow", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Timeout(_))), "{err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn transport_reports_response_headers() {
    let addr = start_server().await;
    let transport = ReqwestTransport::with_client(reqwest::Client::new());

    let response = transport
        .send(HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/headers"),
            headers: vec![("X-Trace".to_string(), "abc".to_string())],
            body: None,
        })
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.reason, "OK");
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    let echoed: BTreeMap<String, String> = serde_json::from_str(&response.body).unwrap();
    assert_eq!(echoed["x-trace"], "abc");
}
