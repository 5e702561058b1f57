use super::*;
use axum::{extract::Path, http::StatusCode, routing::get, Router};
use shared::{
    domain::Txid,
    protocol::{RequestId, RequestKind},
};
use tokio::net::TcpListener;

async fn tx_handler(Path(txid): Path<String>) -> (StatusCode, String) {
    if txid == "aa" {
        (StatusCode::OK, r#"{"txid":"aa"}"#.to_string())
    } else {
        (StatusCode::NOT_FOUND, "Transaction not found".to_string())
    }
}

async fn spawn_api_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/blocks/tip/height", get(|| async { "840000" }))
        .route("/api/tx/:txid", get(tx_handler));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api/")
}

fn descriptor(kind: RequestKind) -> RequestDescriptor {
    RequestDescriptor::new(RequestId(1), kind, 1)
}

#[test]
fn api_base_drops_trailing_slashes() {
    assert_eq!(
        normalize_api_base(" https://example.com/api// ").expect("valid"),
        "https://example.com/api"
    );
}

#[test]
fn relative_api_base_is_rejected() {
    let err = normalize_api_base("/api").expect_err("relative");
    assert!(matches!(err, TransportError::InvalidBaseUrl { .. }));
}

#[tokio::test]
async fn fetches_text_bodies_from_the_base() {
    let base = spawn_api_server().await;
    let transport = HttpTransport::new(&base).expect("transport");
    assert!(!transport.base().ends_with('/'));

    let body = transport
        .fetch(&descriptor(RequestKind::TipHeight))
        .await
        .expect("tip height");
    assert_eq!(body, "840000");
}

#[tokio::test]
async fn non_success_status_becomes_a_failure() {
    let base = spawn_api_server().await;
    let transport = HttpTransport::new(&base).expect("transport");

    let envelope = transport
        .exchange(descriptor(RequestKind::Tx {
            txid: Txid::from("bb"),
        }))
        .await;
    let failure = envelope.outcome.expect_err("404");
    assert_eq!(failure.code, FailureCode::NotFound);
    assert_eq!(failure.display_message(), "HTTP 404: Transaction not found");
    assert_eq!(envelope.request.id, RequestId(1));
}

#[tokio::test]
async fn exchange_wraps_success_in_an_envelope() {
    let base = spawn_api_server().await;
    let transport = HttpTransport::new(&base).expect("transport");

    let envelope = transport
        .exchange(descriptor(RequestKind::Tx {
            txid: Txid::from("aa"),
        }))
        .await;
    assert!(envelope.ok());
    assert_eq!(envelope.outcome.as_deref(), Ok(r#"{"txid":"aa"}"#));
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

    let transport = HttpTransport::new(&format!("http://{addr}")).expect("transport");
    let failure = transport
        .fetch(&descriptor(RequestKind::TipHeight))
        .await
        .expect_err("connection refused");
    assert_eq!(failure.code, FailureCode::Network);
    assert_eq!(failure.status, None);
}
