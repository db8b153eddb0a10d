//! Tests for SessionGate against a mocked backend

use agent_console::config::ApiConfig;
use agent_console::session::{
    AuthClient, MemorySessionStorage, Navigator, Route, RouteDecision, SessionGate,
    SessionStorage, DEFAULT_AUTH_ERROR, TOKEN_KEY,
};
use mockito::{Matcher, Server};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

fn gate_for(api: ApiConfig, storage: Arc<MemorySessionStorage>) -> SessionGate {
    SessionGate::new(AuthClient::new(reqwest::Client::new(), &api), storage)
}

/// Navigator that forwards every navigation to a channel
struct ChannelNavigator(mpsc::UnboundedSender<String>);

impl Navigator for ChannelNavigator {
    fn navigate(&self, path: &str) {
        let _ = self.0.send(path.to_string());
    }
}

async fn next_path(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("navigation should happen")
        .expect("navigator channel open")
}

#[tokio::test]
#[serial]
async fn test_login_stores_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/user/login")
        .match_body(Matcher::Json(json!({"email": "a@b.c", "senha": "secret"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"api_key": "X"}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemorySessionStorage::new());
    let gate = gate_for(ApiConfig::with_base_url(server.url()), storage.clone());
    assert!(!gate.is_authenticated());

    let credential = gate.login("a@b.c", "secret").await.unwrap();

    mock.assert_async().await;
    assert_eq!(credential.api_key, "X");
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("X"));
    assert!(gate.is_authenticated());
    assert_eq!(gate.guard(Route::Agents), RouteDecision::Render);
}

#[tokio::test]
#[serial]
async fn test_login_rejected_keeps_backend_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/user/login")
        .match_body(Matcher::PartialJson(json!({"senha": "wrong"})))
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Senha inválida"}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemorySessionStorage::new());
    let gate = gate_for(ApiConfig::with_base_url(server.url()), storage.clone());

    let err = gate.login("a@b.c", "wrong").await.unwrap_err();

    mock.assert_async().await;
    assert!(err.is_auth());
    assert_eq!(err.to_string(), "Senha inválida");
    assert!(!gate.is_authenticated());
    assert!(storage.get(TOKEN_KEY).is_none());
}

#[tokio::test]
#[serial]
async fn test_login_falls_back_to_default_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/user/login")
        .match_body(Matcher::PartialJson(json!({"email": "a@b.c"})))
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    server
        .mock("POST", "/user/login")
        .match_body(Matcher::PartialJson(json!({"email": "empty@b.c"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let gate = gate_for(
        ApiConfig::with_base_url(server.url()),
        Arc::new(MemorySessionStorage::new()),
    );

    let rejected = gate.login("a@b.c", "x").await.unwrap_err();
    assert_eq!(rejected.to_string(), DEFAULT_AUTH_ERROR);

    let no_key = gate.login("empty@b.c", "x").await.unwrap_err();
    assert_eq!(no_key.to_string(), DEFAULT_AUTH_ERROR);
    assert!(!gate.is_authenticated());
}

#[tokio::test]
#[serial]
async fn test_logout_sends_bearer_and_clears_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/logout")
        .match_header("authorization", "Bearer X")
        .with_status(200)
        .create_async()
        .await;

    let storage = Arc::new(MemorySessionStorage::with_token("X"));
    let gate = gate_for(ApiConfig::with_base_url(server.url()), storage.clone());
    assert!(gate.is_authenticated());

    gate.logout().await;

    mock.assert_async().await;
    assert!(storage.get(TOKEN_KEY).is_none());
    assert!(!gate.is_authenticated());
    assert_eq!(gate.guard(Route::Home), RouteDecision::Redirect("/"));
}

#[tokio::test]
#[serial]
async fn test_logout_ignores_backend_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/logout")
        .with_status(404)
        .create_async()
        .await;

    let storage = Arc::new(MemorySessionStorage::with_token("X"));
    let gate = gate_for(ApiConfig::with_base_url(server.url()), storage.clone());

    gate.logout().await;

    assert!(storage.get(TOKEN_KEY).is_none());
    assert!(!gate.is_authenticated());
}

#[tokio::test]
async fn test_logout_bounded_when_backend_hangs() {
    // Accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut api = ApiConfig::with_base_url(format!("http://{}", addr));
    api.logout_timeout = Duration::from_millis(200);
    let storage = Arc::new(MemorySessionStorage::with_token("X"));
    let gate = gate_for(api, storage.clone());

    let started = Instant::now();
    gate.logout().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(storage.get(TOKEN_KEY).is_none());
    assert!(!gate.is_authenticated());
}

#[tokio::test]
async fn test_login_truncated_body_reports_transport_error() {
    // Promises a longer body than it sends, then hangs up
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.ends_with(b"}") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"api_",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let storage = Arc::new(MemorySessionStorage::new());
    let gate = gate_for(
        ApiConfig::with_base_url(format!("http://{}", addr)),
        storage.clone(),
    );

    let err = gate.login("a@b.c", "secret").await.unwrap_err();

    assert!(err.is_auth());
    assert_ne!(err.to_string(), DEFAULT_AUTH_ERROR);
    assert!(!gate.is_authenticated());
    assert!(storage.get(TOKEN_KEY).is_none());
}

#[tokio::test]
async fn test_logout_with_unreachable_backend() {
    let storage = Arc::new(MemorySessionStorage::with_token("X"));
    let gate = gate_for(ApiConfig::with_base_url("http://127.0.0.1:9"), storage.clone());

    gate.logout().await;

    assert!(storage.get(TOKEN_KEY).is_none());
    assert!(!gate.is_authenticated());
}

#[tokio::test]
#[serial]
async fn test_redirect_effect_follows_flag() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/user/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"api_key": "X"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/logout")
        .with_status(200)
        .create_async()
        .await;

    let gate = gate_for(
        ApiConfig::with_base_url(server.url()),
        Arc::new(MemorySessionStorage::new()),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let effect = gate.spawn_redirect_effect(Arc::new(ChannelNavigator(tx)));

    // Unauthenticated at start
    assert_eq!(next_path(&mut rx).await, "/");

    gate.login("a@b.c", "secret").await.unwrap();
    gate.logout().await;
    assert_eq!(next_path(&mut rx).await, "/");
    assert!(rx.try_recv().is_err());

    drop(gate);
    tokio::time::timeout(Duration::from_secs(5), effect)
        .await
        .expect("effect ends with the gate")
        .unwrap();
}

#[tokio::test]
async fn test_guard_public_and_protected_routes() {
    let gate = gate_for(
        ApiConfig::with_base_url("http://127.0.0.1:9"),
        Arc::new(MemorySessionStorage::new()),
    );

    assert_eq!(gate.guard(Route::Login), RouteDecision::Render);
    for route in Route::ALL.iter().filter(|r| r.is_protected()) {
        assert_eq!(gate.guard(*route), RouteDecision::Redirect("/"));
    }
    assert!(!gate.is_authenticated());
}
