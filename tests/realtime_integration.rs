//! Integration tests for the realtime hub and the telemetry relay.
//!
//! The first group drives a `RealtimeHub` with its own event set through
//! `handle_frame`. The last test runs the whole service on a local port and
//! talks to it with real websocket clients.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use xornet_backend::adapters::auth::MockSessionValidator;
use xornet_backend::adapters::websocket::{InboundFrame, Outbound, RealtimeHub};
use xornet_backend::config::AppConfig;
use xornet_backend::domain::realtime::{ConnectionState, EventKind};
use xornet_backend::server::Application;

// =============================================================================
// Hub with a test event set
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TestEvent {
    Ping,
    Stat,
}

impl EventKind for TestEvent {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(TestEvent::Ping),
            "stat" => Some(TestEvent::Stat),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TestEvent::Ping => "ping",
            TestEvent::Stat => "stat",
        }
    }
}

fn text(value: Value) -> InboundFrame {
    InboundFrame::Text(value.to_string())
}

#[test]
fn listeners_run_in_registration_order_per_message() {
    let hub: RealtimeHub<TestEvent> = RealtimeHub::new("test");
    let (conn, _rx) = hub.accept();
    let log = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second"] {
        let log = Arc::clone(&log);
        hub.on(&conn, TestEvent::Ping, move |d| {
            log.lock().unwrap().push(format!("{}:{}", tag, d["n"]));
        });
    }

    hub.handle_frame(&conn, text(json!({"e": "ping", "d": {"n": 1}})));
    hub.handle_frame(&conn, text(json!({"e": "ping", "d": {"n": 2}})));

    assert_eq!(
        *log.lock().unwrap(),
        vec!["first:1", "second:1", "first:2", "second:2"]
    );
}

#[test]
fn listeners_are_isolated_between_connections() {
    let hub: RealtimeHub<TestEvent> = RealtimeHub::new("test");
    let (a, _rx_a) = hub.accept();
    let (b, _rx_b) = hub.accept();
    let seen_a = Arc::new(Mutex::new(0));
    let seen_b = Arc::new(Mutex::new(0));

    let s = Arc::clone(&seen_a);
    hub.on(&a, TestEvent::Ping, move |_| *s.lock().unwrap() += 1);
    let s = Arc::clone(&seen_b);
    hub.on(&b, TestEvent::Ping, move |_| *s.lock().unwrap() += 1);

    hub.handle_frame(&a, text(json!({"e": "ping", "d": {}})));

    assert_eq!(*seen_a.lock().unwrap(), 1);
    assert_eq!(*seen_b.lock().unwrap(), 0);
}

#[test]
fn malformed_frames_are_dropped_and_connection_stays_open() {
    let hub: RealtimeHub<TestEvent> = RealtimeHub::new("test");
    let (conn, _rx) = hub.accept();
    let stats = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&stats);
    hub.on(&conn, TestEvent::Stat, move |d| s.lock().unwrap().push(d.clone()));

    for junk in [
        InboundFrame::Text("not json".into()),
        InboundFrame::Text("[1,2]".into()),
        text(json!({"e": "stat"})),
        text(json!({"d": {}})),
        text(json!({"e": "nope", "d": {}})),
        text(json!({"e": "stat", "d": {}, "extra": true})),
        InboundFrame::Binary(vec![0xff, 0xfe]),
    ] {
        assert!(hub.handle_frame(&conn, junk));
    }
    hub.handle_frame(&conn, InboundFrame::Binary(br#"{"e":"stat","d":{"ok":1}}"#.to_vec()));

    assert_eq!(conn.state(), ConnectionState::Open);
    assert_eq!(*stats.lock().unwrap(), vec![json!({"ok": 1})]);
}

#[test]
fn close_stops_dispatch_and_fires_close_listeners_once() {
    let hub: RealtimeHub<TestEvent> = RealtimeHub::new("test");
    let (conn, _rx) = hub.accept();
    let pings = Arc::new(Mutex::new(0));
    let closes = Arc::new(Mutex::new(0));
    let p = Arc::clone(&pings);
    hub.on(&conn, TestEvent::Ping, move |_| *p.lock().unwrap() += 1);
    let c = Arc::clone(&closes);
    conn.on_close(move || *c.lock().unwrap() += 1);

    hub.handle_frame(&conn, InboundFrame::Closed);
    hub.handle_frame(&conn, text(json!({"e": "ping", "d": {}})));
    hub.handle_frame(&conn, InboundFrame::Closed);

    assert_eq!(*pings.lock().unwrap(), 0);
    assert_eq!(*closes.lock().unwrap(), 1);
    assert_eq!(hub.connection_count(), 0);
}

#[test]
fn send_writes_the_envelope_to_the_outbound_queue() {
    let hub: RealtimeHub<TestEvent> = RealtimeHub::new("test");
    let (conn, mut rx) = hub.accept();

    conn.send("stat", &json!({"cpu": 3})).unwrap();

    match rx.try_recv().unwrap() {
        Outbound::Text(body) => {
            let value: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(value, json!({"e": "stat", "d": {"cpu": 3}}));
        }
        other => panic!("unexpected outbound item: {:?}", other),
    }
}

// =============================================================================
// End to end over real sockets
// =============================================================================

type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a websocket message")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(body) = message {
            return serde_json::from_str(&body).unwrap();
        }
    }
}

/// Skips heartbeats.
async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let value = next_json(socket).await;
        if value["e"] != "heartbeat" {
            return value;
        }
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket.send(Message::Text(value.to_string())).await.unwrap();
}

async fn http_json(app: &axum::Router, method: Method, uri: &str, session: Option<&str>, body: Option<Value>) -> Value {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = session {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status() == StatusCode::OK || response.status() == StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn reporter_telemetry_reaches_the_owners_dashboard() {
    let sessions = MockSessionValidator::new()
        .with_test_user("session-u1", "u1")
        .with_test_user("session-u2", "u2");
    let app = Application::build_with_sessions(&AppConfig::default(), Arc::new(sessions))
        .await
        .unwrap();
    let router = app.router();

    // Pair a machine over HTTP
    let key = http_json(&router, Method::GET, "/v1/machines/@newkey", Some("session-u1"), None).await;
    let registered = http_json(
        &router,
        Method::POST,
        "/v1/machines/@signup",
        None,
        Some(json!({"two_factor_key": key["key"], "hardware_uuid": "hw-e2e", "hostname": "e2e"})),
    )
    .await;
    let access_token = registered["access_token"].as_str().unwrap().to_string();

    // Serve on an ephemeral port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(app.serve_on(listener, async {
        let _ = stop_rx.await;
    }));

    // Owner and stranger dashboards
    let (mut owner, _) = tokio_tungstenite::connect_async(format!("ws://{}/client", addr)).await.unwrap();
    send_json(&mut owner, json!({"e": "login", "d": {"auth_token": "session-u1"}})).await;
    assert_eq!(next_event(&mut owner).await["e"], "authenticated");

    let (mut stranger, _) = tokio_tungstenite::connect_async(format!("ws://{}/client", addr)).await.unwrap();
    send_json(&mut stranger, json!({"e": "login", "d": {"auth_token": "session-u2"}})).await;
    assert_eq!(next_event(&mut stranger).await["e"], "authenticated");

    // Reporter logs in and streams one sample
    let (mut reporter, _) = tokio_tungstenite::connect_async(format!("ws://{}/reporter", addr)).await.unwrap();
    send_json(&mut reporter, json!({"e": "login", "d": {"auth_token": access_token}})).await;
    let welcome = next_event(&mut reporter).await;
    assert_eq!(welcome["e"], "authenticated");
    let machine_id = welcome["d"]["uuid"].clone();

    send_json(
        &mut reporter,
        json!({"e": "dynamicData", "d": {
            "cpu": {"usage": [10.0, 30.0], "freq": [2000.0, 3000.0]},
            "ram": {"total": 100, "used": 50},
            "network": [{"name": "eth0", "tx": 1.0, "rx": 2.0}]
        }}),
    )
    .await;

    let update = next_event(&mut owner).await;
    assert_eq!(update["e"], "machineData");
    assert_eq!(update["d"]["uuid"], machine_id);
    assert_eq!(update["d"]["cau"], 20.0);
    assert_eq!(update["d"]["cas"], 2500.0);

    // The stranger only ever sees heartbeats
    let quiet = tokio::time::timeout(Duration::from_millis(300), next_event(&mut stranger)).await;
    assert!(quiet.is_err(), "stranger received {:?}", quiet);

    // A forged reporter is turned away
    let (mut forged, _) = tokio_tungstenite::connect_async(format!("ws://{}/reporter", addr)).await.unwrap();
    send_json(&mut forged, json!({"e": "login", "d": {"auth_token": "forged"}})).await;
    assert_eq!(next_event(&mut forged).await["e"], "unauthorized");

    let _ = stop_tx.send(());
    drop((owner, stranger, reporter, forged));
    let _ = tokio::time::timeout(Duration::from_secs(5), server).await;
}
