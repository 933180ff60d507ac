//! End-to-end tests over TCP against the in-memory repository.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use shipping_api::middleware::{RequireSecret, SECRET_HEADER};
use shipping_api::shipping::{AppState, InMemoryShippingRepository};
use shipping_api::{app, Server};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SECRET: &str = "test-secret";

struct TestServer {
    base: String,
    client: Client,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), shipping_api::Error>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = AppState::new(Arc::new(InMemoryShippingRepository::new()));
        let router = app::router(&state, RequireSecret::new(SECRET));

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(
            Server::from_listener(listener).serve_with_shutdown(router, async {
                let _ = stopped.await;
            }),
        );

        Self { base: format!("http://{addr}"), client: Client::new(), stop: Some(stop), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn create(&self, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url("/api/shipping/create"))
            .header(SECRET_HEADER, SECRET)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn cancel(&self, body: Value) -> (StatusCode, Value) {
        let res = self.client.put(self.url("/api/shipping/cancel"))
            .header(SECRET_HEADER, SECRET)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn list(&self, query: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(&format!("/api/shipping/get{query}")))
            .header(SECRET_HEADER, SECRET)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not shut down")
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn every_route_requires_the_secret() {
    let server = TestServer::start().await;
    let routes = [
        (reqwest::Method::POST, "/api/shipping/create", Some(json!({"userId": 1, "productId": 2, "count": 5}))),
        (reqwest::Method::PUT, "/api/shipping/cancel", Some(json!({"shippingId": 1}))),
        (reqwest::Method::GET, "/api/shipping/get", None),
    ];

    for (method, path, body) in routes {
        for (key, message) in [
            (None, "SHIPPING_SECRET_KEY is missing or invalid"),
            (Some(""), "SHIPPING_SECRET_KEY is missing or invalid"),
            (Some("wrong"), "Failed to authenticate SHIPPING_SECRET_KEY"),
        ] {
            let mut req = server.client.request(method.clone(), server.url(path));
            if let Some(key) = key {
                req = req.header(SECRET_HEADER, key);
            }
            if let Some(body) = &body {
                req = req.json(body);
            }
            let res = req.send().await.unwrap();
            assert_eq!(res.status(), StatusCode::FORBIDDEN, "{method} {path} with {key:?}");
            assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": message }));
        }
    }

    // Rejected creates never reached the store.
    let (status, records) = server.list("").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records, json!([]));

    server.stop().await;
}

#[tokio::test]
async fn secret_header_name_is_case_insensitive() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/api/shipping/get"))
        .header("SHIPPING_SECRET_KEY", SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn create_returns_pending_record() {
    let server = TestServer::start().await;

    let (status, record) = server.create(json!({"userId": 1, "productId": 2, "count": 5})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(record["id"].is_i64());
    assert_eq!(record["userId"], json!(1));
    assert_eq!(record["productId"], json!(2));
    assert_eq!(record["count"], json!(5));
    assert_eq!(record["status"], json!("pending"));
    assert!(record["createdAt"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn create_without_count_is_rejected_and_not_stored() {
    let server = TestServer::start().await;

    let (status, body) = server.create(json!({"userId": 1, "productId": 2})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "All fields required" }));

    assert_eq!(server.list("").await.1, json!([]));

    server.stop().await;
}

#[tokio::test]
async fn create_accepts_zero_count() {
    let server = TestServer::start().await;

    let (status, record) = server.create(json!({"userId": 1, "productId": 2, "count": 0})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["count"], json!(0));

    server.stop().await;
}

#[tokio::test]
async fn cancel_unknown_record_is_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.cancel(json!({"shippingId": 999})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Shipping record not found" }));
    assert_eq!(server.list("").await.1, json!([]));

    let (status, body) = server.cancel(json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Missing shippingId" }));

    server.stop().await;
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let server = TestServer::start().await;
    let (_, created) = server.create(json!({"userId": 1, "productId": 2, "count": 5})).await;
    let id = created["id"].clone();

    for _ in 0..2 {
        let (status, record) = server.cancel(json!({ "shippingId": id })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["id"], id);
        assert_eq!(record["status"], json!("cancelled"));
    }

    let (_, records) = server.list("?userId=1").await;
    assert_eq!(records[0]["status"], json!("cancelled"));

    server.stop().await;
}

#[tokio::test]
async fn list_filters_by_user() {
    let server = TestServer::start().await;
    for user in [1, 2, 1] {
        let (status, _) = server.create(json!({"userId": user, "productId": 7, "count": 1})).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) = server.list("").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, mine) = server.list("?userId=1").await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|r| r["userId"] == json!(1)));

    let (status, none) = server.list("?userId=42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));

    let (_, unfiltered) = server.list("?userId=abc").await;
    assert_eq!(unfiltered.as_array().unwrap().len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn created_record_round_trips_through_list() {
    let server = TestServer::start().await;
    let (_, created) = server.create(json!({"userId": 5, "productId": 9, "count": 3})).await;

    let (_, listed) = server.list("?userId=5").await;
    assert_eq!(listed, json!([created]));

    server.stop().await;
}

#[tokio::test]
async fn health_checks_skip_the_secret() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = server.client.get(server.url("/readyz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ready");

    let res = server.client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": "Not Found" }));

    server.stop().await;
}

#[tokio::test]
async fn unmatched_shipping_routes_still_require_the_secret() {
    let server = TestServer::start().await;

    let unmatched = [
        server.client.get(server.url("/api/shipping/nope")),
        server.client.get(server.url("/api/shipping/create")),
        server.client.post(server.url("/api/shipping/get")),
        server.client.get(server.url("/api/shipping")),
    ];
    for req in unmatched {
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            res.json::<Value>().await.unwrap(),
            json!({ "error": "SHIPPING_SECRET_KEY is missing or invalid" }),
        );
    }

    let res = server.client.get(server.url("/api/shipping/nope"))
        .header(SECRET_HEADER, "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.get(server.url("/api/shipping/nope"))
        .header(SECRET_HEADER, SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": "Not Found" }));

    server.stop().await;
}
