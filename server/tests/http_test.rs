//! HTTP Integration Tests for the Callback API
//!
//! Tests the gateway endpoints:
//! - GET /health
//! - GET /wx/{account} (server-ownership challenge)
//! - POST /wx/{account} (pushed messages)
//!
//! Run with: `cargo test --test http_test -- --nocapture`

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use helpers::{
    account_id, body_to_json, body_to_string, codec, encrypted, plain_params, query, text_xml,
    TestApp, APP_ID, NONCE, TIMESTAMP, TOKEN,
};
use wx_common::{Reply, RequestMessage, TrustMode};
use wx_crypto::signature;
use wx_server::dispatch::Dispatcher;
use wx_server::parser::flatten;

fn echo_app() -> TestApp {
    TestApp::new(
        Dispatcher::new().push(|message: Arc<RequestMessage>| async move {
            match message.as_ref() {
                RequestMessage::Text(text) => Some(Reply::text(&message, text.content.clone())),
                _ => None,
            }
        }),
    )
}

fn challenge_uri(account: &str, signature: &str) -> String {
    format!(
        "/wx/{account}?signature={signature}&timestamp={TIMESTAMP}&nonce={NONCE}&echostr=5837397749"
    )
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_reports_accounts() {
    let app = echo_app();
    let req = TestApp::request(Method::GET, "/health")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_to_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["accounts"], 3);
}

// ============================================================================
// Challenge
// ============================================================================

#[tokio::test]
async fn challenge_echoes_for_every_mode() {
    let app = echo_app();
    let signature = signature::sign(&[TOKEN, TIMESTAMP, NONCE]);

    for mode in [TrustMode::Plain, TrustMode::Permissive, TrustMode::Strict] {
        let req = TestApp::request(Method::GET, &challenge_uri(account_id(mode), &signature))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{mode}");
        assert_eq!(body_to_string(resp).await, "5837397749");
    }
}

#[tokio::test]
async fn challenge_with_bad_signature_is_unauthorized() {
    let app = echo_app();
    let req = TestApp::request(Method::GET, &challenge_uri("plain", "deadbeef"))
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_to_json(resp).await;
    assert_eq!(json["error"], "SIGNATURE_MISMATCH");
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let app = echo_app();
    let signature = signature::sign(&[TOKEN, TIMESTAMP, NONCE]);
    let req = TestApp::request(Method::GET, &challenge_uri("nobody", &signature))
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(resp).await;
    assert_eq!(json["error"], "UNKNOWN_ACCOUNT");
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn plain_message_gets_xml_reply() {
    let app = echo_app();
    let uri = format!("/wx/plain?{}", query(&plain_params()));
    let req = TestApp::request(Method::POST, &uri)
        .header(header::CONTENT_TYPE, "text/xml")
        .body(Body::from(text_xml("hello")))
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let fields = flatten(&body_to_string(resp).await).unwrap();
    assert_eq!(fields.get("Content"), Some("hello"));
    assert_eq!(fields.get("ToUserName"), Some("o_user"));
}

#[tokio::test]
async fn unanswered_event_is_acknowledged() {
    let app = echo_app();
    let uri = format!("/wx/plain?{}", query(&plain_params()));
    let xml = "<xml><ToUserName>gh_account</ToUserName><FromUserName>o_user</FromUserName>\
               <CreateTime>1409304348</CreateTime><MsgType>event</MsgType>\
               <Event>subscribe</Event></xml>";
    let req = TestApp::request(Method::POST, &uri)
        .body(Body::from(xml))
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_to_string(resp).await, "success");
}

#[tokio::test]
async fn strict_message_gets_sealed_reply() {
    let app = echo_app();
    let (body, params) = encrypted(&text_xml("secret"), APP_ID);
    let uri = format!("/wx/safe?{}", query(&params));
    let req = TestApp::request(Method::POST, &uri)
        .body(Body::from(body))
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let envelope = flatten(&body_to_string(resp).await).unwrap();
    let encrypt = envelope.get("Encrypt").unwrap();
    let decrypted = codec().decrypt(encrypt).unwrap();
    let reply = flatten(&decrypted.xml).unwrap();
    assert_eq!(reply.get("Content"), Some("secret"));
}

#[tokio::test]
async fn strict_plaintext_message_is_unauthorized() {
    let app = echo_app();
    let uri = format!("/wx/safe?{}", query(&plain_params()));
    let req = TestApp::request(Method::POST, &uri)
        .body(Body::from(text_xml("hello")))
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_event_is_bad_request() {
    let app = echo_app();
    let uri = format!("/wx/plain?{}", query(&plain_params()));
    let xml = "<xml><ToUserName>gh_account</ToUserName><FromUserName>o_user</FromUserName>\
               <CreateTime>1</CreateTime><MsgType>event</MsgType><Event>teleport</Event></xml>";
    let req = TestApp::request(Method::POST, &uri)
        .body(Body::from(xml))
        .unwrap();

    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(resp).await;
    assert_eq!(json["error"], "UNKNOWN_EVENT_TYPE");
}
