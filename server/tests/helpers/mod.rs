//! Reusable test helpers for gateway integration tests.
//!
//! Provides `TestApp` for sending requests through the full axum router,
//! plus builders for signed plaintext and encrypted callback bodies.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use wx_common::{AccountContext, TrustMode};
use wx_crypto::{signature, MessageCodec};
use wx_server::api::{create_router, AppState};
use wx_server::dispatch::Dispatcher;
use wx_server::facade::{MessageFacade, MessageParams};

pub const TOKEN: &str = "token";
pub const APP_ID: &str = "wx1234567890";
pub const AES_KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";
pub const TIMESTAMP: &str = "1409304348";
pub const NONCE: &str = "xxxxxx";

/// Account id used for each trust mode.
pub const fn account_id(mode: TrustMode) -> &'static str {
    match mode {
        TrustMode::Plain => "plain",
        TrustMode::Permissive => "compat",
        TrustMode::Strict => "safe",
    }
}

/// Build an account context for `mode`.
pub fn account(mode: TrustMode) -> AccountContext {
    let key = mode.needs_key().then(|| AES_KEY.to_string());
    AccountContext::new(account_id(mode), APP_ID, "secret", TOKEN, key, mode)
        .expect("valid test account")
}

/// Build a facade for `mode` around `dispatcher`.
pub fn facade(mode: TrustMode, dispatcher: Dispatcher) -> MessageFacade {
    MessageFacade::new(account(mode), Arc::new(dispatcher)).expect("valid test facade")
}

pub fn codec() -> MessageCodec {
    MessageCodec::new(AES_KEY).expect("valid test key")
}

/// A plaintext text message from `o_user` to `gh_account`.
pub fn text_xml(content: &str) -> String {
    format!(
        "<xml><ToUserName><![CDATA[gh_account]]></ToUserName>\
         <FromUserName><![CDATA[o_user]]></FromUserName>\
         <CreateTime>1409304348</CreateTime><MsgType><![CDATA[text]]></MsgType>\
         <Content><![CDATA[{content}]]></Content><MsgId>1234567890123456</MsgId></xml>"
    )
}

/// Query of a correctly signed plaintext push.
pub fn plain_params() -> MessageParams {
    MessageParams {
        signature: signature::sign(&[TOKEN, TIMESTAMP, NONCE]),
        timestamp: TIMESTAMP.into(),
        nonce: NONCE.into(),
        openid: Some("o_user".into()),
        ..MessageParams::default()
    }
}

/// Encrypt `xml` for `app_id` and return the envelope body with its
/// correctly signed query.
pub fn encrypted(xml: &str, app_id: &str) -> (String, MessageParams) {
    let encrypt = codec().encrypt(xml, app_id).expect("encrypt");
    let msg_signature = signature::sign(&[TOKEN, TIMESTAMP, NONCE, &encrypt]);
    let body = format!(
        "<xml><ToUserName><![CDATA[gh_account]]></ToUserName>\
         <Encrypt><![CDATA[{encrypt}]]></Encrypt></xml>"
    );
    let params = MessageParams {
        signature: signature::sign(&[TOKEN, TIMESTAMP, NONCE]),
        timestamp: TIMESTAMP.into(),
        nonce: NONCE.into(),
        openid: Some("o_user".into()),
        encrypt_type: Some("aes".into()),
        msg_signature: Some(msg_signature),
    };
    (body, params)
}

/// Encode message query parameters for a request URI.
pub fn query(params: &MessageParams) -> String {
    let mut pairs = vec![
        format!("signature={}", params.signature),
        format!("timestamp={}", params.timestamp),
        format!("nonce={}", params.nonce),
    ];
    if let Some(openid) = &params.openid {
        pairs.push(format!("openid={openid}"));
    }
    if let Some(encrypt_type) = &params.encrypt_type {
        pairs.push(format!("encrypt_type={encrypt_type}"));
    }
    if let Some(msg_signature) = &params.msg_signature {
        pairs.push(format!("msg_signature={msg_signature}"));
    }
    pairs.join("&")
}

/// Test application wrapping the full router, one account per trust mode.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    /// Create a test app whose accounts share `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        let dispatcher = Arc::new(dispatcher);
        let facades = [TrustMode::Plain, TrustMode::Permissive, TrustMode::Strict]
            .into_iter()
            .map(|mode| {
                MessageFacade::new(account(mode), Arc::clone(&dispatcher))
                    .expect("valid test facade")
            });
        Self {
            router: create_router(AppState::new(facades)),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }
}

/// Collect a response body into a string.
pub async fn body_to_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let text = body_to_string(response).await;
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Failed to parse response as JSON: {e}\nBody: {text}"))
}
