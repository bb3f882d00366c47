//! Provider senders against a local capture server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Form, Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use cargodesk_notify::{
    Delivery, EmailApiConfig, EmailSender, HttpEmailSender, Message, SendError, SmsApiConfig,
    SmsSender, TwilioSmsSender,
};

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl Captured {
    fn push(&self, path: &str, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests
            .lock()
            .expect("lock")
            .push((path.to_string(), auth, body));
    }

    fn all(&self) -> Vec<(String, Option<String>, Value)> {
        self.requests.lock().expect("lock").clone()
    }
}

async fn email_handler(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    captured.push("/emails", &headers, body.clone());
    if body["to"][0] == "bounce@example.com" {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"message": "invalid to"})));
    }
    (StatusCode::OK, Json(json!({"id": "em_123"})))
}

async fn sms_handler(
    State(captured): State<Captured>,
    Path(sid): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    captured.push(&format!("/sms/{sid}"), &headers, json!(form));
    (StatusCode::CREATED, Json(json!({"sid": "SM42"})))
}

async fn start_server() -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/emails", post(email_handler))
        .route("/2010-04-01/Accounts/:sid/Messages.json", post(sms_handler))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), captured)
}

fn message() -> Message {
    Message {
        subject: "Package ORD-1: status update".to_string(),
        text: "Your package ORD-1 is in transit.".to_string(),
        html: "<p>Your package ORD-1 is in transit.</p>".to_string(),
    }
}

#[tokio::test]
async fn email_sender_posts_json_with_bearer_key() {
    let (base, captured) = start_server().await;
    let sender = HttpEmailSender::new(EmailApiConfig {
        api_url: format!("{base}/emails"),
        api_key: "re_test".to_string(),
        from: "Cargo Desk <noreply@example.com>".to_string(),
    })
    .expect("sender");

    let delivery = sender.send_email("ana@example.com", &message()).await.expect("send");
    assert_eq!(
        delivery,
        Delivery::Sent {
            provider_id: Some("em_123".to_string())
        }
    );

    let requests = captured.all();
    assert_eq!(requests.len(), 1);
    let (_, auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer re_test"));
    assert_eq!(body["to"], json!(["ana@example.com"]));
    assert_eq!(body["subject"], "Package ORD-1: status update");
    assert_eq!(body["from"], "Cargo Desk <noreply@example.com>");
}

#[tokio::test]
async fn email_provider_rejection_is_reported() {
    let (base, _captured) = start_server().await;
    let sender = HttpEmailSender::new(EmailApiConfig {
        api_url: format!("{base}/emails"),
        api_key: "re_test".to_string(),
        from: "noreply@example.com".to_string(),
    })
    .expect("sender");

    let err = sender
        .send_email("bounce@example.com", &message())
        .await
        .expect_err("should fail");
    match err {
        SendError::Provider { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("invalid to"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn email_sender_rejects_malformed_address_locally() {
    let sender = HttpEmailSender::new(EmailApiConfig {
        api_url: "http://127.0.0.1:9/emails".to_string(),
        api_key: "k".to_string(),
        from: "noreply@example.com".to_string(),
    })
    .expect("sender");
    let err = sender.send_email("not-an-email", &message()).await.expect_err("invalid");
    assert!(matches!(err, SendError::InvalidRecipient(_)));
}

#[tokio::test]
async fn sms_sender_posts_form_with_basic_auth() {
    let (base, captured) = start_server().await;
    let sender = TwilioSmsSender::new(SmsApiConfig {
        api_base: format!("{base}/"),
        account_sid: "AC123".to_string(),
        auth_token: "secret".to_string(),
        from: "+15550000".to_string(),
    })
    .expect("sender");

    let delivery = sender.send_sms("+15551234", "Your package moved").await.expect("send");
    assert_eq!(
        delivery,
        Delivery::Sent {
            provider_id: Some("SM42".to_string())
        }
    );

    let requests = captured.all();
    assert_eq!(requests.len(), 1);
    let (path, auth, body) = &requests[0];
    assert_eq!(path, "/sms/AC123");
    // "AC123:secret" in base64
    assert_eq!(auth.as_deref(), Some("Basic QUMxMjM6c2VjcmV0"));
    assert_eq!(body["To"], "+15551234");
    assert_eq!(body["From"], "+15550000");
    assert_eq!(body["Body"], "Your package moved");
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let sender = TwilioSmsSender::new(SmsApiConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        account_sid: "AC123".to_string(),
        auth_token: "secret".to_string(),
        from: "+15550000".to_string(),
    })
    .expect("sender");
    let err = sender.send_sms("+15551234", "hi").await.expect_err("unreachable");
    assert!(matches!(err, SendError::Transport(_)));
}
