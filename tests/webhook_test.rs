use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use qc_report_bot::adapters::line::{self, SIGNATURE_HEADER};
use qc_report_bot::core::replies::{FORMAT_INCORRECT_REPLY, SAVED_REPLY, TEMPLATE_REPLY};
use qc_report_bot::server::{self, AppState};
use qc_report_bot::{CsvSink, LineMessenger, ReportBot};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "test-channel-secret";
const ACCESS_TOKEN: &str = "test-access-token";

struct Harness {
    app: axum::Router,
    csv_path: PathBuf,
    _temp_dir: TempDir,
}

fn harness(line_api: &MockServer) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("qc_defect_log.csv");

    let state = AppState {
        bot: ReportBot::new(CsvSink::new(&csv_path)),
        messenger: LineMessenger::new(ACCESS_TOKEN.to_string(), line_api.base_url()),
        channel_secret: SECRET.to_string(),
    };

    Harness {
        app: server::router(state, "/callback"),
        csv_path,
        _temp_dir: temp_dir,
    }
}

fn text_event(reply_token: &str, text: &str) -> serde_json::Value {
    json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1714545900000u64,
        "replyToken": reply_token,
        "source": {"type": "user", "userId": "U4af4980629"},
        "message": {"id": "468789577898262530", "type": "text", "text": text}
    })
}

fn signed_request(body: &str) -> Request<Body> {
    let signature = line::sign(SECRET, body.as_bytes()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/callback")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn mock_reply<'a>(server: &'a MockServer, reply_token: &str, text: &str) -> httpmock::Mock<'a> {
    let expected = json!({
        "replyToken": reply_token,
        "messages": [{"type": "text", "text": text}]
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2/bot/message/reply")
            .header("authorization", format!("Bearer {}", ACCESS_TOKEN))
            .json_body(expected);
        then.status(200).json_body(json!({}));
    })
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_valid_report_is_logged_and_acknowledged() {
    let line_api = MockServer::start();
    let reply_mock = mock_reply(&line_api, "reply-1", SAVED_REPLY);
    let h = harness(&line_api);

    let text = "#report\ncosmetic fail\nLine: l1\nDefect: scratch\nPosition: top\nModel: x100\nTOTAL: 3\nSN: sn9";
    let body = json!({"destination": "Ubot", "events": [text_event("reply-1", text)]}).to_string();

    let response = h.app.oneshot(signed_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
    reply_mock.assert();

    let content = std::fs::read_to_string(&h.csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Type,Line,Defect,Position,Model,Total,SN,Datetime");
    assert!(lines[1].starts_with("Cosmetic Fail,L1,scratch,top,X100,3,SN9,"));

    // 時間欄位格式 YYYY-MM-DD HH:MM:SS
    let datetime = lines[1].rsplit(',').next().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[tokio::test]
async fn test_bare_command_replies_with_template() {
    let line_api = MockServer::start();
    let reply_mock = mock_reply(&line_api, "reply-2", TEMPLATE_REPLY);
    let h = harness(&line_api);

    let body = json!({"events": [text_event("reply-2", "  #report  ")]}).to_string();
    let response = h.app.oneshot(signed_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply_mock.assert();
    assert!(!h.csv_path.exists());
}

#[tokio::test]
async fn test_malformed_report_gets_format_reply() {
    let line_api = MockServer::start();
    let reply_mock = mock_reply(&line_api, "reply-3", FORMAT_INCORRECT_REPLY);
    let h = harness(&line_api);

    let body = json!({"events": [text_event("reply-3", "#report\nLine: L1\nTOTAL: many")]}).to_string();
    let response = h.app.oneshot(signed_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply_mock.assert();
    assert!(!h.csv_path.exists());
}

#[tokio::test]
async fn test_other_messages_and_events_are_ignored() {
    let line_api = MockServer::start();
    let any_reply = line_api.mock(|when, then| {
        when.method(POST).path("/v2/bot/message/reply");
        then.status(200);
    });
    let h = harness(&line_api);

    let body = json!({"events": [
        text_event("reply-4", "good morning team"),
        {"type": "follow", "replyToken": "reply-5", "source": {"type": "user", "userId": "U1"}},
        {"type": "message", "replyToken": "reply-6",
         "message": {"id": "1", "type": "image"}}
    ]})
    .to_string();
    let response = h.app.oneshot(signed_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    any_reply.assert_hits(0);
    assert!(!h.csv_path.exists());
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let line_api = MockServer::start();
    let any_reply = line_api.mock(|when, then| {
        when.method(POST).path("/v2/bot/message/reply");
        then.status(200);
    });
    let h = harness(&line_api);

    let body = json!({"events": [text_event("reply-7", "#report")]}).to_string();
    let forged = line::sign("wrong-secret", body.as_bytes()).unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/callback")
        .header(SIGNATURE_HEADER, forged)
        .body(Body::from(body))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unsigned = Request::builder()
        .method("POST")
        .uri("/callback")
        .body(Body::from("{\"events\":[]}"))
        .unwrap();
    let response = h.app.oneshot(unsigned).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    any_reply.assert_hits(0);
}

#[tokio::test]
async fn test_signed_but_malformed_body_is_rejected() {
    let line_api = MockServer::start();
    let h = harness(&line_api);

    let response = h.app.oneshot(signed_request("{\"events\": 42}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reply_failure_still_acknowledges_webhook() {
    let line_api = MockServer::start();
    let reply_mock = line_api.mock(|when, then| {
        when.method(POST).path("/v2/bot/message/reply");
        then.status(400).json_body(json!({"message": "Invalid reply token"}));
    });
    let h = harness(&line_api);

    let body = json!({"events": [text_event("expired", "#report")]}).to_string();
    let response = h.app.oneshot(signed_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply_mock.assert();
}

#[tokio::test]
async fn test_health() {
    let line_api = MockServer::start();
    let h = harness(&line_api);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}
