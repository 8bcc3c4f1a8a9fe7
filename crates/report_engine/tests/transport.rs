use std::time::Duration;

use pretty_assertions::assert_eq;
use report_core::{ActionContext, PrintJobPayload, RequestEnvelope};
use report_engine::{HttpTransport, ReqwestTransport, TransportFailure, TransportSettings};
use serde_json::{json, Map};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> ReqwestTransport {
    ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        ..TransportSettings::default()
    })
    .expect("transport")
}

fn envelope() -> RequestEnvelope {
    PrintJobPayload::new("/report/pdf/sale.report/5,6", &ActionContext::default())
        .envelope("tok", &Map::new())
}

#[tokio::test]
async fn rpc_returns_result_member() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/check_wkhtmltopdf"))
        .and(body_string_contains("\"jsonrpc\":\"2.0\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = transport_for(&server)
        .rpc("/report/check_wkhtmltopdf", json!({}))
        .await
        .unwrap();
    assert_eq!(result, json!("ok"));
}

#[tokio::test]
async fn rpc_error_member_is_an_rpc_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/web/dataset/call_kw/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"message": "Odoo Server Error", "data": {"message": "Access Denied"}}
        })))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .rpc("/web/dataset/call_kw/x", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransportFailure::Rpc);
    assert_eq!(err.message, "Access Denied");
}

#[tokio::test]
async fn check_posts_form_and_parses_boolean() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/check"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("csrf_token=tok"))
        .and(body_string_contains("data=%5B%22%2Freport%2Fpdf%2Fsale.report%2F5%2C6%22"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .mount(&server)
        .await;

    let reply = transport_for(&server)
        .post_json("/report/check", &envelope())
        .await
        .unwrap();
    assert_eq!(reply, json!(true));
}

#[tokio::test]
async fn check_with_error_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/check"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .post_json("/report/check", &envelope())
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransportFailure::HttpStatus(403));
}

#[tokio::test]
async fn check_with_html_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .post_json("/report/check", &envelope())
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransportFailure::InvalidResponse);
}

#[tokio::test]
async fn print_keeps_error_pages_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/print"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_raw("<html><body><h1>Erreur</h1></body></html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let reply = transport_for(&server)
        .post_text("/report/print", &envelope())
        .await
        .unwrap();
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, "<html><body><h1>Erreur</h1></body></html>");
}

#[tokio::test]
async fn print_body_honours_declared_charset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/print"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"d\xe9j\xe0".to_vec(), "text/plain; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let reply = transport_for(&server)
        .post_text("/report/print", &envelope())
        .await
        .unwrap();
    assert_eq!(reply.body, "déjà");
}

#[tokio::test]
async fn session_cookie_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/print"))
        .and(header("cookie", "session_id=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        session_id: Some("abc123".to_string()),
        ..TransportSettings::default()
    })
    .unwrap();

    let reply = transport.post_text("/report/print", &envelope()).await.unwrap();
    assert_eq!(reply.status, 200);
}

#[tokio::test]
async fn oversized_reply_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/print"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        max_bytes: 10,
        ..TransportSettings::default()
    })
    .unwrap();

    let err = transport
        .post_text("/report/print", &envelope())
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        TransportFailure::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report/print"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..TransportSettings::default()
    })
    .unwrap();

    let err = transport
        .post_text("/report/print", &envelope())
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransportFailure::Timeout);
}

#[test]
fn malformed_base_url_is_rejected() {
    let err = ReqwestTransport::new(TransportSettings {
        base_url: "not a url".to_string(),
        ..TransportSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, TransportFailure::InvalidUrl);
}
