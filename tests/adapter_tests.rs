use anyhow::Result;
use notify_service::clients::adapter::{ChannelAdapter, SendError, build_http_client};
use notify_service::clients::{telegram::TelegramAdapter, whatsapp::WhatsAppAdapter};
use notify_service::models::channel::ChannelConfig;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const WHATSAPP_TOKEN: &str = "whatsapp-token-123456";
const TELEGRAM_TOKEN: &str = "1234567890:ABCDEF";

fn whatsapp(server: &MockServer) -> ChannelConfig {
    ChannelConfig::new(true, format!("{}/messages", server.uri()), WHATSAPP_TOKEN)
}

fn telegram(server: &MockServer) -> ChannelConfig {
    ChannelConfig::new(true, format!("{}/bot", server.uri()), TELEGRAM_TOKEN)
}

/// Test: WhatsApp delivery returns the message id from the API
#[tokio::test]
async fn test_whatsapp_success_returns_message_id() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("authorization", format!("Bearer {}", WHATSAPP_TOKEN).as_str()))
        .and(body_json(json!({
            "messaging_product": "whatsapp",
            "to": "5491122334455",
            "type": "text",
            "text": { "body": "Ana arrived at 07:58" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.HBgL" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = WhatsAppAdapter::new(build_http_client(5)?);
    let id = adapter
        .send("+5491122334455", "Ana arrived at 07:58", &whatsapp(&server))
        .await?;

    assert_eq!(id, "wamid.HBgL");

    Ok(())
}

/// Test: Server errors and throttling are transient
#[tokio::test]
async fn test_whatsapp_server_errors_are_transient() -> Result<()> {
    for status in [500u16, 503, 429, 408] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let adapter = WhatsAppAdapter::new(build_http_client(5)?);
        let result = adapter.send("+5491122334455", "hi", &whatsapp(&server)).await;

        assert!(
            matches!(result, Err(SendError::Transient(_))),
            "status {} should be transient, got {:?}",
            status,
            result
        );
    }

    Ok(())
}

/// Test: Client errors are rejections
#[tokio::test]
async fn test_whatsapp_client_errors_are_rejected() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Invalid parameter" }
        })))
        .mount(&server)
        .await;

    let adapter = WhatsAppAdapter::new(build_http_client(5)?);
    let result = adapter.send("+5491122334455", "hi", &whatsapp(&server)).await;

    assert!(matches!(result, Err(SendError::Rejected(_))));

    Ok(())
}

/// Test: Malformed recipients are rejected before any request is made
#[tokio::test]
async fn test_whatsapp_invalid_recipient_is_rejected_locally() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = WhatsAppAdapter::new(build_http_client(5)?);
    let result = adapter.send("not-a-phone", "hi", &whatsapp(&server)).await;

    assert!(matches!(result, Err(SendError::Rejected(_))));

    Ok(())
}

/// Test: Unreachable endpoints are transient
#[tokio::test]
async fn test_connection_failure_is_transient() -> Result<()> {
    let adapter = WhatsAppAdapter::new(build_http_client(2)?);
    let config = ChannelConfig::new(true, "http://127.0.0.1:1/messages", WHATSAPP_TOKEN);

    let result = adapter.send("+5491122334455", "hi", &config).await;

    assert!(matches!(result, Err(SendError::Transient(_))));

    Ok(())
}

/// Test: Telegram delivery returns the numeric message id
#[tokio::test]
async fn test_telegram_success_returns_message_id() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TELEGRAM_TOKEN)))
        .and(body_json(json!({ "chat_id": "-100123456", "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 42, "chat": { "id": -100123456 } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::new(build_http_client(5)?);
    let id = tokio_test::assert_ok!(adapter.send("-100123456", "hello", &telegram(&server)).await);

    assert_eq!(id, "42");

    Ok(())
}

/// Test: Telegram refusals are rejections, throttling is transient
#[tokio::test]
async fn test_telegram_error_classification() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::new(build_http_client(5)?);
    let result = adapter.send("123456789", "hello", &telegram(&server)).await;
    assert!(matches!(result, Err(SendError::Rejected(ref msg)) if msg.contains("blocked")));

    let throttled = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5"
        })))
        .mount(&throttled)
        .await;

    let result = adapter.send("123456789", "hello", &telegram(&throttled)).await;
    assert!(matches!(result, Err(SendError::Transient(_))));

    Ok(())
}

/// Test: Telegram gateway failures without a JSON body are transient
#[tokio::test]
async fn test_telegram_bad_gateway_is_transient() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::new(build_http_client(5)?);
    let result = adapter.send("@school_parents", "hello", &telegram(&server)).await;

    assert!(matches!(result, Err(SendError::Transient(_))));

    Ok(())
}

/// Test: Telegram transport errors never carry the bot token
#[tokio::test]
async fn test_telegram_errors_hide_bot_token() -> Result<()> {
    let adapter = TelegramAdapter::new(build_http_client(2)?);
    let config = ChannelConfig::new(true, "http://127.0.0.1:1/bot", TELEGRAM_TOKEN);

    let result = adapter.send("123456789", "hello", &config).await;

    match result {
        Err(SendError::Transient(reason)) => assert!(!reason.contains(TELEGRAM_TOKEN)),
        other => return Err(anyhow::anyhow!("expected a transient failure, got {:?}", other)),
    }

    Ok(())
}
