use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use messaging_cell::models::{ButtonReply, InteractiveMessage, ListRow, ListSection};
use messaging_cell::{GatewayError, MessagingGateway, WhatsAppClient};
use shared_utils::test_utils::{sign_body, TestConfig};

async fn setup() -> (MockServer, WhatsAppClient) {
    let mock_server = MockServer::start().await;
    let config = TestConfig::default()
        .with_whatsapp_url(&mock_server.uri())
        .to_app_config();
    let client = WhatsAppClient::new(&config).unwrap();
    (mock_server, client)
}

#[tokio::test]
async fn send_text_posts_cloud_api_payload() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v18.0/1234567890/messages"))
        .and(header("Authorization", "Bearer test-access-token"))
        .and(body_partial_json(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": "15550102030",
            "type": "text",
            "text": { "body": "Hello" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.1" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    client.send_text("555-010-2030", "Hello").await.unwrap();

    let status = client.status().await;
    assert!(status.enabled);
    assert_eq!(status.message_count_today, 1);
    assert_eq!(status.total_messages_sent, 1);
    assert!(status.last_message_sent.is_some());
}

#[tokio::test]
async fn send_interactive_posts_list() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v18.0/1234567890/messages"))
        .and(body_partial_json(json!({
            "type": "interactive",
            "interactive": {
                "type": "list",
                "action": { "button": "Choose" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let message = InteractiveMessage::list(
        "Please select a department",
        "Choose",
        vec![ListSection::new("Departments", vec![ListRow::new("3", "Cardiology")])],
    );

    client
        .send_interactive("919876543210", &message)
        .await
        .unwrap();
}

#[tokio::test]
async fn api_failure_is_not_counted() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad recipient"))
        .mount(&mock_server)
        .await;

    let result = client.send_text("919876543210", "Hello").await;

    assert_matches!(result, Err(GatewayError::Api { status: 400, body }) => {
        assert_eq!(body, "bad recipient");
    });
    assert_eq!(client.status().await.total_messages_sent, 0);
}

#[tokio::test]
async fn invalid_interactive_is_not_sent() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let buttons = (0..4)
        .map(|i| ButtonReply {
            id: format!("b{}", i),
            title: "Option".to_string(),
        })
        .collect();
    let result = client
        .send_interactive("919876543210", &InteractiveMessage::buttons("Pick", buttons))
        .await;

    assert_matches!(result, Err(GatewayError::InvalidMessage(_)));
}

#[tokio::test]
async fn unconfigured_client_refuses_to_send() {
    let mut config = TestConfig::default().to_app_config();
    config.whatsapp_access_token = String::new();
    let client = WhatsAppClient::new(&config).unwrap();

    let result = client.send_text("919876543210", "Hello").await;

    assert_matches!(result, Err(GatewayError::NotConfigured));
    assert!(!client.status().await.enabled);
}

#[tokio::test]
async fn signature_uses_app_secret() {
    let config = TestConfig::default().to_app_config();
    let client = WhatsAppClient::new(&config).unwrap();
    let body = br#"{"object":"whatsapp_business_account"}"#;

    let header = sign_body(&config.whatsapp_app_secret, body);
    assert!(client.verify_signature(body, Some(&header)));
    assert!(!client.verify_signature(body, Some("sha256=00")));
    assert_eq!(client.verify_token(), "test-verify-token");
}

#[tokio::test]
async fn slow_api_hits_configured_timeout() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::default()
        .with_whatsapp_url(&mock_server.uri())
        .to_app_config();
    config.whatsapp_api_timeout_secs = 1;
    let client = WhatsAppClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "messages": [] }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let result = client.send_text("15550102030", "Hello").await;

    assert_matches!(result, Err(GatewayError::Transport(_)));
    assert_eq!(client.status().await.total_messages_sent, 0);
}
