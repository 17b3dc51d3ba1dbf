use super::*;
use stock_watcher::core::AlertKind;
use stock_watcher::plugins::{NotificationEvent, Notifier};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_send_message_payload() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .and(body_partial_json(serde_json::json!({
            "chat_id": TEST_CHAT_ID,
            "parse_mode": "HTML",
            "text": "Tom &amp; Jerry &lt;3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": { "message_id": 4242, "chat": { "id": 8186826029i64, "type": "private" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = telegram_notifier(&server)?;
    let message_id = notifier.send_message("Tom & Jerry <3").await?;
    assert_eq!(message_id, 4242);

    Ok(())
}

#[tokio::test]
async fn test_notify_reports_message_id() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": { "message_id": 9 }
        })))
        .mount(&server)
        .await;

    let notifier = telegram_notifier(&server)?;
    let event = NotificationEvent::new(AlertKind::InStock, "Philips Kettle", KETTLE_URL);
    let result = notifier.notify(&event).await?;

    assert!(result.success);
    assert_eq!(result.message_id.as_deref(), Some("9"));

    Ok(())
}

#[tokio::test]
async fn test_api_error_surfaces_description() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let notifier = telegram_notifier(&server)?;
    let err = notifier.send_message("hello").await.unwrap_err();
    assert!(err.to_string().contains("Unauthorized"));

    Ok(())
}

#[tokio::test]
async fn test_latest_chat_uses_last_update_with_a_chat() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(bot_path("getUpdates")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": [
                { "update_id": 1, "message": { "message_id": 1, "chat": { "id": 42, "type": "private", "first_name": "Asha" } } },
                { "update_id": 2, "channel_post": { "message_id": 2, "chat": { "id": -1001, "type": "channel", "title": "Deals" } } },
                { "update_id": 3, "my_chat_member": { "chat": { "id": 5, "type": "group" } } }
            ]
        })))
        .mount(&server)
        .await;

    let notifier = telegram_notifier(&server)?;
    let chat = notifier.latest_chat().await?.expect("a chat is present");

    assert_eq!(chat.id, -1001);
    assert_eq!(chat.chat_type, "channel");
    assert_eq!(chat.name, "Deals");

    Ok(())
}

#[tokio::test]
async fn test_latest_chat_without_updates() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(bot_path("getUpdates")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": []
        })))
        .mount(&server)
        .await;

    let notifier = telegram_notifier(&server)?;
    assert!(notifier.latest_chat().await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_get_updates_does_not_need_chat_id() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(bot_path("getUpdates")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": [{ "update_id": 10, "message": { "chat": { "id": 7, "type": "private" } } }]
        })))
        .mount(&server)
        .await;

    let mut config = telegram_config(&server);
    config.chat_id = None;
    let notifier = TelegramNotifier::new(&config)?;

    let updates = notifier.get_updates().await?;
    assert_eq!(updates.len(), 1);
    assert_eq!(notifier.latest_chat().await?.unwrap().name, "Unknown");

    Ok(())
}
