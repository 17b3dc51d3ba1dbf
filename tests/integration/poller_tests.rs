use super::*;
use stock_watcher::core::{AlertKind, Availability};
use stock_watcher::plugins::LogNotifier;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

const NO_DELIVERY: &str = r#"<div class="cp-ship-opt">Delivery Not Available at your pincode</div>
    <button>Buy Now</button>"#;
const DELIVERY_OK_IN_STOCK: &str = r#"<div class="cp-ship-opt">Delivery by Tomorrow</div>
    <button>Buy Now</button>"#;

fn sent() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "ok": true,
        "result": { "message_id": 1 }
    }))
}

#[tokio::test]
async fn test_delivery_gating_alerts() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .and(body_string_contains("DELIVERY NOT AVAILABLE"))
        .respond_with(sent())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .and(body_string_contains("DELIVERY NOW AVAILABLE"))
        .respond_with(sent())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .and(body_string_contains("STOCK ALERT"))
        .respond_with(sent())
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, manager) = create_test_products(&[(KETTLE_URL, "Philips Kettle")])?;
    let fetcher = ScriptedFetcher::new().script(
        KETTLE_URL,
        &[Some(NO_DELIVERY), Some(NO_DELIVERY), Some(DELIVERY_OK_IN_STOCK)],
    );
    let mut poller = create_test_poller(fetcher, Arc::new(telegram_notifier(&server)?), manager);

    let first = poller.check_once().await?;
    assert_eq!(first.reports[0].availability, Some(Availability::DeliveryUnavailable));
    assert_eq!(first.reports[0].alerts, vec![AlertKind::DeliveryUnavailable]);

    // Stock is not evaluated while delivery is blocked
    let second = poller.check_once().await?;
    assert!(second.reports[0].alerts.is_empty());
    assert!(!poller.state(KETTLE_URL).unwrap().notified);

    let third = poller.check_once().await?;
    assert_eq!(
        third.reports[0].alerts,
        vec![AlertKind::DeliveryRestored, AlertKind::InStock]
    );
    assert_eq!(third.alerts_sent(), 2);

    Ok(())
}

#[tokio::test]
async fn test_restock_after_sellout_alerts_again() -> anyhow::Result<()> {
    let (_dir, manager) = create_test_products(&[(KETTLE_URL, "Philips Kettle")])?;
    let fetcher = ScriptedFetcher::new().script(
        KETTLE_URL,
        &[
            Some("<button>Buy Now</button>"),
            Some("<span>Out of Stock</span>"),
            Some("<button>Add to Bag</button>"),
        ],
    );
    let mut poller = create_test_poller(fetcher, Arc::new(LogNotifier::new()), manager);

    let alerts: Vec<usize> = {
        let mut counts = Vec::new();
        for _ in 0..3 {
            counts.push(poller.check_once().await?.alerts_sent());
        }
        counts
    };
    assert_eq!(alerts, vec![1, 0, 1]);

    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_skips_item_and_keeps_state() -> anyhow::Result<()> {
    let (_dir, manager) = create_test_products(&[
        (KETTLE_URL, "Philips Kettle"),
        (IPHONE_URL, "iPhone 17"),
    ])?;
    let fetcher = ScriptedFetcher::new()
        .script(KETTLE_URL, &[Some("<button>Buy Now</button>"), None, Some("<button>Buy Now</button>")])
        .script(IPHONE_URL, &[None, Some("<span>Notify Me</span>"), None]);
    let mut poller = create_test_poller(fetcher, Arc::new(LogNotifier::new()), manager);

    let first = poller.check_once().await?;
    assert_eq!(first.checked(), 1);
    assert_eq!(first.failed(), 1);
    assert!(poller.state(IPHONE_URL).is_none());

    let second = poller.check_once().await?;
    assert!(!second.reports[0].success());
    assert!(poller.state(KETTLE_URL).unwrap().notified);

    // Still notified, so the kettle does not alert a second time
    let third = poller.check_once().await?;
    assert_eq!(third.alerts_sent(), 0);

    Ok(())
}

#[tokio::test]
async fn test_telegram_failure_is_not_retried() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .and(body_partial_json(serde_json::json!({ "chat_id": TEST_CHAT_ID })))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, manager) = create_test_products(&[(KETTLE_URL, "Philips Kettle")])?;
    let fetcher = ScriptedFetcher::new().script(
        KETTLE_URL,
        &[Some("<button>Buy Now</button>"), Some("<button>Buy Now</button>")],
    );
    let mut poller = create_test_poller(fetcher, Arc::new(telegram_notifier(&server)?), manager);

    let first = poller.check_once().await?;
    assert_eq!(first.reports[0].notification_failures, 1);
    assert_eq!(first.alerts_sent(), 0);

    let second = poller.check_once().await?;
    assert!(second.reports[0].alerts.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_css_item_reads_selected_element() -> anyhow::Result<()> {
    let (dir, manager) = create_test_products(&[])?;
    std::fs::write(
        dir.path().join("items.json"),
        format!(
            r##"[{{
                "name": "Kettle",
                "url": "{}",
                "check_type": "css",
                "css_selector": "#stock-status",
                "available_indicators": ["In Stock"],
                "unavailable_indicators": ["Sold Out"]
            }}]"##,
            KETTLE_URL
        ),
    )?;
    let fetcher = ScriptedFetcher::new().script(
        KETTLE_URL,
        &[Some(r#"<p>Sold Out elsewhere</p><div id="stock-status">In stock</div>"#)],
    );
    let mut poller = create_test_poller(fetcher, Arc::new(LogNotifier::new()), manager);

    let summary = poller.check_once().await?;
    assert_eq!(
        summary.reports[0].availability,
        Some(Availability::Available("In Stock".to_string()))
    );

    Ok(())
}
