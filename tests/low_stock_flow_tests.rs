// End to end low stock flow through the composed client.
//
// - Refreshes reach the notifier through the store's refresh route.
// - A drop from 50% to 19% raises exactly one alert, logged and delivered.

mod fixtures;

use fixtures::item;
use inventory_sync::adapters::in_memory::in_memory_authenticator::InMemoryAuthenticator;
use inventory_sync::adapters::in_memory::in_memory_gateway::InMemoryInventoryGateway;
use inventory_sync::adapters::in_memory::in_memory_key_value_store::InMemoryKeyValueStore;
use inventory_sync::adapters::in_memory::in_memory_notification_center::InMemoryNotificationCenter;
use inventory_sync::config::ClientConfig;
use inventory_sync::core::ports::AuthorizationStatus;
use inventory_sync::shell::InventoryClient;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

struct Setup {
    gateway: Arc<InMemoryInventoryGateway>,
    kv: Arc<InMemoryKeyValueStore>,
    center: Arc<InMemoryNotificationCenter>,
    config: ClientConfig,
}

impl Setup {
    fn new() -> Self {
        Self {
            gateway: Arc::new(InMemoryInventoryGateway::with_items(vec![
                item("tape", "Tape", 50),
                item("boxes", "Boxes", 90),
            ])),
            kv: Arc::new(InMemoryKeyValueStore::new()),
            center: Arc::new(InMemoryNotificationCenter::new(AuthorizationStatus::Authorized)),
            config: ClientConfig {
                alert_delay: Duration::ZERO,
                ..ClientConfig::default()
            },
        }
    }

    async fn start(&self) -> InventoryClient<InMemoryAuthenticator> {
        InventoryClient::start(
            &self.config,
            self.gateway.clone(),
            Arc::new(InMemoryAuthenticator::new()),
            self.kv.clone(),
            self.center.clone(),
        )
        .await
    }
}

#[rstest]
#[tokio::test]
async fn it_should_alert_once_when_a_refresh_crosses_the_threshold() {
    let setup = Setup::new();
    let client = setup.start().await;
    client.notifier.lock().await.settings_mut().set_enabled(true).await;

    client.store.load().unwrap().outcome().await.unwrap();

    let tape = client.store.snapshot().into_iter().find(|i| i.name == "Tape").unwrap();
    let mut low = tape.clone();
    low.quantity = 19;
    client.store.update(low, tape).await.unwrap().outcome().await.unwrap();
    client.store.load().unwrap().outcome().await.unwrap();
    client.store.load().unwrap().outcome().await.unwrap();

    let notifier = client.notifier.clone();
    client.shutdown().await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    let notifier = notifier.lock().await;
    let alerts: Vec<_> = notifier
        .log()
        .events()
        .iter()
        .filter(|e| e.title == "Low Stock Alert")
        .cloned()
        .collect();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message.contains("19%"));

    let delivered = setup.center.scheduled().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].body, alerts[0].message);
}

#[rstest]
#[tokio::test]
async fn it_should_not_repeat_the_alert_after_a_restart() {
    let setup = Setup::new();
    let client = setup.start().await;
    client.store.load().unwrap().outcome().await.unwrap();
    let tape = client.store.snapshot().into_iter().find(|i| i.name == "Tape").unwrap();
    let mut low = tape.clone();
    low.quantity = 10;
    client.store.update(low, tape).await.unwrap().outcome().await.unwrap();
    client.store.load().unwrap().outcome().await.unwrap();
    client.shutdown().await;

    let restarted = setup.start().await;
    restarted.store.load().unwrap().outcome().await.unwrap();
    let notifier = restarted.notifier.clone();
    restarted.shutdown().await;

    let notifier = notifier.lock().await;
    let alerts = notifier
        .log()
        .events()
        .iter()
        .filter(|e| e.title == "Low Stock Alert")
        .count();
    assert_eq!(alerts, 1);
    assert_eq!(notifier.log().events().len(), 4);
}

#[rstest]
#[tokio::test]
async fn it_should_shut_down_while_other_store_handles_are_alive() {
    let setup = Setup::new();
    let client = setup.start().await;
    let ui_store = client.store.clone();
    client.store.load().unwrap().outcome().await.unwrap();

    let stopped = tokio::time::timeout(Duration::from_secs(2), client.shutdown()).await;

    assert!(stopped.is_ok());
    assert!(ui_store.load().is_err());
    assert_eq!(ui_store.snapshot().len(), 2);
}
