use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use inventory_sync::adapters::file::json_file_store::JsonFileStore;
use inventory_sync::adapters::in_memory::in_memory_authenticator::InMemoryAuthenticator;
use inventory_sync::adapters::in_memory::in_memory_gateway::InMemoryInventoryGateway;
use inventory_sync::adapters::in_memory::in_memory_notification_center::InMemoryNotificationCenter;
use inventory_sync::config::ClientConfig;
use inventory_sync::core::inventory_record::{InventoryRecord, ItemDraft};
use inventory_sync::core::ports::AuthorizationStatus;
use inventory_sync::shell::InventoryClient;

fn demo_inventory() -> Vec<InventoryRecord> {
    [
        ("Boxes", 17, 100, "Bay 4", "shippingbox"),
        ("Tape", 29, 100, "Bay 7", "scissors"),
        ("Nails", 103, 500, "Bay 4", "hammer"),
        ("Paper Cups", 51, 200, "Bay 1", "cup.and.saucer"),
        ("Apple Magic Keyboard", 6, 25, "Bay 2", "keyboard"),
    ]
    .into_iter()
    .map(|(name, quantity, capacity, location, symbol)| {
        ItemDraft::new(name, quantity, capacity)
            .location(location)
            .symbol_name(symbol)
            .into_provisional()
    })
    .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = ClientConfig::from_env()?;
    let kv = Arc::new(
        JsonFileStore::open(&config.storage_path)
            .await
            .with_context(|| format!("opening {}", config.storage_path.display()))?,
    );

    // In-memory backend for now
    let gateway = Arc::new(InMemoryInventoryGateway::with_items(demo_inventory()));
    let center = Arc::new(InMemoryNotificationCenter::new(AuthorizationStatus::NotDetermined));
    let authenticator = Arc::new(InMemoryAuthenticator::new());

    let client = InventoryClient::start(&config, gateway, authenticator, kv, center.clone()).await;

    client.session.register("demo", "demo-password").await?;
    client.session.login("demo", "demo-password").await?;
    client.notifier.lock().await.settings_mut().set_enabled(true).await;

    let items = client.store.load()?.outcome().await?;
    tracing::info!(count = items.len(), "inventory loaded");

    if let Some(tape) = items.iter().find(|item| item.name == "Tape").cloned() {
        let mut running_low = tape.clone();
        running_low.quantity = 12;
        client.store.update(running_low, tape).await?.outcome().await?;
    }
    client.store.load()?.outcome().await?;

    let notifier = client.notifier.clone();
    client.shutdown().await;

    let notifier = notifier.lock().await;
    for event in notifier.log().display_events() {
        let marker = if event.is_read { " " } else { "*" };
        println!("{marker} {}: {}", event.title, event.message);
    }
    for alert in center.scheduled().await {
        tracing::info!(identifier = %alert.identifier, "platform alert scheduled");
    }
    if notifier.persist_failures() > 0 {
        tracing::warn!(failures = notifier.persist_failures(), "some state was not saved");
    }
    Ok(())
}
