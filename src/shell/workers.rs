// Background workers spawned by the composition root.

use crate::application::threshold_notifier::ThresholdNotifier;
use crate::core::inventory_record::InventoryRecord;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Feeds every successful inventory refresh to the notifier, one snapshot at a time.
/// Stops once the store that owns the sending side is gone.
pub async fn run_low_stock_worker(
    mut refreshes: mpsc::UnboundedReceiver<Vec<InventoryRecord>>,
    notifier: Arc<Mutex<ThresholdNotifier>>,
) {
    while let Some(snapshot) = refreshes.recv().await {
        let raised = notifier.lock().await.observe(&snapshot).await;
        if !raised.is_empty() {
            tracing::info!(count = raised.len(), "low stock alerts raised");
        }
    }
    tracing::debug!("low stock worker stopped");
}
