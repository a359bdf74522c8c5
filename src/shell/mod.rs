// Composition root for the inventory client.
//
// Responsibilities
// - Take concrete adapters and the client config.
// - Start the item store with its refresh route into the low-stock worker.
// - Load the notifier and the sign-in session over the shared key-value store.

pub mod workers;

use crate::application::item_store::OptimisticItemStore;
use crate::application::session::AuthSession;
use crate::application::threshold_notifier::ThresholdNotifier;
use crate::config::ClientConfig;
use crate::core::ports::{Authenticator, InventoryGateway, KeyValueStore, NotificationCenter};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

pub struct InventoryClient<TAuthenticator>
where
    TAuthenticator: Authenticator + 'static,
{
    pub store: OptimisticItemStore,
    pub notifier: Arc<Mutex<ThresholdNotifier>>,
    pub session: AuthSession<TAuthenticator>,
    low_stock_worker: JoinHandle<()>,
}

impl<TAuthenticator> InventoryClient<TAuthenticator>
where
    TAuthenticator: Authenticator + 'static,
{
    pub async fn start<G>(
        config: &ClientConfig,
        gateway: Arc<G>,
        authenticator: Arc<TAuthenticator>,
        kv: Arc<dyn KeyValueStore>,
        center: Arc<dyn NotificationCenter>,
    ) -> Self
    where
        G: InventoryGateway + 'static,
    {
        let keys = config.storage_keys();
        let notifier = ThresholdNotifier::load(kv.clone(), center, &keys, config.alert_delay).await;
        let notifier = Arc::new(Mutex::new(notifier));

        let (refresh_route, refreshes) = mpsc::unbounded_channel();
        let store = OptimisticItemStore::spawn_with_refresh_route(gateway, Some(refresh_route));
        let low_stock_worker =
            tokio::spawn(workers::run_low_stock_worker(refreshes, notifier.clone()));

        let session = AuthSession::new(authenticator, kv, keys.access_token);
        tracing::info!(
            api = %config.api_base_url,
            namespace = %config.storage_namespace,
            "inventory client started"
        );
        Self {
            store,
            notifier,
            session,
            low_stock_worker,
        }
    }

    /// Closes the store for every handle, lets in-flight calls settle, and waits
    /// until every snapshot it routed has been observed.
    pub async fn shutdown(self) {
        self.store.close();
        if let Err(error) = self.low_stock_worker.await {
            tracing::warn!(%error, "low stock worker ended abnormally");
        }
    }
}
