// Low-stock notifier.
//
// Purpose
// - Turn repeated inventory snapshots into one alert per downward crossing of
//   the low-stock threshold, without duplicates or misses across restarts.
//
// Responsibilities
// - Own the last observed percentage per item and write it through after
//   every fully processed snapshot.
// - Record every alert in the notification log, then request platform delivery
//   when both the preference and the platform permission allow it.
// - Persistence and delivery failures are logged and counted, never raised.

use crate::application::notification_log::NotificationLog;
use crate::application::notification_settings::NotificationSettings;
use crate::application::persisted::{Loaded, read_json, write_json};
use crate::config::StorageKeys;
use crate::core::alert_event::{AlertEvent, now_millis};
use crate::core::inventory_record::InventoryRecord;
use crate::core::ports::{KeyValueStore, NotificationCenter, ScheduledAlert};
use crate::core::threshold::{LowStockCrossing, ThresholdCache, observe_snapshot};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct ThresholdNotifier {
    kv: Arc<dyn KeyValueStore>,
    cache_key: String,
    cache: ThresholdCache,
    log: NotificationLog,
    settings: NotificationSettings,
    center: Arc<dyn NotificationCenter>,
    delivery_delay: Duration,
    persist_failures: u64,
}

impl ThresholdNotifier {
    pub async fn load(
        kv: Arc<dyn KeyValueStore>,
        center: Arc<dyn NotificationCenter>,
        keys: &StorageKeys,
        delivery_delay: Duration,
    ) -> Self {
        let cache = match read_json::<ThresholdCache>(kv.as_ref(), &keys.last_known_percent).await {
            Loaded::Found(cache) => cache,
            Loaded::Missing => ThresholdCache::new(),
            Loaded::Corrupt(error) => {
                tracing::warn!(%error, "threshold cache unreadable, reseeding on next snapshot");
                ThresholdCache::new()
            }
            Loaded::Unavailable(error) => {
                tracing::warn!(%error, "threshold cache unavailable, reseeding on next snapshot");
                ThresholdCache::new()
            }
        };
        let log = NotificationLog::load(kv.clone(), keys.notifications.clone()).await;
        let settings = NotificationSettings::load(
            kv.clone(),
            keys.notifications_enabled.clone(),
            center.clone(),
        )
        .await;
        tracing::info!(tracked = cache.len(), alerts = log.events().len(), "low stock notifier ready");
        Self {
            kv,
            cache_key: keys.last_known_percent.clone(),
            cache,
            log,
            settings,
            center,
            delivery_delay,
            persist_failures: 0,
        }
    }

    /// Processes the whole snapshot, then persists. Returns the alerts it raised.
    ///
    /// Alerts reach the log before the cache is written, and the cache is only
    /// written once every alert is stored. An interrupted observation can repeat
    /// an alert after a restart but never lose one.
    pub async fn observe(&mut self, snapshot: &[InventoryRecord]) -> Vec<AlertEvent> {
        let observation = observe_snapshot(&self.cache, snapshot);

        let mut alerts_stored = true;
        let mut raised = Vec::with_capacity(observation.crossings.len());
        for crossing in observation.crossings {
            tracing::info!(item = %crossing.item_id, percent = crossing.percent, "low stock threshold crossed");
            let event = AlertEvent::new(crossing.title(), crossing.message(), now_millis());
            alerts_stored &= self.log.record(event.clone()).await;
            self.deliver(&crossing);
            raised.push(event);
        }

        self.cache = observation.cache;
        if !alerts_stored {
            tracing::warn!("alert log not saved, threshold cache left unsaved");
            self.persist_failures += 1;
        } else if !write_json(self.kv.as_ref(), &self.cache_key, &self.cache).await {
            self.persist_failures += 1;
        }
        raised
    }

    fn deliver(&self, crossing: &LowStockCrossing) {
        if !self.settings.permits_delivery() {
            tracing::debug!(item = %crossing.item_id, "platform delivery off, alert kept in app only");
            return;
        }
        let alert = ScheduledAlert {
            identifier: format!("lowStock-{}-{}", crossing.name, Uuid::now_v7()),
            title: crossing.title().to_string(),
            body: crossing.message(),
            deliver_after: self.delivery_delay,
        };
        let center = self.center.clone();
        tokio::spawn(async move {
            if let Err(error) = center.schedule(alert).await {
                tracing::warn!(%error, "low stock alert not delivered");
            }
        });
    }

    pub fn cache(&self) -> &ThresholdCache {
        &self.cache
    }

    pub fn log(&self) -> &NotificationLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut NotificationLog {
        &mut self.log
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut NotificationSettings {
        &mut self.settings
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures + self.log.persist_failures() + self.settings.persist_failures()
    }
}

#[cfg(test)]
mod threshold_notifier_tests {
    use super::*;
    use crate::adapters::in_memory::in_memory_key_value_store::InMemoryKeyValueStore;
    use crate::adapters::in_memory::in_memory_notification_center::InMemoryNotificationCenter;
    use crate::core::inventory_record::ItemId;
    use crate::core::ports::AuthorizationStatus;
    use crate::test_support::fixtures::inventory_record::InventoryRecordBuilder;
    use crate::core::ports::KvError;
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Harness {
        kv: Arc<InMemoryKeyValueStore>,
        center: Arc<InMemoryNotificationCenter>,
        keys: StorageKeys,
    }

    impl Harness {
        async fn notifier(&self) -> ThresholdNotifier {
            ThresholdNotifier::load(
                self.kv.clone(),
                self.center.clone(),
                &self.keys,
                Duration::from_secs(3),
            )
            .await
        }

        async fn deliveries(&self) -> Vec<ScheduledAlert> {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            self.center.scheduled().await
        }
    }

    #[fixture]
    fn harness() -> Harness {
        Harness {
            kv: Arc::new(InMemoryKeyValueStore::new()),
            center: Arc::new(InMemoryNotificationCenter::new(AuthorizationStatus::Authorized)),
            keys: StorageKeys::default(),
        }
    }

    fn tape(quantity: i64) -> InventoryRecord {
        InventoryRecordBuilder::new()
            .id("tape")
            .name("Tape")
            .location("Bay 7")
            .quantity(quantity)
            .capacity(100)
            .build()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_only_seed_on_the_first_snapshot(harness: Harness) {
        let mut notifier = harness.notifier().await;
        let raised = notifier.observe(&[tape(5), InventoryRecordBuilder::new().build()]).await;
        assert!(raised.is_empty());
        assert_eq!(notifier.cache().len(), 2);
        assert_eq!(notifier.log().events().len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_alert_once_on_a_downward_crossing(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.settings_mut().set_enabled(true).await;
        notifier.observe(&[tape(50)]).await;
        let raised = notifier.observe(&[tape(19)]).await;
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].title, "Low Stock Alert");
        assert_eq!(raised[0].message, "Tape in Bay 7 is down to 19% of its capacity.");
        assert_eq!(notifier.log().events()[0], raised[0]);

        let deliveries = harness.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].identifier.starts_with("lowStock-Tape-"));
        assert_eq!(deliveries[0].deliver_after, Duration::from_secs(3));

        assert!(notifier.observe(&[tape(19)]).await.is_empty());
        assert!(notifier.observe(&[tape(19)]).await.is_empty());
        assert_eq!(harness.deliveries().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reset_silently_and_alert_again_after_recovery(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.observe(&[tape(50)]).await;
        let counts: Vec<usize> = {
            let mut counts = Vec::new();
            for quantity in [19, 5, 30, 12] {
                counts.push(notifier.observe(&[tape(quantity)]).await.len());
            }
            counts
        };
        assert_eq!(counts, vec![1, 0, 0, 1]);
        assert_eq!(notifier.cache()[&ItemId::from("tape")], 12);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_log_but_not_deliver_when_the_preference_is_off(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.observe(&[tape(50)]).await;
        assert_eq!(notifier.observe(&[tape(10)]).await.len(), 1);
        assert_eq!(notifier.log().unread_count(), 4);
        assert!(harness.deliveries().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_log_but_not_deliver_when_the_platform_denies(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.settings_mut().set_enabled(true).await;
        harness.center.set_status(AuthorizationStatus::Denied).await;
        notifier.settings_mut().refresh_authorization_status().await;
        notifier.observe(&[tape(50)]).await;
        assert_eq!(notifier.observe(&[tape(10)]).await.len(), 1);
        assert!(harness.deliveries().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_swallow_delivery_failures(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.settings_mut().set_enabled(true).await;
        harness.center.set_failing(true);
        notifier.observe(&[tape(50)]).await;
        assert_eq!(notifier.observe(&[tape(10)]).await.len(), 1);
        assert!(harness.deliveries().await.is_empty());
        assert_eq!(notifier.log().events().len(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_alert_again_after_a_restart(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.observe(&[tape(50)]).await;
        assert_eq!(notifier.observe(&[tape(15)]).await.len(), 1);
        drop(notifier);

        let mut restarted = harness.notifier().await;
        assert_eq!(restarted.cache()[&ItemId::from("tape")], 15);
        assert_eq!(restarted.log().events().len(), 4);
        assert!(restarted.observe(&[tape(15)]).await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_detecting_when_persistence_fails(harness: Harness) {
        let mut notifier = harness.notifier().await;
        notifier.observe(&[tape(50)]).await;
        harness.kv.set_offline(true);
        assert_eq!(notifier.observe(&[tape(15)]).await.len(), 1);
        assert!(notifier.observe(&[tape(15)]).await.is_empty());
        assert_eq!(notifier.persist_failures(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_prune_items_that_disappear(harness: Harness) {
        let mut notifier = harness.notifier().await;
        let boxes = InventoryRecordBuilder::new().build();
        notifier.observe(&[tape(50), boxes.clone()]).await;
        notifier.observe(&[boxes]).await;
        assert!(!notifier.cache().contains_key(&ItemId::from("tape")));
        assert_eq!(
            harness.kv.get(&harness.keys.last_known_percent).await.unwrap(),
            Some(br#"{"item-fixed-0001":50}"#.to_vec())
        );
    }

    #[derive(Clone, Copy)]
    enum Interruption {
        CrashAfterLogWrite,
        CrashAfterCacheWrite,
        LogWritesRejected,
    }

    /// Cuts writes off the way a crash or a failing backend would.
    struct InterruptedStore {
        inner: Arc<InMemoryKeyValueStore>,
        keys: StorageKeys,
        interruption: Interruption,
        armed: AtomicBool,
        cut: AtomicBool,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for InterruptedStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
            let armed = self.armed.load(Ordering::SeqCst);
            let rejected = armed
                && matches!(self.interruption, Interruption::LogWritesRejected)
                && key == self.keys.notifications;
            if self.cut.load(Ordering::SeqCst) || rejected {
                return Err(KvError::Backend("write interrupted".into()));
            }
            self.inner.set(key, value).await?;
            let crash_key = match self.interruption {
                Interruption::CrashAfterLogWrite => Some(&self.keys.notifications),
                Interruption::CrashAfterCacheWrite => Some(&self.keys.last_known_percent),
                Interruption::LogWritesRejected => None,
            };
            if armed && crash_key.is_some_and(|k| k == key) {
                self.cut.store(true, Ordering::SeqCst);
            }
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), KvError> {
            self.inner.delete(key).await
        }
    }

    fn low_stock_alerts(notifier: &ThresholdNotifier) -> usize {
        notifier
            .log()
            .events()
            .iter()
            .filter(|e| e.title == "Low Stock Alert")
            .count()
    }

    #[rstest]
    #[case(Interruption::CrashAfterLogWrite)]
    #[case(Interruption::CrashAfterCacheWrite)]
    #[case(Interruption::LogWritesRejected)]
    #[tokio::test]
    async fn it_should_never_lose_an_alert_when_writes_are_interrupted(
        harness: Harness,
        #[case] interruption: Interruption,
    ) {
        let store = Arc::new(InterruptedStore {
            inner: harness.kv.clone(),
            keys: harness.keys.clone(),
            interruption,
            armed: AtomicBool::new(false),
            cut: AtomicBool::new(false),
        });
        let mut notifier = ThresholdNotifier::load(
            store.clone(),
            harness.center.clone(),
            &harness.keys,
            Duration::ZERO,
        )
        .await;
        notifier.observe(&[tape(50)]).await;
        store.armed.store(true, Ordering::SeqCst);
        assert_eq!(notifier.observe(&[tape(15)]).await.len(), 1);
        drop(notifier);

        let mut restarted = harness.notifier().await;
        let stored = low_stock_alerts(&restarted);
        let raised_again = restarted.observe(&[tape(15)]).await.len();
        assert!(stored + raised_again >= 1);
        assert_eq!(low_stock_alerts(&restarted), stored + raised_again);
    }
}
