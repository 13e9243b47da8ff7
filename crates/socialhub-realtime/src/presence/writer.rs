//! Background presence writer.
//!
//! Drains the tracker's queue one record at a time. The store discards a
//! record whose version is not newer than what it holds, so a slow
//! "online" write can never land on top of a later "offline" one.
//! Once an offline record is stored the tracker may forget that user.

use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info};

use socialhub_database::{PresenceRecord, PresenceStore};

use super::tracker::PresenceTracker;

/// Runs until shutdown is signalled, then drains whatever is queued.
///
/// `tracker` is weak because the tracker owns the sending half of `queue`.
pub async fn run_presence_writer(
    store: Arc<dyn PresenceStore>,
    mut queue: mpsc::UnboundedReceiver<PresenceRecord>,
    tracker: Weak<PresenceTracker>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            record = queue.recv() => match record {
                Some(record) => persist(store.as_ref(), &tracker, &record).await,
                None => break,
            },
            _ = shutdown.recv() => {
                while let Ok(record) = queue.try_recv() {
                    persist(store.as_ref(), &tracker, &record).await;
                }
                break;
            }
        }
    }

    info!("Presence writer stopped");
}

async fn persist(
    store: &dyn PresenceStore,
    tracker: &Weak<PresenceTracker>,
    record: &PresenceRecord,
) {
    match store.save_presence(record).await {
        Ok(true) => debug!(
            user_id = %record.user_id,
            online = record.is_online,
            version = record.version,
            "Presence persisted"
        ),
        Ok(false) => debug!(
            user_id = %record.user_id,
            version = record.version,
            "Stale presence write discarded"
        ),
        Err(e) => {
            error!(
                user_id = %record.user_id,
                online = record.is_online,
                error = %e,
                "Failed to persist presence"
            );
            return;
        }
    }

    // The store now holds this record or a newer one.
    if !record.is_online {
        if let Some(tracker) = tracker.upgrade() {
            tracker.evict_offline(&record.user_id, record.version);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use socialhub_core::types::UserId;
    use socialhub_database::memory::MemoryPresenceStore;

    use super::*;

    fn record(version: u64, is_online: bool) -> PresenceRecord {
        PresenceRecord {
            user_id: UserId::parse("u1").unwrap(),
            is_online,
            last_seen: Utc::now(),
            version,
        }
    }

    #[tokio::test]
    async fn test_drains_queue_on_shutdown() {
        let store = Arc::new(MemoryPresenceStore::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        tx.send(record(1, true)).unwrap();
        tx.send(record(2, false)).unwrap();
        shutdown_tx.send(()).unwrap();

        run_presence_writer(store.clone(), rx, Weak::new(), shutdown_rx).await;

        let stored = store
            .load_presence(&UserId::parse("u1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_online);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_writer() {
        let store = Arc::new(MemoryPresenceStore::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let writer = tokio::spawn(run_presence_writer(store.clone(), rx, Weak::new(), shutdown_rx));

        store.set_failing(true);
        tx.send(record(1, true)).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(store.is_empty().await);

        store.set_failing(false);
        tx.send(record(2, false)).unwrap();
        drop(tx);
        writer.await.unwrap();

        let stored = store
            .load_presence(&UserId::parse("u1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_persisted_offline_state_is_evicted() {
        let store = Arc::new(MemoryPresenceStore::new());
        let (tracker, rx) = PresenceTracker::new();
        let tracker = Arc::new(tracker);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let u1 = UserId::parse("u1").unwrap();
        let u2 = UserId::parse("u2").unwrap();

        tracker.on_transition(&u1, true);
        tracker.on_transition(&u1, false);
        tracker.on_transition(&u2, true);
        shutdown_tx.send(()).unwrap();

        run_presence_writer(store.clone(), rx, Arc::downgrade(&tracker), shutdown_rx).await;

        assert!(tracker.get(&u1).is_none());
        assert!(tracker.is_online(&u2));
        assert_eq!(tracker.tracked_count(), 1);
        assert!(!store.load_presence(&u1).await.unwrap().unwrap().is_online);
    }

    #[tokio::test]
    async fn test_failed_offline_write_keeps_state() {
        let store = Arc::new(MemoryPresenceStore::new());
        store.set_failing(true);
        let (tracker, rx) = PresenceTracker::new();
        let tracker = Arc::new(tracker);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let u1 = UserId::parse("u1").unwrap();

        tracker.on_transition(&u1, true);
        tracker.on_transition(&u1, false);
        shutdown_tx.send(()).unwrap();

        run_presence_writer(store.clone(), rx, Arc::downgrade(&tracker), shutdown_rx).await;

        assert!(!tracker.get(&u1).unwrap().is_online);
    }
}
