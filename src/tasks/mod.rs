//! Background tasks. Call `spawn_all` once during startup.

use crate::services::{ChangeFeed, ChangePoller, WatchedTable};
use std::time::Duration;

/// Spawns the fingerprint poller and the booking change log.
///
/// The poller catches writes that bypass this process (other instances,
/// manual SQL); in-process writes publish on their own.
pub fn spawn_all(mut poller: ChangePoller, change_feed: &ChangeFeed, poll_interval: Duration) {
    tokio::spawn(async move {
        loop {
            match poller.poll_once().await {
                Ok(changed) if !changed.is_empty() => {
                    log::info!("Detected external changes in {changed:?}")
                }
                Ok(_) => {}
                Err(e) => log::error!("Failed to poll table fingerprints: {e:?}"),
            }
            tokio::time::sleep(poll_interval).await;
        }
    });

    change_feed.on_change(WatchedTable::Bookings, |event| {
        log::info!("Bookings changed: {:?} at {}", event.kind, event.at);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbPool;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_spawn_all_registers_booking_listener() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres).into_connection().into();
        let feed = ChangeFeed::new(4);

        spawn_all(ChangePoller::new(db, feed.clone()), &feed, Duration::from_secs(3600));

        assert_eq!(feed.subscriber_count(), 1);
    }
}
