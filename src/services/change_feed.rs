//! Table-keyed change notifications. Writers in this process publish
//! directly; the background poller covers writes made elsewhere.

use crate::database::DbPool;
use crate::entities::{article_entity as articles, booking_entity as bookings, field_entity as fields};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QuerySelect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WatchedTable {
    Bookings,
    Fields,
    Articles,
    Settings,
    Profiles,
}

impl WatchedTable {
    pub const ALL: [WatchedTable; 5] = [
        WatchedTable::Bookings,
        WatchedTable::Fields,
        WatchedTable::Articles,
        WatchedTable::Settings,
        WatchedTable::Profiles,
    ];

    fn refresh(self) -> ChangeEvent {
        ChangeEvent {
            table: self,
            kind: ChangeKind::Refresh,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Something changed; refetch.
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChangeEvent {
    pub table: WatchedTable,
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, table: WatchedTable, kind: ChangeKind) {
        let event = ChangeEvent {
            table,
            kind,
            at: Utc::now(),
        };
        // no subscribers is not an error
        if let Ok(n) = self.sender.send(event) {
            log::debug!("Published {table:?}/{kind:?} to {n} subscriber(s)");
        }
    }

    /// Stream of events, optionally limited to one table. A subscriber that
    /// falls behind skips what it missed and gets a `Refresh` instead, one
    /// per table when it watches all of them.
    pub fn subscribe(
        &self,
        table: Option<WatchedTable>,
    ) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        let events = BroadcastStream::new(self.sender.subscribe()).map(move |received| match received {
            Ok(event) if table.is_none_or(|t| t == event.table) => vec![event],
            Ok(_) => Vec::new(),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                log::warn!("Change subscriber lagged, skipped {skipped} event(s)");
                match table {
                    Some(t) => vec![t.refresh()],
                    None => WatchedTable::ALL.into_iter().map(WatchedTable::refresh).collect(),
                }
            }
        });
        futures_util::StreamExt::flat_map(events, futures_util::stream::iter)
    }

    /// Runs `callback` for every event on `table` until the feed is dropped.
    pub fn on_change<F>(&self, table: WatchedTable, callback: F) -> JoinHandle<()>
    where
        F: Fn(ChangeEvent) + Send + 'static,
    {
        let mut stream = Box::pin(self.subscribe(Some(table)));
        tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                callback(event);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Row count plus latest update time. Any insert, update or delete moves
/// at least one of the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromQueryResult)]
pub struct TableFingerprint {
    pub row_count: i64,
    pub last_change: Option<DateTime<Utc>>,
}

async fn fingerprint<E>(pool: &DatabaseConnection, updated_at: E::Column) -> AppResult<TableFingerprint>
where
    E: EntityTrait,
    E::Column: ColumnTrait,
{
    let fp = E::find()
        .select_only()
        .column_as(Expr::val(1).count(), "row_count")
        .column_as(Expr::col(updated_at).max(), "last_change")
        .into_model::<TableFingerprint>()
        .one(pool)
        .await?
        .unwrap_or_default();
    Ok(fp)
}

/// Polls table fingerprints and publishes `Refresh` when one moves.
pub struct ChangePoller {
    pool: DbPool,
    feed: ChangeFeed,
    seen: HashMap<WatchedTable, TableFingerprint>,
}

impl ChangePoller {
    pub const TABLES: [WatchedTable; 3] = [
        WatchedTable::Bookings,
        WatchedTable::Fields,
        WatchedTable::Articles,
    ];

    pub fn new(pool: DbPool, feed: ChangeFeed) -> Self {
        Self {
            pool,
            feed,
            seen: HashMap::new(),
        }
    }

    async fn read(&self, table: WatchedTable) -> AppResult<TableFingerprint> {
        match table {
            WatchedTable::Bookings => fingerprint::<bookings::Entity>(&self.pool, bookings::Column::UpdatedAt).await,
            WatchedTable::Fields => fingerprint::<fields::Entity>(&self.pool, fields::Column::UpdatedAt).await,
            WatchedTable::Articles => fingerprint::<articles::Entity>(&self.pool, articles::Column::UpdatedAt).await,
            WatchedTable::Settings | WatchedTable::Profiles => Ok(TableFingerprint::default()),
        }
    }

    /// One pass over all watched tables. The first observation of a table
    /// only records its fingerprint. Returns the tables that changed.
    pub async fn poll_once(&mut self) -> AppResult<Vec<WatchedTable>> {
        let mut changed = Vec::new();
        for table in Self::TABLES {
            let current = self.read(table).await?;
            match self.seen.insert(table, current) {
                Some(previous) if previous != current => {
                    self.feed.publish(table, ChangeKind::Refresh);
                    changed.push(table);
                }
                _ => {}
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn fp_row(count: i64, secs: i64) -> BTreeMap<&'static str, Value> {
        let ts = Utc.timestamp_opt(secs, 0).unwrap();
        BTreeMap::from([
            ("row_count", Value::BigInt(Some(count))),
            ("last_change", Value::ChronoDateTimeUtc(Some(Box::new(ts)))),
        ])
    }

    #[tokio::test]
    async fn test_subscribe_filters_by_table() {
        let feed = ChangeFeed::new(16);
        let mut bookings_only = Box::pin(feed.subscribe(Some(WatchedTable::Bookings)));

        feed.publish(WatchedTable::Fields, ChangeKind::Update);
        feed.publish(WatchedTable::Bookings, ChangeKind::Insert);

        let event = bookings_only.next().await.unwrap();
        assert_eq!(event.table, WatchedTable::Bookings);
        assert_eq!(event.kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_gets_refresh() {
        let feed = ChangeFeed::new(2);
        let mut stream = Box::pin(feed.subscribe(Some(WatchedTable::Bookings)));
        for _ in 0..5 {
            feed.publish(WatchedTable::Bookings, ChangeKind::Insert);
        }

        let first = stream.next().await.unwrap();
        assert_eq!(first.kind, ChangeKind::Refresh);
    }

    #[tokio::test]
    async fn test_lagging_unfiltered_subscriber_refreshes_every_table() {
        let feed = ChangeFeed::new(2);
        let stream = Box::pin(feed.subscribe(None));
        for _ in 0..5 {
            feed.publish(WatchedTable::Bookings, ChangeKind::Insert);
        }

        let events: Vec<ChangeEvent> = stream.take(WatchedTable::ALL.len() + 2).collect().await;
        let refreshed: Vec<WatchedTable> = events
            .iter()
            .filter(|e| e.kind == ChangeKind::Refresh)
            .map(|e| e.table)
            .collect();
        assert_eq!(refreshed, WatchedTable::ALL.to_vec());
        assert_eq!(
            events.iter().filter(|e| e.kind == ChangeKind::Insert).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_on_change_invokes_callback() {
        let feed = ChangeFeed::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handle = feed.on_change(WatchedTable::Articles, move |e| {
            sink.lock().unwrap().push(e.kind);
        });

        feed.publish(WatchedTable::Articles, ChangeKind::Delete);
        feed.publish(WatchedTable::Bookings, ChangeKind::Insert);

        for _ in 0..50 {
            if !seen.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(*seen.lock().unwrap(), vec![ChangeKind::Delete]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let feed = ChangeFeed::new(4);
        feed.publish(WatchedTable::Settings, ChangeKind::Update);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_poller_publishes_only_on_change() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fp_row(3, 100)]])
            .append_query_results([[fp_row(1, 100)]])
            .append_query_results([[fp_row(0, 0)]])
            // second pass: one new booking
            .append_query_results([[fp_row(4, 200)]])
            .append_query_results([[fp_row(1, 100)]])
            .append_query_results([[fp_row(0, 0)]])
            .into_connection()
            .into();

        let feed = ChangeFeed::new(16);
        let mut events = Box::pin(feed.subscribe(None));
        let mut poller = ChangePoller::new(db, feed.clone());

        assert!(poller.poll_once().await.unwrap().is_empty());
        assert_eq!(poller.poll_once().await.unwrap(), vec![WatchedTable::Bookings]);

        let event = events.next().await.unwrap();
        assert_eq!(event.table, WatchedTable::Bookings);
        assert_eq!(event.kind, ChangeKind::Refresh);
    }
}
