use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::database::DbPool;
use crate::draw::{BookingId, BookingLedger, DrawError, DrawRecord, Prize};
use crate::entities::{booking_reservation_entity as reservations, draw_record_entity as records};

/// 基于数据库的预订号账本
///
/// - 占用: INSERT ... ON CONFLICT (booking_id) DO NOTHING, 影响行数为 0 即已被使用
/// - 记录: draw_records.booking_id 唯一, 重复写入返回已有记录
#[derive(Clone)]
pub struct DatabaseLedger {
    pool: DbPool,
}

impl DatabaseLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_by_booking(&self, booking_id: &BookingId) -> Result<Option<DrawRecord>, DrawError> {
        let found = records::Entity::find()
            .filter(records::Column::BookingId.eq(booking_id.as_str()))
            .one(self.pool.as_ref())
            .await
            .map_err(DrawError::persistence)?;
        Ok(found.map(Into::into))
    }
}

impl From<records::Model> for DrawRecord {
    fn from(m: records::Model) -> Self {
        DrawRecord {
            id: m.id,
            booking_id: m.booking_id,
            prize_id: m.prize_id,
            prize_label: m.prize_label,
            timestamp: m.created_at,
        }
    }
}

#[async_trait]
impl BookingLedger for DatabaseLedger {
    async fn is_consumed(&self, booking_id: &BookingId) -> Result<bool, DrawError> {
        let found = reservations::Entity::find_by_id(booking_id.as_str().to_string())
            .one(self.pool.as_ref())
            .await
            .map_err(DrawError::persistence)?;
        Ok(found.is_some())
    }

    async fn reserve(&self, booking_id: &BookingId) -> Result<(), DrawError> {
        let inserted = reservations::Entity::insert(reservations::ActiveModel {
            booking_id: Set(booking_id.as_str().to_string()),
            reserved_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(reservations::Column::BookingId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.pool.as_ref())
        .await
        .map_err(DrawError::persistence)?;

        if inserted == 0 {
            return Err(DrawError::AlreadyConsumed(booking_id.to_string()));
        }
        Ok(())
    }

    async fn record(
        &self,
        booking_id: &BookingId,
        prize: &Prize,
        timestamp: DateTime<Utc>,
    ) -> Result<DrawRecord, DrawError> {
        let record = DrawRecord::new(booking_id, prize, timestamp);
        let inserted = records::Entity::insert(records::ActiveModel {
            id: Set(record.id.clone()),
            booking_id: Set(record.booking_id.clone()),
            prize_id: Set(record.prize_id.clone()),
            prize_label: Set(record.prize_label.clone()),
            created_at: Set(record.timestamp),
        })
        .on_conflict(
            OnConflict::column(records::Column::BookingId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.pool.as_ref())
        .await
        .map_err(DrawError::persistence)?;

        if inserted == 0 {
            // 幂等: 该预订号已有记录, 返回第一次写入的结果
            return self.find_by_booking(booking_id).await?.ok_or_else(|| {
                DrawError::PersistenceFailure(format!("draw record for {booking_id} not written"))
            });
        }
        Ok(record)
    }

    async fn list_records(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<DrawRecord>, u64), DrawError> {
        let total = records::Entity::find()
            .count(self.pool.as_ref())
            .await
            .map_err(DrawError::persistence)?;

        let items = records::Entity::find()
            .order_by_desc(records::Column::CreatedAt)
            .order_by_desc(records::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.pool.as_ref())
            .await
            .map_err(DrawError::persistence)?;

        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    async fn delete_record(&self, record_id: &str) -> Result<Option<DrawRecord>, DrawError> {
        let txn = self.pool.begin().await.map_err(DrawError::persistence)?;

        let Some(model) = records::Entity::find_by_id(record_id.to_string())
            .one(&txn)
            .await
            .map_err(DrawError::persistence)?
        else {
            return Ok(None);
        };

        reservations::Entity::delete_by_id(model.booking_id.clone())
            .exec(&txn)
            .await
            .map_err(DrawError::persistence)?;
        model
            .clone()
            .delete(&txn)
            .await
            .map_err(DrawError::persistence)?;

        txn.commit().await.map_err(DrawError::persistence)?;
        Ok(Some(model.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn booking(raw: &str) -> BookingId {
        BookingId::parse(raw).unwrap()
    }

    fn record_model(id: &str, booking_id: &str, created_at: DateTime<Utc>) -> records::Model {
        records::Model {
            id: id.into(),
            booking_id: booking_id.into(),
            prize_id: "p-1".into(),
            prize_label: "Welcome Drink".into(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_reserve_maps_conflict_to_already_consumed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        ledger.reserve(&booking("ABC123")).await.unwrap();
        assert_eq!(
            ledger.reserve(&booking("ABC123")).await,
            Err(DrawError::AlreadyConsumed("ABC123".into()))
        );
    }

    #[tokio::test]
    async fn test_is_consumed_reads_reservation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reservations::Model {
                booking_id: "ABC123".into(),
                reserved_at: Utc::now(),
            }]])
            .append_query_results([Vec::<reservations::Model>::new()])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        assert!(ledger.is_consumed(&booking("ABC123")).await.unwrap());
        assert!(!ledger.is_consumed(&booking("OTHER")).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_returns_existing_on_duplicate() {
        let existing = records::Model {
            id: "r-1".into(),
            booking_id: "ABC123".into(),
            prize_id: "p-1".into(),
            prize_label: "Welcome Drink".into(),
            created_at: Utc::now(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([vec![existing.clone()]])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        let prize = Prize::new("p-2", "Room Upgrade", Some(1.0));
        let record = ledger
            .record(&booking("ABC123"), &prize, Utc::now())
            .await
            .unwrap();
        assert_eq!(record, DrawRecord::from(existing));
    }

    #[tokio::test]
    async fn test_database_error_is_persistence_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([sea_orm::DbErr::Custom("connection lost".into())])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        assert!(matches!(
            ledger.reserve(&booking("ABC123")).await,
            Err(DrawError::PersistenceFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_list_records_returns_page_and_total() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(3)))])]])
            .append_query_results([vec![
                record_model("r-3", "C", now),
                record_model("r-2", "B", now - Duration::seconds(1)),
            ]])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        let (page, total) = ledger.list_records(0, 2).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = page.iter().map(|r| r.booking_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "B"]);
        assert_eq!(page[0].prize_label, "Welcome Drink");
    }

    #[tokio::test]
    async fn test_delete_record_releases_reservation() {
        let existing = record_model("r-1", "ABC123", Utc::now());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            // 先删占用, 再删记录
            .append_exec_results([exec(1), exec(1)])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        let deleted = ledger.delete_record("r-1").await.unwrap();
        assert_eq!(deleted, Some(DrawRecord::from(existing)));
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<records::Model>::new()])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));

        assert_eq!(ledger.delete_record("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ledger_clones_share_connection() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let ledger = DatabaseLedger::new(Arc::new(db));
        let other = ledger.clone();

        ledger.reserve(&booking("ABC123")).await.unwrap();
        assert_eq!(
            other.reserve(&booking("ABC123")).await,
            Err(DrawError::AlreadyConsumed("ABC123".into()))
        );
    }
}
