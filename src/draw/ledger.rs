use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

use super::{BookingId, DrawError, DrawRecord, Prize};

/// 预订号账本: 记录哪些预订号已抽奖以及抽中的奖品
///
/// `reserve` 是抽奖流程唯一的串行点: 对同一预订号必须是原子的
/// reserve-if-absent, 且不能阻塞其他预订号的占用。
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn is_consumed(&self, booking_id: &BookingId) -> Result<bool, DrawError>;

    /// 占用预订号, 已被占用时返回 `AlreadyConsumed`
    async fn reserve(&self, booking_id: &BookingId) -> Result<(), DrawError>;

    /// 为已占用的预订号写入抽奖记录; 重复写入返回第一次的记录
    async fn record(
        &self,
        booking_id: &BookingId,
        prize: &Prize,
        timestamp: DateTime<Utc>,
    ) -> Result<DrawRecord, DrawError>;

    /// 时间倒序, 同时返回记录总数
    async fn list_records(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<DrawRecord>, u64), DrawError>;

    /// 后台删除记录, 同时释放预订号
    async fn delete_record(&self, record_id: &str) -> Result<Option<DrawRecord>, DrawError>;

    async fn consume(
        &self,
        booking_id: &BookingId,
        prize: &Prize,
        timestamp: DateTime<Utc>,
    ) -> Result<DrawRecord, DrawError> {
        self.reserve(booking_id).await?;
        self.record(booking_id, prize, timestamp).await
    }
}

const SHARD_COUNT: usize = 16;

// booking id -> record, 已占用但未写入时为 None
type Shard = HashMap<String, Option<DrawRecord>>;

/// 进程内账本, 重启后清空
///
/// 按预订号哈希分片加锁, 不同分片的预订号互不等待。
pub struct MemoryLedger {
    shards: Vec<Mutex<Shard>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(Shard::new())).collect(),
        }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn shard_index(booking_id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        booking_id.hash(&mut hasher);
        (hasher.finish() % SHARD_COUNT as u64) as usize
    }

    fn lock(shard: &Mutex<Shard>) -> Result<MutexGuard<'_, Shard>, DrawError> {
        shard
            .lock()
            .map_err(|_| DrawError::PersistenceFailure("ledger lock poisoned".into()))
    }

    fn shard(&self, booking_id: &str) -> Result<MutexGuard<'_, Shard>, DrawError> {
        Self::lock(&self.shards[Self::shard_index(booking_id)])
    }
}

#[async_trait]
impl BookingLedger for MemoryLedger {
    async fn is_consumed(&self, booking_id: &BookingId) -> Result<bool, DrawError> {
        Ok(self.shard(booking_id.as_str())?.contains_key(booking_id.as_str()))
    }

    async fn reserve(&self, booking_id: &BookingId) -> Result<(), DrawError> {
        match self
            .shard(booking_id.as_str())?
            .entry(booking_id.as_str().to_string())
        {
            Entry::Occupied(_) => Err(DrawError::AlreadyConsumed(booking_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(None);
                Ok(())
            }
        }
    }

    async fn record(
        &self,
        booking_id: &BookingId,
        prize: &Prize,
        timestamp: DateTime<Utc>,
    ) -> Result<DrawRecord, DrawError> {
        let mut shard = self.shard(booking_id.as_str())?;
        let slot = shard.get_mut(booking_id.as_str()).ok_or_else(|| {
            DrawError::PersistenceFailure(format!("booking {booking_id} was not reserved"))
        })?;
        if let Some(existing) = slot {
            return Ok(existing.clone());
        }
        let record = DrawRecord::new(booking_id, prize, timestamp);
        *slot = Some(record.clone());
        Ok(record)
    }

    async fn list_records(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<DrawRecord>, u64), DrawError> {
        let mut records = Vec::new();
        for shard in &self.shards {
            records.extend(Self::lock(shard)?.values().flatten().cloned());
        }
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        let total = records.len() as u64;
        let page = records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn delete_record(&self, record_id: &str) -> Result<Option<DrawRecord>, DrawError> {
        for shard in &self.shards {
            let mut entries = Self::lock(shard)?;
            let booking = entries.iter().find_map(|(booking, slot)| match slot {
                Some(r) if r.id == record_id => Some(booking.clone()),
                _ => None,
            });
            if let Some(booking) = booking {
                return Ok(entries.remove(&booking).flatten());
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(raw: &str) -> BookingId {
        BookingId::parse(raw).unwrap()
    }

    fn prize() -> Prize {
        Prize::new("p1", "Welcome Drink", Some(1.0))
    }

    #[tokio::test]
    async fn test_reserve_is_once_only() {
        let ledger = MemoryLedger::new();
        let id = booking("ABC123");
        assert!(!ledger.is_consumed(&id).await.unwrap());
        ledger.reserve(&id).await.unwrap();
        assert!(ledger.is_consumed(&id).await.unwrap());
        assert_eq!(
            ledger.reserve(&id).await,
            Err(DrawError::AlreadyConsumed("ABC123".into()))
        );
    }

    #[tokio::test]
    async fn test_consume_then_consume_again_fails() {
        let ledger = MemoryLedger::new();
        let id = booking("B-7");
        let record = ledger.consume(&id, &prize(), Utc::now()).await.unwrap();
        assert_eq!(record.booking_id, "B-7");
        assert!(matches!(
            ledger.consume(&id, &prize(), Utc::now()).await,
            Err(DrawError::AlreadyConsumed(_))
        ));
    }

    #[tokio::test]
    async fn test_record_requires_reservation_and_is_idempotent() {
        let ledger = MemoryLedger::new();
        let id = booking("B-8");
        assert!(matches!(
            ledger.record(&id, &prize(), Utc::now()).await,
            Err(DrawError::PersistenceFailure(_))
        ));

        ledger.reserve(&id).await.unwrap();
        let first = ledger.record(&id, &prize(), Utc::now()).await.unwrap();
        let other = Prize::new("p2", "Room Upgrade", None);
        let again = ledger.record(&id, &other, Utc::now()).await.unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_paginated() {
        let ledger = MemoryLedger::new();
        let base = Utc::now();
        for i in 0..5 {
            let id = booking(&format!("B-{i}"));
            ledger
                .consume(&id, &prize(), base + Duration::seconds(i))
                .await
                .unwrap();
        }
        // 已占用但无记录的预订号不出现在列表中
        ledger.reserve(&booking("PENDING")).await.unwrap();

        let (page, total) = ledger.list_records(1, 2).await.unwrap();
        assert_eq!(total, 5);
        let ids: Vec<&str> = page.iter().map(|r| r.booking_id.as_str()).collect();
        assert_eq!(ids, vec!["B-3", "B-2"]);
    }

    #[tokio::test]
    async fn test_delete_record_releases_booking() {
        let ledger = MemoryLedger::new();
        let id = booking("B-9");
        let record = ledger.consume(&id, &prize(), Utc::now()).await.unwrap();

        assert_eq!(ledger.delete_record("missing").await.unwrap(), None);
        assert_eq!(ledger.delete_record(&record.id).await.unwrap(), Some(record));
        assert!(!ledger.is_consumed(&id).await.unwrap());
        ledger.reserve(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_other_shard_not_blocked_by_held_lock() {
        let ledger = MemoryLedger::new();
        let held = booking("HELD-1");
        let held_shard = MemoryLedger::shard_index(held.as_str());
        let other = (0..100)
            .map(|i| booking(&format!("FREE-{i}")))
            .find(|b| MemoryLedger::shard_index(b.as_str()) != held_shard)
            .unwrap();

        let _guard = ledger.shard(held.as_str()).unwrap();
        // 同一把锁时这里会死锁
        ledger.reserve(&other).await.unwrap();
        assert!(matches!(
            ledger.reserve(&other).await,
            Err(DrawError::AlreadyConsumed(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_records_listed_across_shards() {
        let ledger = std::sync::Arc::new(MemoryLedger::new());
        let handles: Vec<_> = (0..40)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    let id = booking(&format!("S-{i}"));
                    ledger.consume(&id, &prize(), Utc::now()).await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let (page, total) = ledger.list_records(0, 100).await.unwrap();
        assert_eq!(total, 40);
        assert_eq!(page.len(), 40);
    }
}
