use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{BookingId, BookingLedger, DrawError, DrawRecord, Prize, RandomSource};
use super::{normalize, select};

/// 抽奖协调器: 每个预订号在共享账本上只能抽一次
#[derive(Clone)]
pub struct DrawCoordinator {
    ledger: Arc<dyn BookingLedger>,
    timeout: Duration,
}

impl DrawCoordinator {
    pub fn new(ledger: Arc<dyn BookingLedger>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }

    pub fn ledger(&self) -> &Arc<dyn BookingLedger> {
        &self.ledger
    }

    /// 抽奖
    ///
    /// 顺序:
    /// 1. 校验预订号 (去除首尾空白后非空)
    /// 2. 归一化奖品快照 (空表直接失败, 不占用预订号)
    /// 3. 原子占用预订号, 已占用则失败
    /// 4. 按权重选出奖品
    /// 5. 写入抽奖记录; 失败时预订号保持已占用, 不自动重试
    pub async fn attempt_draw<R>(
        &self,
        raw_booking_id: &str,
        prizes: &[Prize],
        rng: &mut R,
    ) -> Result<DrawRecord, DrawError>
    where
        R: RandomSource + Send + ?Sized,
    {
        let booking_id = BookingId::parse(raw_booking_id)?;
        let table = normalize(prizes)?;

        if let Err(e) = self.bounded(self.ledger.reserve(&booking_id)).await {
            log::warn!("Draw rejected for booking {booking_id}: {e}");
            return Err(e);
        }

        // 选中结果只在占用成功后产生
        let index = select(&table, rng)?;
        let prize = prizes.get(index).ok_or(DrawError::InvalidPrizeTable)?;

        match self
            .bounded(self.ledger.record(&booking_id, prize, Utc::now()))
            .await
        {
            Ok(record) => {
                log::info!(
                    "Booking {} drew prize {} ({})",
                    record.booking_id,
                    record.prize_id,
                    record.prize_label
                );
                Ok(record)
            }
            Err(e) => {
                log::error!(
                    "Failed to persist draw for booking {booking_id}, booking stays consumed: {e}"
                );
                Err(match e {
                    DrawError::PersistenceFailure(_) => e,
                    other => DrawError::persistence(other),
                })
            }
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, DrawError>
    where
        F: Future<Output = Result<T, DrawError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| {
                DrawError::PersistenceFailure(format!(
                    "ledger did not respond within {} ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}
