use crate::draw::{BookingId, DrawCoordinator, ThreadRandom};
use crate::error::{AppError, AppResult};
use crate::models::{
    BookingStatusResponse, DrawRecordPageResponse, DrawRecordQuery, DrawRecordResponse,
    PaginatedResponse, PaginationParams, SpinRequest,
};
use crate::services::PrizeService;

pub const MAX_BOOKING_ID_LEN: usize = 128;

#[derive(Clone)]
pub struct DrawService {
    prize_service: PrizeService,
    coordinator: DrawCoordinator,
}

impl DrawService {
    pub fn new(prize_service: PrizeService, coordinator: DrawCoordinator) -> Self {
        Self {
            prize_service,
            coordinator,
        }
    }

    /// 抽奖 (Spin)
    ///
    /// 每次读取最新的奖品表快照; 抽奖过程中奖品表被修改不影响本次结果。
    pub async fn spin(&self, request: SpinRequest) -> AppResult<DrawRecordResponse> {
        check_booking_len(&request.booking_id)?;
        // 预订号为空时不读取奖品表
        BookingId::parse(&request.booking_id)?;
        let prizes = self.prize_service.snapshot().await?;
        let record = self
            .coordinator
            .attempt_draw(&request.booking_id, &prizes, &mut ThreadRandom)
            .await?;
        Ok(record.into())
    }

    /// 查询预订号是否已抽过
    pub async fn booking_status(&self, raw_booking_id: &str) -> AppResult<BookingStatusResponse> {
        check_booking_len(raw_booking_id)?;
        let booking_id = BookingId::parse(raw_booking_id)?;
        let consumed = self.coordinator.ledger().is_consumed(&booking_id).await?;
        Ok(BookingStatusResponse {
            booking_id: booking_id.to_string(),
            consumed,
        })
    }

    /// 获取抽奖记录（分页, 时间倒序）
    pub async fn list_records(&self, query: &DrawRecordQuery) -> AppResult<DrawRecordPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);
        let (records, total) = self
            .coordinator
            .ledger()
            .list_records(params.get_offset(), params.get_limit())
            .await?;

        Ok(PaginatedResponse::new(
            records.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    /// 删除抽奖记录 (后台操作), 同时释放预订号
    pub async fn delete_record(&self, record_id: &str) -> AppResult<DrawRecordResponse> {
        let record = self
            .coordinator
            .ledger()
            .delete_record(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Draw record {record_id} not found")))?;

        log::warn!(
            "Draw record {} deleted, booking {} released",
            record.id,
            record.booking_id
        );
        Ok(record.into())
    }
}

fn check_booking_len(raw: &str) -> AppResult<()> {
    if raw.trim().chars().count() > MAX_BOOKING_ID_LEN {
        return Err(AppError::ValidationError(format!(
            "Booking id must be at most {MAX_BOOKING_ID_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawError, MemoryLedger};
    use crate::entities::prize_entity as prizes;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use std::time::Duration;

    fn prize(id: &str, weight: Option<f64>) -> prizes::Model {
        prizes::Model {
            id: id.into(),
            label: format!("Prize {id}"),
            weight,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(snapshots: Vec<Vec<prizes::Model>>) -> DrawService {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(snapshots)
            .into_connection();
        let coordinator =
            DrawCoordinator::new(Arc::new(MemoryLedger::new()), Duration::from_secs(5));
        DrawService::new(PrizeService::new(Arc::new(db)), coordinator)
    }

    fn spin_request(booking_id: &str) -> SpinRequest {
        SpinRequest {
            booking_id: booking_id.into(),
        }
    }

    #[tokio::test]
    async fn test_spin_once_per_booking() {
        let table = vec![prize("only", Some(5.0))];
        let service = service(vec![table.clone(), table]);

        let record = service.spin(spin_request("  R-100 ")).await.unwrap();
        assert_eq!(record.booking_id, "R-100");
        assert_eq!(record.prize_id, "only");
        assert_eq!(record.prize_label, "Prize only");

        let status = service.booking_status("R-100").await.unwrap();
        assert!(status.consumed);

        assert!(matches!(
            service.spin(spin_request("R-100")).await,
            Err(AppError::Draw(DrawError::AlreadyConsumed(_)))
        ));
    }

    #[tokio::test]
    async fn test_spin_without_prizes_keeps_booking_available() {
        let service = service(vec![vec![]]);

        assert!(matches!(
            service.spin(spin_request("R-200")).await,
            Err(AppError::Draw(DrawError::InvalidPrizeTable))
        ));
        assert!(!service.booking_status("R-200").await.unwrap().consumed);
    }

    #[tokio::test]
    async fn test_overlong_booking_rejected() {
        let service = service(vec![]);
        let long = "x".repeat(MAX_BOOKING_ID_LEN + 1);
        assert!(matches!(
            service.spin(spin_request(&long)).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_records_listed_and_deleted() {
        let table = vec![prize("a", Some(1.0)), prize("b", Some(1.0))];
        let service = service(vec![table.clone(), table]);
        service.spin(spin_request("R-1")).await.unwrap();
        let second = service.spin(spin_request("R-2")).await.unwrap();

        let page = service
            .list_records(&DrawRecordQuery {
                page: None,
                per_page: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);

        let deleted = service.delete_record(&second.id).await.unwrap();
        assert_eq!(deleted.booking_id, "R-2");
        assert!(!service.booking_status("R-2").await.unwrap().consumed);
        assert!(matches!(
            service.delete_record(&second.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
