use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::draw::DrawRecord;

use super::PaginatedResponse;

/// 抽奖请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SpinRequest {
    /// 预订号 (首尾空白会被去除)
    #[schema(example = "ABC123")]
    pub booking_id: String,
}

/// 抽奖记录
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawRecordResponse {
    /// 记录ID
    pub id: String,
    pub booking_id: String,
    pub prize_id: String,
    /// 奖品名称 (历史快照)
    pub prize_label: String,
    /// 抽奖时间
    pub timestamp: DateTime<Utc>,
}

impl From<DrawRecord> for DrawRecordResponse {
    fn from(r: DrawRecord) -> Self {
        DrawRecordResponse {
            id: r.id,
            booking_id: r.booking_id,
            prize_id: r.prize_id,
            prize_label: r.prize_label,
            timestamp: r.timestamp,
        }
    }
}

/// 预订号是否已使用
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingStatusResponse {
    pub booking_id: String,
    pub consumed: bool,
}

/// 抽奖记录查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DrawRecordQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20, 最大 100)
    pub per_page: Option<u32>,
}

/// 抽奖记录分页响应
pub type DrawRecordPageResponse = PaginatedResponse<DrawRecordResponse>;
