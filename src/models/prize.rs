use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::draw::Prize;
use crate::entities::prize_entity;

/// 新增 / 编辑奖品请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PrizeRequest {
    /// 展示名称
    #[schema(example = "Room Upgrade")]
    pub label: String,
    /// 相对权重 (可为空, 不可为负)
    #[schema(example = 10.0)]
    pub weight: Option<f64>,
}

/// 奖品信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: String,
    pub label: String,
    pub weight: Option<f64>,
    /// 实际中奖概率 (百分比), 按当前整张奖品表计算
    pub probability: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrizeResponse {
    pub fn new(m: prize_entity::Model, probability: f64) -> Self {
        PrizeResponse {
            id: m.id,
            label: m.label,
            weight: m.weight,
            probability,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 奖品权重批量换算为百分比的结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RescaleResponse {
    /// 换算前权重总和
    pub previous_total: f64,
    pub prizes: Vec<PrizeResponse>,
}

impl From<prize_entity::Model> for Prize {
    fn from(m: prize_entity::Model) -> Self {
        Prize {
            id: m.id,
            label: m.label,
            weight: m.weight,
        }
    }
}

impl From<&prize_entity::Model> for Prize {
    fn from(m: &prize_entity::Model) -> Self {
        Prize {
            id: m.id.clone(),
            label: m.label.clone(),
            weight: m.weight,
        }
    }
}
