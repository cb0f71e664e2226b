use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖记录实体
/// 说明:
/// - 每个预订号成功抽奖后产生一条记录, 之后不再修改
/// - booking_id 唯一, 同时作为写入的幂等键
/// - prize_label 冗余存储 (奖品后续修改或删除仍可回溯)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub booking_id: String,
    /// 奖品ID (指向 prizes.id, 不建外键)
    pub prize_id: String,
    /// 奖品名称 (历史快照)
    pub prize_label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
