use crate::database::DbPool;
use crate::draw::{Prize, effective_weight, normalize};
use crate::entities::prize_entity as prizes;
use crate::error::{AppError, AppResult};
use crate::models::{PrizeRequest, PrizeResponse, RescaleResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder, Set,
    TransactionTrait,
};

const MAX_LABEL_LEN: usize = 255;

#[derive(Clone)]
pub struct PrizeService {
    pool: DbPool,
}

impl PrizeService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 当前奖品表快照（按创建顺序）, 抽奖使用
    pub async fn snapshot(&self) -> AppResult<Vec<Prize>> {
        let list = self.all_models().await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 奖品列表 (附带实际中奖概率)
    pub async fn list_prizes(&self) -> AppResult<Vec<PrizeResponse>> {
        let list = self.all_models().await?;
        Ok(with_probabilities(list))
    }

    /// 新增奖品
    pub async fn add_prize(&self, request: PrizeRequest) -> AppResult<PrizeResponse> {
        let (label, weight) = validate_prize_request(&request)?;
        let now = Utc::now();

        let model = prizes::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            label: Set(label),
            weight: Set(weight),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Prize added: {} ({})", model.id, model.label);
        self.find_prize(&model.id).await
    }

    /// 编辑奖品 (后写覆盖)
    pub async fn edit_prize(&self, id: &str, request: PrizeRequest) -> AppResult<PrizeResponse> {
        let (label, weight) = validate_prize_request(&request)?;

        let model = prizes::Entity::find_by_id(id.to_string())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {id} not found")))?;

        let mut am = model.into_active_model();
        am.label = Set(label);
        am.weight = Set(weight);
        am.updated_at = Set(Utc::now());
        let updated = am.update(self.pool.as_ref()).await?;

        log::info!("Prize updated: {} ({})", updated.id, updated.label);
        self.find_prize(&updated.id).await
    }

    /// 删除奖品; 历史抽奖记录保留名称快照
    pub async fn delete_prize(&self, id: &str) -> AppResult<()> {
        let result = prizes::Entity::delete_by_id(id.to_string())
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Prize {id} not found")));
        }
        log::info!("Prize deleted: {id}");
        Ok(())
    }

    /// 将所有权重换算为百分比 (权重 / 总和 * 100)
    ///
    /// 归一化与比例无关, 换算不影响中奖概率。
    pub async fn rescale_to_percentages(&self) -> AppResult<RescaleResponse> {
        let txn = self.pool.begin().await?;

        let list = prizes::Entity::find()
            .order_by_asc(prizes::Column::CreatedAt)
            .order_by_asc(prizes::Column::Id)
            .all(&txn)
            .await?;

        let weights: Vec<Option<f64>> = list.iter().map(|p| p.weight).collect();
        let (previous_total, scaled) = rescale_weights(&weights).ok_or_else(|| {
            AppError::ValidationError("Total prize weight must be positive to rescale".into())
        })?;

        let now = Utc::now();
        let mut updated = Vec::with_capacity(list.len());
        for (model, weight) in list.into_iter().zip(scaled) {
            let mut am = model.into_active_model();
            am.weight = Set(Some(weight));
            am.updated_at = Set(now);
            updated.push(am.update(&txn).await?);
        }

        txn.commit().await?;

        log::info!("Rescaled {} prize weights from total {previous_total}", updated.len());
        Ok(RescaleResponse {
            previous_total,
            prizes: with_probabilities(updated),
        })
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn all_models(&self) -> AppResult<Vec<prizes::Model>> {
        let list = prizes::Entity::find()
            .order_by_asc(prizes::Column::CreatedAt)
            .order_by_asc(prizes::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(list)
    }

    async fn find_prize(&self, id: &str) -> AppResult<PrizeResponse> {
        self.list_prizes()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Prize {id} not found")))
    }
}

/// 校验奖品请求, 返回去除空白后的名称与权重
pub fn validate_prize_request(request: &PrizeRequest) -> AppResult<(String, Option<f64>)> {
    let label = request.label.trim();
    if label.is_empty() {
        return Err(AppError::ValidationError(
            "Prize label must not be empty".into(),
        ));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(AppError::ValidationError(format!(
            "Prize label must be at most {MAX_LABEL_LEN} characters"
        )));
    }
    if let Some(w) = request.weight
        && (!w.is_finite() || w < 0.0)
    {
        return Err(AppError::ValidationError(
            "Prize weight must be a non-negative number".into(),
        ));
    }
    Ok((label.to_string(), request.weight))
}

/// 权重换算为百分比; 总和 <= 0 时返回 None
pub fn rescale_weights(weights: &[Option<f64>]) -> Option<(f64, Vec<f64>)> {
    let total: f64 = weights.iter().map(|w| effective_weight(*w)).sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    let scaled = weights
        .iter()
        .map(|w| effective_weight(*w) / total * 100.0)
        .collect();
    Some((total, scaled))
}

fn with_probabilities(list: Vec<prizes::Model>) -> Vec<PrizeResponse> {
    let snapshot: Vec<Prize> = list.iter().map(Prize::from).collect();
    let probabilities = normalize(&snapshot)
        .map(|table| table.probabilities())
        .unwrap_or_default();
    list.into_iter()
        .zip(probabilities)
        .map(|(m, p)| PrizeResponse::new(m, p))
        .collect()
}
