use crate::middlewares::current_tier;
use crate::models::*;
use crate::services::{AdminService, PrizeService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/admin/prizes",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取奖品列表成功", body = [PrizeResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_prizes(
    service: web::Data<PrizeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::ViewDrawLog) {
        return Ok(e.error_response());
    }
    match service.list_prizes().await {
        Ok(list) => Ok(ok_json(list)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes",
    tag = "admin",
    request_body = PrizeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "新增奖品成功", body = PrizeResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "需要编辑权限")
    )
)]
pub async fn add_prize(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    request: web::Json<PrizeRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::EditPrizes) {
        return Ok(e.error_response());
    }
    match service.add_prize(request.into_inner()).await {
        Ok(prize) => Ok(ok_json(prize)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/prizes/{id}",
    tag = "admin",
    request_body = PrizeRequest,
    params(
        ("id" = String, Path, description = "奖品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "编辑奖品成功", body = PrizeResponse),
        (status = 403, description = "需要编辑权限"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn edit_prize(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<PrizeRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::EditPrizes) {
        return Ok(e.error_response());
    }
    match service
        .edit_prize(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(prize) => Ok(ok_json(prize)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/prizes/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "奖品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除奖品成功"),
        (status = 403, description = "需要编辑权限"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn delete_prize(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::EditPrizes) {
        return Ok(e.error_response());
    }
    let id = path.into_inner();
    match service.delete_prize(&id).await {
        Ok(()) => Ok(ApiResponse::success_with_message(id, "Prize deleted").into_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes/rescale",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "权重已换算为百分比", body = RescaleResponse),
        (status = 400, description = "权重总和为 0"),
        (status = 403, description = "需要编辑权限")
    )
)]
/// 将所有奖品权重换算为百分比, 不改变中奖概率
pub async fn rescale_prizes(
    service: web::Data<PrizeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::EditPrizes) {
        return Ok(e.error_response());
    }
    match service.rescale_to_percentages().await {
        Ok(result) => Ok(ok_json(result)),
        Err(e) => Ok(e.error_response()),
    }
}

/// 奖品管理路由, 挂在 /admin 下
pub fn prize_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/prizes", web::get().to(list_prizes))
        .route("/prizes", web::post().to(add_prize))
        .route("/prizes/rescale", web::post().to(rescale_prizes))
        .route("/prizes/{id}", web::put().to(edit_prize))
        .route("/prizes/{id}", web::delete().to(delete_prize));
}
