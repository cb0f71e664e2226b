use crate::handlers::prize::prize_admin_config;
use crate::middlewares::current_tier;
use crate::models::*;
use crate::services::{AdminService, DrawService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AdminLoginResponse),
        (status = 401, description = "口令错误")
    )
)]
/// 后台登录: 编辑口令得到 editor 权限, 查看口令得到 viewer 权限
pub async fn login(
    service: web::Data<AdminService>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse> {
    let service = service.into_inner();
    let request = request.into_inner();
    // bcrypt 校验较慢, 放到阻塞线程池
    let result = web::block(move || service.login(request)).await?;
    match result {
        Ok(response) => Ok(ok_json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/draws",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽奖记录成功", body = PaginatedResponse<DrawRecordResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取抽奖记录（倒序）
pub async fn list_draws(
    service: web::Data<DrawService>,
    req: HttpRequest,
    query: web::Query<DrawRecordQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::ViewDrawLog) {
        return Ok(e.error_response());
    }
    match service.list_records(&query.into_inner()).await {
        Ok(page) => Ok(ok_json(page)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/draws/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "抽奖记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功, 预订号可再次抽奖", body = DrawRecordResponse),
        (status = 403, description = "需要编辑权限"),
        (status = 404, description = "记录不存在")
    )
)]
/// 删除抽奖记录并释放预订号 (人工处理用)
pub async fn delete_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = AdminService::require(current_tier(&req), Capability::EditPrizes) {
        return Ok(e.error_response());
    }
    match service.delete_record(&path.into_inner()).await {
        Ok(record) => Ok(ok_json(record)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(login))
            .route("/draws", web::get().to(list_draws))
            .route("/draws/{id}", web::delete().to(delete_draw))
            .configure(prize_admin_config),
    );
}
