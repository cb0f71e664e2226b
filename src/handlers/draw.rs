use crate::models::*;
use crate::services::{DrawService, PrizeService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/draw/prizes",
    tag = "draw",
    responses(
        (status = 200, description = "获取奖品列表成功", body = [PrizeResponse])
    )
)]
/// 获取当前奖品表（转盘展示用, 附带中奖概率）
pub async fn get_prizes(service: web::Data<PrizeService>) -> Result<HttpResponse> {
    match service.list_prizes().await {
        Ok(list) => Ok(ok_json(list)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draw/bookings/{booking_id}",
    tag = "draw",
    params(
        ("booking_id" = String, Path, description = "预订号")
    ),
    responses(
        (status = 200, description = "查询成功", body = BookingStatusResponse),
        (status = 400, description = "预订号为空或过长")
    )
)]
/// 查询预订号是否已抽过奖
pub async fn get_booking_status(
    service: web::Data<DrawService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.booking_status(&path.into_inner()).await {
        Ok(status) => Ok(ok_json(status)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/spin",
    tag = "draw",
    request_body = SpinRequest,
    responses(
        (status = 200, description = "抽奖成功", body = DrawRecordResponse),
        (status = 400, description = "预订号为空"),
        (status = 409, description = "预订号已使用"),
        (status = 503, description = "奖品未配置或记录保存失败")
    )
)]
/// 进行一次抽奖:
/// 1. 预订号去除首尾空白并校验
/// 2. 原子占用预订号
/// 3. 按权重选出奖品并保存记录
pub async fn spin(
    service: web::Data<DrawService>,
    request: web::Json<SpinRequest>,
) -> Result<HttpResponse> {
    match service.spin(request.into_inner()).await {
        Ok(record) => Ok(ok_json(record)),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draw")
            .route("/prizes", web::get().to(get_prizes))
            .route("/bookings/{booking_id}", web::get().to(get_booking_status))
            .route("/spin", web::post().to(spin)),
    );
}
