use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::draw::get_prizes,
        handlers::draw::get_booking_status,
        handlers::draw::spin,
        handlers::admin::login,
        handlers::admin::list_draws,
        handlers::admin::delete_draw,
        handlers::prize::list_prizes,
        handlers::prize::add_prize,
        handlers::prize::edit_prize,
        handlers::prize::delete_prize,
        handlers::prize::rescale_prizes,
    ),
    components(
        schemas(
            SpinRequest,
            DrawRecordResponse,
            BookingStatusResponse,
            DrawRecordQuery,
            PrizeRequest,
            PrizeResponse,
            RescaleResponse,
            AccessTier,
            AdminLoginRequest,
            AdminLoginResponse,
            PaginationParams,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "draw", description = "Prize wheel API"),
        (name = "admin", description = "Prize and draw log administration API"),
    ),
    info(
        title = "Spin Wheel Backend API",
        version = "0.1.0",
        description = "Booking-gated prize wheel REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
