use crate::entities::UserRole;
use crate::middlewares::require_role;
use crate::models::*;
use crate::services::AdminService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform counters", body = AdminStatsResponse),
        (status = 403, description = "Admins only")
    )
)]
pub async fn get_stats(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match admin_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").route("/stats", web::get().to(get_stats)));
}
