use crate::entities::UserRole;
use crate::middlewares::{current_user, require_role};
use crate::models::*;
use crate::rules::CouponQuote;
use crate::services::CouponService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

/// Price a coupon against a service without consuming it.
#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    tag = "coupons",
    request_body = ValidateCouponRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Coupon applies", body = CouponQuote),
        (status = 400, description = "Coupon rejected"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn validate_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<ValidateCouponRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match coupon_service
        .validate_for(caller.id, request.into_inner())
        .await
    {
        Ok(quote) => Ok(HttpResponse::Ok().json(ApiResponse::success(quote))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/coupons",
    tag = "coupons",
    params(CouponListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Coupons", body = [CouponResponse]),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_coupons(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    query: web::Query<CouponListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match coupon_service.list(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/coupons",
    tag = "coupons",
    request_body = CreateCouponRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Coupon created", body = CouponResponse),
        (status = 400, description = "Invalid terms"),
        (status = 409, description = "Code already in use")
    )
)]
pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match coupon_service.create(request.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Created().json(ApiResponse::success(coupon))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/coupons/{id}",
    tag = "coupons",
    params(("id" = i64, Path, description = "Coupon id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Coupon", body = CouponResponse),
        (status = 404, description = "No such coupon")
    )
)]
pub async fn get_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match coupon_service.get(path.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(ApiResponse::success(coupon))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/coupons/{id}",
    tag = "coupons",
    params(("id" = i64, Path, description = "Coupon id")),
    request_body = UpdateCouponRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Coupon updated", body = CouponResponse),
        (status = 400, description = "Invalid terms")
    )
)]
pub async fn update_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match coupon_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(coupon) => Ok(HttpResponse::Ok().json(ApiResponse::success(coupon))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    tag = "coupons",
    params(("id" = i64, Path, description = "Coupon id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Coupon deactivated"),
        (status = 404, description = "No such coupon")
    )
)]
pub async fn delete_coupon(
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match coupon_service.deactivate(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Coupon deactivated"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn coupon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("/validate", web::post().to(validate_coupon))
            .route("", web::get().to(list_coupons))
            .route("", web::post().to(create_coupon))
            .route("/{id}", web::get().to(get_coupon))
            .route("/{id}", web::put().to(update_coupon))
            .route("/{id}", web::delete().to(delete_coupon)),
    );
}
