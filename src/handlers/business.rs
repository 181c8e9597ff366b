use crate::entities::UserRole;
use crate::handlers::{review, service};
use crate::middlewares::{optional_user, require_role};
use crate::models::*;
use crate::services::BusinessService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/businesses",
    tag = "businesses",
    params(BusinessListQuery),
    responses(
        (status = 200, description = "Paginated businesses", body = [BusinessResponse]),
        (status = 400, description = "Invalid filter or paging values")
    )
)]
pub async fn list_businesses(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    query: web::Query<BusinessListQuery>,
) -> Result<HttpResponse> {
    match business_service
        .list(optional_user(&req), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/businesses/mine",
    tag = "businesses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's business", body = BusinessDetailResponse),
        (status = 403, description = "Business accounts only"),
        (status = 404, description = "No business yet")
    )
)]
pub async fn my_business(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match business_service.mine(caller.id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business id")),
    responses(
        (status = 200, description = "Business with hours and services", body = BusinessDetailResponse),
        (status = 404, description = "No such business")
    )
)]
pub async fn get_business(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match business_service
        .get(optional_user(&req), path.into_inner())
        .await
    {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/businesses",
    tag = "businesses",
    request_body = CreateBusinessRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Business created", body = BusinessDetailResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Business accounts and admins only"),
        (status = 409, description = "Caller already owns a business")
    )
)]
pub async fn create_business(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    request: web::Json<CreateBusinessRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match business_service.create(caller, request.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business id")),
    request_body = UpdateBusinessRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Business updated", body = BusinessResponse),
        (status = 403, description = "Not the owner, or admin-only field"),
        (status = 404, description = "No such business")
    )
)]
pub async fn update_business(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateBusinessRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match business_service
        .update(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(business) => Ok(HttpResponse::Ok().json(ApiResponse::success(business))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Business deactivated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such business")
    )
)]
pub async fn delete_business(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match business_service.deactivate(caller, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Business deactivated"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/working-hours",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business id")),
    responses(
        (status = 200, description = "Monday-first week", body = [WorkingHoursDto]),
        (status = 404, description = "No such business")
    )
)]
pub async fn get_working_hours(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match business_service
        .working_hours(optional_user(&req), path.into_inner())
        .await
    {
        Ok(week) => Ok(HttpResponse::Ok().json(ApiResponse::list(week))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}/working-hours",
    tag = "businesses",
    params(("id" = i64, Path, description = "Business id")),
    request_body = UpdateWorkingHoursRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Week replaced", body = [WorkingHoursDto]),
        (status = 400, description = "Invalid times or duplicate days"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn update_working_hours(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateWorkingHoursRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match business_service
        .replace_working_hours(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(week) => Ok(HttpResponse::Ok().json(ApiResponse::list(week))),
        Err(e) => Ok(e.error_response()),
    }
}

/// `/businesses` plus the services and reviews nested under a business.
pub fn business_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/businesses")
            .route("", web::get().to(list_businesses))
            .route("", web::post().to(create_business))
            .route("/mine", web::get().to(my_business))
            .route("/{id}", web::get().to(get_business))
            .route("/{id}", web::put().to(update_business))
            .route("/{id}", web::delete().to(delete_business))
            .route("/{id}/working-hours", web::get().to(get_working_hours))
            .route("/{id}/working-hours", web::put().to(update_working_hours))
            .route(
                "/{id}/services",
                web::get().to(service::list_business_services),
            )
            .route(
                "/{id}/services",
                web::post().to(service::create_business_service),
            )
            .route("/{id}/reviews", web::get().to(review::list_business_reviews))
            .route(
                "/{id}/reviews",
                web::post().to(review::create_business_review),
            ),
    );
}
