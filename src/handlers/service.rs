use crate::entities::UserRole;
use crate::middlewares::{optional_user, require_role};
use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/services",
    tag = "services",
    params(
        ("id" = i64, Path, description = "Business id"),
        IncludeInactiveQuery
    ),
    responses(
        (status = 200, description = "Services of the business", body = [ServiceResponse]),
        (status = 404, description = "No such business")
    )
)]
pub async fn list_business_services(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<IncludeInactiveQuery>,
) -> Result<HttpResponse> {
    match catalog_service
        .list_for_business(
            optional_user(&req),
            path.into_inner(),
            query.include_inactive.unwrap_or(false),
        )
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::list(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/businesses/{id}/services",
    tag = "services",
    params(("id" = i64, Path, description = "Business id")),
    request_body = CreateServiceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Invalid price or duration"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn create_business_service(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match catalog_service
        .create(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(service) => Ok(HttpResponse::Created().json(ApiResponse::success(service))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "services",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service", body = ServiceResponse),
        (status = 404, description = "No such service")
    )
)]
pub async fn get_service(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service
        .get(optional_user(&req), path.into_inner())
        .await
    {
        Ok(service) => Ok(HttpResponse::Ok().json(ApiResponse::success(service))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "services",
    params(("id" = i64, Path, description = "Service id")),
    request_body = UpdateServiceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, description = "Invalid input or unknown field"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn update_service(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateServiceRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match catalog_service
        .update(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(service) => Ok(HttpResponse::Ok().json(ApiResponse::success(service))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "services",
    params(("id" = i64, Path, description = "Service id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Service deactivated"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn delete_service(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match catalog_service.deactivate(caller, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Service deactivated"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn service_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("/{id}", web::get().to(get_service))
            .route("/{id}", web::put().to(update_service))
            .route("/{id}", web::delete().to(delete_service)),
    );
}
