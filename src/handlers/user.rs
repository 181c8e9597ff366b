use crate::entities::UserRole;
use crate::middlewares::{current_user, require_role};
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_me(user_service: web::Data<UserService>, req: HttpRequest) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service.get_user(caller.id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "users",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_me(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service
        .update_profile(caller.id, request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(UserListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users, newest first", body = [UserResponse]),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match user_service.list_users(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match user_service.get_user(path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status changed", body = UserResponse),
        (status = 400, description = "Admins cannot disable themselves"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn update_user_status(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateUserStatusRequest>,
) -> Result<HttpResponse> {
    let admin = match require_role(&req, &[UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service
        .set_status(admin.id, path.into_inner(), request.is_active)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/me", web::get().to(get_me))
            .route("/me", web::put().to(update_me))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}/status", web::put().to(update_user_status)),
    );
}
