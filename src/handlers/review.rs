use crate::entities::UserRole;
use crate::middlewares::{current_user, optional_user, require_role};
use crate::models::*;
use crate::services::ReviewService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = i64, Path, description = "Business id"),
        ReviewListQuery
    ),
    responses(
        (status = 200, description = "Approved reviews, newest first", body = [ReviewResponse]),
        (status = 404, description = "No such business")
    )
)]
pub async fn list_business_reviews(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ReviewListQuery>,
) -> Result<HttpResponse> {
    match review_service
        .list_for_business(optional_user(&req), path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/businesses/{id}/reviews",
    tag = "reviews",
    params(("id" = i64, Path, description = "Business id")),
    request_body = CreateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Review submitted for moderation", body = ReviewResponse),
        (status = 400, description = "No completed appointment"),
        (status = 403, description = "Customers only"),
        (status = 409, description = "Already reviewed")
    )
)]
pub async fn create_business_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::User]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match review_service
        .create(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(review) => Ok(HttpResponse::Created().json(ApiResponse::success(review))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}/approve",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Review approved", body = ReviewResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "No such review")
    )
)]
pub async fn approve_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match review_service.approve(path.into_inner()).await {
        Ok(review) => Ok(HttpResponse::Ok().json(ApiResponse::success(review))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}/reply",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    request_body = ReplyReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reply saved", body = ReviewResponse),
        (status = 403, description = "Not the business owner")
    )
)]
pub async fn reply_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ReplyReviewRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match review_service
        .reply(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(review) => Ok(HttpResponse::Ok().json(ApiResponse::success(review))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Review removed"),
        (status = 403, description = "Not the author")
    )
)]
pub async fn delete_review(
    review_service: web::Data<ReviewService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match review_service.delete(caller, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Review removed"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn review_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .route("/{id}/approve", web::put().to(approve_review))
            .route("/{id}/reply", web::put().to(reply_review))
            .route("/{id}", web::delete().to(delete_review)),
    );
}
