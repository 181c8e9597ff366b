use crate::middlewares::current_user;
use crate::models::*;
use crate::services::NotificationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    params(NotificationQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own notifications with unread total", body = NotificationListResponse)
    )
)]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service.list(caller.id, &query.into_inner()).await {
        Ok((list, pagination)) => Ok(HttpResponse::Ok().json(ApiResponse {
            pagination: Some(pagination),
            ..ApiResponse::success(list)
        })),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    params(("id" = i64, Path, description = "Notification id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Marked as read", body = NotificationResponse),
        (status = 404, description = "Not one of the caller's notifications")
    )
)]
pub async fn mark_notification_read(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service
        .mark_read(caller.id, path.into_inner())
        .await
    {
        Ok(notification) => Ok(HttpResponse::Ok().json(ApiResponse::success(notification))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All marked as read")
    )
)]
pub async fn mark_all_notifications_read(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service.mark_all_read(caller.id).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            json!({ "updated": updated }),
            "All notifications marked as read",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "notifications",
    params(("id" = i64, Path, description = "Notification id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Not one of the caller's notifications")
    )
)]
pub async fn delete_notification(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service.delete(caller.id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Notification deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("", web::put().to(mark_all_notifications_read))
            .route("/read-all", web::put().to(mark_all_notifications_read))
            .route("/{id}/read", web::put().to(mark_notification_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
