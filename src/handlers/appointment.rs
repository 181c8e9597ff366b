use crate::entities::UserRole;
use crate::middlewares::{current_user, require_role};
use crate::models::*;
use crate::services::AppointmentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "appointments",
    request_body = CreateAppointmentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Booking or coupon rejected"),
        (status = 403, description = "Customers only"),
        (status = 404, description = "Business or service not found")
    )
)]
pub async fn create_appointment(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    request: web::Json<CreateAppointmentRequest>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::User]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match appointment_service.create(caller, request.into_inner()).await {
        Ok(appointment) => Ok(HttpResponse::Created().json(ApiResponse::success(appointment))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "appointments",
    params(AppointmentListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's bookings", body = [AppointmentResponse])
    )
)]
pub async fn list_my_appointments(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    query: web::Query<AppointmentListQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match appointment_service.list_own(caller, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/appointments/business/{id}",
    tag = "appointments",
    params(
        ("id" = i64, Path, description = "Business id"),
        AppointmentListQuery
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookings of the business", body = [AppointmentResponse]),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn list_business_appointments(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<AppointmentListQuery>,
) -> Result<HttpResponse> {
    let caller = match require_role(&req, &[UserRole::Business, UserRole::Admin]) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match appointment_service
        .list_for_business(caller, path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/appointments/admin/all",
    tag = "appointments",
    params(AdminAppointmentQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All bookings", body = [AppointmentResponse]),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_all_appointments(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    query: web::Query<AdminAppointmentQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_role(&req, &[UserRole::Admin]) {
        return Ok(e.error_response());
    }
    match appointment_service.list_all(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::page(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "appointments",
    params(("id" = i64, Path, description = "Appointment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Appointment", body = AppointmentResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "No such appointment")
    )
)]
pub async fn get_appointment(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match appointment_service.get(caller, path.into_inner()).await {
        Ok(appointment) => Ok(HttpResponse::Ok().json(ApiResponse::success(appointment))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    tag = "appointments",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentResponse),
        (status = 400, description = "Invalid reschedule"),
        (status = 403, description = "Transition not allowed for the caller"),
        (status = 404, description = "No such appointment"),
        (status = 409, description = "Status changed concurrently")
    )
)]
pub async fn update_appointment(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateAppointmentRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match appointment_service
        .update(caller, path.into_inner(), request.into_inner())
        .await
    {
        Ok(appointment) => Ok(HttpResponse::Ok().json(ApiResponse::success(appointment))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn appointment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/appointments")
            .route("", web::post().to(create_appointment))
            .route("", web::get().to(list_my_appointments))
            .route("/mine", web::get().to(list_my_appointments))
            .route("/business/{id}", web::get().to(list_business_appointments))
            .route("/admin/all", web::get().to(list_all_appointments))
            .route("/{id}", web::get().to(get_appointment))
            .route("/{id}", web::put().to(update_appointment)),
    );
}
