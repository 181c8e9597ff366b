use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    AppointmentStatus, BusinessType, DiscountType, NotificationType, UserRole, Weekday,
};
use crate::error::FieldError;
use crate::handlers;
use crate::models::*;
use crate::rules::CouponQuote;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::change_password,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_user_status,
        handlers::business::list_businesses,
        handlers::business::my_business,
        handlers::business::get_business,
        handlers::business::create_business,
        handlers::business::update_business,
        handlers::business::delete_business,
        handlers::business::get_working_hours,
        handlers::business::update_working_hours,
        handlers::service::list_business_services,
        handlers::service::create_business_service,
        handlers::service::get_service,
        handlers::service::update_service,
        handlers::service::delete_service,
        handlers::appointment::create_appointment,
        handlers::appointment::list_my_appointments,
        handlers::appointment::list_business_appointments,
        handlers::appointment::list_all_appointments,
        handlers::appointment::get_appointment,
        handlers::appointment::update_appointment,
        handlers::review::list_business_reviews,
        handlers::review::create_business_review,
        handlers::review::approve_review,
        handlers::review::reply_review,
        handlers::review::delete_review,
        handlers::coupon::validate_coupon,
        handlers::coupon::list_coupons,
        handlers::coupon::create_coupon,
        handlers::coupon::get_coupon,
        handlers::coupon::update_coupon,
        handlers::coupon::delete_coupon,
        handlers::notification::list_notifications,
        handlers::notification::mark_notification_read,
        handlers::notification::mark_all_notifications_read,
        handlers::notification::delete_notification,
        handlers::admin::get_stats,
    ),
    components(
        schemas(
            UserRole,
            BusinessType,
            AppointmentStatus,
            DiscountType,
            NotificationType,
            Weekday,
            FieldError,
            PaginationInfo,
            RegisterRole,
            RegisterRequest,
            LoginRequest,
            ChangePasswordRequest,
            UpdateProfileRequest,
            UpdateUserStatusRequest,
            UserResponse,
            AuthResponse,
            BusinessSort,
            WorkingHoursDto,
            UpdateWorkingHoursRequest,
            CreateBusinessRequest,
            UpdateBusinessRequest,
            BusinessResponse,
            BusinessDetailResponse,
            CreateServiceRequest,
            UpdateServiceRequest,
            ServiceResponse,
            CreateAppointmentRequest,
            UpdateAppointmentRequest,
            AppointmentResponse,
            CreateReviewRequest,
            ReplyReviewRequest,
            ReviewResponse,
            ValidateCouponRequest,
            CreateCouponRequest,
            UpdateCouponRequest,
            CouponResponse,
            CouponQuote,
            NotificationResponse,
            NotificationListResponse,
            AppointmentStatusCounts,
            AdminStatsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and sign-in"),
        (name = "users", description = "Profiles and user administration"),
        (name = "businesses", description = "Business listings and working hours"),
        (name = "services", description = "Service catalog"),
        (name = "appointments", description = "Booking and appointment lifecycle"),
        (name = "reviews", description = "Reviews and moderation"),
        (name = "coupons", description = "Discount and gift coupons"),
        (name = "notifications", description = "In-app notifications"),
        (name = "admin", description = "Platform statistics"),
    ),
    info(
        title = "ArabaMon API",
        version = "1.0.0",
        description = "Vehicle service marketplace REST API"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/appointments"));
        assert!(doc.paths.paths.contains_key("/api/businesses/{id}/working-hours"));
        assert!(doc.paths.paths.contains_key("/api/coupons/validate"));
    }
}
