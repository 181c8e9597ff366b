pub mod admin;
pub mod appointment;
pub mod auth;
pub mod business;
pub mod coupon;
pub mod notification;
pub mod review;
pub mod service;
pub mod user;

pub use admin::admin_config;
pub use appointment::appointment_config;
pub use auth::auth_config;
pub use business::business_config;
pub use coupon::coupon_config;
pub use notification::notification_config;
pub use review::review_config;
pub use service::service_config;
pub use user::user_config;

use crate::error::AppError;
use actix_web::web;

/// Malformed bodies answer with the shared error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Every resource scope, mounted under `/api`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth_config)
        .configure(user_config)
        .configure(business_config)
        .configure(service_config)
        .configure(appointment_config)
        .configure(review_config)
        .configure(coupon_config)
        .configure(notification_config)
        .configure(admin_config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::middlewares::AuthMiddleware;
    use crate::services::*;
    use crate::utils::{JwtService, MarketClock};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use sea_orm::DatabaseConnection;
    use serde_json::json;

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    fn bearer(role: UserRole) -> (&'static str, String) {
        let token = jwt().generate_token(7, role).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    // Every request in these tests is rejected before touching the database.
    macro_rules! gate_app {
        () => {{
            let pool = DatabaseConnection::Disconnected;
            let notifications = NotificationService::new(pool.clone());
            test::init_service(
                App::new()
                    .wrap(AuthMiddleware::new(jwt()))
                    .app_data(json_config())
                    .app_data(query_config())
                    .app_data(path_config())
                    .app_data(web::Data::new(AuthService::new(pool.clone(), jwt())))
                    .app_data(web::Data::new(UserService::new(pool.clone())))
                    .app_data(web::Data::new(BusinessService::new(pool.clone())))
                    .app_data(web::Data::new(CatalogService::new(pool.clone())))
                    .app_data(web::Data::new(CouponService::new(pool.clone())))
                    .app_data(web::Data::new(AdminService::new(pool.clone())))
                    .app_data(web::Data::new(ReviewService::new(
                        pool.clone(),
                        notifications.clone(),
                    )))
                    .app_data(web::Data::new(AppointmentService::new(
                        pool.clone(),
                        notifications.clone(),
                        MarketClock::new(180),
                    )))
                    .app_data(web::Data::new(notifications))
                    .service(web::scope("/api").configure(api_config)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_customer_cannot_create_business() {
        let app = gate_app!();
        let req = test::TestRequest::post()
            .uri("/api/businesses")
            .insert_header(bearer(UserRole::User))
            .set_json(json!({
                "name": "Parlak Oto Yıkama",
                "businessType": "car-wash",
                "address": "Atatürk Cd. 12",
                "city": "İzmir"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let app = gate_app!();
        let req = test::TestRequest::get().uri("/api/appointments").to_request();
        let err = test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_stats_are_admin_only() {
        let app = gate_app!();
        let req = test::TestRequest::get()
            .uri("/api/admin/stats")
            .insert_header(bearer(UserRole::Business))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_business_account_cannot_book() {
        let app = gate_app!();
        let req = test::TestRequest::post()
            .uri("/api/appointments")
            .insert_header(bearer(UserRole::Business))
            .set_json(json!({
                "businessId": 1,
                "serviceId": 1,
                "date": "2030-01-07",
                "time": "10:00"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_user_list_is_admin_only() {
        let app = gate_app!();
        let req = test::TestRequest::get()
            .uri("/api/users")
            .insert_header(bearer(UserRole::User))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_register_as_admin_is_rejected() {
        let app = gate_app!();
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Mallory",
                "email": "mallory@example.com",
                "password": "secret123",
                "role": "admin"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_service_cannot_be_moved_between_businesses() {
        let app = gate_app!();
        let req = test::TestRequest::put()
            .uri("/api/services/1")
            .insert_header(bearer(UserRole::Business))
            .set_json(json!({ "businessId": 2 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_oversized_page_is_rejected() {
        let app = gate_app!();
        let req = test::TestRequest::get()
            .uri("/api/businesses?limit=500")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_page_past_offset_range_is_rejected() {
        let app = gate_app!();
        let req = test::TestRequest::get()
            .uri("/api/businesses?page=18446744073709551615&limit=100")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
