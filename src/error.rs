use crate::rules::{BookingError, CouponError, ScheduleError, TransitionError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

pub type AppResult<T> = Result<T, AppError>;

/// One failed field of a request body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed")]
    FieldValidation(Vec<FieldError>),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn forbidden() -> Self {
        AppError::Forbidden("You do not have permission to perform this action".to_string())
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::FieldValidation(_) => "VALIDATION_ERROR",
            AppError::Schedule(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) | AppError::Transition(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Booking(e) if e.is_not_found() => "NOT_FOUND",
            AppError::Booking(_) => "BOOKING_REJECTED",
            AppError::Coupon(CouponError::NotFound) => "NOT_FOUND",
            AppError::Coupon(_) => "COUPON_REJECTED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the client. Internal failures stay generic.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::FieldValidation(_) => "Validation failed".to_string(),
            AppError::JwtError(_) => "Invalid or expired token".to_string(),
            AppError::Booking(e) => e.to_string(),
            AppError::Coupon(e) => e.to_string(),
            AppError::Transition(e) => e.to_string(),
            AppError::Schedule(e) => e.to_string(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::FieldValidation(_)
            | AppError::Schedule(_)
            | AppError::SerdeJsonError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::Transition(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Booking(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Booking(_) => StatusCode::BAD_REQUEST,
            AppError::Coupon(CouponError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Coupon(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => log::error!("{self}"),
            StatusCode::NOT_FOUND => log::info!("{self}"),
            _ => log::warn!("Request rejected: {self}"),
        }

        let mut body = json!({
            "success": false,
            "code": self.error_code(),
            "message": self.public_message(),
        });
        if let AppError::FieldValidation(errors) = self {
            body["errors"] = json!(errors);
        }

        HttpResponse::build(status).json(body)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid ({})", e.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::FieldValidation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::AuthError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::forbidden().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Booking(BookingError::PastDate).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Booking(BookingError::ServiceNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Coupon(CouponError::Expired).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Transition(TransitionError::NotParticipant).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn test_internal_errors_are_not_leaked() {
        let resp = AppError::InternalError("connection refused on 10.0.0.3".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Internal server error");
    }

    #[actix_web::test]
    async fn test_field_errors_in_envelope() {
        let err = AppError::FieldValidation(vec![FieldError {
            field: "email".into(),
            message: "Invalid e-mail address".into(),
        }]);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["errors"][0]["field"], "email");
        assert_eq!(value["code"], "VALIDATION_ERROR");
    }
}
