use crate::entities::{AppointmentStatus, appointment_entity as appointments};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub business_id: i64,
    pub service_id: i64,
    /// `YYYY-MM-DD`
    #[validate(length(equal = 10, message = "Date must be YYYY-MM-DD"))]
    pub date: String,
    /// `HH:MM`
    #[validate(length(equal = 5, message = "Time must be HH:MM"))]
    pub time: String,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub coupon_code: Option<String>,
}

/// Partial update; which fields a caller may send depends on their role.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(max = 500))]
    pub cancel_reason: Option<String>,
    /// Admin only
    pub date: Option<String>,
    /// Admin only
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminAppointmentQuery {
    pub status: Option<AppointmentStatus>,
    pub business_id: Option<i64>,
    pub user_id: Option<i64>,
    /// `YYYY-MM-DD`, inclusive
    pub from: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub to: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    pub price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
    pub coupon_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<appointments::Model> for AppointmentResponse {
    fn from(m: appointments::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            business_id: m.business_id,
            service_id: m.service_id,
            date: m.appointment_date,
            time: m.appointment_time,
            status: m.status,
            notes: m.notes,
            cancel_reason: m.cancel_reason,
            price: m.price,
            discount_amount: m.discount_amount,
            final_price: m.final_price,
            coupon_id: m.coupon_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_shape() {
        let req: UpdateAppointmentRequest = serde_json::from_value(serde_json::json!({
            "status": "cancelled",
            "cancelReason": "Araç serviste"
        }))
        .unwrap();
        assert_eq!(req.status, Some(AppointmentStatus::Cancelled));
        assert!(req.cancel_reason.is_some());

        assert!(
            serde_json::from_value::<UpdateAppointmentRequest>(serde_json::json!({
                "status": "done"
            }))
            .is_err()
        );
        assert!(
            serde_json::from_value::<UpdateAppointmentRequest>(serde_json::json!({
                "serviceId": 3
            }))
            .is_err()
        );
    }
}
