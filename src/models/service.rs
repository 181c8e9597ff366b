use crate::entities::{BusinessType, service_entity as services};
use crate::rules::MAX_AMOUNT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// In kuruş
    #[validate(range(min = 0, max = MAX_AMOUNT, message = "Price must be between 0 and 10 billion lira"))]
    pub price: i64,
    #[validate(range(min = 5, max = 1440, message = "Duration must be 5-1440 minutes"))]
    pub duration_minutes: i32,
}

/// Has no business field: services cannot move between businesses.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = MAX_AMOUNT, message = "Price must be between 0 and 10 billion lira"))]
    pub price: Option<i64>,
    #[validate(range(min = 5, max = 1440, message = "Duration must be 5-1440 minutes"))]
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_minutes: i32,
    pub business_type: BusinessType,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<services::Model> for ServiceResponse {
    fn from(m: services::Model) -> Self {
        Self {
            id: m.id,
            business_id: m.business_id,
            name: m.name,
            description: m.description,
            price: m.price,
            duration_minutes: m.duration_minutes,
            business_type: m.business_type,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_and_duration_bounds() {
        let ok = CreateServiceRequest {
            name: "İç-dış yıkama".into(),
            description: None,
            price: 0,
            duration_minutes: 5,
        };
        assert!(ok.validate().is_ok());

        let bad = CreateServiceRequest {
            price: -1,
            duration_minutes: 4,
            ..ok
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
        assert!(errors.field_errors().contains_key("duration_minutes"));

        let huge = UpdateServiceRequest {
            price: Some(MAX_AMOUNT + 1),
            ..Default::default()
        };
        assert!(huge.validate().unwrap_err().field_errors().contains_key("price"));
    }

    #[test]
    fn test_cannot_reparent() {
        let result = serde_json::from_value::<UpdateServiceRequest>(serde_json::json!({
            "price": 15000,
            "businessId": 7
        }));
        assert!(result.is_err());
    }
}
