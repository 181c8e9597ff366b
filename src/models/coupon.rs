use crate::entities::{BusinessType, DiscountType, coupon_entity as coupons};
use crate::rules::MAX_AMOUNT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[validate(length(min = 1, max = 50, message = "Coupon code is required"))]
    pub code: String,
    pub business_id: i64,
    pub service_id: i64,
    /// Order amount in kuruş; defaults to the service price
    #[validate(range(min = 0, max = MAX_AMOUNT, message = "Amount is out of range"))]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    /// Generated when omitted
    #[validate(length(min = 3, max = 50, message = "Code must be 3-50 characters"))]
    pub code: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Percent (0-100) or kuruş
    #[validate(range(min = 0))]
    pub discount_value: i64,
    pub gift_service_id: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    #[serde(default)]
    pub single_use_per_user: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_AMOUNT))]
    pub minimum_amount: i64,
    #[serde(default)]
    pub applicable_business_types: Vec<BusinessType>,
    #[serde(default)]
    pub applicable_service_ids: Vec<i64>,
    #[serde(default)]
    pub applicable_business_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCouponRequest {
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(min = 0))]
    pub discount_value: Option<i64>,
    pub gift_service_id: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub single_use_per_user: Option<bool>,
    #[validate(range(min = 0))]
    pub minimum_amount: Option<i64>,
    pub applicable_business_types: Option<Vec<BusinessType>>,
    pub applicable_service_ids: Option<Vec<i64>>,
    pub applicable_business_ids: Option<Vec<i64>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CouponListQuery {
    pub is_active: Option<bool>,
    /// Substring of the code
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub gift_service_id: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub single_use_per_user: bool,
    pub minimum_amount: i64,
    pub applicable_business_types: Vec<BusinessType>,
    pub applicable_service_ids: Vec<i64>,
    pub applicable_business_ids: Vec<i64>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<coupons::Model> for CouponResponse {
    fn from(m: coupons::Model) -> Self {
        Self {
            applicable_business_types: m.business_types(),
            applicable_service_ids: m.service_ids(),
            applicable_business_ids: m.business_ids(),
            id: m.id,
            code: m.code,
            description: m.description,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            gift_service_id: m.gift_service_id,
            valid_from: m.valid_from,
            valid_until: m.valid_until,
            max_uses: m.max_uses,
            used_count: m.used_count,
            single_use_per_user: m.single_use_per_user,
            minimum_amount: m.minimum_amount,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_coupon_defaults() {
        let req: CreateCouponRequest = serde_json::from_value(serde_json::json!({
            "discountType": "percentage",
            "discountValue": 20,
            "validFrom": "2025-01-01T00:00:00Z",
            "validUntil": "2025-12-31T23:59:59Z",
            "applicableBusinessTypes": ["car-wash", "tire-change"]
        }))
        .unwrap();
        assert!(req.code.is_none());
        assert!(!req.single_use_per_user);
        assert_eq!(req.minimum_amount, 0);
        assert_eq!(
            req.applicable_business_types,
            vec![BusinessType::CarWash, BusinessType::TireChange]
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_amount_is_bounded() {
        let mut req = ValidateCouponRequest {
            code: "KIS2025".into(),
            business_id: 1,
            service_id: 1,
            amount: Some(MAX_AMOUNT),
        };
        assert!(req.validate().is_ok());

        req.amount = Some(100_000_000_000_000_000);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }
}
