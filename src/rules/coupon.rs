//! Coupon evaluation. Pure: never touches usage counters.

use crate::entities::{
    DiscountType, business_entity as businesses, coupon_entity as coupons,
    service_entity as services,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Coupon not found")]
    NotFound,
    #[error("This coupon is no longer active")]
    Inactive,
    #[error("This coupon is not valid yet")]
    NotYetValid,
    #[error("This coupon has expired")]
    Expired,
    #[error("Order amount is below the coupon minimum of {minimum}")]
    BelowMinimum { minimum: i64 },
    #[error("This coupon has reached its usage limit")]
    UsageExceeded,
    #[error("This coupon cannot be used for this service")]
    NotApplicable,
}

/// What the coupon is being applied to.
#[derive(Debug, Clone)]
pub struct CouponContext<'a> {
    pub business: &'a businesses::Model,
    pub service: &'a services::Model,
    /// In kuruş
    pub order_amount: i64,
    /// Caller already has a recorded usage of this coupon
    pub already_used_by_caller: bool,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub coupon_id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    /// Percentage or kuruş, depending on `discount_type`
    pub discount: i64,
    pub original_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub gift_service_id: Option<i64>,
}

pub fn evaluate_coupon(
    coupon: Option<&coupons::Model>,
    ctx: &CouponContext<'_>,
) -> Result<CouponQuote, CouponError> {
    let coupon = coupon.ok_or(CouponError::NotFound)?;

    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }
    if ctx.now < coupon.valid_from {
        return Err(CouponError::NotYetValid);
    }
    if ctx.now > coupon.valid_until {
        return Err(CouponError::Expired);
    }
    if ctx.order_amount < coupon.minimum_amount {
        return Err(CouponError::BelowMinimum {
            minimum: coupon.minimum_amount,
        });
    }
    if coupon.is_exhausted() || (coupon.single_use_per_user && ctx.already_used_by_caller) {
        return Err(CouponError::UsageExceeded);
    }
    if !is_applicable(coupon, ctx.business, ctx.service) {
        return Err(CouponError::NotApplicable);
    }

    let final_amount = apply_discount(coupon.discount_type, coupon.discount_value, ctx.order_amount);
    let gift_service_id = match coupon.discount_type {
        DiscountType::GiftService => coupon.gift_service_id,
        _ => None,
    };

    Ok(CouponQuote {
        coupon_id: coupon.id,
        code: coupon.code.clone(),
        discount_type: coupon.discount_type,
        discount: coupon.discount_value,
        original_amount: ctx.order_amount,
        discount_amount: ctx.order_amount - final_amount,
        final_amount,
        gift_service_id,
    })
}

/// Largest order amount accepted anywhere, in kuruş (10 billion lira).
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amount left to pay, never below zero.
pub fn apply_discount(discount_type: DiscountType, value: i64, amount: i64) -> i64 {
    let discounted = match discount_type {
        DiscountType::Percentage => {
            let off = i128::from(amount) * i128::from(value) / 100;
            i64::try_from(i128::from(amount) - off).unwrap_or(0)
        }
        DiscountType::FixedAmount => amount.saturating_sub(value),
        DiscountType::GiftService => 0,
    };
    discounted.clamp(0, amount.max(0))
}

/// Empty lists place no restriction.
fn is_applicable(
    coupon: &coupons::Model,
    business: &businesses::Model,
    service: &services::Model,
) -> bool {
    let types = coupon.business_types();
    if !types.is_empty() && !types.contains(&business.business_type) {
        return false;
    }
    let service_ids = coupon.service_ids();
    if !service_ids.is_empty() && !service_ids.contains(&service.id) {
        return false;
    }
    let business_ids = coupon.business_ids();
    if !business_ids.is_empty() && !business_ids.contains(&business.id) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BusinessType;
    use crate::entities::coupons::encode_list;
    use chrono::Duration;

    fn business() -> businesses::Model {
        businesses::Model {
            id: 3,
            owner_id: 2,
            name: "Lastikçi Mehmet".into(),
            business_type: BusinessType::TireChange,
            description: None,
            phone: None,
            email: None,
            website: None,
            address: "Sanayi Sitesi 4. Blok".into(),
            city: "Ankara".into(),
            district: None,
            latitude: None,
            longitude: None,
            is_active: true,
            average_rating: 4.5,
            review_count: 10,
            created_at: None,
            updated_at: None,
        }
    }

    fn service() -> services::Model {
        services::Model {
            id: 30,
            business_id: 3,
            name: "Lastik değişimi".into(),
            description: None,
            price: 100,
            duration_minutes: 30,
            business_type: BusinessType::TireChange,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn coupon(discount_type: DiscountType, value: i64) -> coupons::Model {
        let now = Utc::now();
        coupons::Model {
            id: 1,
            code: "KIS2025".into(),
            description: None,
            discount_type,
            discount_value: value,
            gift_service_id: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            max_uses: None,
            used_count: 0,
            single_use_per_user: false,
            minimum_amount: 0,
            applicable_business_types: None,
            applicable_service_ids: None,
            applicable_business_ids: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn evaluate(c: &coupons::Model, amount: i64, used: bool) -> Result<CouponQuote, CouponError> {
        let b = business();
        let s = service();
        let ctx = CouponContext {
            business: &b,
            service: &s,
            order_amount: amount,
            already_used_by_caller: used,
            now: Utc::now(),
        };
        evaluate_coupon(Some(c), &ctx)
    }

    #[test]
    fn test_percentage_discount() {
        let quote = evaluate(&coupon(DiscountType::Percentage, 20), 100, false).unwrap();
        assert_eq!(quote.final_amount, 80);
        assert_eq!(quote.discount_amount, 20);
        assert_eq!(quote.code, "KIS2025");
    }

    #[test]
    fn test_fixed_discount() {
        let quote = evaluate(&coupon(DiscountType::FixedAmount, 30), 100, false).unwrap();
        assert_eq!(quote.final_amount, 70);
        assert_eq!(quote.discount_amount, 30);
    }

    #[test]
    fn test_discount_never_negative() {
        assert_eq!(apply_discount(DiscountType::FixedAmount, 500, 100), 0);
        assert_eq!(apply_discount(DiscountType::Percentage, 250, 100), 0);
        assert_eq!(apply_discount(DiscountType::Percentage, 0, 100), 100);
        assert_eq!(apply_discount(DiscountType::FixedAmount, 0, 0), 0);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let amount = 100_000_000_000_000_000;
        assert_eq!(
            apply_discount(DiscountType::Percentage, 100, amount),
            0
        );
        assert_eq!(
            apply_discount(DiscountType::Percentage, 10, amount),
            90_000_000_000_000_000
        );
        assert_eq!(
            apply_discount(DiscountType::Percentage, 50, i64::MAX),
            i64::MAX - i64::MAX / 2
        );
        assert_eq!(apply_discount(DiscountType::FixedAmount, i64::MAX, 0), 0);
    }

    #[test]
    fn test_gift_service() {
        let mut c = coupon(DiscountType::GiftService, 0);
        c.gift_service_id = Some(31);
        let quote = evaluate(&c, 100, false).unwrap();
        assert_eq!(quote.final_amount, 0);
        assert_eq!(quote.discount_amount, 100);
        assert_eq!(quote.gift_service_id, Some(31));
    }

    #[test]
    fn test_unknown_and_inactive() {
        let b = business();
        let s = service();
        let ctx = CouponContext {
            business: &b,
            service: &s,
            order_amount: 100,
            already_used_by_caller: false,
            now: Utc::now(),
        };
        assert_eq!(evaluate_coupon(None, &ctx), Err(CouponError::NotFound));

        let mut c = coupon(DiscountType::Percentage, 10);
        c.is_active = false;
        assert_eq!(evaluate(&c, 100, false), Err(CouponError::Inactive));
    }

    #[test]
    fn test_validity_window() {
        let mut expired = coupon(DiscountType::Percentage, 10);
        expired.valid_until = Utc::now() - Duration::minutes(1);
        assert_eq!(evaluate(&expired, 100, false), Err(CouponError::Expired));

        let mut future = coupon(DiscountType::Percentage, 10);
        future.valid_from = Utc::now() + Duration::days(1);
        assert_eq!(evaluate(&future, 100, false), Err(CouponError::NotYetValid));
    }

    #[test]
    fn test_minimum_amount() {
        let mut c = coupon(DiscountType::FixedAmount, 10);
        c.minimum_amount = 150;
        assert_eq!(
            evaluate(&c, 100, false),
            Err(CouponError::BelowMinimum { minimum: 150 })
        );
        assert!(evaluate(&c, 150, false).is_ok());
    }

    #[test]
    fn test_usage_caps() {
        let mut capped = coupon(DiscountType::Percentage, 10);
        capped.max_uses = Some(1);
        assert!(evaluate(&capped, 100, false).is_ok());
        capped.used_count = 1;
        assert_eq!(evaluate(&capped, 100, false), Err(CouponError::UsageExceeded));

        let mut single = coupon(DiscountType::Percentage, 10);
        single.single_use_per_user = true;
        assert!(evaluate(&single, 100, false).is_ok());
        assert_eq!(evaluate(&single, 100, true), Err(CouponError::UsageExceeded));

        // reuse is fine for multi-use coupons
        assert!(evaluate(&coupon(DiscountType::Percentage, 10), 100, true).is_ok());
    }

    #[test]
    fn test_applicability_filters() {
        let mut by_type = coupon(DiscountType::Percentage, 10);
        by_type.applicable_business_types = encode_list(&[BusinessType::CarWash]);
        assert_eq!(evaluate(&by_type, 100, false), Err(CouponError::NotApplicable));
        by_type.applicable_business_types =
            encode_list(&[BusinessType::CarWash, BusinessType::TireChange]);
        assert!(evaluate(&by_type, 100, false).is_ok());

        let mut by_service = coupon(DiscountType::Percentage, 10);
        by_service.applicable_service_ids = encode_list(&[31_i64]);
        assert_eq!(evaluate(&by_service, 100, false), Err(CouponError::NotApplicable));

        let mut by_business = coupon(DiscountType::Percentage, 10);
        by_business.applicable_business_ids = encode_list(&[3_i64]);
        assert!(evaluate(&by_business, 100, false).is_ok());
    }

    #[test]
    fn test_expired_wins_over_other_failures() {
        let mut c = coupon(DiscountType::Percentage, 10);
        c.valid_until = Utc::now() - Duration::days(1);
        c.max_uses = Some(1);
        c.used_count = 1;
        c.minimum_amount = 1_000;
        assert_eq!(evaluate(&c, 100, false), Err(CouponError::Expired));
    }
}
