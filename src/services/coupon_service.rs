use crate::entities::{
    DiscountType, business_entity as businesses, coupon_entity as coupons,
    coupon_usage_entity as coupon_usages, service_entity as services,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CouponListQuery, CouponResponse, CreateCouponRequest, Page, PaginationParams,
    UpdateCouponRequest, ValidateCouponRequest,
};
use crate::rules::{CouponContext, CouponError, CouponQuote, evaluate_coupon};
use crate::services::{find_business, like_pattern, paginate};
use crate::utils::generate_coupon_code;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use validator::Validate;

const GENERATED_CODE_LEN: usize = 8;

#[derive(Clone)]
pub struct CouponService {
    pool: DatabaseConnection,
}

impl CouponService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Price a booking with a coupon without consuming it.
    pub async fn validate_for(
        &self,
        user_id: i64,
        request: ValidateCouponRequest,
    ) -> AppResult<CouponQuote> {
        request.validate()?;

        let business = find_business(&self.pool, request.business_id).await?;
        let service = services::Entity::find_by_id(request.service_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        if service.business_id != business.id {
            return Err(AppError::ValidationError(
                "Service does not belong to this business".to_string(),
            ));
        }

        let amount = request.amount.unwrap_or(service.price);
        quote(
            &self.pool,
            &request.code,
            user_id,
            &business,
            &service,
            amount,
            Utc::now(),
        )
        .await
    }

    pub async fn list(&self, query: &CouponListQuery) -> AppResult<Page<CouponResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;

        let mut select = coupons::Entity::find().order_by_desc(coupons::Column::CreatedAt);
        if let Some(is_active) = query.is_active {
            select = select.filter(coupons::Column::IsActive.eq(is_active));
        }
        if let Some(pattern) = query.search.as_deref().and_then(like_pattern) {
            select = select.filter(Expr::expr(Func::lower(Expr::col(coupons::Column::Code))).like(pattern));
        }

        Ok(paginate(&self.pool, select, params).await?.map(Into::into))
    }

    pub async fn get(&self, id: i64) -> AppResult<CouponResponse> {
        Ok(self.find_coupon(id).await?.into())
    }

    pub async fn create(&self, request: CreateCouponRequest) -> AppResult<CouponResponse> {
        request.validate()?;
        check_terms(
            request.discount_type,
            request.discount_value,
            request.valid_from,
            request.valid_until,
        )?;
        self.check_gift_service(request.discount_type, request.gift_service_id)
            .await?;

        let code = match request.code {
            Some(code) => code.trim().to_string(),
            None => self.unused_code().await?,
        };
        if self.code_exists(&code).await? {
            return Err(AppError::Conflict(format!("Coupon code {code} already exists")));
        }

        let now = Utc::now();
        let coupon = coupons::ActiveModel {
            code: Set(code),
            description: Set(request.description),
            discount_type: Set(request.discount_type),
            discount_value: Set(request.discount_value),
            gift_service_id: Set(request.gift_service_id),
            valid_from: Set(request.valid_from),
            valid_until: Set(request.valid_until),
            max_uses: Set(request.max_uses),
            used_count: Set(0),
            single_use_per_user: Set(request.single_use_per_user),
            minimum_amount: Set(request.minimum_amount),
            applicable_business_types: Set(coupons::encode_list(&request.applicable_business_types)),
            applicable_service_ids: Set(coupons::encode_list(&request.applicable_service_ids)),
            applicable_business_ids: Set(coupons::encode_list(&request.applicable_business_ids)),
            is_active: Set(true),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Coupon created: id={} code={}", coupon.id, coupon.code);
        Ok(coupon.into())
    }

    pub async fn update(&self, id: i64, request: UpdateCouponRequest) -> AppResult<CouponResponse> {
        request.validate()?;
        let coupon = self.find_coupon(id).await?;

        let discount_type = request.discount_type.unwrap_or(coupon.discount_type);
        let gift_service_id = request.gift_service_id.or(coupon.gift_service_id);
        check_terms(
            discount_type,
            request.discount_value.unwrap_or(coupon.discount_value),
            request.valid_from.unwrap_or(coupon.valid_from),
            request.valid_until.unwrap_or(coupon.valid_until),
        )?;
        self.check_gift_service(discount_type, gift_service_id)
            .await?;

        let mut am = coupon.into_active_model();
        if let Some(v) = request.description {
            am.description = Set(Some(v));
        }
        if let Some(v) = request.discount_type {
            am.discount_type = Set(v);
        }
        if let Some(v) = request.discount_value {
            am.discount_value = Set(v);
        }
        if let Some(v) = request.gift_service_id {
            am.gift_service_id = Set(Some(v));
        }
        if let Some(v) = request.valid_from {
            am.valid_from = Set(v);
        }
        if let Some(v) = request.valid_until {
            am.valid_until = Set(v);
        }
        if let Some(v) = request.max_uses {
            am.max_uses = Set(Some(v));
        }
        if let Some(v) = request.single_use_per_user {
            am.single_use_per_user = Set(v);
        }
        if let Some(v) = request.minimum_amount {
            am.minimum_amount = Set(v);
        }
        if let Some(v) = request.applicable_business_types {
            am.applicable_business_types = Set(coupons::encode_list(&v));
        }
        if let Some(v) = request.applicable_service_ids {
            am.applicable_service_ids = Set(coupons::encode_list(&v));
        }
        if let Some(v) = request.applicable_business_ids {
            am.applicable_business_ids = Set(coupons::encode_list(&v));
        }
        if let Some(v) = request.is_active {
            am.is_active = Set(v);
        }
        am.updated_at = Set(Some(Utc::now()));

        Ok(am.update(&self.pool).await?.into())
    }

    /// Soft delete.
    pub async fn deactivate(&self, id: i64) -> AppResult<()> {
        let coupon = self.find_coupon(id).await?;
        let mut am = coupon.into_active_model();
        am.is_active = Set(false);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn find_coupon(&self, id: i64) -> AppResult<coupons::Model> {
        coupons::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let count = coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn unused_code(&self) -> AppResult<String> {
        for _ in 0..5 {
            let code = generate_coupon_code(GENERATED_CODE_LEN);
            if !self.code_exists(&code).await? {
                return Ok(code);
            }
        }
        Err(AppError::InternalError(
            "Could not generate a unique coupon code".to_string(),
        ))
    }

    async fn check_gift_service(
        &self,
        discount_type: DiscountType,
        gift_service_id: Option<i64>,
    ) -> AppResult<()> {
        if discount_type != DiscountType::GiftService {
            return Ok(());
        }
        let id = gift_service_id.ok_or_else(|| {
            AppError::ValidationError("Gift coupons need a giftServiceId".to_string())
        })?;
        services::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gift service not found".to_string()))?;
        Ok(())
    }
}

/// Evaluate `code` for `user_id` against a business/service pair.
pub(crate) async fn quote<C: ConnectionTrait>(
    db: &C,
    code: &str,
    user_id: i64,
    business: &businesses::Model,
    service: &services::Model,
    amount: i64,
    now: DateTime<Utc>,
) -> AppResult<CouponQuote> {
    let coupon = coupons::Entity::find()
        .filter(coupons::Column::Code.eq(code.trim()))
        .one(db)
        .await?;

    let already_used_by_caller = match &coupon {
        Some(c) => {
            coupon_usages::Entity::find()
                .filter(coupon_usages::Column::CouponId.eq(c.id))
                .filter(coupon_usages::Column::UserId.eq(user_id))
                .count(db)
                .await?
                > 0
        }
        None => false,
    };

    let ctx = CouponContext {
        business,
        service,
        order_amount: amount,
        already_used_by_caller,
        now,
    };
    Ok(evaluate_coupon(coupon.as_ref(), &ctx)?)
}

/// Count one use of a coupon. Must run inside the booking transaction.
///
/// The coupon row is locked first, so concurrent bookings with the same code
/// queue up here and each sees the usages committed before it. The per-user
/// check and the capped increment are repeated under that lock.
pub(crate) async fn commit_usage<C: ConnectionTrait>(
    db: &C,
    coupon_id: i64,
    user_id: i64,
    appointment_id: i64,
) -> AppResult<()> {
    let coupon = coupons::Entity::find_by_id(coupon_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(CouponError::NotFound)?;

    if coupon.single_use_per_user {
        let used = coupon_usages::Entity::find()
            .filter(coupon_usages::Column::CouponId.eq(coupon_id))
            .filter(coupon_usages::Column::UserId.eq(user_id))
            .count(db)
            .await?;
        if used > 0 {
            return Err(CouponError::UsageExceeded.into());
        }
    }

    let result = coupons::Entity::update_many()
        .col_expr(
            coupons::Column::UsedCount,
            Expr::col(coupons::Column::UsedCount).add(1),
        )
        .filter(coupons::Column::Id.eq(coupon_id))
        .filter(
            Condition::any()
                .add(coupons::Column::MaxUses.is_null())
                .add(Expr::col(coupons::Column::UsedCount).lt(Expr::col(coupons::Column::MaxUses))),
        )
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(CouponError::UsageExceeded.into());
    }

    coupon_usages::ActiveModel {
        coupon_id: Set(coupon_id),
        user_id: Set(user_id),
        appointment_id: Set(Some(appointment_id)),
        used_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

fn check_terms(
    discount_type: DiscountType,
    value: i64,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> AppResult<()> {
    if valid_from >= valid_until {
        return Err(AppError::ValidationError(
            "validFrom must be before validUntil".to_string(),
        ));
    }
    if discount_type == DiscountType::Percentage && !(0..=100).contains(&value) {
        return Err(AppError::ValidationError(
            "Percentage discounts must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait, Value};
    use std::collections::BTreeMap;

    fn coupon(max_uses: Option<i32>, used_count: i32, single_use_per_user: bool) -> coupons::Model {
        coupons::Model {
            id: 3,
            code: "KIS2025".into(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: 20,
            gift_service_id: None,
            valid_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2035, 1, 1, 0, 0, 0).unwrap(),
            max_uses,
            used_count,
            single_use_per_user,
            minimum_amount: 0,
            applicable_business_types: None,
            applicable_service_ids: None,
            applicable_business_ids: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn usage_count(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn log_text(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_commit_usage_counts_and_records() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(Some(5), 1, false)]])
            .append_query_results([vec![coupon_usages::Model {
                id: 1,
                coupon_id: 3,
                user_id: 9,
                appointment_id: Some(40),
                used_at: None,
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let txn = db.begin().await.unwrap();
        commit_usage(&txn, 3, 9, 40).await.unwrap();
        txn.commit().await.unwrap();

        let log = log_text(db);
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("UPDATE \\\"coupons\\\""));
        assert!(log.contains("INSERT INTO"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_commit_usage_fails_when_cap_was_reached_meanwhile() {
        // validated while 0/1 were used, another booking took the last use
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(Some(1), 1, false)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = {
            let txn = db.begin().await.unwrap();
            commit_usage(&txn, 3, 9, 40).await
        };
        assert!(matches!(
            result,
            Err(AppError::Coupon(CouponError::UsageExceeded))
        ));

        let log = log_text(db);
        assert!(!log.contains("INSERT"));
        assert!(!log.contains("COMMIT"));
        assert!(log.contains("ROLLBACK"));
    }

    #[tokio::test]
    async fn test_commit_usage_rechecks_single_use_under_lock() {
        // uncapped coupon; a parallel booking by the same user committed first
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(None, 1, true)]])
            .append_query_results([vec![usage_count(1)]])
            .into_connection();

        let result = {
            let txn = db.begin().await.unwrap();
            commit_usage(&txn, 3, 9, 41).await
        };
        assert!(matches!(
            result,
            Err(AppError::Coupon(CouponError::UsageExceeded))
        ));

        let log = log_text(db);
        assert!(!log.contains("UPDATE \\\"coupons\\\""));
        assert!(!log.contains("INSERT"));
        assert!(log.contains("ROLLBACK"));
    }

    #[test]
    fn test_check_terms() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert!(check_terms(DiscountType::Percentage, 20, from, until).is_ok());
        assert!(check_terms(DiscountType::Percentage, 120, from, until).is_err());
        assert!(check_terms(DiscountType::FixedAmount, 5_000, from, until).is_ok());
        assert!(check_terms(DiscountType::FixedAmount, 5_000, until, from).is_err());
    }
}
