use crate::entities::BusinessType;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "discount_type")]
#[serde(rename_all = "kebab-case")]
pub enum DiscountType {
    /// `discount_value` is a percentage (0-100)
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// `discount_value` is an amount in kuruş
    #[sea_orm(string_value = "fixed_amount")]
    FixedAmount,
    /// Booking becomes free; `gift_service_id` is granted
    #[sea_orm(string_value = "gift_service")]
    GiftService,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::FixedAmount => write!(f, "fixed-amount"),
            DiscountType::GiftService => write!(f, "gift-service"),
        }
    }
}

/// Discount code.
///
/// The three `applicable_*` columns hold JSON arrays; a missing or empty
/// array leaves that dimension unrestricted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
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
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub applicable_business_types: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub applicable_service_ids: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub applicable_business_ids: Option<Json>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn business_types(&self) -> Vec<BusinessType> {
        decode_list(&self.applicable_business_types)
    }

    pub fn service_ids(&self) -> Vec<i64> {
        decode_list(&self.applicable_service_ids)
    }

    pub fn business_ids(&self) -> Vec<i64> {
        decode_list(&self.applicable_business_ids)
    }

    /// `true` once the global cap is reached.
    pub fn is_exhausted(&self) -> bool {
        match self.max_uses {
            None => false,
            Some(max) => self.used_count >= max,
        }
    }
}

fn decode_list<T: serde::de::DeserializeOwned>(value: &Option<Json>) -> Vec<T> {
    match value {
        Some(json) => match serde_json::from_value::<Vec<T>>(json.clone()) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Ignoring malformed coupon applicability list {json}: {e}");
                Vec::new()
            }
        },
        None => Vec::new(),
    }
}

/// Encode an applicability list; empty lists are stored as NULL.
pub fn encode_list<T: Serialize>(list: &[T]) -> Option<Json> {
    if list.is_empty() {
        None
    } else {
        serde_json::to_value(list).ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
