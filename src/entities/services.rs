use crate::entities::BusinessType;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Bookable offering of a business. `price` is in kuruş.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_minutes: i32,
    /// Copy of the owning business's type, kept for filtering.
    pub business_type: BusinessType,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
