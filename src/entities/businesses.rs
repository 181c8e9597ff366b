use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema, DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "business_type")]
#[serde(rename_all = "kebab-case")]
pub enum BusinessType {
    #[sea_orm(string_value = "car_wash")]
    CarWash,
    #[sea_orm(string_value = "inspection")]
    Inspection,
    #[sea_orm(string_value = "parking")]
    Parking,
    #[sea_orm(string_value = "tire_change")]
    TireChange,
    #[sea_orm(string_value = "other")]
    Other,
}

impl std::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusinessType::CarWash => write!(f, "car-wash"),
            BusinessType::Inspection => write!(f, "inspection"),
            BusinessType::Parking => write!(f, "parking"),
            BusinessType::TireChange => write!(f, "tire-change"),
            BusinessType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for BusinessType {
    type Err = String;

    /// Accepts both the wire spelling (`car-wash`) and the column spelling (`car_wash`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").as_str() {
            "car-wash" => Ok(BusinessType::CarWash),
            "inspection" => Ok(BusinessType::Inspection),
            "parking" => Ok(BusinessType::Parking),
            "tire-change" => Ok(BusinessType::TireChange),
            "other" => Ok(BusinessType::Other),
            other => Err(format!("unknown business type: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub business_type: BusinessType,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: String,
    pub city: String,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
