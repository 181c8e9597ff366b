use super::ServiceResponse;
use crate::entities::{BusinessType, Weekday, business_entity as businesses};
use crate::rules::DaySchedule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Sort keys accepted by the business list.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, ToSchema)]
pub enum BusinessSort {
    #[serde(rename = "rating")]
    RatingAsc,
    #[default]
    #[serde(rename = "-rating")]
    RatingDesc,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "reviews")]
    Reviews,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BusinessListQuery {
    /// Matches city, district or address
    pub location: Option<String>,
    pub category: Option<BusinessType>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Minimum average rating
    pub rating: Option<f64>,
    pub sort: Option<BusinessSort>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Admin only
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct IncludeInactiveQuery {
    /// Honoured for the owner and admins only
    pub include_inactive: Option<bool>,
}

/// One weekday of a working-hours payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHoursDto {
    pub day_of_week: Weekday,
    pub is_open: bool,
    /// `HH:MM`
    pub open_time: Option<String>,
    /// `HH:MM`
    pub close_time: Option<String>,
}

impl From<&DaySchedule> for WorkingHoursDto {
    fn from(d: &DaySchedule) -> Self {
        Self {
            day_of_week: d.day,
            is_open: d.is_open,
            open_time: d.open_time(),
            close_time: d.close_time(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkingHoursRequest {
    #[validate(length(max = 7, message = "At most one entry per weekday"))]
    pub working_hours: Vec<WorkingHoursDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,
    pub business_type: BusinessType,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    #[validate(length(min = 5, max = 500, message = "Address must be 5-500 characters"))]
    pub address: String,
    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Defaults to Monday-Saturday 09:00-18:00
    pub working_hours: Option<Vec<WorkingHoursDto>>,
    /// Admin only: create on behalf of another account
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,
    pub business_type: Option<BusinessType>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    #[validate(length(min = 5, max = 500, message = "Address must be 5-500 characters"))]
    pub address: Option<String>,
    #[validate(length(min = 2, max = 100))]
    pub city: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Admin only
    pub is_active: Option<bool>,
    /// Admin only
    pub owner_id: Option<i64>,
}

impl UpdateBusinessRequest {
    pub fn touches_admin_fields(&self) -> bool {
        self.is_active.is_some() || self.owner_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessResponse {
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
}

impl From<businesses::Model> for BusinessResponse {
    fn from(m: businesses::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            name: m.name,
            business_type: m.business_type,
            description: m.description,
            phone: m.phone,
            email: m.email,
            website: m.website,
            address: m.address,
            city: m.city,
            district: m.district,
            latitude: m.latitude,
            longitude: m.longitude,
            is_active: m.is_active,
            average_rating: m.average_rating,
            review_count: m.review_count,
            created_at: m.created_at,
        }
    }
}

/// Business page: profile, the full week and the active catalogue.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetailResponse {
    #[serde(flatten)]
    pub business: BusinessResponse,
    pub working_hours: Vec<WorkingHoursDto>,
    pub services: Vec<ServiceResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_spellings() {
        let q: BusinessListQuery = serde_json::from_value(serde_json::json!({
            "sort": "-rating",
            "category": "car-wash",
            "includeInactive": true
        }))
        .unwrap();
        assert_eq!(q.sort, Some(BusinessSort::RatingDesc));
        assert_eq!(q.category, Some(BusinessType::CarWash));
        assert_eq!(q.include_inactive, Some(true));
        assert!(serde_json::from_value::<BusinessSort>(serde_json::json!("cheapest")).is_err());
    }

    #[test]
    fn test_create_business_validation() {
        let req: CreateBusinessRequest = serde_json::from_value(serde_json::json!({
            "name": "Köpük Oto Yıkama",
            "businessType": "car-wash",
            "address": "Bağdat Cad. No:12",
            "city": "İstanbul",
            "latitude": 40.96,
            "longitude": 29.07
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let bad = CreateBusinessRequest {
            website: Some("not a url".into()),
            email: Some("nope".into()),
            ..req
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("website"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let result = serde_json::from_value::<UpdateBusinessRequest>(serde_json::json!({
            "name": "New name",
            "averageRating": 5.0
        }));
        assert!(result.is_err());
    }
}
