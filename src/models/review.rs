use crate::entities::review_entity as reviews;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    /// Completed appointment the review is about
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplyReviewRequest {
    #[validate(length(min = 1, max = 2000, message = "Reply must be 1-2000 characters"))]
    pub reply: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    /// Owner and admins only
    pub include_pending: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub appointment_id: Option<i64>,
    pub rating: i16,
    pub comment: Option<String>,
    pub reply: Option<String>,
    pub is_approved: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<reviews::Model> for ReviewResponse {
    fn from(m: reviews::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            business_id: m.business_id,
            appointment_id: m.appointment_id,
            rating: m.rating,
            comment: m.comment,
            reply: m.reply,
            is_approved: m.is_approved,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let req = CreateReviewRequest {
                rating,
                comment: None,
                appointment_id: None,
            };
            assert_eq!(req.validate().is_ok(), ok, "rating {rating}");
        }
    }
}
