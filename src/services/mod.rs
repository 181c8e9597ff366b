pub mod admin_service;
pub mod appointment_service;
pub mod auth_service;
pub mod business_service;
pub mod catalog_service;
pub mod coupon_service;
pub mod notification_service;
pub mod review_service;
pub mod user_service;

pub use admin_service::*;
pub use appointment_service::*;
pub use auth_service::*;
pub use business_service::*;
pub use catalog_service::*;
pub use coupon_service::*;
pub use notification_service::*;
pub use review_service::*;
pub use user_service::*;

use crate::error::AppResult;
use crate::models::{Page, PaginationParams};
use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select,
};

/// Run `query` for one page and count the full result set.
pub(crate) async fn paginate<E>(
    pool: &DatabaseConnection,
    query: Select<E>,
    params: PaginationParams,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'static,
{
    let total = query.clone().count(pool).await?;
    let items = query
        .limit(params.limit)
        .offset(params.offset())
        .all(pool)
        .await?;
    Ok(Page {
        items,
        pagination: params.info(total),
    })
}

/// `%term%` for a case-insensitive LIKE against a lowered column.
pub(crate) fn like_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        None
    } else {
        Some(format!("%{}%", term.to_lowercase()))
    }
}
