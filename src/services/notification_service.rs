use crate::entities::{
    NotificationType, UserRole, notification_entity as notifications, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    NotificationListResponse, NotificationQuery, NotificationResponse, PaginationInfo,
    PaginationParams,
};
use crate::services::paginate;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Message to write for one or more recipients.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<i64>,
}

#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
}

impl NotificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Own notifications, newest first, with the unread total.
    pub async fn list(
        &self,
        user_id: i64,
        query: &NotificationQuery,
    ) -> AppResult<(NotificationListResponse, PaginationInfo)> {
        let params = PaginationParams::new(query.page, query.limit)?;

        let mut select = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id);
        if query.unread_only.unwrap_or(false) {
            select = select.filter(notifications::Column::IsRead.eq(false));
        }

        let page = paginate(&self.pool, select, params).await?;
        let unread_count = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.pool)
            .await?;

        Ok((
            NotificationListResponse {
                notifications: page.items.into_iter().map(Into::into).collect(),
                unread_count,
            },
            page.pagination,
        ))
    }

    pub async fn mark_read(&self, user_id: i64, id: i64) -> AppResult<NotificationResponse> {
        let model = self.find_own(user_id, id).await?;
        if model.is_read {
            return Ok(model.into());
        }
        let mut am = model.into_active_model();
        am.is_read = Set(true);
        Ok(am.update(&self.pool).await?.into())
    }

    /// Returns how many rows changed.
    pub async fn mark_all_read(&self, user_id: i64) -> AppResult<u64> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<()> {
        let model = self.find_own(user_id, id).await?;
        notifications::Entity::delete_by_id(model.id)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    /// Write the same notification for every recipient (duplicates collapsed).
    pub async fn notify(&self, mut user_ids: Vec<i64>, note: &NewNotification) -> AppResult<()> {
        user_ids.sort_unstable();
        user_ids.dedup();
        if user_ids.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows = user_ids.into_iter().map(|user_id| notifications::ActiveModel {
            user_id: Set(user_id),
            title: Set(note.title.clone()),
            message: Set(note.message.clone()),
            notification_type: Set(note.notification_type),
            is_read: Set(false),
            related_id: Set(note.related_id),
            created_at: Set(Some(now)),
            ..Default::default()
        });
        notifications::Entity::insert_many(rows)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn active_admin_ids(&self) -> AppResult<Vec<i64>> {
        let ids = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Role.eq(UserRole::Admin))
            .filter(users::Column::IsActive.eq(true))
            .into_tuple::<i64>()
            .all(&self.pool)
            .await?;
        Ok(ids)
    }

    /// Best-effort delivery on a background task. Failures are logged only.
    pub fn spawn_notify(&self, user_ids: Vec<i64>, note: NewNotification, include_admins: bool) {
        let service = self.clone();
        tokio::spawn(async move {
            let mut recipients = user_ids;
            if include_admins {
                match service.active_admin_ids().await {
                    Ok(admins) => recipients.extend(admins),
                    Err(e) => log::warn!("Failed to load admins for notification: {e}"),
                }
            }
            if let Err(e) = service.notify(recipients, &note).await {
                log::warn!(
                    "Failed to write notification '{}' (related_id={:?}): {e}",
                    note.title,
                    note.related_id
                );
            }
        });
    }

    async fn find_own(&self, user_id: i64, id: i64) -> AppResult<notifications::Model> {
        notifications::Entity::find_by_id(id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }
}
