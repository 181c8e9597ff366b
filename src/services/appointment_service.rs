use crate::entities::{
    AppointmentStatus, NotificationType, appointment_entity as appointments,
    business_entity as businesses, service_entity as services,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use crate::models::{
    AdminAppointmentQuery, AppointmentListQuery, AppointmentResponse, CreateAppointmentRequest,
    Page, PaginationParams, UpdateAppointmentRequest,
};
use crate::rules::{Actor, AppointmentChange, BookingError, authorize_change, validate_booking};
use crate::services::{
    NewNotification, NotificationService, commit_usage, ensure_manager, find_business, load_hours,
    paginate, quote,
};
use crate::utils::{MarketClock, format_hhmm, parse_date, parse_hhmm};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
};
use validator::Validate;

#[derive(Clone)]
pub struct AppointmentService {
    pool: DatabaseConnection,
    notifications: NotificationService,
    clock: MarketClock,
}

impl AppointmentService {
    pub fn new(
        pool: DatabaseConnection,
        notifications: NotificationService,
        clock: MarketClock,
    ) -> Self {
        Self {
            pool,
            notifications,
            clock,
        }
    }

    /// Book a slot.
    ///
    /// The slot is validated against the business' hours in local time. A
    /// coupon is priced first and its usage is counted in the same
    /// transaction that inserts the appointment. Notifications go out after
    /// commit and never fail the booking.
    pub async fn create(
        &self,
        caller: CurrentUser,
        request: CreateAppointmentRequest,
    ) -> AppResult<AppointmentResponse> {
        request.validate()?;
        let date = require_date(&request.date)?;
        let time = require_time(&request.time)?;

        let business = businesses::Entity::find_by_id(request.business_id)
            .one(&self.pool)
            .await?;
        let service = services::Entity::find_by_id(request.service_id)
            .one(&self.pool)
            .await?;
        let hours = match &business {
            Some(b) => load_hours(&self.pool, b.id).await?,
            None => Vec::new(),
        };

        let approval = validate_booking(
            business.as_ref(),
            service.as_ref(),
            &hours,
            date.and_time(time),
            self.clock.now(),
        )?;
        let business = business.ok_or(BookingError::BusinessNotFound)?;
        let service = service.ok_or(BookingError::ServiceNotFound)?;

        let coupon_code = request
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let coupon_quote = match coupon_code {
            Some(code) => Some(
                quote(
                    &self.pool,
                    code,
                    caller.id,
                    &business,
                    &service,
                    service.price,
                    Utc::now(),
                )
                .await?,
            ),
            None => None,
        };
        let (discount_amount, final_price) = coupon_quote
            .as_ref()
            .map(|q| (q.discount_amount, q.final_amount))
            .unwrap_or((0, service.price));

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let appointment = appointments::ActiveModel {
            user_id: Set(caller.id),
            business_id: Set(approval.business_id),
            service_id: Set(approval.service_id),
            appointment_date: Set(approval.scheduled_for.date()),
            appointment_time: Set(format_hhmm(approval.scheduled_for.time())),
            status: Set(AppointmentStatus::Pending),
            notes: Set(request.notes),
            cancel_reason: Set(None),
            price: Set(service.price),
            discount_amount: Set(discount_amount),
            final_price: Set(final_price),
            coupon_id: Set(coupon_quote.as_ref().map(|q| q.coupon_id)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        if let Some(q) = &coupon_quote {
            commit_usage(&txn, q.coupon_id, caller.id, appointment.id).await?;
        }
        txn.commit().await?;

        log::info!(
            "Appointment booked: id={} user_id={} business_id={} at {} {} final_price={}",
            appointment.id,
            caller.id,
            business.id,
            appointment.appointment_date,
            appointment.appointment_time,
            appointment.final_price
        );

        self.notifications.spawn_notify(
            vec![business.owner_id],
            NewNotification {
                title: "New appointment".to_string(),
                message: format!(
                    "{} booked for {} at {}",
                    service.name, appointment.appointment_date, appointment.appointment_time
                ),
                notification_type: NotificationType::Appointment,
                related_id: Some(appointment.id),
            },
            true,
        );

        Ok(appointment.into())
    }

    pub async fn list_own(
        &self,
        caller: CurrentUser,
        query: &AppointmentListQuery,
    ) -> AppResult<Page<AppointmentResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;
        let select = appointments::Entity::find()
            .filter(appointments::Column::UserId.eq(caller.id));
        let select = filter_status_and_date(select, query)?;
        Ok(paginate(&self.pool, newest_first(select), params)
            .await?
            .map(Into::into))
    }

    /// Visible to the booker, the business owner and admins.
    pub async fn get(&self, caller: CurrentUser, id: i64) -> AppResult<AppointmentResponse> {
        let appointment = self.find_appointment(id).await?;
        let business = find_business(&self.pool, appointment.business_id).await?;
        let actor = Actor::resolve(
            caller.id,
            caller.role,
            appointment.user_id,
            business.owner_id,
        );
        if !actor.can_view() {
            return Err(AppError::forbidden());
        }
        Ok(appointment.into())
    }

    /// Apply a role-checked change. Nothing is written unless the whole
    /// change is allowed.
    pub async fn update(
        &self,
        caller: CurrentUser,
        id: i64,
        request: UpdateAppointmentRequest,
    ) -> AppResult<AppointmentResponse> {
        request.validate()?;
        let appointment = self.find_appointment(id).await?;
        let business = find_business(&self.pool, appointment.business_id).await?;
        let actor = Actor::resolve(
            caller.id,
            caller.role,
            appointment.user_id,
            business.owner_id,
        );

        let change = AppointmentChange {
            status: request.status,
            notes: request.notes.is_some(),
            cancel_reason: request.cancel_reason.is_some(),
            schedule: request.date.is_some() || request.time.is_some(),
        };
        authorize_change(actor, appointment.status, &change)?;

        let reschedule = if change.schedule {
            let date = match request.date.as_deref() {
                Some(d) => require_date(d)?,
                None => appointment.appointment_date,
            };
            let time = match request.time.as_deref() {
                Some(t) => require_time(t)?,
                None => stored_time(&appointment)?,
            };
            let service = services::Entity::find_by_id(appointment.service_id)
                .one(&self.pool)
                .await?;
            let hours = load_hours(&self.pool, business.id).await?;
            let approval = validate_booking(
                Some(&business),
                service.as_ref(),
                &hours,
                date.and_time(time),
                self.clock.now(),
            )?;
            Some(approval.scheduled_for)
        } else {
            None
        };

        let previous = appointment.status;
        let booker_id = appointment.user_id;
        let new_status = request.status.filter(|s| *s != previous);

        let mut am = appointment.into_active_model();
        if let Some(status) = new_status {
            am.status = Set(status);
        }
        if let Some(notes) = request.notes {
            am.notes = Set(Some(notes));
        }
        if let Some(reason) = request.cancel_reason {
            am.cancel_reason = Set(Some(reason));
        }
        if let Some(at) = reschedule {
            am.appointment_date = Set(at.date());
            am.appointment_time = Set(format_hhmm(at.time()));
        }
        am.updated_at = Set(Some(Utc::now()));

        // only if nobody moved the status since it was authorized
        let result = appointments::Entity::update_many()
            .set(am)
            .filter(appointments::Column::Id.eq(id))
            .filter(appointments::Column::Status.eq(previous))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict(
                "Appointment was changed by someone else, reload and try again".to_string(),
            ));
        }
        let updated = self.find_appointment(id).await?;

        if let Some(status) = new_status {
            log::info!(
                "Appointment {} {} -> {} by user {}",
                updated.id,
                previous,
                status,
                caller.id
            );
            // tell the other side
            let recipient = if caller.id == booker_id {
                business.owner_id
            } else {
                booker_id
            };
            self.notifications.spawn_notify(
                vec![recipient],
                NewNotification {
                    title: "Appointment updated".to_string(),
                    message: format!(
                        "Appointment on {} at {} is now {}",
                        updated.appointment_date, updated.appointment_time, status
                    ),
                    notification_type: NotificationType::Appointment,
                    related_id: Some(updated.id),
                },
                false,
            );
        }

        Ok(updated.into())
    }

    /// Owner of the business or an admin.
    pub async fn list_for_business(
        &self,
        caller: CurrentUser,
        business_id: i64,
        query: &AppointmentListQuery,
    ) -> AppResult<Page<AppointmentResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;
        let business = find_business(&self.pool, business_id).await?;
        ensure_manager(caller, &business)?;

        let select = appointments::Entity::find()
            .filter(appointments::Column::BusinessId.eq(business.id));
        let select = filter_status_and_date(select, query)?;
        Ok(paginate(&self.pool, newest_first(select), params)
            .await?
            .map(Into::into))
    }

    pub async fn list_all(
        &self,
        query: &AdminAppointmentQuery,
    ) -> AppResult<Page<AppointmentResponse>> {
        let params = PaginationParams::new(query.page, query.limit)?;

        let mut select = appointments::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(appointments::Column::Status.eq(status));
        }
        if let Some(business_id) = query.business_id {
            select = select.filter(appointments::Column::BusinessId.eq(business_id));
        }
        if let Some(user_id) = query.user_id {
            select = select.filter(appointments::Column::UserId.eq(user_id));
        }
        if let Some(from) = optional_date(query.from.as_deref())? {
            select = select.filter(appointments::Column::AppointmentDate.gte(from));
        }
        if let Some(to) = optional_date(query.to.as_deref())? {
            select = select.filter(appointments::Column::AppointmentDate.lte(to));
        }

        Ok(paginate(&self.pool, newest_first(select), params)
            .await?
            .map(Into::into))
    }

    async fn find_appointment(&self, id: i64) -> AppResult<appointments::Model> {
        appointments::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
    }
}

fn filter_status_and_date(
    mut select: Select<appointments::Entity>,
    query: &AppointmentListQuery,
) -> AppResult<Select<appointments::Entity>> {
    if let Some(status) = query.status {
        select = select.filter(appointments::Column::Status.eq(status));
    }
    if let Some(date) = optional_date(query.date.as_deref())? {
        select = select.filter(appointments::Column::AppointmentDate.eq(date));
    }
    Ok(select)
}

fn newest_first(select: Select<appointments::Entity>) -> Select<appointments::Entity> {
    select
        .order_by_desc(appointments::Column::AppointmentDate)
        .order_by_desc(appointments::Column::AppointmentTime)
        .order_by_desc(appointments::Column::Id)
}

fn require_date(value: &str) -> AppResult<NaiveDate> {
    parse_date(value).ok_or_else(|| {
        AppError::ValidationError(format!("Invalid date {value}, expected YYYY-MM-DD"))
    })
}

fn require_time(value: &str) -> AppResult<NaiveTime> {
    parse_hhmm(value)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid time {value}, expected HH:MM")))
}

fn optional_date(value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    value.map(require_date).transpose()
}

fn stored_time(appointment: &appointments::Model) -> AppResult<NaiveTime> {
    parse_hhmm(&appointment.appointment_time).ok_or_else(|| {
        AppError::InternalError(format!(
            "Appointment {} has a malformed time {}",
            appointment.id, appointment.appointment_time
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BusinessType, UserRole};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[test]
    fn test_require_date_and_time() {
        assert_eq!(
            require_date("2030-01-07").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
        );
        assert!(matches!(
            require_date("07/01/2030"),
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(
            require_time("14:30").unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
        assert!(require_time("2pm").is_err());
        assert_eq!(optional_date(None).unwrap(), None);
    }

    fn appointment(status: AppointmentStatus) -> appointments::Model {
        appointments::Model {
            id: 9,
            user_id: 1,
            business_id: 1,
            service_id: 1,
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            appointment_time: "10:00".into(),
            status,
            notes: None,
            cancel_reason: None,
            price: 10_000,
            discount_amount: 0,
            final_price: 10_000,
            coupon_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn business() -> businesses::Model {
        businesses::Model {
            id: 1,
            owner_id: 7,
            name: "Köpük".into(),
            business_type: BusinessType::CarWash,
            description: None,
            phone: None,
            email: None,
            website: None,
            address: "Bağdat Cad. 12".into(),
            city: "İstanbul".into(),
            district: None,
            latitude: None,
            longitude: None,
            is_active: true,
            average_rating: 0.0,
            review_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_update_loses_to_concurrent_transition() {
        // the booker cancelled between our read and our write
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![appointment(AppointmentStatus::Pending)]])
            .append_query_results([vec![business()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = AppointmentService::new(
            db.clone(),
            NotificationService::new(db.clone()),
            MarketClock::new(180),
        );

        let owner = CurrentUser { id: 7, role: UserRole::Business };
        let request: UpdateAppointmentRequest =
            serde_json::from_value(serde_json::json!({ "status": "confirmed" })).unwrap();
        let result = service.update(owner, 9, request).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        drop(service);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE \\\"appointments\\\""));
    }

    #[test]
    fn test_stored_time_reports_corruption() {
        let model = appointments::Model {
            id: 9,
            user_id: 1,
            business_id: 1,
            service_id: 1,
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            appointment_time: "noon".into(),
            status: AppointmentStatus::Pending,
            notes: None,
            cancel_reason: None,
            price: 10_000,
            discount_amount: 0,
            final_price: 10_000,
            coupon_id: None,
            created_at: None,
            updated_at: None,
        };
        assert!(matches!(
            stored_time(&model),
            Err(AppError::InternalError(_))
        ));
    }
}
