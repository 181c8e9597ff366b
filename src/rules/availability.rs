//! Decides whether an appointment may be created for a business, service
//! and local date/time.

use crate::entities::{
    Weekday, business_entity as businesses, service_entity as services,
    working_hours_entity as working_hours,
};
use crate::rules::schedule::window_for;
use crate::utils::format_hhmm;
use chrono::{Datelike, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Business not found")]
    BusinessNotFound,
    #[error("Service not found")]
    ServiceNotFound,
    #[error("This business is not accepting appointments")]
    BusinessInactive,
    #[error("This service is no longer offered")]
    ServiceInactive,
    #[error("The service does not belong to this business")]
    ServiceMismatch,
    #[error("Appointments cannot be booked in the past")]
    PastDate,
    #[error("The business is closed on {0}")]
    ClosedDay(Weekday),
    #[error("The requested time is outside working hours ({open}-{close})")]
    OutsideHours { open: String, close: String },
}

impl BookingError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BookingError::BusinessNotFound | BookingError::ServiceNotFound
        )
    }
}

/// Proof that a slot passed validation. Carries no side effects; the caller
/// persists the appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingApproval {
    pub business_id: i64,
    pub service_id: i64,
    pub scheduled_for: NaiveDateTime,
    pub weekday: Weekday,
}

/// `now` must be read right before calling, in the marketplace's local time.
pub fn validate_booking(
    business: Option<&businesses::Model>,
    service: Option<&services::Model>,
    hours: &[working_hours::Model],
    requested: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<BookingApproval, BookingError> {
    let business = business.ok_or(BookingError::BusinessNotFound)?;
    let service = service.ok_or(BookingError::ServiceNotFound)?;

    if !business.is_active {
        return Err(BookingError::BusinessInactive);
    }
    if !service.is_active {
        return Err(BookingError::ServiceInactive);
    }
    if service.business_id != business.id {
        return Err(BookingError::ServiceMismatch);
    }
    if requested < now {
        return Err(BookingError::PastDate);
    }

    let weekday = Weekday::from(requested.weekday());
    let business_hours: Vec<working_hours::Model> = hours
        .iter()
        .filter(|h| h.business_id == business.id)
        .cloned()
        .collect();
    let (open, close) =
        window_for(&business_hours, weekday).ok_or(BookingError::ClosedDay(weekday))?;

    let date = requested.date();
    // closing time itself is still bookable
    if requested < date.and_time(open) || requested > date.and_time(close) {
        return Err(BookingError::OutsideHours {
            open: format_hhmm(open),
            close: format_hhmm(close),
        });
    }

    Ok(BookingApproval {
        business_id: business.id,
        service_id: service.id,
        scheduled_for: requested,
        weekday,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BusinessType;
    use crate::rules::schedule::default_week;
    use chrono::{NaiveDate, NaiveTime};

    fn business(active: bool) -> businesses::Model {
        businesses::Model {
            id: 7,
            owner_id: 2,
            name: "Parlak Oto Yıkama".into(),
            business_type: BusinessType::CarWash,
            description: None,
            phone: None,
            email: None,
            website: None,
            address: "Atatürk Cd. 12".into(),
            city: "İzmir".into(),
            district: Some("Karşıyaka".into()),
            latitude: None,
            longitude: None,
            is_active: active,
            average_rating: 0.0,
            review_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    fn service(business_id: i64, active: bool) -> services::Model {
        services::Model {
            id: 11,
            business_id,
            name: "İç-dış yıkama".into(),
            description: None,
            price: 25_000,
            duration_minutes: 45,
            business_type: BusinessType::CarWash,
            is_active: active,
            created_at: None,
            updated_at: None,
        }
    }

    fn default_hours() -> Vec<working_hours::Model> {
        default_week()
            .into_iter()
            .enumerate()
            .map(|(i, d)| working_hours::Model {
                id: i as i64 + 1,
                business_id: 7,
                day_of_week: d.day,
                is_open: d.is_open,
                open_time: d.open_time(),
                close_time: d.close_time(),
            })
            .collect()
    }

    // 2030-01-07 is a Monday
    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, day)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn now() -> NaiveDateTime {
        at(1, 12, 0)
    }

    #[test]
    fn test_valid_booking() {
        let b = business(true);
        let s = service(7, true);
        let approval =
            validate_booking(Some(&b), Some(&s), &default_hours(), at(7, 10, 30), now()).unwrap();
        assert_eq!(approval.business_id, 7);
        assert_eq!(approval.service_id, 11);
        assert_eq!(approval.weekday, Weekday::Monday);
        assert_eq!(approval.scheduled_for, at(7, 10, 30));
    }

    #[test]
    fn test_missing_entities() {
        let b = business(true);
        let s = service(7, true);
        assert_eq!(
            validate_booking(None, Some(&s), &[], at(7, 10, 0), now()),
            Err(BookingError::BusinessNotFound)
        );
        assert_eq!(
            validate_booking(Some(&b), None, &[], at(7, 10, 0), now()),
            Err(BookingError::ServiceNotFound)
        );
        assert!(BookingError::ServiceNotFound.is_not_found());
    }

    #[test]
    fn test_inactive_business_always_rejected() {
        let b = business(false);
        let s = service(7, true);
        // even a past, closed-day request reports the inactive business first
        for requested in [at(7, 10, 0), at(13, 10, 0), at(1, 8, 0)] {
            assert_eq!(
                validate_booking(Some(&b), Some(&s), &default_hours(), requested, now()),
                Err(BookingError::BusinessInactive)
            );
        }
    }

    #[test]
    fn test_inactive_or_foreign_service() {
        let b = business(true);
        assert_eq!(
            validate_booking(
                Some(&b),
                Some(&service(7, false)),
                &default_hours(),
                at(7, 10, 0),
                now()
            ),
            Err(BookingError::ServiceInactive)
        );
        assert_eq!(
            validate_booking(
                Some(&b),
                Some(&service(99, true)),
                &default_hours(),
                at(7, 10, 0),
                now()
            ),
            Err(BookingError::ServiceMismatch)
        );
    }

    #[test]
    fn test_past_date_rejected() {
        let b = business(true);
        let s = service(7, true);
        let current = at(7, 12, 0);
        assert_eq!(
            validate_booking(Some(&b), Some(&s), &default_hours(), at(7, 11, 59), current),
            Err(BookingError::PastDate)
        );
        // the exact current minute is not in the past
        assert!(validate_booking(Some(&b), Some(&s), &default_hours(), current, current).is_ok());
    }

    #[test]
    fn test_closed_day_rejected_at_any_time() {
        let b = business(true);
        let s = service(7, true);
        // 2030-01-13 is a Sunday
        for h in [0, 9, 12, 18, 23] {
            assert_eq!(
                validate_booking(Some(&b), Some(&s), &default_hours(), at(13, h, 0), now()),
                Err(BookingError::ClosedDay(Weekday::Sunday))
            );
        }
    }

    #[test]
    fn test_missing_row_is_closed() {
        let b = business(true);
        let s = service(7, true);
        assert_eq!(
            validate_booking(Some(&b), Some(&s), &[], at(8, 10, 0), now()),
            Err(BookingError::ClosedDay(Weekday::Tuesday))
        );
    }

    #[test]
    fn test_working_hours_bounds_are_inclusive() {
        let b = business(true);
        let s = service(7, true);
        let hours = default_hours();
        assert!(validate_booking(Some(&b), Some(&s), &hours, at(8, 9, 0), now()).is_ok());
        assert!(validate_booking(Some(&b), Some(&s), &hours, at(8, 18, 0), now()).is_ok());

        let outside = BookingError::OutsideHours {
            open: "09:00".into(),
            close: "18:00".into(),
        };
        assert_eq!(
            validate_booking(Some(&b), Some(&s), &hours, at(8, 8, 59), now()),
            Err(outside.clone())
        );
        assert_eq!(
            validate_booking(Some(&b), Some(&s), &hours, at(8, 18, 1), now()),
            Err(outside)
        );
    }

    #[test]
    fn test_hours_of_other_businesses_are_ignored() {
        let b = business(true);
        let s = service(7, true);
        let mut hours = default_hours();
        for h in hours.iter_mut() {
            h.business_id = 8;
        }
        assert_eq!(
            validate_booking(Some(&b), Some(&s), &hours, at(8, 10, 0), now()),
            Err(BookingError::ClosedDay(Weekday::Tuesday))
        );
    }
}
