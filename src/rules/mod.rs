//! Business rules that decide, without touching storage, whether an
//! operation is allowed and what it yields.

pub mod availability;
pub mod coupon;
pub mod schedule;
pub mod transitions;

pub use availability::{BookingApproval, BookingError, validate_booking};
pub use coupon::{CouponContext, CouponError, CouponQuote, MAX_AMOUNT, apply_discount, evaluate_coupon};
pub use schedule::{DaySchedule, ScheduleError, default_week, normalize_week, week_from_rows};
pub use transitions::{Actor, AppointmentChange, TransitionError, authorize_change, can_transition};
