//! Appointment status machine and per-role edit rights.
//!
//! ```text
//! pending ──> confirmed ──> completed
//!    │            │
//!    └──────┬─────┘
//!           v
//!       cancelled
//! ```

use crate::entities::{AppointmentStatus, UserRole};
use thiserror::Error;

/// How the caller relates to the appointment being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The user who booked it
    Booker,
    /// Owner of the business it was booked at
    BusinessOwner,
    Admin,
    Stranger,
}

impl Actor {
    pub fn resolve(
        caller_id: i64,
        caller_role: UserRole,
        booker_id: i64,
        business_owner_id: i64,
    ) -> Self {
        // an owner acting on their own business is never the booker
        if caller_role == UserRole::Admin {
            Actor::Admin
        } else if caller_id == business_owner_id {
            Actor::BusinessOwner
        } else if caller_id == booker_id {
            Actor::Booker
        } else {
            Actor::Stranger
        }
    }

    pub fn can_view(self) -> bool {
        self != Actor::Stranger
    }
}

/// Fields touched by an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentChange {
    pub status: Option<AppointmentStatus>,
    pub notes: bool,
    pub cancel_reason: bool,
    /// date and/or time
    pub schedule: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("You are not allowed to modify this appointment")]
    NotParticipant,
    #[error("Appointment cannot move from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("You are not allowed to change the status from {from} to {to}")]
    StatusNotAllowed {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("You are not allowed to change the {0} field")]
    FieldNotAllowed(&'static str),
}

/// Edges of the status machine.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
    )
}

/// Check the whole change up front; nothing may be applied when this fails.
///
/// Re-sending the current status is treated as "no status change".
pub fn authorize_change(
    actor: Actor,
    current: AppointmentStatus,
    change: &AppointmentChange,
) -> Result<(), TransitionError> {
    let target = change.status.filter(|s| *s != current);

    match actor {
        Actor::Stranger => Err(TransitionError::NotParticipant),
        Actor::Admin => Ok(()),
        Actor::Booker => {
            if change.schedule {
                return Err(TransitionError::FieldNotAllowed("date/time"));
            }
            match target {
                Some(AppointmentStatus::Cancelled) if can_transition(current, AppointmentStatus::Cancelled) => {
                    Ok(())
                }
                Some(to) => Err(TransitionError::StatusNotAllowed { from: current, to }),
                None if change.cancel_reason => {
                    Err(TransitionError::FieldNotAllowed("cancelReason"))
                }
                None => Ok(()),
            }
        }
        Actor::BusinessOwner => {
            if change.schedule {
                return Err(TransitionError::FieldNotAllowed("date/time"));
            }
            match target {
                None => Ok(()),
                Some(to) if !can_transition(current, to) => {
                    Err(TransitionError::InvalidTransition { from: current, to })
                }
                Some(_) => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    fn status(to: AppointmentStatus) -> AppointmentChange {
        AppointmentChange {
            status: Some(to),
            ..Default::default()
        }
    }

    #[test]
    fn test_machine_edges() {
        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Confirmed, Completed));
        assert!(can_transition(Confirmed, Cancelled));
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Completed, Cancelled));
        assert!(!can_transition(Cancelled, Pending));
        assert!(!can_transition(Confirmed, Pending));
    }

    #[test]
    fn test_resolve_actor() {
        assert_eq!(Actor::resolve(1, UserRole::Admin, 5, 6), Actor::Admin);
        assert_eq!(Actor::resolve(6, UserRole::Business, 5, 6), Actor::BusinessOwner);
        assert_eq!(Actor::resolve(5, UserRole::User, 5, 6), Actor::Booker);
        assert_eq!(Actor::resolve(9, UserRole::Business, 5, 6), Actor::Stranger);
        assert!(!Actor::Stranger.can_view());
    }

    #[test]
    fn test_owner_booking_own_business_resolves_as_owner() {
        assert_eq!(Actor::resolve(6, UserRole::Business, 6, 6), Actor::BusinessOwner);
        assert_eq!(Actor::resolve(6, UserRole::User, 6, 6), Actor::BusinessOwner);
    }

    #[test]
    fn test_booker_cannot_confirm() {
        assert_eq!(
            authorize_change(Actor::Booker, Pending, &status(Confirmed)),
            Err(TransitionError::StatusNotAllowed {
                from: Pending,
                to: Confirmed
            })
        );
        assert!(authorize_change(Actor::Booker, Confirmed, &status(Completed)).is_err());
    }

    #[test]
    fn test_booker_can_cancel_open_appointments() {
        let cancel = AppointmentChange {
            status: Some(Cancelled),
            cancel_reason: true,
            ..Default::default()
        };
        assert!(authorize_change(Actor::Booker, Pending, &cancel).is_ok());
        assert!(authorize_change(Actor::Booker, Confirmed, &cancel).is_ok());
        assert!(authorize_change(Actor::Booker, Completed, &cancel).is_err());
    }

    #[test]
    fn test_booker_field_rights() {
        let notes = AppointmentChange {
            notes: true,
            ..Default::default()
        };
        assert!(authorize_change(Actor::Booker, Pending, &notes).is_ok());

        let reason_only = AppointmentChange {
            cancel_reason: true,
            ..Default::default()
        };
        assert_eq!(
            authorize_change(Actor::Booker, Pending, &reason_only),
            Err(TransitionError::FieldNotAllowed("cancelReason"))
        );

        // a forbidden field sinks the whole change, even with an allowed status
        let reschedule = AppointmentChange {
            status: Some(Cancelled),
            schedule: true,
            ..Default::default()
        };
        assert_eq!(
            authorize_change(Actor::Booker, Pending, &reschedule),
            Err(TransitionError::FieldNotAllowed("date/time"))
        );
    }

    #[test]
    fn test_owner_transitions() {
        assert!(authorize_change(Actor::BusinessOwner, Pending, &status(Confirmed)).is_ok());
        assert!(authorize_change(Actor::BusinessOwner, Confirmed, &status(Completed)).is_ok());
        assert!(authorize_change(Actor::BusinessOwner, Pending, &status(Cancelled)).is_ok());
        assert!(authorize_change(Actor::BusinessOwner, Confirmed, &status(Cancelled)).is_ok());
        assert_eq!(
            authorize_change(Actor::BusinessOwner, Pending, &status(Completed)),
            Err(TransitionError::InvalidTransition {
                from: Pending,
                to: Completed
            })
        );
        assert!(authorize_change(Actor::BusinessOwner, Cancelled, &status(Confirmed)).is_err());
        assert!(authorize_change(Actor::BusinessOwner, Completed, &status(Cancelled)).is_err());
    }

    #[test]
    fn test_same_status_is_a_no_op() {
        assert!(authorize_change(Actor::Booker, Confirmed, &status(Confirmed)).is_ok());
        assert!(authorize_change(Actor::BusinessOwner, Completed, &status(Completed)).is_ok());
    }

    #[test]
    fn test_admin_and_stranger() {
        let everything = AppointmentChange {
            status: Some(Pending),
            notes: true,
            cancel_reason: true,
            schedule: true,
        };
        assert!(authorize_change(Actor::Admin, Cancelled, &everything).is_ok());
        assert_eq!(
            authorize_change(Actor::Stranger, Pending, &AppointmentChange::default()),
            Err(TransitionError::NotParticipant)
        );
    }
}
