//! Weekly opening schedule of a business.

use crate::entities::{Weekday, working_hours_entity as working_hours};
use crate::utils::{format_hhmm, parse_hhmm};
use chrono::NaiveTime;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Working hours for {0} are listed more than once")]
    DuplicateDay(Weekday),
    #[error("Invalid time '{value}' for {day}, expected HH:MM")]
    InvalidTime { day: Weekday, value: String },
    #[error("Opening and closing times are required for {0}")]
    MissingTimes(Weekday),
    #[error("Opening time must be before closing time on {0}")]
    InvertedWindow(Weekday),
}

/// One day of a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub day: Weekday,
    pub is_open: bool,
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
}

impl DaySchedule {
    pub fn closed(day: Weekday) -> Self {
        Self {
            day,
            is_open: false,
            open: None,
            close: None,
        }
    }

    /// Build from raw `HH:MM` strings, as received from clients.
    pub fn parse(
        day: Weekday,
        is_open: bool,
        open: Option<&str>,
        close: Option<&str>,
    ) -> Result<Self, ScheduleError> {
        let parse = |value: Option<&str>| -> Result<Option<NaiveTime>, ScheduleError> {
            match value {
                None => Ok(None),
                Some(v) => parse_hhmm(v).map(Some).ok_or(ScheduleError::InvalidTime {
                    day,
                    value: v.to_string(),
                }),
            }
        };
        Ok(Self {
            day,
            is_open,
            open: parse(open)?,
            close: parse(close)?,
        })
    }

    pub fn open_time(&self) -> Option<String> {
        self.open.map(format_hhmm)
    }

    pub fn close_time(&self) -> Option<String> {
        self.close.map(format_hhmm)
    }
}

/// Schedule applied to businesses created without explicit hours:
/// Monday to Saturday 09:00-18:00, Sunday closed.
pub fn default_week() -> Vec<DaySchedule> {
    let nine = NaiveTime::from_hms_opt(9, 0, 0);
    let six_pm = NaiveTime::from_hms_opt(18, 0, 0);
    Weekday::ALL
        .iter()
        .map(|&day| {
            if day == Weekday::Sunday {
                DaySchedule::closed(day)
            } else {
                DaySchedule {
                    day,
                    is_open: true,
                    open: nine,
                    close: six_pm,
                }
            }
        })
        .collect()
}

/// Validate a submitted week and fill it up to seven days.
///
/// Days that are not listed are closed. Closed days drop their times.
pub fn normalize_week(days: Vec<DaySchedule>) -> Result<Vec<DaySchedule>, ScheduleError> {
    let mut by_day: BTreeMap<Weekday, DaySchedule> = BTreeMap::new();

    for day in days {
        if by_day.contains_key(&day.day) {
            return Err(ScheduleError::DuplicateDay(day.day));
        }
        let day = if day.is_open {
            match (day.open, day.close) {
                (Some(open), Some(close)) if open < close => day,
                (Some(_), Some(_)) => return Err(ScheduleError::InvertedWindow(day.day)),
                _ => return Err(ScheduleError::MissingTimes(day.day)),
            }
        } else {
            DaySchedule::closed(day.day)
        };
        by_day.insert(day.day, day);
    }

    Ok(Weekday::ALL
        .iter()
        .map(|&d| by_day.remove(&d).unwrap_or_else(|| DaySchedule::closed(d)))
        .collect())
}

/// Opening window for `day`, or `None` when the business is closed.
///
/// A row flagged open but carrying unparsable times counts as closed.
pub fn window_for(rows: &[working_hours::Model], day: Weekday) -> Option<(NaiveTime, NaiveTime)> {
    let row = rows.iter().find(|r| r.day_of_week == day)?;
    if !row.is_open {
        return None;
    }
    let open = parse_hhmm(row.open_time.as_deref()?)?;
    let close = parse_hhmm(row.close_time.as_deref()?)?;
    Some((open, close))
}

/// Stored rows as a full Monday-first week; missing days are closed.
pub fn week_from_rows(rows: &[working_hours::Model]) -> Vec<DaySchedule> {
    Weekday::ALL
        .iter()
        .map(|&day| match window_for(rows, day) {
            Some((open, close)) => DaySchedule {
                day,
                is_open: true,
                open: Some(open),
                close: Some(close),
            },
            None => DaySchedule::closed(day),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_default_week() {
        let week = default_week();
        assert_eq!(week.len(), 7);
        for day in &week[..6] {
            assert!(day.is_open);
            assert_eq!(day.open_time().as_deref(), Some("09:00"));
            assert_eq!(day.close_time().as_deref(), Some("18:00"));
        }
        assert_eq!(week[6].day, Weekday::Sunday);
        assert!(!week[6].is_open);
        assert!(week[6].open.is_none());
    }

    #[test]
    fn test_normalize_fills_missing_days_as_closed() {
        let week = normalize_week(vec![DaySchedule {
            day: Weekday::Wednesday,
            is_open: true,
            open: Some(t(10, 0)),
            close: Some(t(16, 30)),
        }])
        .unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, Weekday::Monday);
        assert!(!week[0].is_open);
        assert!(week[2].is_open);
        assert_eq!(week[2].close_time().as_deref(), Some("16:30"));
    }

    #[test]
    fn test_normalize_rejects_duplicates_and_bad_windows() {
        let dup = normalize_week(vec![
            DaySchedule::closed(Weekday::Monday),
            DaySchedule::closed(Weekday::Monday),
        ]);
        assert_eq!(dup, Err(ScheduleError::DuplicateDay(Weekday::Monday)));

        let inverted = normalize_week(vec![DaySchedule {
            day: Weekday::Friday,
            is_open: true,
            open: Some(t(18, 0)),
            close: Some(t(9, 0)),
        }]);
        assert_eq!(inverted, Err(ScheduleError::InvertedWindow(Weekday::Friday)));

        let missing = normalize_week(vec![DaySchedule {
            day: Weekday::Friday,
            is_open: true,
            open: Some(t(9, 0)),
            close: None,
        }]);
        assert_eq!(missing, Err(ScheduleError::MissingTimes(Weekday::Friday)));
    }

    #[test]
    fn test_closed_day_drops_times() {
        let week = normalize_week(vec![DaySchedule {
            day: Weekday::Sunday,
            is_open: false,
            open: Some(t(9, 0)),
            close: Some(t(12, 0)),
        }])
        .unwrap();
        assert_eq!(week[6], DaySchedule::closed(Weekday::Sunday));
    }

    #[test]
    fn test_parse_rejects_bad_time() {
        let err = DaySchedule::parse(Weekday::Monday, true, Some("9am"), Some("18:00"));
        assert!(matches!(err, Err(ScheduleError::InvalidTime { .. })));
    }

    #[test]
    fn test_window_for() {
        let rows = vec![
            working_hours::Model {
                id: 1,
                business_id: 1,
                day_of_week: Weekday::Monday,
                is_open: true,
                open_time: Some("09:00".into()),
                close_time: Some("18:00".into()),
            },
            working_hours::Model {
                id: 2,
                business_id: 1,
                day_of_week: Weekday::Tuesday,
                is_open: true,
                open_time: Some("garbage".into()),
                close_time: Some("18:00".into()),
            },
        ];
        assert_eq!(window_for(&rows, Weekday::Monday), Some((t(9, 0), t(18, 0))));
        assert_eq!(window_for(&rows, Weekday::Tuesday), None);
        assert_eq!(window_for(&rows, Weekday::Sunday), None);

        let week = week_from_rows(&rows);
        assert_eq!(week.len(), 7);
        assert!(week[0].is_open);
        assert_eq!(week[1], DaySchedule::closed(Weekday::Tuesday));
    }
}
