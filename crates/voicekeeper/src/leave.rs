//! Leave-of-absence tracking.
//!
//! A member files for leave with a duration, gets the leave role, and an
//! announcement lands in the admin channel. Coming back early revokes
//! the role and withdraws the announcement.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use voicekeeper_protocol::{MemberId, MessageId};

/// The accepted leave durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDuration {
    ThreeDays,
    Week,
    TwoWeeks,
}

impl LeaveDuration {
    /// Parses the user-supplied duration argument.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "3д" | "3дня" | "3 дня" => Some(Self::ThreeDays),
            "неделя" | "7д" | "7дней" => Some(Self::Week),
            "2недели" | "2 недели" | "14д" | "14дней" => Some(Self::TwoWeeks),
            _ => None,
        }
    }

    pub fn delta(&self) -> Duration {
        match self {
            Self::ThreeDays => Duration::days(3),
            Self::Week => Duration::weeks(1),
            Self::TwoWeeks => Duration::weeks(2),
        }
    }

    /// How the duration reads in messages.
    pub fn display(&self) -> &'static str {
        match self {
            Self::ThreeDays => "1-3 дня",
            Self::Week => "неделю",
            Self::TwoWeeks => "2 недели",
        }
    }
}

/// One member's active leave.
#[derive(Debug, Clone)]
pub struct LeaveRecord {
    pub duration: LeaveDuration,
    pub end_date: DateTime<Utc>,
    /// The admin-channel announcement, deleted on early return. `None`
    /// if posting it failed — the leave itself still stands.
    pub admin_message: Option<MessageId>,
}

/// Active leaves, keyed by member.
#[derive(Debug, Default)]
pub struct LeaveBook {
    entries: HashMap<MemberId, LeaveRecord>,
}

impl LeaveBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, member: MemberId, record: LeaveRecord) {
        tracing::info!(
            %member,
            until = %record.end_date.format("%d.%m.%Y %H:%M"),
            "leave recorded"
        );
        self.entries.insert(member, record);
    }

    /// Ends a leave. Absent members are a no-op returning `None`.
    pub fn remove(&mut self, member: MemberId) -> Option<LeaveRecord> {
        let removed = self.entries.remove(&member);
        if removed.is_some() {
            tracing::info!(%member, "leave ended");
        }
        removed
    }

    pub fn get(&self, member: MemberId) -> Option<&LeaveRecord> {
        self.entries.get(&member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_day_spellings() {
        for text in ["3д", "3дня", "3 дня", "3Д"] {
            assert_eq!(LeaveDuration::parse(text), Some(LeaveDuration::ThreeDays));
        }
    }

    #[test]
    fn test_parse_week_spellings() {
        for text in ["неделя", "7д", "7дней", "НЕДЕЛЯ"] {
            assert_eq!(LeaveDuration::parse(text), Some(LeaveDuration::Week));
        }
    }

    #[test]
    fn test_parse_two_week_spellings() {
        for text in ["2недели", "2 недели", "14д", "14дней"] {
            assert_eq!(LeaveDuration::parse(text), Some(LeaveDuration::TwoWeeks));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_duration() {
        assert_eq!(LeaveDuration::parse("месяц"), None);
        assert_eq!(LeaveDuration::parse(""), None);
    }

    #[test]
    fn test_deltas_match_displayed_durations() {
        assert_eq!(LeaveDuration::ThreeDays.delta(), Duration::days(3));
        assert_eq!(LeaveDuration::Week.delta(), Duration::days(7));
        assert_eq!(LeaveDuration::TwoWeeks.delta(), Duration::days(14));
    }

    #[test]
    fn test_book_remove_is_idempotent() {
        let mut book = LeaveBook::new();
        book.insert(
            MemberId(1),
            LeaveRecord {
                duration: LeaveDuration::Week,
                end_date: Utc::now() + Duration::weeks(1),
                admin_message: None,
            },
        );

        assert!(book.remove(MemberId(1)).is_some());
        assert!(book.remove(MemberId(1)).is_none());
    }
}
