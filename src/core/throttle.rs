use chrono::{DateTime, Utc};

use crate::models::UserStatus;

/// Default cooldown for students and no-experience users, in calendar days
pub const DEFAULT_STUDENT_COOLDOWN_DAYS: i64 = 3;

/// Default cooldown for experienced users, in calendar days
pub const DEFAULT_EXPERIENCED_COOLDOWN_DAYS: i64 = 14;

/// What the throttle decided for one (user, job) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The pair was never notified before
    FirstContact,
    /// The cooldown has passed since the last notification
    CooldownElapsed { days_since: i64 },
    /// Still inside the cooldown window
    Suppressed { days_since: i64, cooldown_days: i64 },
}

impl ThrottleDecision {
    pub fn is_notify(&self) -> bool {
        !matches!(self, ThrottleDecision::Suppressed { .. })
    }
}

/// Notification cooldown policy
///
/// A pair may be re-notified once strictly more than the cooldown has
/// elapsed, counted in whole calendar days (UTC), not in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    student_cooldown_days: i64,
    experienced_cooldown_days: i64,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_STUDENT_COOLDOWN_DAYS, DEFAULT_EXPERIENCED_COOLDOWN_DAYS)
    }
}

impl Throttle {
    pub fn new(student_cooldown_days: i64, experienced_cooldown_days: i64) -> Self {
        Self {
            student_cooldown_days,
            experienced_cooldown_days,
        }
    }

    pub fn cooldown_days(&self, status: UserStatus) -> i64 {
        match status {
            UserStatus::StudentPosition | UserStatus::NoExperiencePosition => {
                self.student_cooldown_days
            }
            UserStatus::ExperiencePosition => self.experienced_cooldown_days,
        }
    }

    pub fn decide(
        &self,
        status: UserStatus,
        last_sent_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ThrottleDecision {
        let Some(last_sent_at) = last_sent_at else {
            return ThrottleDecision::FirstContact;
        };

        let days_since = calendar_days_between(last_sent_at, now);
        let cooldown_days = self.cooldown_days(status);

        if days_since > cooldown_days {
            ThrottleDecision::CooldownElapsed { days_since }
        } else {
            ThrottleDecision::Suppressed {
                days_since,
                cooldown_days,
            }
        }
    }

    pub fn should_notify(
        &self,
        status: UserStatus,
        last_sent_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        self.decide(status, last_sent_at, now).is_notify()
    }
}

/// Midnight-to-midnight day difference; negative when `earlier` is after `later`
#[inline]
pub fn calendar_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later.date_naive() - earlier.date_naive()).num_days()
}
