//! Query-string parsing for `/search`.
//!
//! Every dimension accepts two parameter names. The newer one (`query`,
//! `start`, `end`, `userRole`) wins whenever it is present, even if empty.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ParticipantRole;
use crate::error::ServiceError;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text matched against title, description and location.
    pub query: Option<String>,
    /// Legacy alias of `query`.
    pub q: Option<String>,
    /// Lower bound: `YYYY-MM-DD`, `today`, `tomorrow` or `nextweek`.
    pub start: Option<String>,
    /// Legacy alias of `start`.
    pub from: Option<String>,
    /// Upper bound, inclusive of the whole day. Same formats as `start`.
    pub end: Option<String>,
    /// Legacy alias of `end`.
    pub to: Option<String>,
    /// One of `organizer`, `attendee`, `collaborator`.
    #[serde(rename = "userRole")]
    pub user_role: Option<String>,
    /// Legacy alias of `userRole`.
    pub role: Option<String>,
}

/// Resolved, validated search input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub text: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub role: Option<ParticipantRole>,
    /// Acting user. `None` disables role scoping.
    pub user_id: Option<i32>,
}

impl SearchCriteria {
    pub fn for_user(mut self, user_id: Option<i32>) -> Self {
        self.user_id = user_id.filter(|id| *id > 0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

impl Bound {
    fn param(self) -> &'static str {
        match self {
            Bound::Start => "start",
            Bound::End => "end",
        }
    }
}

fn prefer(newer: Option<String>, legacy: Option<String>) -> Option<String> {
    newer.or(legacy)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchParams {
    /// Resolves the raw parameters against `now`, whose time zone defines "today".
    pub fn into_criteria<Tz: TimeZone>(
        self,
        now: &DateTime<Tz>,
    ) -> Result<SearchCriteria, ServiceError> {
        let text = non_empty(prefer(self.query, self.q));

        let role = non_empty(prefer(self.user_role, self.role))
            .map(|r| r.parse::<ParticipantRole>())
            .transpose()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let from = non_empty(prefer(self.start, self.from))
            .map(|raw| resolve_bound(&raw, Bound::Start, now))
            .transpose()?;

        let to = non_empty(prefer(self.end, self.to))
            .map(|raw| resolve_bound(&raw, Bound::End, now))
            .transpose()?;

        Ok(SearchCriteria {
            text,
            from,
            to,
            role,
            user_id: None,
        })
    }
}

/// Maps a date token or ISO date to a calendar day in `now`'s time zone.
pub fn resolve_day<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>) -> Option<NaiveDate> {
    let today = now.date_naive();
    match raw.trim().to_lowercase().as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "nextweek" => today.checked_add_days(Days::new(7)),
        other => {
            // Only the zero-padded form is accepted.
            if other.len() != 10 {
                return None;
            }
            NaiveDate::parse_from_str(other, "%Y-%m-%d").ok()
        }
    }
}

/// The instant `time` on `date` in `tz`. A wall time skipped by a DST jump
/// resolves to the same time one hour later.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    local_instant(tz, date, NaiveTime::MIN)
}

fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59)?;
    local_instant(tz, date, last_second)
}

fn resolve_bound<Tz: TimeZone>(
    raw: &str,
    bound: Bound,
    now: &DateTime<Tz>,
) -> Result<DateTime<Utc>, ServiceError> {
    let invalid = || {
        ServiceError::validation(format!(
            "invalid '{}' date format, use YYYY-MM-DD, 'today', 'tomorrow' or 'nextweek'",
            bound.param()
        ))
    };

    let day = resolve_day(raw, now).ok_or_else(invalid)?;
    let tz = now.timezone();
    match bound {
        Bound::Start => start_of_day(&tz, day),
        Bound::End => end_of_day(&tz, day),
    }
    .ok_or_else(invalid)
}
