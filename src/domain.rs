//! Closed enumerations for participant roles and attendance.
//!
//! Both travel as plain strings over HTTP and are stored as Postgres enum
//! types. Only the exact lower-case literals are accepted at the boundary.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::schema::sql_types;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role '{0}', must be 'organizer', 'attendee', or 'collaborator'")]
pub struct UnknownRole(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status '{0}', must be 'going', 'maybe', or 'not_going'")]
pub struct UnknownAttendance(pub String);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
    ToSchema,
)]
#[diesel(sql_type = sql_types::ParticipantRole)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Organizer,
    Attendee,
    Collaborator,
}

impl ParticipantRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantRole::Organizer => "organizer",
            ParticipantRole::Attendee => "attendee",
            ParticipantRole::Collaborator => "collaborator",
        }
    }

    /// Organizers are the only role with control over an event.
    pub fn is_privileged(self) -> bool {
        matches!(self, ParticipantRole::Organizer)
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(ParticipantRole::Organizer),
            "attendee" => Ok(ParticipantRole::Attendee),
            "collaborator" => Ok(ParticipantRole::Collaborator),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl ToSql<sql_types::ParticipantRole, Pg> for ParticipantRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<sql_types::ParticipantRole, Pg> for ParticipantRole {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        raw.parse::<ParticipantRole>().map_err(Into::into)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
    ToSchema,
)]
#[diesel(sql_type = sql_types::AttendanceStatus)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Going,
    Maybe,
    NotGoing,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Going => "going",
            AttendanceStatus::Maybe => "maybe",
            AttendanceStatus::NotGoing => "not_going",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = UnknownAttendance;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "going" => Ok(AttendanceStatus::Going),
            "maybe" => Ok(AttendanceStatus::Maybe),
            "not_going" => Ok(AttendanceStatus::NotGoing),
            _ => Err(UnknownAttendance(s.to_string())),
        }
    }
}

impl ToSql<sql_types::AttendanceStatus, Pg> for AttendanceStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<sql_types::AttendanceStatus, Pg> for AttendanceStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        raw.parse::<AttendanceStatus>().map_err(Into::into)
    }
}
