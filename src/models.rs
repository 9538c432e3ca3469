use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AttendanceStatus, ParticipantRole};

#[derive(Debug, Queryable, Selectable, Serialize, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Team offsite")]
    pub title: String,
    #[schema(example = "Planning day for Q3")]
    pub description: String,
    #[schema(example = "Main office")]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub organizer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::events)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub organizer_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::event_participants)]
pub struct NewParticipant {
    pub event_id: i32,
    pub user_id: i32,
    pub role: ParticipantRole,
    pub attendance: Option<AttendanceStatus>,
    pub invited_by: Option<i32>,
}

/// A participant row joined with the user it refers to.
#[derive(Debug, Queryable, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub event_id: i32,
    pub user_id: i32,
    #[schema(example = "Ann")]
    pub user_name: String,
    #[schema(example = "ann@example.com")]
    pub user_email: String,
    pub role: ParticipantRole,
    pub attendance: Option<AttendanceStatus>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub event_id: i32,
    #[schema(example = "Book the venue")]
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTask {
    pub event_id: i32,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<i32>,
}
