//! Events and their participant rows.
//!
//! The guarded writes (`delete_if_organizer`, `upsert_invite`) signal a failed
//! organizer check with `diesel::result::Error::NotFound`; the service layer
//! turns that into a forbidden error.

use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use tracing::debug;

use crate::domain::{AttendanceStatus, ParticipantRole};
use crate::error::{is_unique_violation, ServiceError};
use crate::models::{Event, NewEvent, NewParticipant, ParticipantView};
use crate::schema::{event_participants, events, users};

fn time_taken() -> ServiceError {
    ServiceError::Conflict {
        message: "an event already exists at this time".to_string(),
        code: "EVENT_TIME_TAKEN",
    }
}

/// Inserts the event and its organizer participant row in one transaction.
///
/// The pre-check gives a clean conflict in the common case; the unique index on
/// `start_time` still decides races between concurrent creators.
pub fn create_event(conn: &mut PgConnection, new_event: &NewEvent) -> Result<Event, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let taken: bool = diesel::select(exists(
            events::table.filter(events::start_time.eq(new_event.start_time)),
        ))
        .get_result(conn)?;
        if taken {
            return Err(time_taken());
        }

        let event = diesel::insert_into(events::table)
            .values(new_event)
            .returning(Event::as_returning())
            .get_result(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    time_taken()
                } else {
                    ServiceError::from(e)
                }
            })?;

        diesel::insert_into(event_participants::table)
            .values(&NewParticipant {
                event_id: event.id,
                user_id: event.organizer_id,
                role: ParticipantRole::Organizer,
                attendance: None,
                invited_by: None,
            })
            .execute(conn)?;

        Ok(event)
    })
}

/// Events where `user_id` holds exactly `role`, earliest first.
pub fn list_by_role(
    conn: &mut PgConnection,
    user_id: i32,
    role: ParticipantRole,
) -> QueryResult<Vec<Event>> {
    events::table
        .inner_join(event_participants::table)
        .filter(event_participants::user_id.eq(user_id))
        .filter(event_participants::role.eq(role))
        .order((events::start_time.asc(), events::id.asc()))
        .select(Event::as_select())
        .load(conn)
}

pub fn find_role(
    conn: &mut PgConnection,
    event_id: i32,
    user_id: i32,
) -> QueryResult<Option<ParticipantRole>> {
    event_participants::table
        .find((event_id, user_id))
        .select(event_participants::role)
        .first(conn)
        .optional()
}

fn require_organizer_row(conn: &mut PgConnection, event_id: i32, user_id: i32) -> QueryResult<()> {
    match find_role(conn, event_id, user_id)? {
        Some(role) if role.is_privileged() => Ok(()),
        _ => Err(DieselError::NotFound),
    }
}

pub fn delete_if_organizer(conn: &mut PgConnection, event_id: i32, user_id: i32) -> QueryResult<()> {
    conn.transaction(|conn| {
        require_organizer_row(conn, event_id, user_id)?;
        let deleted = diesel::delete(events::table.find(event_id)).execute(conn)?;
        debug!(event_id = %event_id, deleted, "Event rows deleted");
        Ok(())
    })
}

/// Adds `invitee_id` to the event, or overwrites their role if already present.
pub fn upsert_invite(
    conn: &mut PgConnection,
    event_id: i32,
    inviter_id: i32,
    invitee_id: i32,
    role: ParticipantRole,
) -> QueryResult<()> {
    conn.transaction(|conn| {
        require_organizer_row(conn, event_id, inviter_id)?;

        diesel::insert_into(event_participants::table)
            .values(&NewParticipant {
                event_id,
                user_id: invitee_id,
                role,
                attendance: None,
                invited_by: Some(inviter_id),
            })
            .on_conflict((event_participants::event_id, event_participants::user_id))
            .do_update()
            .set((
                event_participants::role.eq(excluded(event_participants::role)),
                event_participants::invited_by.eq(excluded(event_participants::invited_by)),
                event_participants::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        Ok(())
    })
}

/// Participants with their user details, ordered by name.
pub fn list_participants(conn: &mut PgConnection, event_id: i32) -> QueryResult<Vec<ParticipantView>> {
    event_participants::table
        .inner_join(users::table)
        .filter(event_participants::event_id.eq(event_id))
        .order((users::name.asc(), users::id.asc()))
        .select((
            event_participants::event_id,
            event_participants::user_id,
            users::name,
            users::email,
            event_participants::role,
            event_participants::attendance,
        ))
        .load(conn)
}

/// Sets the RSVP, joining the user as an attendee when they have no row yet.
/// An existing role is left untouched.
pub fn upsert_attendance(
    conn: &mut PgConnection,
    event_id: i32,
    user_id: i32,
    status: AttendanceStatus,
) -> QueryResult<()> {
    diesel::insert_into(event_participants::table)
        .values(&NewParticipant {
            event_id,
            user_id,
            role: ParticipantRole::Attendee,
            attendance: Some(status),
            invited_by: None,
        })
        .on_conflict((event_participants::event_id, event_participants::user_id))
        .do_update()
        .set((
            event_participants::attendance.eq(excluded(event_participants::attendance)),
            event_participants::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    Ok(())
}

/// Number of organizer rows for an event.
pub fn count_organizers(conn: &mut PgConnection, event_id: i32) -> QueryResult<i64> {
    event_participants::table
        .filter(event_participants::event_id.eq(event_id))
        .filter(event_participants::role.eq(ParticipantRole::Organizer))
        .count()
        .get_result(conn)
}
