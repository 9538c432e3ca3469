//! Event lifecycle, invitations, attendance and tasks.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use tracing::{info, warn};

use crate::domain::{AttendanceStatus, ParticipantRole};
use crate::error::{is_foreign_key_violation, ServiceError};
use crate::models::{Event, NewEvent, NewTask, ParticipantView, Task};
use crate::policy::{self, GuardedAction};
use crate::repositories::{events as event_repo, tasks as task_repo};
use crate::DbPool;

use super::run_blocking;

#[derive(Debug, Clone)]
pub struct CreateEventInput {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<i32>,
}

/// Maps a missing-row signal from a guarded write to the action's denial.
fn guard_failure(action: GuardedAction) -> impl FnOnce(DieselError) -> ServiceError {
    move |e| match e {
        DieselError::NotFound => action.denied(),
        other => other.into(),
    }
}

fn missing_reference(message: &'static str) -> impl FnOnce(DieselError) -> ServiceError {
    move |e| {
        if is_foreign_key_violation(&e) {
            ServiceError::not_found(message)
        } else {
            e.into()
        }
    }
}

#[derive(Clone)]
pub struct EventService {
    pool: DbPool,
}

impl EventService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the event with `organizer_id` as its organizer participant.
    pub async fn create_event(
        &self,
        organizer_id: i32,
        input: CreateEventInput,
    ) -> Result<Event, ServiceError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::validation("event title is required"));
        }

        let new_event = NewEvent {
            title,
            description: input.description.unwrap_or_default(),
            location: input.location.unwrap_or_default(),
            start_time: input.start_time,
            organizer_id,
        };

        let event = run_blocking(&self.pool, move |conn| {
            event_repo::create_event(conn, &new_event).map_err(|e| match e {
                ServiceError::Database(db) if is_foreign_key_violation(&db) => {
                    ServiceError::not_found("organizer not found")
                }
                other => other,
            })
        })
        .await
        .inspect_err(|e| {
            if matches!(e, ServiceError::Conflict { .. }) {
                warn!(organizer_id = %organizer_id, start_time = %input.start_time, "Event time already taken");
            }
        })?;

        info!(event_id = %event.id, organizer_id = %organizer_id, "Event created");
        Ok(event)
    }

    pub async fn list_organized(&self, user_id: i32) -> Result<Vec<Event>, ServiceError> {
        self.list_by_role(user_id, ParticipantRole::Organizer).await
    }

    /// Events the user was invited to as an attendee.
    pub async fn list_invited(&self, user_id: i32) -> Result<Vec<Event>, ServiceError> {
        self.list_by_role(user_id, ParticipantRole::Attendee).await
    }

    async fn list_by_role(
        &self,
        user_id: i32,
        role: ParticipantRole,
    ) -> Result<Vec<Event>, ServiceError> {
        run_blocking(&self.pool, move |conn| {
            Ok(event_repo::list_by_role(conn, user_id, role)?)
        })
        .await
    }

    /// Deletes the event and, by cascade, its participants and tasks.
    /// Unknown events are reported as forbidden, same as non-organizers.
    pub async fn delete_event(&self, event_id: i32, user_id: i32) -> Result<(), ServiceError> {
        run_blocking(&self.pool, move |conn| {
            event_repo::delete_if_organizer(conn, event_id, user_id)
                .map_err(guard_failure(GuardedAction::DeleteEvent))
        })
        .await
        .inspect_err(|e| {
            if matches!(e, ServiceError::Forbidden(_)) {
                warn!(event_id = %event_id, user_id = %user_id, "Delete denied");
            }
        })?;

        info!(event_id = %event_id, user_id = %user_id, "Event deleted");
        Ok(())
    }

    /// Adds or re-roles `invitee_id`. Only organizers may invite.
    pub async fn invite(
        &self,
        event_id: i32,
        inviter_id: i32,
        invitee_id: i32,
        role: ParticipantRole,
    ) -> Result<(), ServiceError> {
        if invitee_id <= 0 {
            return Err(ServiceError::validation("userId must be a positive integer"));
        }
        if invitee_id == inviter_id {
            return Err(ServiceError::validation("cannot invite yourself"));
        }

        run_blocking(&self.pool, move |conn| {
            event_repo::upsert_invite(conn, event_id, inviter_id, invitee_id, role).map_err(|e| {
                if is_foreign_key_violation(&e) {
                    ServiceError::not_found("user not found")
                } else {
                    guard_failure(GuardedAction::Invite)(e)
                }
            })
        })
        .await
        .inspect_err(|e| {
            if matches!(e, ServiceError::Forbidden(_)) {
                warn!(event_id = %event_id, user_id = %inviter_id, "Invite denied");
            }
        })?;

        info!(
            event_id = %event_id,
            inviter_id = %inviter_id,
            invitee_id = %invitee_id,
            role = %role,
            "User invited"
        );
        Ok(())
    }

    pub async fn participants(
        &self,
        event_id: i32,
        requester_id: i32,
    ) -> Result<Vec<ParticipantView>, ServiceError> {
        run_blocking(&self.pool, move |conn| {
            policy::require_organizer(conn, event_id, requester_id, GuardedAction::ViewParticipants)?;
            Ok(event_repo::list_participants(conn, event_id)?)
        })
        .await
    }

    /// Records the requester's RSVP. `target_user_id` of `None` or `0` means the
    /// requester; anyone else is forbidden.
    pub async fn set_attendance(
        &self,
        event_id: i32,
        requester_id: i32,
        target_user_id: Option<i32>,
        status: AttendanceStatus,
    ) -> Result<(), ServiceError> {
        let target = target_user_id
            .filter(|id| *id != 0)
            .unwrap_or(requester_id);
        if target != requester_id {
            warn!(event_id = %event_id, user_id = %requester_id, target_user_id = %target, "Attendance update for another user denied");
            return Err(ServiceError::forbidden(
                "you can only update your own attendance",
            ));
        }

        run_blocking(&self.pool, move |conn| {
            event_repo::upsert_attendance(conn, event_id, target, status)
                .map_err(missing_reference("event or user not found"))
        })
        .await?;

        info!(event_id = %event_id, user_id = %target, status = %status, "Attendance updated");
        Ok(())
    }

    /// Shortcut for attendance `going`. Does not require a prior invitation.
    pub async fn accept(&self, event_id: i32, user_id: i32) -> Result<(), ServiceError> {
        self.set_attendance(event_id, user_id, None, AttendanceStatus::Going)
            .await
    }

    /// Title is validated before the organizer check.
    pub async fn create_task(
        &self,
        event_id: i32,
        user_id: i32,
        input: CreateTaskInput,
    ) -> Result<Task, ServiceError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::validation("task title is required"));
        }

        let new_task = NewTask {
            event_id,
            title,
            description: input.description.unwrap_or_default(),
            due_date: input.due_date,
            assignee_id: input.assignee_id,
        };

        let task = run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, ServiceError, _>(|conn| {
                policy::require_organizer(conn, event_id, user_id, GuardedAction::CreateTask)?;
                task_repo::create_task(conn, &new_task)
                    .map_err(missing_reference("event or assignee not found"))
            })
        })
        .await?;

        info!(task_id = %task.id, event_id = %event_id, user_id = %user_id, "Task created");
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_guard_failure_maps_not_found_to_forbidden() {
        let err = guard_failure(GuardedAction::DeleteEvent)(DieselError::NotFound);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "only organizers can delete this event");
    }

    #[test]
    fn test_guard_failure_keeps_other_errors() {
        let err = guard_failure(GuardedAction::Invite)(DieselError::RollbackTransaction);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_reference_passes_through_non_fk_errors() {
        let err = missing_reference("event or assignee not found")(DieselError::NotFound);
        assert!(matches!(err, ServiceError::Database(DieselError::NotFound)));
    }
}
