//! Organizer guards for event mutations.

use diesel::PgConnection;
use tracing::warn;

use crate::error::ServiceError;
use crate::repositories::events as event_repo;

/// Actions reserved to an event's organizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    DeleteEvent,
    Invite,
    ViewParticipants,
    CreateTask,
}

impl GuardedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            GuardedAction::DeleteEvent => "delete_event",
            GuardedAction::Invite => "invite",
            GuardedAction::ViewParticipants => "view_participants",
            GuardedAction::CreateTask => "create_task",
        }
    }

    pub fn denial_message(self) -> &'static str {
        match self {
            GuardedAction::DeleteEvent => "only organizers can delete this event",
            GuardedAction::Invite => "only organizers can invite to this event",
            GuardedAction::ViewParticipants => "only organizers can view participants",
            GuardedAction::CreateTask => "only organizers can create tasks",
        }
    }

    pub fn denied(self) -> ServiceError {
        ServiceError::forbidden(self.denial_message())
    }
}

/// True iff `user_id` has an organizer participant row for `event_id`.
pub fn is_organizer(
    conn: &mut PgConnection,
    event_id: i32,
    user_id: i32,
) -> Result<bool, ServiceError> {
    let role = event_repo::find_role(conn, event_id, user_id)?;
    Ok(role.is_some_and(|r| r.is_privileged()))
}

pub fn require_organizer(
    conn: &mut PgConnection,
    event_id: i32,
    user_id: i32,
    action: GuardedAction,
) -> Result<(), ServiceError> {
    if is_organizer(conn, event_id, user_id)? {
        return Ok(());
    }
    warn!(
        event_id = %event_id,
        user_id = %user_id,
        action = action.as_str(),
        "Organizer check failed"
    );
    Err(action.denied())
}
