//! Event, invitation, attendance and task handlers.
//!
//! Every route here sits behind `require_identity`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{AttendanceStatus, ParticipantRole},
    error::{ApiError, ApiResult},
    helpers::{parse_event_id, JsonBody},
    middleware::Identity,
    models::{Event, ParticipantView, Task},
    services::{CreateEventInput, CreateTaskInput},
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schema(example = "Team offsite")]
    pub title: String,
    #[schema(example = "Planning day for Q3")]
    pub description: Option<String>,
    #[schema(example = "Main office")]
    pub location: Option<String>,
    /// RFC 3339 timestamp.
    #[schema(example = "2030-01-01T10:00:00Z")]
    pub start_time: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[schema(example = 2)]
    pub user_id: i32,
    #[schema(example = "attendee")]
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    /// Defaults to the caller. Any other user is rejected.
    pub user_id: Option<i32>,
    #[schema(example = "going")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[schema(example = "Book the venue")]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Event deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn parse_start_time(raw: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::bad_request("invalid startTime, use RFC3339", "INVALID_START_TIME"))
}

#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    request_body = CreateEventRequest,
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Event created", body = Event),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Missing or invalid X-User-ID", body = ApiError),
        (status = 409, description = "An event already exists at this time", body = ApiError)
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<CreateEventRequest>,
) -> ApiResult<Json<Event>> {
    let start_time = parse_start_time(&payload.start_time)?;

    let event = state
        .events
        .create_event(
            identity.user_id(),
            CreateEventInput {
                title: payload.title,
                description: payload.description,
                location: payload.location,
                start_time,
            },
        )
        .await?;

    Ok(Json(event))
}

#[utoipa::path(
    get,
    path = "/events/organized",
    tag = "Events",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Events organized by the caller", body = Vec<Event>),
        (status = 401, description = "Missing or invalid X-User-ID", body = ApiError)
    )
)]
pub async fn list_organized(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.events.list_organized(identity.user_id()).await?))
}

#[utoipa::path(
    get,
    path = "/events/invited",
    tag = "Events",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Events the caller is invited to", body = Vec<Event>),
        (status = 401, description = "Missing or invalid X-User-ID", body = ApiError)
    )
)]
pub async fn list_invited(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.events.list_invited(identity.user_id()).await?))
}

#[utoipa::path(
    post,
    path = "/events/{id}/invite",
    tag = "Events",
    params(("id" = i32, Path, description = "Event id")),
    request_body = InviteRequest,
    security(("user_id" = [])),
    responses(
        (status = 200, description = "User invited", body = MessageResponse),
        (status = 400, description = "Invalid id, role or self-invite", body = ApiError),
        (status = 403, description = "Caller is not an organizer", body = ApiError),
        (status = 404, description = "Invitee not found", body = ApiError)
    )
)]
pub async fn invite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<InviteRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let event_id = parse_event_id(&id)?;
    let role = payload
        .role
        .parse::<ParticipantRole>()
        .map_err(|e| ApiError::bad_request(e.to_string(), "INVALID_ROLE"))?;

    state
        .events
        .invite(event_id, identity.user_id(), payload.user_id, role)
        .await?;

    Ok(MessageResponse::new("User invited successfully"))
}

#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "Events",
    params(("id" = i32, Path, description = "Event id")),
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 400, description = "Invalid event id", body = ApiError),
        (status = 403, description = "Caller is not an organizer", body = ApiError)
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let event_id = parse_event_id(&id)?;
    state
        .events
        .delete_event(event_id, identity.user_id())
        .await?;
    Ok(MessageResponse::new("Event deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/events/{id}/attendees",
    tag = "Events",
    params(("id" = i32, Path, description = "Event id")),
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Participants ordered by name", body = Vec<ParticipantView>),
        (status = 400, description = "Invalid event id", body = ApiError),
        (status = 403, description = "Caller is not an organizer", body = ApiError)
    )
)]
pub async fn list_attendees(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ParticipantView>>> {
    let event_id = parse_event_id(&id)?;
    let participants = state
        .events
        .participants(event_id, identity.user_id())
        .await?;
    Ok(Json(participants))
}

#[utoipa::path(
    put,
    path = "/events/{id}/attendance",
    tag = "Events",
    params(("id" = i32, Path, description = "Event id")),
    request_body = AttendanceRequest,
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Attendance updated", body = MessageResponse),
        (status = 400, description = "Invalid id or status", body = ApiError),
        (status = 403, description = "Target user is not the caller", body = ApiError),
        (status = 404, description = "Event not found", body = ApiError)
    )
)]
pub async fn set_attendance(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AttendanceRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let event_id = parse_event_id(&id)?;
    let status = payload
        .status
        .parse::<AttendanceStatus>()
        .map_err(|e| ApiError::bad_request(e.to_string(), "INVALID_STATUS"))?;

    state
        .events
        .set_attendance(event_id, identity.user_id(), payload.user_id, status)
        .await?;

    Ok(MessageResponse::new("Attendance updated successfully"))
}

#[utoipa::path(
    put,
    path = "/events/{id}/accept",
    tag = "Events",
    params(("id" = i32, Path, description = "Event id")),
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Attendance set to going", body = MessageResponse),
        (status = 400, description = "Invalid event id", body = ApiError),
        (status = 404, description = "Event not found", body = ApiError)
    )
)]
pub async fn accept_invite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let event_id = parse_event_id(&id)?;
    state.events.accept(event_id, identity.user_id()).await?;
    Ok(MessageResponse::new("Invitation accepted successfully"))
}

#[utoipa::path(
    post,
    path = "/events/{id}/tasks",
    tag = "Tasks",
    params(("id" = i32, Path, description = "Event id")),
    request_body = CreateTaskRequest,
    security(("user_id" = [])),
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Missing title or invalid id", body = ApiError),
        (status = 403, description = "Caller is not an organizer", body = ApiError),
        (status = 404, description = "Event or assignee not found", body = ApiError)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let event_id = parse_event_id(&id)?;

    let task = state
        .events
        .create_task(
            event_id,
            identity.user_id(),
            CreateTaskInput {
                title: payload.title,
                description: payload.description,
                due_date: payload.due_date,
                assignee_id: payload.assignee_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}
