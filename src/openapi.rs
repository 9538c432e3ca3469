//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::{AttendanceStatus, ParticipantRole};
use crate::error::ApiError;
use crate::handlers::{auth, events, health};
use crate::models::{Event, ParticipantView, Task};
use crate::search::present::{DateRange, EventResult, SearchMeta, SearchResponse, TaskResult, TaskStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Planner API",
        version = "1.0.0",
        description = "Accounts, events, invitations, attendance, tasks and search.\n\n\
        ## Identity\n\
        Event routes read the caller from the `X-User-ID` header (a positive integer).\n\
        The value is not verified. `/login` returns a placeholder token that no route checks.\n\n\
        ## Search\n\
        `/search` is public. Dates accept `YYYY-MM-DD`, `today`, `tomorrow` or `nextweek`, \
        resolved in the server's local time zone.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Authentication", description = "Signup and login"),
        (name = "Events", description = "Event lifecycle, invitations and attendance"),
        (name = "Tasks", description = "Event tasks"),
        (name = "Search", description = "Public search over events and tasks")
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::ready_check,

        crate::handlers::auth::signup,
        crate::handlers::auth::login,

        crate::handlers::events::create_event,
        crate::handlers::events::list_organized,
        crate::handlers::events::list_invited,
        crate::handlers::events::invite,
        crate::handlers::events::delete_event,
        crate::handlers::events::list_attendees,
        crate::handlers::events::set_attendance,
        crate::handlers::events::accept_invite,
        crate::handlers::events::create_task,

        crate::handlers::search::search,
    ),
    components(
        schemas(
            ApiError,
            health::HealthResponse,
            health::ReadinessResponse,
            health::ComponentStatus,

            auth::SignupRequest,
            auth::SignupResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserSummary,

            Event,
            Task,
            ParticipantView,
            ParticipantRole,
            AttendanceStatus,
            events::CreateEventRequest,
            events::InviteRequest,
            events::AttendanceRequest,
            events::CreateTaskRequest,
            events::MessageResponse,

            SearchResponse,
            SearchMeta,
            DateRange,
            EventResult,
            TaskResult,
            TaskStatus,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-User-ID",
                    "Numeric id of the acting user",
                ))),
            );
        }
    }
}

pub fn swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
