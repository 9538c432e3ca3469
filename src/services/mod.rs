//! Business operations over the repositories and policy guards.

pub mod events;
pub mod search;
pub mod users;

use diesel::PgConnection;

use crate::error::ServiceError;
use crate::DbPool;

pub use events::{CreateEventInput, CreateTaskInput, EventService};
pub use search::{SearchResults, SearchService};
pub use users::UserService;

/// Checks out a pooled connection and runs `f` on the blocking thread pool.
pub async fn run_blocking<T, F>(pool: &DbPool, f: F) -> Result<T, ServiceError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("blocking task failed: {}", e)))?
}
