use diesel::result::Error as DieselError;
use tracing::debug;

use crate::error::ServiceError;
use crate::models::{Event, Task};
use crate::search::{SearchCriteria, SearchFilter};
use crate::DbPool;

use super::run_blocking;

#[derive(Debug, Default)]
pub struct SearchResults {
    pub events: Vec<Event>,
    pub tasks: Vec<Task>,
}

#[derive(Clone)]
pub struct SearchService {
    pool: DbPool,
}

impl SearchService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs the event and task queries in one read-only transaction.
    /// Role scoping applies only when `criteria.user_id` is set.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResults, ServiceError> {
        let filter = SearchFilter::from_criteria(criteria);

        let results = run_blocking(&self.pool, move |conn| {
            conn.build_transaction()
                .read_only()
                .run::<_, DieselError, _>(|conn| {
                    Ok(SearchResults {
                        events: filter.load_events(conn)?,
                        tasks: filter.load_tasks(conn)?,
                    })
                })
                .map_err(ServiceError::from)
        })
        .await?;

        debug!(
            events = results.events.len(),
            tasks = results.tasks.len(),
            "Search completed"
        );
        Ok(results)
    }
}
