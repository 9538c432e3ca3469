//! Structured predicate builder for event and task search.
//!
//! Criteria become an ordered list of typed predicates. Each target
//! (events, tasks) folds that list into a boxed diesel query, so values only
//! ever travel as bind parameters.

use chrono::{DateTime, Utc};
use diesel::dsl::{self, InnerJoin, IntoBoxed, Select};
use diesel::expression_methods::{PgSortExpressionMethods, PgTextExpressionMethods};
use diesel::pg::Pg;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::ParticipantRole;
use crate::models::{Event, Task};
use crate::schema::{event_participants, events, tasks};

use super::criteria::SearchCriteria;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// The event's organizer is this user.
    OrganizedBy(i32),
    /// The user participates in the event with exactly this role.
    HasRole { user_id: i32, role: ParticipantRole },
    /// Escaped `ILIKE` pattern.
    Text(String),
    StartsFrom(DateTime<Utc>),
    StartsUntil(DateTime<Utc>),
}

type TasksWithEvents =
    Select<InnerJoin<tasks::table, events::table>, <tasks::table as Table>::AllColumns>;

type ParticipantSubquery = Select<
    dsl::Filter<
        dsl::Filter<event_participants::table, dsl::Eq<event_participants::user_id, i32>>,
        dsl::Eq<event_participants::role, ParticipantRole>,
    >,
    event_participants::event_id,
>;

pub type EventsQuery = events::BoxedQuery<'static, Pg>;
pub type TasksQuery = IntoBoxed<'static, TasksWithEvents, Pg>;

/// Wraps `text` in `%...%`, escaping LIKE metacharacters so they match literally.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    predicates: Vec<Predicate>,
}

impl SearchFilter {
    /// Predicates are added in a fixed order: role, text, start, end.
    /// Role scoping needs both a role and an acting user.
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        let mut predicates = Vec::new();

        if let (Some(role), Some(user_id)) = (criteria.role, criteria.user_id) {
            predicates.push(match role {
                ParticipantRole::Organizer => Predicate::OrganizedBy(user_id),
                role => Predicate::HasRole { user_id, role },
            });
        }
        if let Some(text) = &criteria.text {
            predicates.push(Predicate::Text(like_pattern(text)));
        }
        if let Some(from) = criteria.from {
            predicates.push(Predicate::StartsFrom(from));
        }
        if let Some(to) = criteria.to {
            predicates.push(Predicate::StartsUntil(to));
        }

        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn uses_participants(&self) -> bool {
        self.predicates
            .iter()
            .any(|p| matches!(p, Predicate::HasRole { .. }))
    }

    /// Matching events, earliest start first.
    pub fn events_query(&self) -> EventsQuery {
        let mut query = events::table.into_boxed();

        for predicate in &self.predicates {
            query = match predicate {
                Predicate::OrganizedBy(user_id) => query.filter(events::organizer_id.eq(*user_id)),
                Predicate::HasRole { user_id, role } => query.filter(
                    events::id.eq_any(participating_events(*user_id, *role)),
                ),
                Predicate::Text(pattern) => query.filter(
                    events::title
                        .ilike(pattern.clone())
                        .or(events::description.ilike(pattern.clone()))
                        .or(events::location.ilike(pattern.clone())),
                ),
                Predicate::StartsFrom(from) => query.filter(events::start_time.ge(*from)),
                Predicate::StartsUntil(to) => query.filter(events::start_time.le(*to)),
            };
        }

        query.order((events::start_time.asc(), events::id.asc()))
    }

    /// Matching tasks, scoped through their event. Tasks without a due date
    /// satisfy every date bound. Sorted by due date with unscheduled tasks last.
    pub fn tasks_query(&self) -> TasksQuery {
        let mut query = tasks::table
            .inner_join(events::table)
            .select(tasks::all_columns)
            .into_boxed();

        for predicate in &self.predicates {
            query = match predicate {
                Predicate::OrganizedBy(user_id) => query.filter(events::organizer_id.eq(*user_id)),
                Predicate::HasRole { user_id, role } => query.filter(
                    events::id.eq_any(participating_events(*user_id, *role)),
                ),
                Predicate::Text(pattern) => query.filter(
                    tasks::title
                        .ilike(pattern.clone())
                        .or(tasks::description.ilike(pattern.clone())),
                ),
                Predicate::StartsFrom(from) => query.filter(
                    tasks::due_date
                        .is_null()
                        .or(tasks::due_date.assume_not_null().ge(*from)),
                ),
                Predicate::StartsUntil(to) => query.filter(
                    tasks::due_date
                        .is_null()
                        .or(tasks::due_date.assume_not_null().le(*to)),
                ),
            };
        }

        query.order((tasks::due_date.asc().nulls_last(), tasks::id.asc()))
    }

    pub fn load_events(&self, conn: &mut PgConnection) -> QueryResult<Vec<Event>> {
        self.log_shape("events");
        self.events_query().load::<Event>(conn)
    }

    pub fn load_tasks(&self, conn: &mut PgConnection) -> QueryResult<Vec<Task>> {
        self.log_shape("tasks");
        self.tasks_query().load::<Task>(conn)
    }

    fn log_shape(&self, target: &'static str) {
        debug!(
            target_table = target,
            predicates = self.predicates.len(),
            participant_subquery = self.uses_participants(),
            "Running search query"
        );
    }
}

/// Ids of events where `user_id` holds `role`. Used as a semi-join, which
/// matches the join form because (event_id, user_id) is unique.
fn participating_events(user_id: i32, role: ParticipantRole) -> ParticipantSubquery {
    event_participants::table
        .filter(event_participants::user_id.eq(user_id))
        .filter(event_participants::role.eq(role))
        .select(event_participants::event_id)
}
