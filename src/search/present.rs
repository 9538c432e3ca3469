//! Response shaping for search results.

use chrono::{DateTime, Days, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ParticipantRole;
use crate::models::{Event, Task};

use super::criteria::{start_of_day, SearchCriteria};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Overdue,
    Today,
    Upcoming,
    NoDueDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub organizer_id: i32,
    pub is_upcoming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "in 3 days")]
    pub time_until: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub id: i32,
    pub event_id: i32,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i32>,
    pub status: TaskStatus,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ParticipantRole>,
    pub date_range: DateRange,
    pub result_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub meta: SearchMeta,
    pub events: Vec<EventResult>,
    pub tasks: Vec<TaskResult>,
}

/// Coarse distance to `start`, or `None` once it has begun.
pub fn time_until(start: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    if start <= now {
        return None;
    }

    let hours = (start - now).num_hours();
    let days = hours / 24;

    Some(if days > 30 {
        "in more than a month".to_string()
    } else if days > 1 {
        format!("in {} days", days)
    } else if hours >= 1 {
        format!("in {} hours", hours)
    } else {
        "very soon".to_string()
    })
}

/// Classifies a due date against the calendar day of `now`.
pub fn task_status<Tz: TimeZone>(due: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> TaskStatus {
    let Some(due) = due else {
        return TaskStatus::NoDueDate;
    };

    let tz = now.timezone();
    let today = now.date_naive();
    let (Some(day_start), Some(next_day_start)) = (
        start_of_day(&tz, today),
        today
            .checked_add_days(Days::new(1))
            .and_then(|d| start_of_day(&tz, d)),
    ) else {
        return TaskStatus::Upcoming;
    };

    if due < day_start {
        TaskStatus::Overdue
    } else if due < next_day_start {
        TaskStatus::Today
    } else {
        TaskStatus::Upcoming
    }
}

impl EventResult {
    pub fn from_event(event: Event, now: DateTime<Utc>) -> Self {
        Self {
            is_upcoming: event.start_time > now,
            time_until: time_until(event.start_time, now),
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_time: event.start_time,
            organizer_id: event.organizer_id,
        }
    }
}

impl TaskResult {
    pub fn from_task<Tz: TimeZone>(task: Task, now: &DateTime<Tz>) -> Self {
        Self {
            status: task_status(task.due_date, now),
            id: task.id,
            event_id: task.event_id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            assignee_id: task.assignee_id,
        }
    }
}

impl SearchResponse {
    pub fn assemble<Tz: TimeZone>(
        criteria: &SearchCriteria,
        events: Vec<Event>,
        tasks: Vec<Task>,
        now: &DateTime<Tz>,
    ) -> Self {
        let now_utc = now.with_timezone(&Utc);

        let events: Vec<EventResult> = events
            .into_iter()
            .map(|e| EventResult::from_event(e, now_utc))
            .collect();
        let tasks: Vec<TaskResult> = tasks
            .into_iter()
            .map(|t| TaskResult::from_task(t, now))
            .collect();

        Self {
            meta: SearchMeta {
                query: criteria.text.clone(),
                role: criteria.role,
                date_range: DateRange {
                    from: criteria.from,
                    to: criteria.to,
                },
                result_count: events.len() + tasks.len(),
            },
            events,
            tasks,
        }
    }
}
