use diesel::prelude::*;

use crate::models::{NewTask, Task};
use crate::schema::tasks;

pub fn create_task(conn: &mut PgConnection, new_task: &NewTask) -> QueryResult<Task> {
    diesel::insert_into(tasks::table)
        .values(new_task)
        .returning(Task::as_returning())
        .get_result(conn)
}
