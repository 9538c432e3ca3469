//! Typed data access over a pooled Postgres connection.
//!
//! Functions take `&mut PgConnection` and run synchronously; callers are
//! expected to invoke them from a blocking context (see `services::run_blocking`).

pub mod events;
pub mod tasks;
pub mod users;
