//! Event and task search: criteria parsing, query building and result shaping.

pub mod criteria;
pub mod filter;
pub mod present;

pub use criteria::{SearchCriteria, SearchParams};
pub use filter::{Predicate, SearchFilter};
pub use present::{EventResult, SearchResponse, TaskResult, TaskStatus};
