//! Request middleware.

pub mod identity;
pub mod request_id;

pub use identity::{require_identity, Identity, USER_ID_HEADER};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
