//! Credential handling.

pub mod password;

pub use password::{PasswordPolicy, PasswordPolicyError, PasswordService};
