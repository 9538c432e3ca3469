//! Signup and login.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::auth::password::{PasswordPolicy, PasswordService};
use crate::error::{is_unique_violation, ServiceError};
use crate::models::{NewUser, User};
use crate::repositories::users as user_repo;
use crate::DbPool;

use super::run_blocking;

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
    policy: PasswordPolicy,
    hash_cost: u32,
    // Verified against when the email is unknown, so both login failures cost one hash.
    dummy_hash: Arc<OnceCell<String>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_error(e: argon2::password_hash::Error) -> ServiceError {
    ServiceError::PasswordHash(e.to_string())
}

impl UserService {
    pub fn new(pool: DbPool, policy: PasswordPolicy, hash_cost: u32) -> Self {
        Self {
            pool,
            policy,
            hash_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::validation("name is required"));
        }
        self.policy
            .validate(password)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let email = normalize_email(email);
        let password = password.to_string();
        let cost = self.hash_cost;

        let user = run_blocking(&self.pool, move |conn| {
            if user_repo::email_exists(conn, &email)? {
                warn!(email = %email, "Signup for registered email");
                return Err(ServiceError::UserExists);
            }

            let password_hash =
                PasswordService::hash_password_with_cost(&password, cost).map_err(hash_error)?;

            user_repo::create_user(
                conn,
                &NewUser {
                    name,
                    email,
                    password_hash,
                },
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::UserExists
                } else {
                    e.into()
                }
            })
        })
        .await?;

        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        let password = password.to_string();
        let dummy_hash = Arc::clone(&self.dummy_hash);
        let cost = self.hash_cost;

        let user = run_blocking(&self.pool, move |conn| {
            let Some(user) = user_repo::find_by_email(conn, &email)? else {
                let dummy = dummy_hash.get_or_try_init(|| {
                    PasswordService::hash_password_with_cost("dummy-password", cost)
                        .map_err(hash_error)
                })?;
                let _ = PasswordService::verify_password(&password, dummy);
                warn!(email = %email, "Login attempt for unknown email");
                return Err(ServiceError::InvalidCredentials);
            };

            let valid = PasswordService::verify_password(&password, &user.password_hash)
                .map_err(hash_error)?;
            if !valid {
                warn!(user_id = %user.id, "Failed login attempt - invalid password");
                return Err(ServiceError::InvalidCredentials);
            }
            Ok(user)
        })
        .await?;

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }
}
