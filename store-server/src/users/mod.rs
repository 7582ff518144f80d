//! User accounts
//!
//! Registration, login, profile management and the admin user listing.
//! Passwords exist in the clear only inside the register/login payloads;
//! storage sees argon2 hashes exclusively.

use crate::auth::{Identity, JwtService, require_admin, require_self_or_admin};
use crate::db::models::{User, UserCreate, UserUpdate};
use crate::db::repository::{UserRepository, record_id};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, validate_optional_text,
};
use crate::utils::{AppError, AppResult};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use validator::{Validate, ValidateEmail};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// A signed-in user plus their bearer token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    jwt: Arc<JwtService>,
}

impl UserService {
    pub fn new(users: UserRepository, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Register a new customer account. Admin accounts are never created
    /// through registration.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let user = self
            .users
            .create(UserCreate {
                name: input.name,
                email: input.email,
                password: input.password,
                is_admin: false,
            })
            .await?;

        tracing::info!(user = %user.email, "User registered");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate with email and password.
    ///
    /// The delay runs before the result check and the error message never
    /// says whether the email exists.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let found = self.users.find_by_email(email).await?;

        tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

        let user = match found {
            Some(user) => user,
            None => {
                tracing::warn!(email = %email, "Login failed - user not found");
                return Err(AppError::invalid_credentials());
            }
        };

        let password_valid = user
            .verify_password(password)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
        if !password_valid {
            tracing::warn!(email = %email, "Login failed - invalid credentials");
            return Err(AppError::invalid_credentials());
        }

        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Fetch a profile: self or admin
    pub async fn get_profile(&self, actor: &Identity, user_id: &str) -> AppResult<User> {
        let target = record_id("user", user_id)?.to_string();
        require_self_or_admin(actor, &target)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))
    }

    /// Update name/email/password: self or admin
    pub async fn update_profile(
        &self,
        actor: &Identity,
        user_id: &str,
        update: UserUpdate,
    ) -> AppResult<User> {
        let target = record_id("user", user_id)?.to_string();
        require_self_or_admin(actor, &target)?;

        validate_optional_text(&update.name, "name", MAX_NAME_LEN)?;
        if let Some(email) = &update.email {
            if email.len() > MAX_EMAIL_LEN || !email.validate_email() {
                return Err(AppError::validation("Invalid email address"));
            }
        }
        if let Some(password) = &update.password
            && !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.chars().count())
        {
            return Err(AppError::validation(format!(
                "Password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
            )));
        }

        Ok(self.users.update(user_id, update).await?)
    }

    /// List every account (admin only)
    pub async fn list_users(&self, actor: &Identity) -> AppResult<Vec<User>> {
        require_admin(actor)?;
        Ok(self.users.find_all().await?)
    }

    /// Delete an account (admin only). Admins cannot delete themselves.
    pub async fn delete_user(&self, actor: &Identity, user_id: &str) -> AppResult<()> {
        require_admin(actor)?;
        let target = record_id("user", user_id)?.to_string();
        if actor.user_id == target {
            return Err(AppError::validation("Admin cannot delete own account"));
        }
        self.users.delete(user_id).await?;
        tracing::info!(user = %target, by = %actor.user_id, "User deleted");
        Ok(())
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        let user_id = user
            .id
            .as_ref()
            .ok_or_else(|| AppError::internal("User record missing id"))?
            .to_string();
        self.jwt
            .generate_token(&user_id, &user.name, user.is_admin)
            .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))
    }
}
