//! User Model

use super::serde_helpers;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type UserId = RecordId;

/// User account. The password never leaves this model unhashed and the
/// hash is never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check a login attempt against the stored argon2 hash
    pub fn verify_password(&self, candidate: &str) -> Result<bool, argon2::password_hash::Error> {
        let stored = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &stored)
            .is_ok())
    }

    /// Salted argon2 hash for a new or changed password
    pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(plain.as_bytes(), &salt)?
            .to_string())
    }
}

/// Create user payload (password still in the clear, hashed by the repository)
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// Update user payload
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
