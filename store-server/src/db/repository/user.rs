//! User Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{User, UserCreate, UserUpdate};
use chrono::Utc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::new(db, timeout),
        }
    }

    /// All users, oldest first
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        self.base
            .guard("user.find_all", async {
                let users: Vec<User> = self
                    .base
                    .db()
                    .query("SELECT * FROM user ORDER BY created_at ASC")
                    .await?
                    .take(0)?;
                Ok(users)
            })
            .await
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = record_id(USER_TABLE, id)?;
        self.base
            .guard("user.find_by_id", async {
                let user: Option<User> = self.base.db().select(rid).await?;
                Ok(user)
            })
            .await
    }

    /// Find user by email (unique)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.to_lowercase();
        self.base
            .guard("user.find_by_email", async {
                let mut result = self
                    .base
                    .db()
                    .query("SELECT * FROM user WHERE email = $email LIMIT 1")
                    .bind(("email", email))
                    .await?;
                let users: Vec<User> = result.take(0)?;
                Ok(users.into_iter().next())
            })
            .await
    }

    /// Create a new user. The password is hashed here; the unique email
    /// index backs up the duplicate check against races.
    ///
    /// `hash_pass` is marked skip_serializing on the model, so the insert
    /// binds every field explicitly instead of using CONTENT.
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                data.email
            )));
        }

        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        self.base
            .guard("user.create", async {
                let mut result = self
                    .base
                    .db()
                    .query(
                        r#"CREATE user SET
                            name = $name,
                            email = $email,
                            hash_pass = $hash_pass,
                            is_admin = $is_admin,
                            created_at = $created_at
                        RETURN AFTER"#,
                    )
                    .bind(("name", data.name))
                    .bind(("email", data.email.to_lowercase()))
                    .bind(("hash_pass", hash_pass))
                    .bind(("is_admin", data.is_admin))
                    .bind(("created_at", Utc::now()))
                    .await?;

                let created: Option<User> = result.take(0)?;
                created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
            })
            .await
    }

    /// Update name/email/password. Re-hashes when a new password arrives.
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let rid = record_id(USER_TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        if let Some(new_email) = &data.email
            && new_email.to_lowercase() != existing.email
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                new_email
            )));
        }

        let hash_pass = match &data.password {
            Some(password) => Some(
                User::hash_password(password)
                    .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?,
            ),
            None => None,
        };

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.email.is_some() {
            set_parts.push("email = $email");
        }
        if hash_pass.is_some() {
            set_parts.push("hash_pass = $hash_pass");
        }

        if set_parts.is_empty() {
            return Ok(existing);
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut request = self.base.db().query(query_str).bind(("thing", rid));
        if let Some(v) = data.name {
            request = request.bind(("name", v));
        }
        if let Some(v) = data.email {
            request = request.bind(("email", v.to_lowercase()));
        }
        if let Some(v) = hash_pass {
            request = request.bind(("hash_pass", v));
        }

        self.base
            .guard("user.update", async {
                let mut result = request.await?;
                let users: Vec<User> = result.take(0)?;
                users
                    .into_iter()
                    .next()
                    .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
            })
            .await
    }

    /// Hard delete a user
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = record_id(USER_TABLE, id)?;
        self.base
            .guard("user.delete", async {
                let deleted: Option<User> = self.base.db().delete(rid).await?;
                if deleted.is_none() {
                    return Err(RepoError::NotFound(format!("User {} not found", id)));
                }
                Ok(())
            })
            .await
    }
}
