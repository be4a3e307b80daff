//! User repository for database operations.

use chrono::Utc;
use sqlx::SqlitePool;

use tradepost_core::{Email, UserId};

use super::StoreError;
use crate::models::User;

/// Columns selected for a [`User`].
const USER_COLUMNS: &str = "id, username, email, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(user)
    }

    /// Create a new user with a pre-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email already exists.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already exists".to_owned());
            }
            StoreError::Database(e)
        })?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            "SELECT id, username, email, created_at, password_hash
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Update a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn update_profile(&self, id: UserId, username: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(username)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

/// Internal row shape for credential lookups.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("alice@example.com").unwrap();

        let created = repo.create("alice", &email, "hash").await.unwrap();
        assert_eq!(created.username, "alice");

        let by_email = repo.get_by_email(&email).await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, email);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("bob@example.com").unwrap();

        repo.create("bob", &email, "hash").await.unwrap();
        let err = repo.create("robert", &email, "hash2").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_password_hash_roundtrip() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("carol@example.com").unwrap();

        repo.create("carol", &email, "argon2-hash").await.unwrap();
        let (user, hash) = repo.get_password_hash(&email).await.unwrap().unwrap();
        assert_eq!(user.username, "carol");
        assert_eq!(hash, "argon2-hash");

        let missing = Email::parse("nobody@example.com").unwrap();
        assert!(repo.get_password_hash(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("dave@example.com").unwrap();

        let user = repo.create("dave", &email, "hash").await.unwrap();
        repo.update_profile(user.id, "david").await.unwrap();
        assert_eq!(
            repo.get_by_id(user.id).await.unwrap().unwrap().username,
            "david"
        );

        let err = repo
            .update_profile(UserId::new(9999), "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
