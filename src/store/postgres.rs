use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, UserStore};
use crate::auth::hash_refresh_token;
use crate::error::StorageError;
use crate::models::{Chirp, NewChirp, NewUser, RefreshTokenRecord, User};

/// Postgres-backed store
///
/// Refresh tokens are persisted as their SHA-256 digest; the plaintext only
/// ever exists on the client and in the request that presents it.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRow {
    fn into_record(self, token: &str) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token: token.to_string(),
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
            revoked_at: self.revoked_at,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the migrations under `./migrations`.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Unexpected(format!("migration failed: {}", e)))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password)
            VALUES ($1, $2, $2, $3, $4)
            RETURNING id, created_at, updated_at, email, hashed_password, is_chirpy_red
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, created_at, updated_at, email, hashed_password, is_chirpy_red
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: NewUser) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, created_at, updated_at, email, hashed_password, is_chirpy_red
            "#,
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.hashed_password)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_chirpy_red = true, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_users(&self) -> Result<(), StorageError> {
        // chirps and refresh_tokens go with them (ON DELETE CASCADE)
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for PgStore {
    async fn create_chirp(&self, new_chirp: NewChirp) -> Result<Chirp, StorageError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $2, $3, $4)
            RETURNING id, created_at, updated_at, body, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .bind(&new_chirp.body)
        .bind(new_chirp.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, StorageError> {
        let chirps = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StorageError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StorageError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $3, $4)
            RETURNING user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(hash_refresh_token(token))
        .bind(user_id)
        .bind(Utc::now())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record(token))
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StorageError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_refresh_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_record(token)))
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        // COALESCE keeps the first revocation time on repeat calls.
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_refresh_token(token))
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
