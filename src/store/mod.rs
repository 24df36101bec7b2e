/// Persistence port
///
/// The service never talks to a database directly. Handlers and the session
/// layer depend on these traits; `PgStore` and `InMemoryStore` implement them.
/// Uniqueness of emails and refresh tokens, and atomic revocation, are the
/// adapter's job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{Chirp, NewChirp, NewUser, RefreshTokenRecord, User};

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Replaces email and password hash; `None` if no such user.
    async fn update_user(&self, id: Uuid, changes: NewUser) -> Result<Option<User>, StorageError>;

    /// Marks the user as a paying member; `false` if no such user.
    async fn upgrade_user(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Removes every user together with their chirps and refresh tokens.
    async fn delete_all_users(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, new_chirp: NewChirp) -> Result<Chirp, StorageError>;

    /// Oldest first.
    async fn list_chirps(&self) -> Result<Vec<Chirp>, StorageError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StorageError>;

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StorageError>;

    /// Exact, case-sensitive lookup.
    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StorageError>;

    /// Sets `revoked_at` unless it is already set; `false` if no such token.
    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError>;
}

/// Everything the service needs from storage.
pub trait Store: UserStore + ChirpStore + RefreshTokenStore {}

impl<T> Store for T where T: UserStore + ChirpStore + RefreshTokenStore {}
