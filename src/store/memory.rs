use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, UserStore};
use crate::error::StorageError;
use crate::models::{Chirp, NewChirp, NewUser, RefreshTokenRecord, User};

/// Process-local store with the same semantics as `PgStore`.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    chirps: Mutex<Vec<Chirp>>,
    refresh_tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|_| StorageError::Unexpected("in-memory store lock poisoned".to_string()))
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let mut users = lock(&self.users)?;
        if email_taken(&users, &new_user.email, None) {
            return Err(StorageError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: new_user.email,
            hashed_password: new_user.hashed_password,
            is_chirpy_red: false,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: NewUser) -> Result<Option<User>, StorageError> {
        let mut users = lock(&self.users)?;
        if email_taken(&users, &changes.email, Some(id)) {
            return Err(StorageError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        Ok(users.get_mut(&id).map(|user| {
            user.email = changes.email;
            user.hashed_password = changes.hashed_password;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut users = lock(&self.users)?;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_all_users(&self) -> Result<(), StorageError> {
        lock(&self.users)?.clear();
        lock(&self.chirps)?.clear();
        lock(&self.refresh_tokens)?.clear();
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, new_chirp: NewChirp) -> Result<Chirp, StorageError> {
        if !lock(&self.users)?.contains_key(&new_chirp.user_id) {
            return Err(StorageError::QueryExecution(
                "chirps_user_id_fkey violated".to_string(),
            ));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: new_chirp.body,
            user_id: new_chirp.user_id,
        };
        lock(&self.chirps)?.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, StorageError> {
        // Insertion order is creation order.
        Ok(lock(&self.chirps)?.clone())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StorageError> {
        Ok(lock(&self.chirps)?.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut chirps = lock(&self.chirps)?;
        let before = chirps.len();
        chirps.retain(|c| c.id != id);
        Ok(chirps.len() != before)
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StorageError> {
        if !lock(&self.users)?.contains_key(&user_id) {
            return Err(StorageError::QueryExecution(
                "refresh_tokens_user_id_fkey violated".to_string(),
            ));
        }

        let mut tokens = lock(&self.refresh_tokens)?;
        if tokens.contains_key(token) {
            return Err(StorageError::UniqueConstraintViolation(
                "refresh_tokens_pkey".to_string(),
            ));
        }

        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        tokens.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StorageError> {
        Ok(lock(&self.refresh_tokens)?.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let mut tokens = lock(&self.refresh_tokens)?;
        Ok(match tokens.get_mut(token) {
            Some(record) => {
                if record.revoked_at.is_none() {
                    record.revoked_at = Some(at);
                    record.updated_at = at;
                }
                true
            }
            None => false,
        })
    }
}
