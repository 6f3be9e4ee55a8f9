//! # Users
//!
//! Document store for accounts.
//!
//! ## Requirements
//!
//! - Lookup by email
//! - Email is unique, enforced when the account is created
//! - Accounts are never updated by the server
//!
//! ## Implementation
//!
//! - Redis string per account: `user:<email>` holding the JSON document
//! - The connection is opened lazily on the first request that needs it
//! - `SET NX` makes the uniqueness check and the insert one atomic step,
//!   so two signups racing on the same email cannot both succeed
//! - Without a `REDIS_URL` the server falls back to [`MemoryUserStore`],
//!   which is also what the tests run against
use std::collections::{HashMap, hash_map::Entry};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};
use tracing::info;

use crate::user::User;

pub const USER_PREFIX: &str = "user:";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Corrupt user document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Returns `false` without writing when the email is already taken.
    async fn insert(&self, user: &User) -> Result<bool, StoreError>;
}

pub async fn init_redis(client: &Client) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(1);

    let connection_manager = client.get_connection_manager_with_config(config).await?;
    info!("Connected to Redis");

    Ok(connection_manager)
}

fn user_key(email: &str) -> String {
    format!("{USER_PREFIX}{email}")
}

/// Connects on first use, a store that is down at boot only fails the requests
/// that need it. A failed connect is not cached, the next request tries again.
pub struct RedisUserStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisUserStore {
    /// Only parses the URL, no connection is made here.
    pub fn open(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::open(redis_url)?,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        self.connection
            .get_or_try_init(|| init_redis(&self.client))
            .await
            .cloned()
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut connection = self.connection().await?;
        let document: Option<String> = connection.get(user_key(email)).await?;

        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, user: &User) -> Result<bool, StoreError> {
        let mut connection = self.connection().await?;
        let document = serde_json::to_string(user)?;

        let created: bool = connection.set_nx(user_key(&user.email), document).await?;

        Ok(created)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<bool, StoreError> {
        match self.users.write().await.entry(user.email.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(email: &str) -> User {
        User::new("Ada".to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = MemoryUserStore::new();
        let user = sample("ada@example.com");

        assert!(store.insert(&user).await.unwrap());
        assert_eq!(
            store.find_by_email("ada@example.com").await.unwrap(),
            Some(user)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();

        assert!(store.insert(&sample("ada@example.com")).await.unwrap());
        assert!(!store.insert(&sample("ada@example.com")).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_email() {
        let store = MemoryUserStore::new();

        assert!(store.is_empty().await);
        assert_eq!(store.find_by_email("nobody@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_redis_fails_per_call() {
        let store = RedisUserStore::open("redis://127.0.0.1:1/").unwrap();

        let err = store.find_by_email("ada@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Redis(_)));

        // nothing was cached, the next call tries to connect again
        let err = store.insert(&sample("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Redis(_)));
    }

    #[test]
    fn test_bad_redis_url() {
        assert!(RedisUserStore::open("not a url").is_err());
    }

    #[test]
    fn test_user_key() {
        assert_eq!(user_key("a@b.c"), "user:a@b.c");
    }
}
