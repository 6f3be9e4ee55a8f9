//! # Auth
//!
//! Signup and login.
//!
//! ## Flow
//! - Signup: presence check, bcrypt hash, insert keyed by email
//! - Login: lookup by email, bcrypt verify, HS256 token holding the user id
//! - Tokens last one hour and are never revoked server side
//!
//! ## Notes
//! - bcrypt is CPU bound, both hashing and verifying run on the blocking pool
//! - No password reset, email verification or attempt limiting
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;
use tracing::info;

use crate::{
    database::UserStore,
    error::AppError,
    user::{PublicUser, User},
};

pub const BCRYPT_COST: u32 = 10;
pub const TOKEN_TTL_SECS: i64 = 60 * 60;
pub const MISSING_FIELDS: &str = "Please fill in all fields!";
pub const NO_SECRET: &str = "JWT_SECRET is not configured";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            id: user_id.to_string(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalError(e.into()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();

    spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::InternalError(e.into()))?
        .map_err(|e| AppError::InternalError(e.into()))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();

    spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::InternalError(e.into()))?
        .map_err(|e| AppError::InternalError(e.into()))
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: Option<TokenKeys>,
}

impl AuthService {
    /// Without a secret, signup still works but every login fails with a server error.
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: Option<&str>) -> Self {
        Self {
            users,
            keys: jwt_secret.map(TokenKeys::new),
        }
    }

    pub fn keys(&self) -> Option<&TokenKeys> {
        self.keys.as_ref()
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<(), AppError> {
        if blank(name) || blank(email) || blank(password) {
            return Err(AppError::InvalidInput(MISSING_FIELDS));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password(password).await?;
        let user = User::new(name.to_string(), email.to_string(), password_hash);

        // a racing signup may have taken the email since the lookup
        if !self.users.insert(&user).await? {
            return Err(AppError::DuplicateEmail);
        }

        info!("Registered user {}", user.id);
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if blank(email) || blank(password) {
            return Err(AppError::InvalidInput(MISSING_FIELDS));
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| AppError::InternalError(NO_SECRET.into()))?;
        let token = keys.issue(&user.id)?;

        Ok(Session {
            token,
            user: user.public(),
        })
    }
}
