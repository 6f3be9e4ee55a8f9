use std::sync::Arc;

use tracing::{info, warn};

use super::{
    auth::AuthService,
    config::Config,
    database::{MemoryUserStore, RedisUserStore, StoreError, UserStore},
    doctors::DoctorDirectory,
    gemini::{GeminiClient, TextGenerator},
};

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub generator: Arc<dyn TextGenerator>,
    pub directory: DoctorDirectory,
}

impl AppState {
    pub fn new() -> Result<Arc<Self>, StoreError> {
        Self::from_config(Config::load())
    }

    /// Fails only on a malformed `REDIS_URL`, reaching Redis is left to the first request.
    pub fn from_config(config: Config) -> Result<Arc<Self>, StoreError> {
        let users: Arc<dyn UserStore> = match &config.redis_url {
            Some(redis_url) => Arc::new(RedisUserStore::open(redis_url)?),
            None => {
                warn!("No REDIS_URL, accounts are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new())
            }
        };
        info!("User store ready");

        let generator = Arc::new(GeminiClient::from_config(&config));

        Ok(Self::with_parts(config, users, generator))
    }

    pub fn with_parts(
        config: Config,
        users: Arc<dyn UserStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Arc<Self> {
        let auth = AuthService::new(users, config.jwt_secret.as_deref());

        Arc::new(Self {
            config,
            auth,
            generator,
            directory: DoctorDirectory::default(),
        })
    }
}
