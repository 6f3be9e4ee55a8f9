use std::{env, fmt::Display, fs::read_to_string, path::Path, str::FromStr};

use tracing::{info, warn};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const SECRETS_DIR: &str = "/run/secrets";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub gemini_url: String,
    pub gemini_model: String,
    pub gemini_key: String,
    pub jwt_secret: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "5001"),
            redis_url: env::var("REDIS_URL").ok(),
            gemini_url: try_load("GEMINI_URL", DEFAULT_GEMINI_URL),
            gemini_model: try_load("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_key: read_secret("GEMINI_API_KEY").unwrap_or_else(|| {
                warn!("GEMINI_API_KEY missing, symptom analysis will fail upstream");
                String::new()
            }),
            jwt_secret: read_secret("JWT_SECRET").or_else(|| {
                warn!("JWT_SECRET missing, logins will fail");
                None
            }),
        }
    }
}

/// Loads `.env` from the working directory (or a parent) into the environment.
/// Variables already set are left alone.
pub fn load_env_file() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => info!("No .env file loaded: {e}"),
    }
}

/// Same as [`load_env_file`] for an explicit path.
pub fn load_env_file_from(path: &Path) -> bool {
    dotenvy::from_path(path)
        .map_err(|e| {
            info!("No env file at {}: {e}", path.display());
        })
        .is_ok()
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> Option<String> {
    read_secret_from(secret_name, env::var(secret_name).ok(), Path::new(SECRETS_DIR))
}

/// Non-blank environment value first, then `<secrets_dir>/<secret_name>`.
fn read_secret_from(
    secret_name: &str,
    env_value: Option<String>,
    secrets_dir: &Path,
) -> Option<String> {
    let from_env = env_value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if from_env.is_some() {
        return from_env;
    }

    let path = secrets_dir.join(secret_name);

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}
