use std::path::PathBuf;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DIARY_JWT_SECRET is unset or empty")]
    MissingSecret,

    #[error("DIARY_JWT_SECRET is still a placeholder value")]
    PlaceholderSecret,

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("DIARY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::PlaceholderSecret);
        }

        let port = match lookup("DIARY_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "DIARY_PORT",
                value: raw,
            })?,
            None => 3000,
        };

        Ok(Self {
            jwt_secret,
            db_path: lookup("DIARY_DB_PATH").unwrap_or_else(|| "diary.db".into()).into(),
            host: lookup("DIARY_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            cors_origin: lookup("DIARY_CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".into()),
        })
    }
}
