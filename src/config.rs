use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without one the API runs on the
    /// in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub plants_cache_ttl_secs: u64,
    /// Largest decoded image accepted on plants and plant types.
    pub max_image_bytes: usize,

    pub seed_defaults: bool,
    pub default_images_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "0.0.0.0".into(),
            port: 8080,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            plants_cache_ttl_secs: 60,
            max_image_bytes: 5 * 1024 * 1024,
            seed_defaults: true,
            default_images_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// unset or empty keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_url: var("DATABASE_URL"),
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_or(var("PORT"), "PORT", defaults.port)?,
            frontend_url: var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            cors_extra_origins: var("CORS_EXTRA_ORIGINS")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),

            plants_cache_ttl_secs: parse_or(
                var("PLANTS_CACHE_TTL_SECS"),
                "PLANTS_CACHE_TTL_SECS",
                defaults.plants_cache_ttl_secs,
            )?,
            max_image_bytes: parse_or(
                var("MAX_IMAGE_BYTES"),
                "MAX_IMAGE_BYTES",
                defaults.max_image_bytes,
            )?,

            seed_defaults: parse_or(var("SEED_DEFAULTS"), "SEED_DEFAULTS", defaults.seed_defaults)?,
            default_images_dir: var("DEFAULT_IMAGES_DIR").map(PathBuf::from),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn plants_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.plants_cache_ttl_secs)
    }

    /// Request body limit: base64 inflates by 4/3, plus room for the other
    /// JSON fields.
    pub fn max_body_bytes(&self) -> usize {
        (self.max_image_bytes / 3)
            .saturating_mul(4)
            .saturating_add(64 * 1024)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        None => Ok(default),
    }
}
