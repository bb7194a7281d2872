use std::env;

use chrono::FixedOffset;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "DEV_JWT_SECRET";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing environment variable: {0}")]
  Missing(&'static str),
  #[error("Invalid value for {0}: {1}")]
  Invalid(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct Config {
  pub host: String,
  pub jwt_secret: String,
  pub mongodb_uri: String,
  pub mongodb_database: String,
  pub admin_email: String,
  pub studio_offset: FixedOffset,
  pub contact_inbox: String,
  pub hash_threads: u32,
  pub hash_cost: u32,
  pub auth_rate_per_second: u64,
  pub auth_burst_size: u32,
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let jwt_secret = env::var("JWT_SECRET")
      .or_else(|_| env::var("JWT_SECRET_KEY"))
      .unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using the development secret");
        DEV_JWT_SECRET.to_string()
      });
    let mongodb_uri =
      env::var("MONGODB_URI").map_err(|_| ConfigError::Missing("MONGODB_URI"))?;
    let mongodb_database =
      env::var("MONGODB_DATABASE").unwrap_or_else(|_| "pilates".to_string());
    let admin_email = env::var("ADMIN_EMAIL")
      .unwrap_or_else(|_| "sarah@example.com".to_string());
    let offset_minutes: i32 = parse_var("STUDIO_UTC_OFFSET_MINUTES", 0)?;
    let studio_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(
      || {
        ConfigError::Invalid(
          "STUDIO_UTC_OFFSET_MINUTES",
          offset_minutes.to_string(),
        )
      },
    )?;
    let contact_inbox = env::var("CONTACT_INBOX")
      .or_else(|_| env::var("EMAIL_USER"))
      .unwrap_or_else(|_| admin_email.clone());

    Ok(Self {
      host,
      jwt_secret,
      mongodb_uri,
      mongodb_database,
      admin_email,
      studio_offset,
      contact_inbox,
      hash_threads: parse_var("HASH_THREADS", 4)?,
      hash_cost: parse_var("HASH_COST", bcrypt::DEFAULT_COST)?,
      auth_rate_per_second: parse_var("AUTH_RATE_PER_SECOND", 2)?,
      auth_burst_size: parse_var("AUTH_BURST_SIZE", 5)?,
    })
  }
}

fn parse_var<T: std::str::FromStr>(
  name: &'static str,
  default: T,
) -> Result<T, ConfigError> {
  match env::var(name) {
    Ok(value) => {
      let parsed = value.trim().parse::<T>();
      parsed.map_err(|_| ConfigError::Invalid(name, value))
    }
    Err(_) => Ok(default),
  }
}

#[cfg(test)]
impl Config {
  pub fn for_tests(jwt_secret: &str) -> Self {
    Self {
      host: "127.0.0.1:0".to_string(),
      jwt_secret: jwt_secret.to_string(),
      mongodb_uri: String::new(),
      mongodb_database: "test".to_string(),
      admin_email: "sarah@example.com".to_string(),
      studio_offset: FixedOffset::east_opt(0).unwrap(),
      contact_inbox: "studio@example.com".to_string(),
      hash_threads: 2,
      hash_cost: 4,
      auth_rate_per_second: 100,
      auth_burst_size: 100,
    }
  }
}
