use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Upper bound on a user's total hours per calendar day. `None` disables the check.
    pub daily_hours_cap: Option<f64>,
    pub reference_cache_ttl: u64,
    pub log_dir: String,

    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone, Debug)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET must be set")?;

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_EMAIL"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin {
                    email,
                    password,
                    full_name: lookup("BOOTSTRAP_ADMIN_NAME")
                        .unwrap_or_else(|| "Administrator".to_string()),
                })
            }
            _ => None,
        };

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://timetracker.db".to_string()),
            jwt_secret,
            access_token_ttl: parse_or(&lookup, "ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parse_or(&lookup, "REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parse_or(&lookup, "RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            daily_hours_cap: parse_cap(lookup("DAILY_HOURS_CAP"))?,
            reference_cache_ttl: parse_or(&lookup, "REFERENCE_CACHE_TTL", 300)?,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            bootstrap_admin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

// empty or zero turns the cap off
fn parse_cap(raw: Option<String>) -> Result<Option<f64>> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };

    let cap: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("DAILY_HOURS_CAP has an invalid value: {raw:?}"))?;

    if !cap.is_finite() || cap < 0.0 || cap > 24.0 {
        anyhow::bail!("DAILY_HOURS_CAP must be between 0 and 24, got {cap}");
    }

    Ok((cap > 0.0).then_some(cap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("JWT_SECRET", "secret")]).unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.access_token_ttl, 900);
        assert_eq!(config.daily_hours_cap, None);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn daily_cap_parsing() {
        let capped = config_from(&[("JWT_SECRET", "s"), ("DAILY_HOURS_CAP", "8")]).unwrap();
        assert_eq!(capped.daily_hours_cap, Some(8.0));

        let off = config_from(&[("JWT_SECRET", "s"), ("DAILY_HOURS_CAP", "0")]).unwrap();
        assert_eq!(off.daily_hours_cap, None);

        assert!(config_from(&[("JWT_SECRET", "s"), ("DAILY_HOURS_CAP", "30")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "s"), ("DAILY_HOURS_CAP", "eight")]).is_err());
    }

    #[test]
    fn malformed_number_is_reported_with_key() {
        let err = config_from(&[("JWT_SECRET", "s"), ("ACCESS_TOKEN_TTL", "soon")]).unwrap_err();
        assert!(err.to_string().contains("ACCESS_TOKEN_TTL"));
    }

    #[test]
    fn bootstrap_admin_needs_email_and_password() {
        let partial =
            config_from(&[("JWT_SECRET", "s"), ("BOOTSTRAP_ADMIN_EMAIL", "a@b.c")]).unwrap();
        assert!(partial.bootstrap_admin.is_none());

        let full = config_from(&[
            ("JWT_SECRET", "s"),
            ("BOOTSTRAP_ADMIN_EMAIL", "a@b.c"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();
        let admin = full.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "a@b.c");
        assert_eq!(admin.full_name, "Administrator");
    }
}
