use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail. Kept separate
/// from the process environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SHOPINTEL_ENV", "development"));
    let log_level = or_default("SHOPINTEL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("SHOPINTEL_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("SHOPINTEL_USER_AGENT", "shopintel/0.1 (brand-insights)");
    let max_retries = parse_u32("SHOPINTEL_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("SHOPINTEL_RETRY_BACKOFF_BASE_MS", "500")?;
    let inter_request_delay_ms = parse_u64("SHOPINTEL_INTER_REQUEST_DELAY_MS", "250")?;
    let max_concurrent_targets = parse_positive_usize("SHOPINTEL_MAX_CONCURRENT_TARGETS", "3")?;
    let max_products = parse_positive_usize("SHOPINTEL_MAX_PRODUCTS", "1000")?;

    let normalizer_url = lookup("SHOPINTEL_NORMALIZER_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let normalizer_api_key = lookup("SHOPINTEL_NORMALIZER_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let normalizer_timeout_secs = parse_u64("SHOPINTEL_NORMALIZER_TIMEOUT_SECS", "20")?;

    let competitors_path = PathBuf::from(or_default(
        "SHOPINTEL_COMPETITORS_PATH",
        "./config/competitors.yaml",
    ));

    Ok(AppConfig {
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        inter_request_delay_ms,
        max_concurrent_targets,
        max_products,
        normalizer_url,
        normalizer_api_key,
        normalizer_timeout_secs,
        competitors_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
