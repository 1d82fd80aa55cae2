use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Accepted debounce window for the post search box, in milliseconds.
pub const SEARCH_DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 250..=500;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = require("SOCIALDASH_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "SOCIALDASH_API_BASE_URL",
            format!("expected an http(s) URL, got '{api_base_url}'"),
        ));
    }

    let env = parse_environment(&or_default("SOCIALDASH_ENV", "development"));
    let api_token = lookup("SOCIALDASH_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let request_timeout_secs = parse_u64("SOCIALDASH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "SOCIALDASH_USER_AGENT",
        "socialdash/0.1 (analytics-dashboard)",
    );
    let log_level = or_default("SOCIALDASH_LOG_LEVEL", "info");
    let products_path = PathBuf::from(or_default(
        "SOCIALDASH_PRODUCTS_PATH",
        "./config/products.yaml",
    ));
    let default_product = or_default("SOCIALDASH_DEFAULT_PRODUCT", "pirai-infotech");

    let page_size = parse_u32("SOCIALDASH_PAGE_SIZE", "10")?;
    if page_size == 0 {
        return Err(invalid("SOCIALDASH_PAGE_SIZE", "must be greater than zero".to_string()));
    }

    let search_debounce_ms = parse_u64("SOCIALDASH_SEARCH_DEBOUNCE_MS", "500")?;
    if !SEARCH_DEBOUNCE_RANGE_MS.contains(&search_debounce_ms) {
        return Err(invalid(
            "SOCIALDASH_SEARCH_DEBOUNCE_MS",
            format!(
                "must be between {} and {} ms",
                SEARCH_DEBOUNCE_RANGE_MS.start(),
                SEARCH_DEBOUNCE_RANGE_MS.end()
            ),
        ));
    }

    let upload_settle_ms = parse_u64("SOCIALDASH_UPLOAD_SETTLE_MS", "1500")?;
    let event_capacity = parse_usize("SOCIALDASH_EVENT_CAPACITY", "256")?.max(1);

    Ok(AppConfig {
        env,
        api_base_url,
        api_token,
        request_timeout_secs,
        user_agent,
        log_level,
        products_path,
        default_product,
        page_size,
        search_debounce_ms,
        upload_settle_ms,
        event_capacity,
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
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid values.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("SOCIALDASH_API_BASE_URL", "http://10.0.0.5:3002/api");
        m
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(parse_environment("development"), Environment::Development);
        assert_eq!(parse_environment("test"), Environment::Test);
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_base_url() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SOCIALDASH_API_BASE_URL"),
            "expected MissingEnvVar(SOCIALDASH_API_BASE_URL), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_non_http_base_url() {
        let mut map = full_env();
        map.insert("SOCIALDASH_API_BASE_URL", "ftp://example.com");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALDASH_API_BASE_URL"),
            "got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_applies_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.api_base_url, "http://10.0.0.5:3002/api");
        assert!(cfg.api_token.is_none());
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "socialdash/0.1 (analytics-dashboard)");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.products_path.to_str(), Some("./config/products.yaml"));
        assert_eq!(cfg.default_product, "pirai-infotech");
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.search_debounce_ms, 500);
        assert_eq!(cfg.upload_settle_ms, 1500);
        assert_eq!(cfg.event_capacity, 256);
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = full_env();
        map.insert("SOCIALDASH_ENV", "production");
        map.insert("SOCIALDASH_API_TOKEN", "secret");
        map.insert("SOCIALDASH_PAGE_SIZE", "25");
        map.insert("SOCIALDASH_SEARCH_DEBOUNCE_MS", "300");
        map.insert("SOCIALDASH_UPLOAD_SETTLE_MS", "0");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.env, Environment::Production);
        assert_eq!(cfg.api_token.as_deref(), Some("secret"));
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.search_debounce_ms, 300);
        assert_eq!(cfg.upload_settle_ms, 0);
    }

    #[test]
    fn blank_api_token_is_treated_as_absent() {
        let mut map = full_env();
        map.insert("SOCIALDASH_API_TOKEN", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn build_app_config_rejects_zero_page_size() {
        let mut map = full_env();
        map.insert("SOCIALDASH_PAGE_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALDASH_PAGE_SIZE"),
            "got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_non_numeric_timeout() {
        let mut map = full_env();
        map.insert("SOCIALDASH_REQUEST_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALDASH_REQUEST_TIMEOUT_SECS"),
            "got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_debounce_outside_window() {
        for raw in ["100", "900"] {
            let mut map = full_env();
            map.insert("SOCIALDASH_SEARCH_DEBOUNCE_MS", raw);
            let result = build_app_config(lookup_from_map(&map));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALDASH_SEARCH_DEBOUNCE_MS"),
                "debounce {raw} should be rejected, got: {result:?}"
            );
        }
    }

    #[test]
    fn debug_output_redacts_api_token() {
        let mut map = full_env();
        map.insert("SOCIALDASH_API_TOKEN", "super-secret-token");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("[redacted]"));
    }
}
