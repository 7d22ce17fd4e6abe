//! Load `ApiConfig` from environment variables.

use crate::config::types::*;
use crate::error::ConfigError;
use std::str::FromStr;

/// Read config from `API_*` env vars. Unset vars keep their defaults.
pub fn from_env() -> Result<ApiConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`from_env`] with a custom variable source.
pub fn from_lookup<F>(lookup: F) -> Result<ApiConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ApiConfig::default();
    if let Some(v) = lookup("API_PREFIX") {
        config.prefix = v;
    }
    if let Some(v) = lookup("API_BASE_URL") {
        config.base_url = v;
    }
    if let Some(v) = lookup("API_DEFAULT_LIMIT") {
        config.default_limit = parse("API_DEFAULT_LIMIT", &v).and_then(|n: i64| {
            if n < 1 {
                Err(ConfigError::InvalidValue { key: "API_DEFAULT_LIMIT", value: v.clone() })
            } else {
                Ok(n)
            }
        })?;
    }
    if let Some(v) = lookup("API_CONTENT_TYPE") {
        config.content_type = v;
    }
    if let Some(v) = lookup("API_ERROR_STATUS") {
        config.error_status = parse("API_ERROR_STATUS", &v)?;
    }
    if let Some(v) = lookup("API_UPDATE_RESPONSE") {
        config.update_response = parse("API_UPDATE_RESPONSE", &v)?;
    }
    if let Some(v) = lookup("API_DB_SCHEMA").filter(|s| !s.trim().is_empty()) {
        config.db_schema = Some(v);
    }
    if let Some(v) = lookup("API_BODY_LIMIT") {
        config.body_limit = parse("API_BODY_LIMIT", &v)?;
    }
    Ok(config)
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.content_type, "application/json");
        assert_eq!(config.error_status, ErrorStatus::Legacy);
        assert_eq!(config.update_response, UpdateResponse::Payload);
        assert!(config.db_schema.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = from_lookup(lookup(&[
            ("API_PREFIX", "/v1/"),
            ("API_DEFAULT_LIMIT", "50"),
            ("API_ERROR_STATUS", "Differentiated"),
            ("API_UPDATE_RESPONSE", "merged"),
            ("API_DB_SCHEMA", "app"),
        ]))
        .unwrap();
        assert_eq!(config.trimmed_prefix(), "v1");
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.error_status, ErrorStatus::Differentiated);
        assert_eq!(config.update_response, UpdateResponse::Merged);
        assert_eq!(config.db_schema.as_deref(), Some("app"));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(from_lookup(lookup(&[("API_DEFAULT_LIMIT", "many")])).is_err());
        assert!(from_lookup(lookup(&[("API_DEFAULT_LIMIT", "0")])).is_err());
        assert!(from_lookup(lookup(&[("API_ERROR_STATUS", "loud")])).is_err());
    }
}
