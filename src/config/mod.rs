use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api/v1";
const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub store_dir: PathBuf,
    pub storage_key: String,
    /// Tell the server about a logout so it can revoke the token
    pub revoke_on_logout: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub register_paths: Vec<String>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("PAYROLL_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Same defaults as `from_env` but pointed at an explicit API base
    pub fn for_base_url(base_url: &str) -> Self {
        let mut config = Self::development();
        config.api.base_url = normalize_base(Some(base_url));
        config
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("PAYROLL_API_BASE") {
            self.api.base_url = normalize_base(Some(&v));
        }
        if let Ok(v) = env::var("PAYROLL_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("PAYROLL_API_CONNECT_TIMEOUT_SECS") {
            self.api.connect_timeout_secs = v.parse().unwrap_or(self.api.connect_timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("PAYROLL_CONFIG_DIR") {
            self.session.store_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PAYROLL_STORAGE_KEY") {
            if !v.trim().is_empty() {
                self.session.storage_key = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("PAYROLL_REVOKE_ON_LOGOUT") {
            self.session.revoke_on_logout = v.parse().unwrap_or(self.session.revoke_on_logout);
        }

        // Probe overrides
        if let Ok(v) = env::var("PAYROLL_REGISTER_PATHS") {
            let paths = parse_path_list(&v);
            if !paths.is_empty() {
                self.probe.register_paths = paths;
            }
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_API_BASE.to_string(),
                timeout_secs: 30,
                connect_timeout_secs: 10,
                user_agent: default_user_agent(),
            },
            session: SessionConfig {
                store_dir: default_store_dir(),
                storage_key: "auth".to_string(),
                revoke_on_logout: true,
            },
            probe: ProbeConfig::default(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.api.timeout_secs = 15;
        config.api.connect_timeout_secs = 5;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.timeout_secs = 10;
        config.api.connect_timeout_secs = 5;
        config
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            register_paths: vec![
                "/auth/register".to_string(),
                "/register".to_string(),
                "/users/register".to_string(),
            ],
        }
    }
}

/// Normalize an API base so it always ends with `/api/v1`.
///
/// `http://host:8080`, `http://host:8080/` and `http://host:8080/api/v1/` all
/// become `http://host:8080/api/v1`.
pub fn normalize_base(input: Option<&str>) -> String {
    let raw = input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/');

    if raw.ends_with(API_PREFIX) {
        raw.to_string()
    } else {
        format!("{}{}", raw, API_PREFIX)
    }
}

fn parse_path_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with('/') {
                s.to_string()
            } else {
                format!("/{}", s)
            }
        })
        .collect()
}

fn default_store_dir() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config").join("payroll").join("cli"),
        Err(_) => PathBuf::from(".payroll"),
    }
}

fn default_user_agent() -> String {
    format!("payroll-portal/{}", env!("CARGO_PKG_VERSION"))
}

// Global singleton config for the binary - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static ClientConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_appends_api_prefix() {
        assert_eq!(normalize_base(Some("http://h:8080")), "http://h:8080/api/v1");
        assert_eq!(normalize_base(Some("http://h:8080///")), "http://h:8080/api/v1");
        assert_eq!(normalize_base(Some("http://h:8080/api/v1/")), "http://h:8080/api/v1");
        assert_eq!(normalize_base(None), DEFAULT_API_BASE);
        assert_eq!(normalize_base(Some("  ")), DEFAULT_API_BASE);
    }

    #[test]
    fn test_default_register_paths_order() {
        let config = ClientConfig::development();
        assert_eq!(
            config.probe.register_paths,
            vec!["/auth/register", "/register", "/users/register"]
        );
    }

    #[test]
    fn test_parse_path_list_adds_leading_slash() {
        assert_eq!(
            parse_path_list("auth/signup, /register ,,"),
            vec!["/auth/signup".to_string(), "/register".to_string()]
        );
    }

    #[test]
    fn test_production_tightens_timeouts() {
        let config = ClientConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.api.timeout_secs < ClientConfig::development().api.timeout_secs);
    }
}
