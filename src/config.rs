use std::net::IpAddr;

use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub time_zone: Tz,
    pub max_body_size: usize,
    pub log_level: String,
}

/// Settings for the capture form. Every field except the log level is required.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub api: ApiConfig,
    pub directory: DirectoryConfig,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn log_url(&self) -> String {
        format!("http://{}:{}/log", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub server: String,
    pub bind_dn: String,
    pub password: String,
    pub search_base: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let database_url = env_or("DATABASE_URL", "sqlite://maintenance_logs.db");

        let host: IpAddr = env_or("MAINTLOG_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid MAINTLOG_HOST: {e}"))?;

        let port: u16 = env_or("MAINTLOG_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid MAINTLOG_PORT: {e}"))?;

        let time_zone_name = env_or("MAINTLOG_TIMEZONE", "America/New_York");
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| format!("Invalid MAINTLOG_TIMEZONE value: {time_zone_name}"))?;

        let max_body_size: usize = env_or("MAINTLOG_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid MAINTLOG_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("MAINTLOG_LOG_LEVEL", "info");

        Ok(ServerConfig {
            database_url,
            host,
            port,
            time_zone,
            max_body_size,
            log_level,
        })
    }
}

const CAPTURE_REQUIRED: [&str; 6] = [
    "API_SERVER_IP",
    "API_SERVER_PORT",
    "LDAP_SERVER",
    "LDAP_USER",
    "LDAP_PASSWORD",
    "LDAP_BASE_DN",
];

impl CaptureConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let present = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = CAPTURE_REQUIRED
            .iter()
            .copied()
            .filter(|key| present(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let required = |key: &str| present(key).unwrap_or_default();

        let port: u16 = required("API_SERVER_PORT")
            .trim()
            .parse()
            .map_err(|e| format!("Invalid API_SERVER_PORT: {e}"))?;

        Ok(CaptureConfig {
            api: ApiConfig {
                host: required("API_SERVER_IP").trim().to_string(),
                port,
            },
            directory: DirectoryConfig {
                server: required("LDAP_SERVER"),
                bind_dn: required("LDAP_USER"),
                password: required("LDAP_PASSWORD"),
                search_base: required("LDAP_BASE_DN"),
            },
            log_level: var("LOGFORM_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }
}
