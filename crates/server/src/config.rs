//! Service configuration read from the environment (and `.env`)

use std::env;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level configuration for the service
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub forms: FormConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("APP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 3000,
        };
        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let path = |key: &str| lookup(key).filter(|value| !value.trim().is_empty()).map(PathBuf::from);
        let strict_sections = match lookup("FORM_STRICT_SECTIONS") {
            Some(raw) => parse_flag("FORM_STRICT_SECTIONS", &raw)?,
            None => false,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            forms: FormConfig {
                template_dir: path("FORM_TEMPLATE_DIR").unwrap_or_else(|| PathBuf::from("templates")),
                font_regular: path("FORM_FONT_REGULAR"),
                font_bold: path("FORM_FONT_BOLD"),
                strict_sections,
                seed_file: path("FORM_SEED_FILE"),
            },
        })
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}

/// Settings controlling the HTTP server binding
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where templates, fonts and seed data come from
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub template_dir: PathBuf,
    /// TrueType regular face; Helvetica when unset
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
    pub strict_sections: bool,
    /// JSON array of application records loaded into the in-memory repository
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16, got {0:?}")]
    InvalidPort(String),

    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: AddrParseError,
    },

    #[error("{name} must be true or false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}
