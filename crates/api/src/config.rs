use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Trusted-proxy authentication settings
    pub auth: AuthConfig,
    /// Device registration settings
    pub devices: DevicesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply bundled migrations at startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Deployment mode. Development enables the simulated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Production,
    Development,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_mode")]
    pub mode: AppMode,

    #[serde(default = "default_user_header")]
    pub user_header: String,

    #[serde(default = "default_name_header")]
    pub name_header: String,

    #[serde(default = "default_groups_header")]
    pub groups_header: String,

    #[serde(default = "default_email_header")]
    pub email_header: String,

    /// Group token that grants write access
    #[serde(default = "default_privileged_group")]
    pub privileged_group: String,
}

impl AuthConfig {
    pub fn is_development(&self) -> bool {
        self.mode == AppMode::Development
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevicesConfig {
    /// Ordered list of selectable VLAN names
    #[serde(default = "default_vlan_names")]
    pub vlan_names: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_run_migrations() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_mode() -> AppMode {
    AppMode::Production
}
fn default_user_header() -> String {
    "Remote-User".to_string()
}
fn default_name_header() -> String {
    "Remote-Name".to_string()
}
fn default_groups_header() -> String {
    "Remote-Groups".to_string()
}
fn default_email_header() -> String {
    "Remote-Email".to_string()
}
fn default_privileged_group() -> String {
    "sudoers".to_string()
}
fn default_vlan_names() -> Vec<String> {
    vec!["trusted".to_string(), "iot".to_string(), "guest".to_string()]
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with VP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("VP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("devices.vlan_names")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults so tests do not depend on
    /// the working directory.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600
            run_migrations = true

            [logging]
            level = "info"
            format = "json"

            [auth]
            mode = "production"
            user_header = "Remote-User"
            name_header = "Remote-Name"
            groups_header = "Remote-Groups"
            email_header = "Remote-Email"
            privileged_group = "sudoers"

            [devices]
            vlan_names = ["trusted", "iot", "guest"]
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "VP__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.devices.vlan_names.is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "devices.vlan_names must list at least one VLAN".to_string(),
            ));
        }

        if self.devices.vlan_names.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigValidationError::InvalidValue(
                "devices.vlan_names must not contain blank entries".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

impl DatabaseConfig {
    /// Pool settings understood by the persistence crate.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}
