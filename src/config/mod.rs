use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Parser)]
#[command(name = "debtdesk")]
#[command(about = "Debt snapshot service for the back-office dashboard")]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "debtdesk.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub secret_token: String,
    pub shop_ids: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    pub signing_key: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Phone number used to seed the admin account when the users table is
    /// empty. Optional; without it the admin must be provisioned manually.
    #[serde(default)]
    pub admin_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_run_at_start")]
    pub run_at_start: bool,
}

fn default_currency() -> String {
    "UZS".to_string()
}

fn default_page_size() -> u32 {
    500
}

fn default_max_pages() -> u32 {
    200
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_admin_name() -> String {
    "admin".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_db_path() -> String {
    "./debtdesk.sqlite".to_string()
}

fn default_interval_minutes() -> u64 {
    60
}

fn default_run_at_start() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            run_at_start: default_run_at_start(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AppError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` placeholders with environment values, leaving
    /// unresolved placeholders intact so validation can report them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("upstream.base_url", &self.upstream.base_url)?;
        validate_non_empty_string("upstream.secret_token", &self.upstream.secret_token)?;
        validate_non_empty_string("upstream.shop_ids", &self.upstream.shop_ids)?;
        validate_positive_number("upstream.page_size", self.upstream.page_size, 1)?;
        validate_positive_number("upstream.max_pages", self.upstream.max_pages, 1)?;

        validate_non_empty_string("server.bind_addr", &self.server.bind_addr)?;
        validate_non_empty_string("server.signing_key", &self.server.signing_key)?;
        validate_non_empty_string("server.admin_name", &self.server.admin_name)?;

        validate_path("storage.data_dir", &self.storage.data_dir)?;
        validate_path("database.path", &self.database.path)?;

        validate_positive_number(
            "scheduler.interval_minutes",
            self.scheduler.interval_minutes as u32,
            1,
        )?;

        // An unresolved ${VAR} placeholder means the environment is missing
        // a secret; catch it before it reaches the upstream.
        for (field, value) in [
            ("upstream.secret_token", &self.upstream.secret_token),
            ("server.signing_key", &self.server.signing_key),
        ] {
            if value.starts_with("${") {
                return Err(AppError::MissingConfig {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}
