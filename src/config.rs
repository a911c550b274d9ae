use crate::catalog::{CatalogTaxonomy, CategoryRule};
use crate::errors::SeedError;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_DATABASE_URL: &str = "sqlite://storefront.db?mode=rwc";
const DEFAULT_ASSET_ROOT: &str = "../frontend/public/assets/products";
const DEFAULT_ASSET_URL_PREFIX: &str = "/assets/products";
const DEFAULT_INITIAL_SCAN_LIMIT: usize = 200;
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_NAME: &str = "Admin";
const DEFAULT_ADMIN_PASSWORD: &str = "Admin123!";
const DEFAULT_ADMIN_PROFILE_PIC: &str = "/assets/products/watches/boAt%20Wave%20Style%20Call%201.webp";
const CONFIG_DIR: &str = "config";

/// Admin account created by the seeder
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AdminSeedConfig {
    #[serde(default = "default_admin_email")]
    #[validate(email(message = "admin.email must be a valid email address"))]
    pub email: String,

    #[serde(default = "default_admin_name")]
    #[validate(length(min = 1, message = "admin.name cannot be empty"))]
    pub name: String,

    /// Plain-text password; only its argon2 hash is stored
    #[serde(default = "default_admin_password")]
    #[validate(length(min = 8, message = "admin.password must be at least 8 characters"))]
    pub password: String,

    #[serde(default = "default_admin_profile_pic")]
    pub profile_pic: Option<String>,
}

impl Default for AdminSeedConfig {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            name: default_admin_name(),
            password: default_admin_password(),
            profile_pic: default_admin_profile_pic(),
        }
    }
}

/// Seeder configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Database connection URL
    pub database_url: String,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default = "default_true_bool")]
    pub auto_migrate: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1, message = "db_max_connections must be at least 1"))]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Directory holding one image folder per raw category
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    /// URL prefix written in front of generated image paths
    #[serde(default = "default_asset_url_prefix")]
    #[validate(length(min = 1, message = "asset_url_prefix cannot be empty"))]
    pub asset_url_prefix: String,

    /// Upper bound on products queued by the initial asset scan (0 disables it)
    #[serde(default = "default_initial_scan_limit")]
    pub initial_scan_limit: usize,

    /// Admin account settings
    #[serde(default)]
    #[validate]
    pub admin: AdminSeedConfig,

    /// Replaces the built-in storefront taxonomy when set
    #[serde(default)]
    pub categories: Option<Vec<CategoryRule>>,

    /// Categories listed in the final count report; all canonical names when unset
    #[serde(default)]
    pub report_categories: Option<Vec<String>>,
}

impl SeedConfig {
    /// Configuration with defaults for everything but the store and asset locations.
    pub fn new(database_url: impl Into<String>, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            database_url: database_url.into(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            asset_root: asset_root.into(),
            asset_url_prefix: default_asset_url_prefix(),
            initial_scan_limit: default_initial_scan_limit(),
            admin: AdminSeedConfig::default(),
            categories: None,
            report_categories: None,
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Taxonomy in effect: the configured categories, or the storefront default.
    pub fn taxonomy(&self) -> Result<CatalogTaxonomy, SeedError> {
        match &self.categories {
            Some(rules) => CatalogTaxonomy::new(rules.clone()),
            None => Ok(CatalogTaxonomy::storefront_default()),
        }
    }

    pub fn report_categories(&self, taxonomy: &CatalogTaxonomy) -> Vec<String> {
        self.report_categories
            .clone()
            .unwrap_or_else(|| taxonomy.canonical_names())
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some("db_min_connections cannot exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        // The well-known default password must not reach a production catalog
        if self.is_production() && self.admin.password == DEFAULT_ADMIN_PASSWORD {
            let mut err = ValidationError::new("admin_password");
            err.message = Some("admin.password must be overridden in production".into());
            errors.add("admin", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] ConfigError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

impl From<AppConfigError> for SeedError {
    fn from(err: AppConfigError) -> Self {
        match err {
            AppConfigError::Load(e) => SeedError::ConfigError(e),
            AppConfigError::Validation(e) => SeedError::from(e),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_true_bool() -> bool {
    true
}
fn default_db_max_connections() -> u32 {
    5
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    10
}
fn default_db_acquire_timeout_secs() -> u64 {
    10
}
fn default_asset_root() -> PathBuf {
    PathBuf::from(DEFAULT_ASSET_ROOT)
}
fn default_asset_url_prefix() -> String {
    DEFAULT_ASSET_URL_PREFIX.to_string()
}
fn default_initial_scan_limit() -> usize {
    DEFAULT_INITIAL_SCAN_LIMIT
}
fn default_admin_email() -> String {
    DEFAULT_ADMIN_EMAIL.to_string()
}
fn default_admin_name() -> String {
    DEFAULT_ADMIN_NAME.to_string()
}
fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}
fn default_admin_profile_pic() -> Option<String> {
    Some(DEFAULT_ADMIN_PROFILE_PIC.to_string())
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("{},sqlx=warn,sea_orm_migration=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_target(false)
            .try_init();
    }
}

/// Loads seeder configuration from `./config`
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<SeedConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<SeedConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(
            File::with_name(&format!("{}/default", config_dir.display())).required(false),
        )
        .add_source(
            File::with_name(&format!("{}/{}", config_dir.display(), run_env)).required(false),
        )
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let seed_config: SeedConfig = config.try_deserialize()?;

    seed_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    seed_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(seed_config)
}
