use crate::config::SeedConfig;
use crate::errors::SeedError;
use metrics::{counter, gauge};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
    /// Log every SQL statement
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(10),
            sqlx_logging: false,
        }
    }
}

impl From<&SeedConfig> for DbConfig {
    fn from(cfg: &SeedConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
            sqlx_logging: cfg.log_level.eq_ignore_ascii_case("trace"),
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns a `SeedError` if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, SeedError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .sqlx_logging(config.sqlx_logging);

    gauge!("storefront_db.max_connections", config.max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!(error = %e, "Database connection failed");
        counter!("storefront_db.connection_failures", 1);
        SeedError::DatabaseError(e)
    })?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establish DB pool using seeder configuration
pub async fn establish_connection_from_config(cfg: &SeedConfig) -> Result<DbPool, SeedError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Connects and, when `auto_migrate` is set, brings the schema up to date.
pub async fn connect_and_migrate(cfg: &SeedConfig) -> Result<DbPool, SeedError> {
    let pool = establish_connection_from_config(cfg).await?;
    if cfg.auto_migrate {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}

/// Runs database migrations
///
/// # Errors
/// Returns a `SeedError` if migrations fail to execute
pub async fn run_migrations(pool: &DbPool) -> Result<(), SeedError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(|e| SeedError::MigrationError(e.to_string()));

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), SeedError> {
    debug!("Checking database connection");
    pool.ping().await.map_err(|e| {
        error!("Database connection check failed: {}", e);
        counter!("storefront_db.connection_failures", 1);
        SeedError::DatabaseError(e)
    })
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), SeedError> {
    info!("Closing database connection pool");
    pool.close().await.map_err(SeedError::DatabaseError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_config_follows_seed_config() {
        let mut cfg = SeedConfig::new("sqlite::memory:", "assets");
        cfg.db_max_connections = 3;
        cfg.db_connect_timeout_secs = 2;
        cfg.log_level = "TRACE".into();

        let db_cfg = DbConfig::from(&cfg);
        assert_eq!(db_cfg.url, "sqlite::memory:");
        assert_eq!(db_cfg.max_connections, 3);
        assert_eq!(db_cfg.connect_timeout, Duration::from_secs(2));
        assert!(db_cfg.sqlx_logging);
    }

    #[tokio::test]
    async fn in_memory_sqlite_migrates() {
        let mut cfg = SeedConfig::new("sqlite::memory:", "assets");
        cfg.db_max_connections = 1;
        let pool = connect_and_migrate(&cfg).await.unwrap();
        check_connection(&pool).await.unwrap();
        // Running migrations again is a no-op
        run_migrations(&pool).await.unwrap();
        close_pool(pool).await.unwrap();
    }
}
