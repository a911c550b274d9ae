use sea_orm::error::DbErr;

/// Errors that abort a seeding run.
///
/// Recoverable conditions (missing asset folders, empty image sets, unknown
/// category labels) never surface here; they are logged where they occur and
/// the run continues.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for SeedError {
    fn from(err: validator::ValidationErrors) -> Self {
        SeedError::ValidationError(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for SeedError {
    fn from(err: argon2::password_hash::Error) -> Self {
        SeedError::HashError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl SeedError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        SeedError::DatabaseError(error.into_db_err())
    }

    /// Whether the failure came from the store. Store failures are fatal for
    /// the run but a full rerun is always safe.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::MigrationError(_))
    }

    /// Process exit code reported by the binaries.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError(_) | Self::ValidationError(_) => 2,
            Self::DatabaseError(_) | Self::MigrationError(_) => 3,
            _ => 1,
        }
    }
}

pub type SeedResult<T> = Result<T, SeedError>;
