use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::ProductDraft;
use crate::errors::SeedError;

pub mod product_repository;

pub use product_repository::ProductRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Side-effecting product operations the reconciler depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Number of persisted products whose category equals `category` exactly.
    async fn count_by_category(&self, category: &str) -> Result<u64, SeedError>;

    /// Rewrites every product in `alias` to `canonical`; returns the rows changed.
    async fn rename_category(&self, alias: &str, canonical: &str) -> Result<u64, SeedError>;

    /// Every persisted product name.
    async fn product_names(&self) -> Result<HashSet<String>, SeedError>;

    /// Inserts the draft unless a product with the same name exists.
    /// Returns `true` when a row was written.
    async fn insert_if_absent(&self, draft: &ProductDraft) -> Result<bool, SeedError>;
}
