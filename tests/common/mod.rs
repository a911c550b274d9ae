#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::{ActiveModelTrait, Set};
use storefront_catalog::{
    catalog::{AssetCatalog, CatalogTaxonomy},
    config::SeedConfig,
    db::{self, DbPool},
    entities::product::{self, ProductImages},
    repositories::ProductRepository,
    services::CatalogReconciler,
};
use tempfile::TempDir;
use uuid::Uuid;

/// In-memory SQLite store plus a temporary asset tree.
pub struct TestCatalog {
    pub pool: Arc<DbPool>,
    pub repo: Arc<ProductRepository>,
    pub assets: TempDir,
}

impl TestCatalog {
    pub async fn new() -> Self {
        let pool = Arc::new(db::connect_and_migrate(&test_config()).await.unwrap());
        let repo = Arc::new(ProductRepository::new(pool.clone()));
        let assets = TempDir::new().unwrap();
        Self { pool, repo, assets }
    }

    pub fn asset_root(&self) -> &Path {
        self.assets.path()
    }

    /// Creates `folder` under the asset root with the given files.
    pub fn add_images(&self, folder: &str, files: &[&str]) {
        let dir = self.assets.path().join(folder);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"\x89PNG").unwrap();
        }
    }

    /// Inserts a product directly, bypassing the reconciler.
    pub async fn insert_product(&self, name: &str, category: &str) {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_name: Set(name.to_string()),
            brand_name: Set("Legacy".to_string()),
            category: Set(category.to_string()),
            product_image: Set(ProductImages(vec![])),
            description: Set(format!("Legacy {}", name)),
            price: Set(5_000),
            selling_price: Set(4_000),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.pool)
        .await
        .unwrap();
    }

    pub async fn insert_products(&self, prefix: &str, category: &str, count: usize) {
        for i in 0..count {
            self.insert_product(&format!("{} legacy {}", prefix, i), category)
                .await;
        }
    }

    pub fn reconciler(&self) -> CatalogReconciler {
        CatalogReconciler::new(
            self.repo.clone(),
            CatalogTaxonomy::storefront_default(),
            AssetCatalog::new(self.assets.path()),
        )
    }
}

pub fn test_config() -> SeedConfig {
    let mut cfg = SeedConfig::new("sqlite::memory:", "assets");
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
