//! Seed data script - brings the storefront catalog up to its category targets
//!
//! Run with: cargo run --bin seed-data -- --asset-root ../frontend/public/assets/products
//!
//! Steps, in order:
//! - ensure the admin account exists
//! - fold legacy category labels into their canonical names
//! - queue products for every discovered image (initial scan)
//! - top each targeted category up to its minimum count
//! - insert queued products whose name is not taken yet
//! - report the per-category counts

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use storefront_catalog::{
    config::{self, SeedConfig},
    db,
    repositories::ProductRepository,
    services::{AdminService, CatalogReconciler},
    SeedError,
};

#[derive(Parser)]
#[command(
    name = "seed-data",
    about = "Normalize categories and top the product catalog up to its targets",
    version
)]
struct Cli {
    /// Directory holding one sub-folder of images per category
    #[arg(long)]
    asset_root: Option<PathBuf>,

    /// Do not create or repair the admin account
    #[arg(long)]
    skip_admin: bool,

    /// Seed for the price generator; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after at most this many initial-scan products (0 disables the scan)
    #[arg(long)]
    initial_scan_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(SeedError::from(e).exit_code() as u8);
        }
    };
    config::init_tracing(cfg.log_level(), cfg.log_json);

    match run(cli, cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Seeding failed: {:#}", e);
            let code = e
                .downcast_ref::<SeedError>()
                .map(SeedError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: Cli, mut cfg: SeedConfig) -> anyhow::Result<()> {
    if let Some(asset_root) = cli.asset_root {
        cfg.asset_root = asset_root;
    }
    if let Some(limit) = cli.initial_scan_limit {
        cfg.initial_scan_limit = limit;
    }

    info!("=== Storefront catalog seed ===");
    info!(asset_root = %cfg.asset_root.display(), "Using asset root");

    let pool = Arc::new(
        db::connect_and_migrate(&cfg)
            .await
            .context("failed to prepare the database")?,
    );

    if cli.skip_admin {
        info!("Skipping admin seeding");
    } else {
        let outcome = AdminService::new(pool.clone(), cfg.admin.clone())
            .ensure_admin()
            .await
            .context("failed to seed the admin user")?;
        info!(?outcome, "Admin seeding done");
    }

    let store = Arc::new(ProductRepository::new(pool.clone()));
    let reconciler = CatalogReconciler::from_config(store, &cfg)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let summary = reconciler
        .run(&mut rng)
        .await
        .context("catalog reconciliation failed")?;

    info!(
        renamed = summary.renamed_rows(),
        initial_scanned = summary.initial_scanned,
        inserted = summary.commit.inserted,
        skipped = summary.commit.skipped,
        total = summary.report.total(),
        "=== Seed complete ==="
    );

    drop(reconciler);
    if let Ok(pool) = Arc::try_unwrap(pool) {
        db::close_pool(pool).await?;
    }
    Ok(())
}
