//! Removes seeded data: every product, every cart item and the admin user
//!
//! Run with: cargo run --bin clean-database -- --yes

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use storefront_catalog::{
    config::{self, SeedConfig},
    db,
    services::clean_database,
    SeedError,
};

#[derive(Parser)]
#[command(
    name = "clean-database",
    about = "Delete all products, cart items and the admin user",
    version
)]
struct Cli {
    /// Confirm the deletion; without it nothing is removed
    #[arg(long)]
    yes: bool,
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

    if !cli.yes {
        warn!("Refusing to delete data without --yes");
        return ExitCode::from(2);
    }

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Cleaning failed: {:#}", e);
            let code = e
                .downcast_ref::<SeedError>()
                .map(SeedError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cfg: SeedConfig) -> anyhow::Result<()> {
    let pool = Arc::new(
        db::connect_and_migrate(&cfg)
            .await
            .context("failed to prepare the database")?,
    );

    let summary = clean_database(pool.clone(), &cfg.admin.email)
        .await
        .context("failed to clean the database")?;

    info!(
        products = summary.products,
        cart_items = summary.cart_items,
        admin_users = summary.admin_users,
        "Database cleaned successfully"
    );

    if let Ok(pool) = Arc::try_unwrap(pool) {
        db::close_pool(pool).await?;
    }
    Ok(())
}
