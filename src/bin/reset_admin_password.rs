//! Resets the admin user's password to the configured value
//!
//! Run with: cargo run --bin reset-admin-password

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use storefront_catalog::{
    config::{self, SeedConfig},
    db,
    services::AdminService,
    SeedError,
};

#[derive(Parser)]
#[command(
    name = "reset-admin-password",
    about = "Re-hash the configured admin password onto the admin user",
    version
)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(SeedError::from(e).exit_code() as u8);
        }
    };
    config::init_tracing(cfg.log_level(), cfg.log_json);

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Password reset failed: {:#}", e);
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

    let service = AdminService::new(pool.clone(), cfg.admin.clone());
    if service
        .reset_password()
        .await
        .context("failed to reset the admin password")?
    {
        info!(email = %cfg.admin.email, "Admin password updated successfully");
    } else {
        warn!(email = %cfg.admin.email, "Admin user not found; run seed-data first");
    }

    drop(service);
    if let Ok(pool) = Arc::try_unwrap(pool) {
        db::close_pool(pool).await?;
    }
    Ok(())
}
