// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Database Migration Command
//!
//! `benevole migrate` applies the SQL migrations under `cli/migrations` to
//! the configured PostgreSQL database.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! benevole migrate
//!
//! # Preview migrations without applying
//! benevole migrate --dry-run
//! ```
//!
//! The connection string comes from `spec.storage.database_url` or
//! `BENEVOLE_DATABASE_URL`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashSet;
use std::path::PathBuf;

use benevole_core::domain::platform_config::PlatformConfigManifest;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Args, Debug)]
pub struct MigrateCommand {
    /// Perform a dry run without applying changes
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: MigrateCommand, config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", "Benevole Migrate".bold().green());

    let config = PlatformConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    let database_url = config.resolved_database_url()?.context(
        "No database configured. Set spec.storage.database_url or BENEVOLE_DATABASE_URL.",
    )?;

    println!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    // The tracking table does not exist before the first run
    let applied: HashSet<i64> = sqlx::query_scalar("SELECT version FROM _sqlx_migrations")
        .fetch_all(&pool)
        .await
        .map(|versions| versions.into_iter().collect())
        .unwrap_or_default();

    let pending: Vec<_> = MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    println!(
        "Migration status: {} applied, {} total available.",
        applied.len(),
        MIGRATOR.iter().count()
    );

    if pending.is_empty() {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations found (Dry Run):");
        for migration in &pending {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("Skipping application due to --dry-run");
        return Ok(());
    }

    println!("Applying {} pending migration(s)...", pending.len());
    MIGRATOR.run(&pool).await.context("Failed to apply migrations")?;
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}
