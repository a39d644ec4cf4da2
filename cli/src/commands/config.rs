// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use benevole_core::domain::platform_config::PlatformConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file with default values
    Generate {
        /// Output path (default: ./benevole-config.yaml)
        #[arg(short, long, default_value = "./benevole-config.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, force } => generate(&output, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = PlatformConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. BENEVOLE_CONFIG_PATH: {}",
            std::env::var("BENEVOLE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./benevole-config.yaml");
        println!("  4. ~/.benevole/config.yaml");
        println!("  5. /etc/benevole/config.yaml");
        println!();
    }

    if as_yaml {
        let rendered = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Server:".bold());
    println!("  Name: {}", config.metadata.name);
    println!("  Listen: {}:{}", config.spec.server.bind_address, config.spec.server.port);
    println!();

    println!("{}", "Storage:".bold());
    println!("  Backend: {:?}", config.spec.storage.backend);
    match config.spec.storage.database_url.as_deref() {
        // Never echo credentials
        Some(url) if url.starts_with("env:") => println!("  Database URL: {}", url),
        Some(_) => println!("  Database URL: {}", "(set)".dimmed()),
        None => println!("  Database URL: {}", "(not set)".dimmed()),
    }
    println!("  Max connections: {}", config.spec.storage.max_connections);
    println!();

    let registration = &config.spec.registration;
    println!("{}", "Registration:".bold());
    println!("  Matricule prefix: {}", registration.matricule_prefix);
    println!("  Minimum password length: {}", registration.password_min_length);
    println!(
        "  Argon2id: m={} KiB, t={}, p={}",
        registration.password_hashing.memory_kib,
        registration.password_hashing.iterations,
        registration.password_hashing.parallelism
    );
    println!();

    let observability = &config.spec.observability;
    println!("{}", "Observability:".bold());
    println!("  Log level: {}", observability.log_level);
    println!("  Event bus capacity: {}", observability.event_bus_capacity);
    match observability.metrics.as_ref().filter(|m| m.enabled) {
        Some(metrics) => println!("  Prometheus metrics: port {}", metrics.port),
        None => println!("  Prometheus metrics: {}", "disabled".dimmed()),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = PlatformConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", output.display());
    }

    PlatformConfigManifest::default()
        .to_yaml_file(output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!("{}", format!("✓ Configuration generated: {}", output.display()).green());

    Ok(())
}
