// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Serve Command
//!
//! `benevole serve` loads the configuration, applies command-line overrides
//! and runs the HTTP API in the foreground.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use benevole_core::domain::platform_config::PlatformConfigManifest;

use crate::server;

#[derive(Args, Debug, Default)]
pub struct ServeCommand {
    /// HTTP API port (overrides spec.server.port)
    #[arg(long, env = "BENEVOLE_PORT")]
    pub port: Option<u16>,

    /// Address to bind (overrides spec.server.bind_address)
    #[arg(long = "bind", env = "BENEVOLE_BIND_ADDRESS", value_name = "ADDRESS")]
    pub bind_address: Option<String>,
}

impl ServeCommand {
    pub fn apply(&self, config: &mut PlatformConfigManifest) {
        if let Some(port) = self.port {
            config.spec.server.port = port;
        }
        if let Some(addr) = &self.bind_address {
            config.spec.server.bind_address = addr.clone();
        }
    }
}

pub async fn execute(cmd: ServeCommand, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = PlatformConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    cmd.apply(&mut config);

    info!(
        name = %config.metadata.name,
        backend = ?config.spec.storage.backend,
        "Starting Benevole API"
    );

    server::start_server(config).await
}
