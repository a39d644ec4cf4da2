// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP server bootstrap
//!
//! Builds the repositories for the configured backend, wires the use cases
//! and serves the API until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use benevole_core::application::repository_factory::create_repositories;
use benevole_core::domain::platform_config::PlatformConfigManifest;
use benevole_core::domain::repository::StorageBackend;
use benevole_core::infrastructure::db::Database;
use benevole_core::infrastructure::event_bus::{DomainEvent, EventBus, EventBusError};
use benevole_core::infrastructure::password::Argon2PasswordHasher;
use benevole_core::presentation::{app, AppState};

pub async fn start_server(config: PlatformConfigManifest) -> Result<()> {
    config.validate().context("Configuration validation failed")?;

    let backend = config.storage_backend()?;
    let pool = match &backend {
        StorageBackend::InMemory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            None
        }
        StorageBackend::PostgreSQL(pg) => {
            info!("Connecting to PostgreSQL");
            let database = Database::from_config(pg).await?;
            Some(database.get_pool().clone())
        }
    };

    let repositories = create_repositories(&backend, pool).context("Failed to create repositories")?;

    let hasher = Argon2PasswordHasher::new(&config.spec.registration.password_hashing)
        .context("Invalid password hashing parameters")?;

    let event_bus = Arc::new(EventBus::new(config.spec.observability.event_bus_capacity));
    spawn_event_logger(&event_bus);

    if let Some(metrics) = config.spec.observability.metrics.as_ref().filter(|m| m.enabled) {
        let addr = SocketAddr::from(([0, 0, 0, 0], metrics.port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics listening on {}", addr);
    }

    let state = AppState::new(
        repositories,
        Arc::new(hasher),
        event_bus,
        &config.spec.registration,
    );
    let router = app(state);

    let addr = format!("{}:{}", config.spec.server.bind_address, config.spec.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Benevole API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

/// Log every domain event until the bus closes
fn spawn_event_logger(event_bus: &EventBus) {
    let mut receiver = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(DomainEvent::Registration(event)) => {
                    info!(matricule = %event.matricule(), "Domain event: {:?}", event);
                }
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
