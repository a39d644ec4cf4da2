// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on storage backend
//! configuration, keeping the domain layer free of infrastructure types.
//!
//! The in-memory backend ignores the pool; the PostgreSQL backend requires one.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repository::{
    MissionRepository, ReferenceDataRepository, RepositoryError, StorageBackend, VolunteerRepository,
};
use crate::infrastructure::repositories::postgres_mission::PostgresMissionRepository;
use crate::infrastructure::repositories::postgres_reference::PostgresReferenceDataRepository;
use crate::infrastructure::repositories::postgres_volunteer::PostgresVolunteerRepository;
use crate::infrastructure::repositories::{
    InMemoryMissionRepository, InMemoryReferenceDataRepository, InMemoryVolunteerRepository,
};

/// Repositories sharing one backend
#[derive(Clone)]
pub struct Repositories {
    pub volunteers: Arc<dyn VolunteerRepository>,
    pub reference_data: Arc<dyn ReferenceDataRepository>,
    pub missions: Arc<dyn MissionRepository>,
}

fn require_pool(pool: Option<PgPool>) -> Result<PgPool, RepositoryError> {
    pool.ok_or_else(|| {
        RepositoryError::Database("PostgreSQL backend selected but no connection pool was provided".to_string())
    })
}

/// Creates a VolunteerRepository implementation based on the configured backend
pub fn create_volunteer_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn VolunteerRepository>, RepositoryError> {
    let repository: Arc<dyn VolunteerRepository> = match backend {
        StorageBackend::InMemory => Arc::new(InMemoryVolunteerRepository::new()),
        StorageBackend::PostgreSQL(_) => Arc::new(PostgresVolunteerRepository::new(require_pool(pool)?)),
    };
    Ok(repository)
}

/// Creates a ReferenceDataRepository implementation based on the configured backend
pub fn create_reference_data_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn ReferenceDataRepository>, RepositoryError> {
    let repository: Arc<dyn ReferenceDataRepository> = match backend {
        StorageBackend::InMemory => Arc::new(InMemoryReferenceDataRepository::new()),
        StorageBackend::PostgreSQL(_) => {
            Arc::new(PostgresReferenceDataRepository::new(require_pool(pool)?))
        }
    };
    Ok(repository)
}

/// Creates a MissionRepository implementation based on the configured backend
pub fn create_mission_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn MissionRepository>, RepositoryError> {
    let repository: Arc<dyn MissionRepository> = match backend {
        StorageBackend::InMemory => Arc::new(InMemoryMissionRepository::new()),
        StorageBackend::PostgreSQL(_) => Arc::new(PostgresMissionRepository::new(require_pool(pool)?)),
    };
    Ok(repository)
}

/// Build all repositories for `backend`
pub fn create_repositories(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Repositories, RepositoryError> {
    Ok(Repositories {
        volunteers: create_volunteer_repository(backend, pool.clone())?,
        reference_data: create_reference_data_repository(backend, pool.clone())?,
        missions: create_mission_repository(backend, pool)?,
    })
}
