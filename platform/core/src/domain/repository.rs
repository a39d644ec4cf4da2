// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate root: one repository per
//! aggregate, interface defined in the domain layer, implemented in
//! `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `VolunteerRepository` | `Volunteer` | `InMemoryVolunteerRepository`, `PostgresVolunteerRepository` |
//! | `ReferenceDataRepository` | `ReferenceEntry` | `InMemoryReferenceDataRepository`, `PostgresReferenceDataRepository` |
//! | `MissionRepository` | `Mission` | `InMemoryMissionRepository`, `PostgresMissionRepository` |
//!
//! ## Atomicity
//!
//! Three operations must be atomic in every implementation because the
//! workflow relies on them instead of separate read and write steps:
//!
//! - `VolunteerRepository::next_matricule_number` (sequence, never a row count)
//! - `ReferenceDataRepository::upsert` (insert-if-absent keyed by `(kind, name)`)
//! - `MissionRepository::add_participant` (capacity check and link in one unit)

use async_trait::async_trait;

use crate::domain::mission::{Admission, Mission, MissionId};
use crate::domain::reference::{ReferenceEntry, ReferenceId, ReferenceKind};
use crate::domain::volunteer::{Matricule, Volunteer, VolunteerId, VolunteerStatus};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// Repository interface for Volunteer aggregates
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// Insert a new volunteer. Fails with `UniqueViolation` when the email or
    /// matricule is already taken.
    async fn insert(&self, volunteer: &Volunteer) -> Result<(), RepositoryError>;

    /// Persist changes to an existing volunteer whose stored status is still
    /// `expected_status`. Fails with `Conflict` when another writer changed
    /// the status first and with `NotFound` when the volunteer is gone.
    async fn update(&self, volunteer: &Volunteer, expected_status: VolunteerStatus) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError>;

    async fn find_by_matricule(&self, matricule: &Matricule) -> Result<Option<Volunteer>, RepositoryError>;

    /// Lookup by email (already lower-cased by the caller)
    async fn find_by_email(&self, email: &str) -> Result<Option<Volunteer>, RepositoryError>;

    /// Reserve the next matricule sequence number. Each call returns a value
    /// no other call has seen.
    async fn next_matricule_number(&self) -> Result<u64, RepositoryError>;
}

/// Repository interface for reference data (skills, professions, ...)
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    /// Return the id for `(kind, name)`, inserting the row when absent.
    async fn upsert(&self, kind: ReferenceKind, name: &str) -> Result<ReferenceId, RepositoryError>;

    /// List every entry of a kind, ordered by name
    async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, RepositoryError>;
}

/// Repository interface for Mission aggregates and their participants
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Save mission (create or update)
    async fn save(&self, mission: &Mission) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: MissionId) -> Result<Option<Mission>, RepositoryError>;

    /// Decide admission with `Mission::admit` and, when admitted, link the
    /// volunteer, all while holding the mission exclusively. Fails with
    /// `NotFound` when the mission does not exist.
    async fn add_participant(
        &self,
        mission_id: MissionId,
        volunteer_id: VolunteerId,
    ) -> Result<Admission, RepositoryError>;

    async fn participant_count(&self, mission_id: MissionId) -> Result<usize, RepositoryError>;

    /// Participants in registration order
    async fn list_participants(&self, mission_id: MissionId) -> Result<Vec<VolunteerId>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// PostgreSQL SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return RepositoryError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
