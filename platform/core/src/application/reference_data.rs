// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Reference-Data Resolver
//!
//! Maps free-text labels typed at registration (skills, profession, education
//! level, nationality) to stable identifiers, creating the reference row the
//! first time a label is seen.
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Collaborators:** `ReferenceDataRepository` (atomic upsert)

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::domain::reference::{normalize_reference_name, ReferenceEntry, ReferenceId, ReferenceKind};
use crate::domain::repository::{ReferenceDataRepository, RepositoryError};

pub struct ReferenceDataResolver {
    repository: Arc<dyn ReferenceDataRepository>,
}

impl ReferenceDataResolver {
    pub fn new(repository: Arc<dyn ReferenceDataRepository>) -> Self {
        Self { repository }
    }

    /// Resolve one label. Absent or blank labels resolve to `None` without
    /// touching the store.
    pub async fn resolve_or_create(
        &self,
        kind: ReferenceKind,
        name: Option<&str>,
    ) -> Result<Option<ReferenceId>, RepositoryError> {
        let Some(name) = name.and_then(normalize_reference_name) else {
            return Ok(None);
        };

        let id = self.repository.upsert(kind, &name).await?;
        debug!(%kind, %name, %id, "Resolved reference entry");
        Ok(Some(id))
    }

    /// Resolve a list of labels, skipping blanks and collapsing repeats.
    /// Identifiers come back in first-seen order.
    pub async fn resolve_many(
        &self,
        kind: ReferenceKind,
        names: &[String],
    ) -> Result<Vec<ReferenceId>, RepositoryError> {
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            if let Some(id) = self.resolve_or_create(kind, Some(name)).await? {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    pub async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, RepositoryError> {
        self.repository.list(kind).await
    }
}
