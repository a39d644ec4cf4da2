// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Matricule Generator
//!
//! Draws the next number from the volunteer repository's sequence and formats
//! it as `{prefix}-{number:06}`. The sequence is atomic, so concurrent
//! registrations never share a matricule.

use std::sync::Arc;

use crate::domain::repository::{RepositoryError, VolunteerRepository};
use crate::domain::volunteer::Matricule;

pub struct MatriculeGenerator {
    repository: Arc<dyn VolunteerRepository>,
    prefix: String,
}

impl MatriculeGenerator {
    pub fn new(repository: Arc<dyn VolunteerRepository>, prefix: impl Into<String>) -> Self {
        Self {
            repository,
            prefix: prefix.into(),
        }
    }

    pub fn with_default_prefix(repository: Arc<dyn VolunteerRepository>) -> Self {
        Self::new(repository, Matricule::DEFAULT_PREFIX)
    }

    pub async fn next_matricule(&self) -> Result<Matricule, RepositoryError> {
        let number = self.repository.next_matricule_number().await?;
        Ok(Matricule::from_sequence(&self.prefix, number))
    }
}
