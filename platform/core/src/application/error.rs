// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Workflow Errors
//!
//! Typed failures of the registration use cases. Every variant is surfaced
//! to the caller as-is; nothing here is retried.

use thiserror::Error;

use crate::domain::credentials::CredentialError;
use crate::domain::mission::{MissionId, MissionStatus};
use crate::domain::repository::RepositoryError;
use crate::domain::validation::ValidationErrors;
use crate::domain::volunteer::{Matricule, VolunteerStatus};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("a volunteer with this email is already registered")]
    DuplicateEmail,

    #[error("mission {0} not found")]
    MissionNotFound(MissionId),

    #[error("no volunteer with matricule {0}")]
    VolunteerNotFound(Matricule),

    #[error("mission has reached its maximum of {max_participants} participants")]
    MissionFull { max_participants: u32 },

    #[error("mission is {status} and no longer accepts registrations")]
    MissionNotOpen { status: MissionStatus },

    #[error("volunteer {0} is already registered for this mission")]
    AlreadyRegistered(Matricule),

    #[error("cannot change volunteer status from {from} to {to}")]
    InvalidStatusTransition {
        from: VolunteerStatus,
        to: VolunteerStatus,
    },

    #[error("status of volunteer {0} was changed concurrently, retry with a fresh read")]
    ConcurrentStatusChange(Matricule),

    /// Infrastructure failure. The message is for logs, not for clients.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other unclassified failure, reported like `StoreUnavailable`.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Stable machine-readable code, also used as the metrics label
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateEmail => "duplicate_email",
            Self::MissionNotFound(_) => "mission_not_found",
            Self::VolunteerNotFound(_) => "volunteer_not_found",
            Self::MissionFull { .. } => "mission_full",
            Self::MissionNotOpen { .. } => "mission_not_open",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::InvalidStatusTransition { .. } => "invalid_status_transition",
            Self::ConcurrentStatusChange(_) => "concurrent_status_change",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<ValidationErrors> for WorkflowError {
    fn from(errors: ValidationErrors) -> Self {
        WorkflowError::Validation(errors)
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(err: RepositoryError) -> Self {
        WorkflowError::StoreUnavailable(err.to_string())
    }
}

impl From<CredentialError> for WorkflowError {
    fn from(err: CredentialError) -> Self {
        WorkflowError::Internal(err.to_string())
    }
}
