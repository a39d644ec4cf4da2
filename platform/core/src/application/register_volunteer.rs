// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Register Volunteer Use Case
//!
//! Application service creating a volunteer account from the public sign-up
//! form.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Orchestrate volunteer creation
//! - **Collaborators:**
//!   - Domain: Volunteer aggregate, ValidationErrors
//!   - Infrastructure: VolunteerRepository, PasswordHasher, ReferenceDataResolver,
//!     MatriculeGenerator, EventBus
//!
//! # Flow
//!
//! 1. Validate every field, collecting all field errors
//! 2. Reject an email that is already registered
//! 3. Hash the password on a blocking thread
//! 4. Draw the matricule from the atomic sequence
//! 5. Resolve skills, profession, education level and nationality
//! 6. Persist the volunteer in `PENDING` status
//! 7. Publish `RegistrationEvent::VolunteerRegistered`
//!
//! # Error Handling
//!
//! - `Validation`: one or more fields invalid
//! - `DuplicateEmail`: email taken (checked up front and again by the unique
//!   constraint at insert time)
//! - `StoreUnavailable` / `Internal`: infrastructure failure, not retried

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::error::WorkflowError;
use crate::application::matricule::MatriculeGenerator;
use crate::application::reference_data::ReferenceDataResolver;
use crate::domain::credentials::PasswordHasher;
use crate::domain::events::RegistrationEvent;
use crate::domain::reference::ReferenceKind;
use crate::domain::repository::{RepositoryError, VolunteerRepository};
use crate::domain::validation::{is_valid_email, ValidationErrors};
use crate::domain::volunteer::{Residence, Volunteer, VolunteerDraft};
use crate::infrastructure::event_bus::EventBus;

const MAX_NAME_LENGTH: usize = 100;

/// Sign-up form. Required fields are optional here so that a missing field
/// is reported as a field error rather than a malformed body.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVolunteerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub national_id: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub profession: Option<String>,
    pub education_level: Option<String>,
    pub nationality: Option<String>,
    pub residence: Option<Residence>,
}

impl std::fmt::Debug for RegisterVolunteerRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterVolunteerRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("skills", &self.skills)
            .finish_non_exhaustive()
    }
}

/// Fields that passed validation, normalized.
struct ValidatedRegistration {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    national_id: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate(
    request: &RegisterVolunteerRequest,
    password_min_length: usize,
) -> Result<ValidatedRegistration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for (field, value) in [("firstName", &request.first_name), ("lastName", &request.last_name)] {
        if errors.require(field, value.as_deref()) {
            if value.as_deref().map(str::trim).map(str::len).unwrap_or_default() > MAX_NAME_LENGTH {
                errors.add(field, format!("{} must be at most {} characters", field, MAX_NAME_LENGTH));
            }
        }
    }

    if errors.require("email", request.email.as_deref()) {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        if !is_valid_email(email) {
            errors.add("email", "email must be a valid address");
        }
    }

    match request.password.as_deref() {
        None | Some("") => errors.add("password", "password is required"),
        Some(password) => {
            if password.chars().count() < password_min_length {
                errors.add(
                    "password",
                    format!("password must be at least {} characters", password_min_length),
                );
            }
        }
    }

    if let Some(birth_date) = request.birth_date {
        if birth_date > Utc::now().date_naive() {
            errors.add("birthDate", "birthDate cannot be in the future");
        }
    }

    errors.into_result()?;

    Ok(ValidatedRegistration {
        first_name: non_blank(&request.first_name).unwrap_or_default(),
        last_name: non_blank(&request.last_name).unwrap_or_default(),
        email: request
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default(),
        password: request.password.clone().unwrap_or_default(),
        phone: non_blank(&request.phone),
        national_id: non_blank(&request.national_id),
    })
}

/// Register Volunteer Use Case
#[async_trait]
pub trait RegisterVolunteerUseCase: Send + Sync {
    /// Create a volunteer in `PENDING` status and return it
    async fn register(&self, request: RegisterVolunteerRequest) -> Result<Volunteer, WorkflowError>;
}

/// Standard implementation of RegisterVolunteerUseCase
pub struct StandardRegisterVolunteerUseCase {
    volunteers: Arc<dyn VolunteerRepository>,
    reference_data: Arc<ReferenceDataResolver>,
    matricules: Arc<MatriculeGenerator>,
    hasher: Arc<dyn PasswordHasher>,
    event_bus: Arc<EventBus>,
    password_min_length: usize,
}

impl StandardRegisterVolunteerUseCase {
    pub fn new(
        volunteers: Arc<dyn VolunteerRepository>,
        reference_data: Arc<ReferenceDataResolver>,
        matricules: Arc<MatriculeGenerator>,
        hasher: Arc<dyn PasswordHasher>,
        event_bus: Arc<EventBus>,
        password_min_length: usize,
    ) -> Self {
        Self {
            volunteers,
            reference_data,
            matricules,
            hasher,
            event_bus,
            password_min_length,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, WorkflowError> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| WorkflowError::Internal(format!("password hashing task failed: {}", e)))??;
        Ok(hashed)
    }

    async fn register_inner(&self, request: RegisterVolunteerRequest) -> Result<Volunteer, WorkflowError> {
        // Step 1: Validate input
        let input = validate(&request, self.password_min_length)?;

        // Step 2: Reject duplicate email early
        if self.volunteers.find_by_email(&input.email).await?.is_some() {
            return Err(WorkflowError::DuplicateEmail);
        }

        // Step 3: Hash password
        let password_hash = self.hash_password(input.password).await?;

        // Step 4: Matricule
        let matricule = self.matricules.next_matricule().await?;

        // Step 5: Reference data
        let skill_ids = self
            .reference_data
            .resolve_many(ReferenceKind::Skill, &request.skills)
            .await?;
        let profession_id = self
            .reference_data
            .resolve_or_create(ReferenceKind::Profession, request.profession.as_deref())
            .await?;
        let education_level_id = self
            .reference_data
            .resolve_or_create(ReferenceKind::EducationLevel, request.education_level.as_deref())
            .await?;
        let nationality_id = self
            .reference_data
            .resolve_or_create(ReferenceKind::Nationality, request.nationality.as_deref())
            .await?;

        // Step 6: Persist
        let volunteer = Volunteer::register(VolunteerDraft {
            matricule,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
            phone: input.phone,
            birth_date: request.birth_date,
            national_id: input.national_id,
            skill_ids,
            profession_id,
            education_level_id,
            nationality_id,
            residence: request.residence,
        });

        match self.volunteers.insert(&volunteer).await {
            Ok(()) => {}
            Err(RepositoryError::UniqueViolation { constraint }) if constraint.contains("email") => {
                return Err(WorkflowError::DuplicateEmail);
            }
            Err(e) => return Err(e.into()),
        }

        // Step 7: Publish domain event
        self.event_bus
            .publish_registration_event(RegistrationEvent::VolunteerRegistered {
                volunteer_id: volunteer.id,
                matricule: volunteer.matricule.clone(),
                email: volunteer.email.clone(),
                registered_at: volunteer.created_at,
            });

        Ok(volunteer)
    }
}

#[async_trait]
impl RegisterVolunteerUseCase for StandardRegisterVolunteerUseCase {
    async fn register(&self, request: RegisterVolunteerRequest) -> Result<Volunteer, WorkflowError> {
        match self.register_inner(request).await {
            Ok(volunteer) => {
                info!(
                    volunteer_id = %volunteer.id,
                    matricule = %volunteer.matricule,
                    "Volunteer registered"
                );
                metrics::counter!("benevole_volunteers_registered_total").increment(1);
                Ok(volunteer)
            }
            Err(err) => {
                warn!(reason = err.code(), "Volunteer registration rejected: {}", err);
                metrics::counter!(
                    "benevole_registration_rejections_total",
                    "workflow" => "volunteer",
                    "reason" => err.code()
                )
                .increment(1);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterVolunteerRequest {
        RegisterVolunteerRequest {
            first_name: Some("Awa".to_string()),
            last_name: Some("Diop".to_string()),
            email: Some("  Awa@Example.com ".to_string()),
            password: Some("secret123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_normalizes_email() {
        let input = validate(&request(), 8).unwrap();
        assert_eq!(input.email, "awa@example.com");
        assert_eq!(input.first_name, "Awa");
        assert!(input.phone.is_none());
    }

    #[test]
    fn test_validate_reports_every_field() {
        let errors = validate(&RegisterVolunteerRequest::default(), 8).err().unwrap();
        for field in ["firstName", "lastName", "email", "password"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_validate_password_length() {
        let mut req = request();
        req.password = Some("short".to_string());
        let errors = validate(&req, 8).err().unwrap();
        assert!(errors.contains("password"));
        assert!(!errors.contains("email"));

        // Only a minimum length applies
        req.password = Some("x".repeat(512));
        assert!(validate(&req, 8).is_ok());
    }

    #[test]
    fn test_validate_optional_fields() {
        let mut req = request();
        req.phone = Some("77 123 45 67 ext. 2".to_string());
        let input = validate(&req, 8).unwrap();
        assert_eq!(input.phone.as_deref(), Some("77 123 45 67 ext. 2"));

        req.phone = Some("   ".to_string());
        assert_eq!(validate(&req, 8).unwrap().phone, None);

        req.birth_date = Some(Utc::now().date_naive() + chrono::Duration::days(2));
        let errors = validate(&req, 8).err().unwrap();
        assert!(errors.contains("birthDate"));
        assert!(!errors.contains("phone"));
    }

    #[test]
    fn test_validate_name_length() {
        let mut req = request();
        req.first_name = Some("A".repeat(MAX_NAME_LENGTH));
        assert!(validate(&req, 8).is_ok());

        req.first_name = Some("A".repeat(MAX_NAME_LENGTH + 1));
        let errors = validate(&req, 8).err().unwrap();
        assert!(errors.contains("firstName"));
        assert!(!errors.contains("lastName"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", request());
        assert!(!rendered.contains("secret123"));
        assert!(rendered.contains("<redacted>"));
    }
}
