// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Volunteer Administration
//!
//! Staff-facing operations on registered volunteers: lookup by matricule and
//! lifecycle changes (`PENDING → ACTIVE | REJECTED`, `ACTIVE ↔ INACTIVE`).

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::application::error::WorkflowError;
use crate::domain::events::RegistrationEvent;
use crate::domain::repository::{RepositoryError, VolunteerRepository};
use crate::domain::validation::ValidationErrors;
use crate::domain::volunteer::{Matricule, Volunteer, VolunteerError, VolunteerStatus};
use crate::infrastructure::event_bus::EventBus;

#[async_trait]
pub trait VolunteerAdministration: Send + Sync {
    async fn get_volunteer(&self, matricule: &str) -> Result<Volunteer, WorkflowError>;

    /// Move a volunteer to `status`. Requesting the current status is a no-op.
    async fn change_status(&self, matricule: &str, status: VolunteerStatus) -> Result<Volunteer, WorkflowError>;
}

pub struct StandardVolunteerAdministration {
    volunteers: Arc<dyn VolunteerRepository>,
    event_bus: Arc<EventBus>,
}

impl StandardVolunteerAdministration {
    pub fn new(volunteers: Arc<dyn VolunteerRepository>, event_bus: Arc<EventBus>) -> Self {
        Self { volunteers, event_bus }
    }
}

fn parse_matricule(raw: &str) -> Result<Matricule, WorkflowError> {
    Matricule::parse(raw)
        .map_err(|_| ValidationErrors::single("matricule", "matricule must look like VOL-000042").into())
}

#[async_trait]
impl VolunteerAdministration for StandardVolunteerAdministration {
    async fn get_volunteer(&self, matricule: &str) -> Result<Volunteer, WorkflowError> {
        let matricule = parse_matricule(matricule)?;
        self.volunteers
            .find_by_matricule(&matricule)
            .await?
            .ok_or(WorkflowError::VolunteerNotFound(matricule))
    }

    async fn change_status(&self, matricule: &str, status: VolunteerStatus) -> Result<Volunteer, WorkflowError> {
        let mut volunteer = self.get_volunteer(matricule).await?;
        let previous = volunteer.status;

        let changed = volunteer.change_status(status).map_err(|e| match e {
            VolunteerError::InvalidStateTransition { from, to } => {
                WorkflowError::InvalidStatusTransition { from, to }
            }
            other => WorkflowError::Internal(other.to_string()),
        })?;

        if !changed {
            return Ok(volunteer);
        }

        match self.volunteers.update(&volunteer, previous).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => {
                return Err(WorkflowError::ConcurrentStatusChange(volunteer.matricule));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            matricule = %volunteer.matricule,
            from = %previous,
            to = %volunteer.status,
            "Volunteer status changed"
        );

        self.event_bus
            .publish_registration_event(RegistrationEvent::VolunteerStatusChanged {
                volunteer_id: volunteer.id,
                matricule: volunteer.matricule.clone(),
                from: previous,
                to: volunteer.status,
                changed_at: Utc::now(),
            });

        Ok(volunteer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::volunteer::{VolunteerDraft, VolunteerId};
    use crate::infrastructure::repositories::InMemoryVolunteerRepository;

    /// Serves lookups from a snapshot taken before another writer moved on
    struct StaleReads {
        inner: InMemoryVolunteerRepository,
        snapshot: Volunteer,
    }

    #[async_trait]
    impl VolunteerRepository for StaleReads {
        async fn insert(&self, volunteer: &Volunteer) -> Result<(), RepositoryError> {
            self.inner.insert(volunteer).await
        }

        async fn update(&self, volunteer: &Volunteer, expected_status: VolunteerStatus) -> Result<(), RepositoryError> {
            self.inner.update(volunteer, expected_status).await
        }

        async fn find_by_id(&self, _id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
            Ok(Some(self.snapshot.clone()))
        }

        async fn find_by_matricule(&self, _matricule: &Matricule) -> Result<Option<Volunteer>, RepositoryError> {
            Ok(Some(self.snapshot.clone()))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Volunteer>, RepositoryError> {
            self.inner.find_by_email(email).await
        }

        async fn next_matricule_number(&self) -> Result<u64, RepositoryError> {
            self.inner.next_matricule_number().await
        }
    }

    fn awa() -> Volunteer {
        Volunteer::register(VolunteerDraft {
            matricule: Matricule::from_sequence("VOL", 1),
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            email: "awa@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            phone: None,
            birth_date: None,
            national_id: None,
            skill_ids: vec![],
            profession_id: None,
            education_level_id: None,
            nationality_id: None,
            residence: None,
        })
    }

    #[tokio::test]
    async fn test_lost_update_is_reported_as_conflict() {
        let pending = awa();
        let inner = InMemoryVolunteerRepository::new();
        inner.insert(&pending).await.unwrap();

        // Another administrator activates the volunteer first
        let mut active = pending.clone();
        active.change_status(VolunteerStatus::Active).unwrap();
        inner.update(&active, VolunteerStatus::Pending).await.unwrap();

        let store = Arc::new(StaleReads {
            inner: inner.clone(),
            snapshot: pending.clone(),
        });
        let event_bus = Arc::new(EventBus::new(10));
        let mut events = event_bus.subscribe();
        let admin = StandardVolunteerAdministration::new(store, event_bus.clone());

        let result = admin.change_status("VOL-000001", VolunteerStatus::Rejected).await;
        assert!(matches!(result, Err(WorkflowError::ConcurrentStatusChange(m)) if m == pending.matricule));

        let stored = inner.find_by_id(pending.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VolunteerStatus::Active);
        assert!(events.try_recv().is_err());
    }
}
