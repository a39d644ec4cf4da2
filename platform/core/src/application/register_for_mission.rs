// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Register For Mission Use Case
//!
//! Links an existing volunteer, identified by matricule, to a mission.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Enforce mission status, capacity and uniqueness of
//!   participation
//! - **Collaborators:** MissionRepository, VolunteerRepository, EventBus
//!
//! # Flow
//!
//! 1. Parse the matricule (`Validation` on field `matricule`)
//! 2. Load the mission (`MissionNotFound`)
//! 3. Load the volunteer (`VolunteerNotFound`)
//! 4. Reject closed missions early (`MissionNotOpen`)
//! 5. `MissionRepository::add_participant` decides and writes atomically:
//!    status, capacity guard (`MissionFull`), duplicate (`AlreadyRegistered`)
//! 6. Publish `RegistrationEvent::VolunteerJoinedMission`
//!
//! Steps 2–4 are read-only, so a failure there leaves the participant set
//! untouched. Step 5 re-checks everything under the mission lock because the
//! mission may have changed since step 2.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::error::WorkflowError;
use crate::domain::events::RegistrationEvent;
use crate::domain::mission::{Admission, MissionId};
use crate::domain::repository::{MissionRepository, RepositoryError, VolunteerRepository};
use crate::domain::validation::ValidationErrors;
use crate::domain::volunteer::{Matricule, VolunteerId};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRegistration {
    pub mission_id: MissionId,
    pub volunteer_id: VolunteerId,
    pub matricule: Matricule,
    pub participant_count: usize,
}

#[async_trait]
pub trait RegisterForMissionUseCase: Send + Sync {
    async fn register_volunteer(
        &self,
        mission_id: MissionId,
        matricule: &str,
    ) -> Result<MissionRegistration, WorkflowError>;
}

pub struct StandardRegisterForMissionUseCase {
    missions: Arc<dyn MissionRepository>,
    volunteers: Arc<dyn VolunteerRepository>,
    event_bus: Arc<EventBus>,
}

impl StandardRegisterForMissionUseCase {
    pub fn new(
        missions: Arc<dyn MissionRepository>,
        volunteers: Arc<dyn VolunteerRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            missions,
            volunteers,
            event_bus,
        }
    }

    async fn register_inner(
        &self,
        mission_id: MissionId,
        matricule: &str,
    ) -> Result<MissionRegistration, WorkflowError> {
        if matricule.trim().is_empty() {
            return Err(ValidationErrors::single("matricule", "matricule is required").into());
        }
        let matricule = Matricule::parse(matricule).map_err(|_| {
            ValidationErrors::single("matricule", "matricule must look like VOL-000042")
        })?;

        let mission = self
            .missions
            .find_by_id(mission_id)
            .await?
            .ok_or(WorkflowError::MissionNotFound(mission_id))?;

        let volunteer = self
            .volunteers
            .find_by_matricule(&matricule)
            .await?
            .ok_or_else(|| WorkflowError::VolunteerNotFound(matricule.clone()))?;

        if !mission.status.accepts_registrations() {
            return Err(WorkflowError::MissionNotOpen { status: mission.status });
        }

        let admission = match self.missions.add_participant(mission_id, volunteer.id).await {
            Ok(admission) => admission,
            // Deleted between lookup and write
            Err(RepositoryError::NotFound(_)) => return Err(WorkflowError::MissionNotFound(mission_id)),
            // Lost a race on the (mission, volunteer) primary key
            Err(RepositoryError::UniqueViolation { .. }) => {
                return Err(WorkflowError::AlreadyRegistered(matricule))
            }
            Err(e) => return Err(e.into()),
        };

        let participant_count = match admission {
            Admission::Admitted { participant_count } => participant_count,
            Admission::NotOpen(status) => return Err(WorkflowError::MissionNotOpen { status }),
            Admission::Full { max_participants } => {
                return Err(WorkflowError::MissionFull { max_participants })
            }
            Admission::AlreadyRegistered => return Err(WorkflowError::AlreadyRegistered(matricule)),
        };

        self.event_bus
            .publish_registration_event(RegistrationEvent::VolunteerJoinedMission {
                mission_id,
                volunteer_id: volunteer.id,
                matricule: matricule.clone(),
                participant_count,
                joined_at: Utc::now(),
            });

        Ok(MissionRegistration {
            mission_id,
            volunteer_id: volunteer.id,
            matricule,
            participant_count,
        })
    }
}

#[async_trait]
impl RegisterForMissionUseCase for StandardRegisterForMissionUseCase {
    async fn register_volunteer(
        &self,
        mission_id: MissionId,
        matricule: &str,
    ) -> Result<MissionRegistration, WorkflowError> {
        match self.register_inner(mission_id, matricule).await {
            Ok(registration) => {
                info!(
                    %mission_id,
                    matricule = %registration.matricule,
                    participant_count = registration.participant_count,
                    "Volunteer joined mission"
                );
                metrics::counter!("benevole_mission_registrations_total").increment(1);
                Ok(registration)
            }
            Err(err) => {
                warn!(%mission_id, reason = err.code(), "Mission registration rejected: {}", err);
                metrics::counter!(
                    "benevole_registration_rejections_total",
                    "workflow" => "mission",
                    "reason" => err.code()
                )
                .increment(1);
                Err(err)
            }
        }
    }
}
