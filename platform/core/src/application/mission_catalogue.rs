// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Mission Catalogue
//!
//! Administrator-side mission management: creation, lookup with the current
//! participant count, and the participant roster.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::application::error::WorkflowError;
use crate::domain::mission::{Mission, MissionError, MissionId};
use crate::domain::repository::{MissionRepository, VolunteerRepository};
use crate::domain::validation::ValidationErrors;
use crate::domain::volunteer::Volunteer;

/// Largest capacity the mission store can hold (a signed 32-bit column)
pub const MAX_PARTICIPANTS_LIMIT: u32 = i32::MAX as u32;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_participants: Option<u32>,
}

/// A mission together with its current number of participants
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionOverview {
    #[serde(flatten)]
    pub mission: Mission,
    pub participant_count: usize,
}

#[async_trait]
pub trait MissionCatalogue: Send + Sync {
    async fn create_mission(&self, request: CreateMissionRequest) -> Result<MissionOverview, WorkflowError>;

    async fn get_mission(&self, id: MissionId) -> Result<MissionOverview, WorkflowError>;

    async fn list_participants(&self, id: MissionId) -> Result<Vec<Volunteer>, WorkflowError>;
}

pub struct StandardMissionCatalogue {
    missions: Arc<dyn MissionRepository>,
    volunteers: Arc<dyn VolunteerRepository>,
}

impl StandardMissionCatalogue {
    pub fn new(missions: Arc<dyn MissionRepository>, volunteers: Arc<dyn VolunteerRepository>) -> Self {
        Self { missions, volunteers }
    }
}

#[async_trait]
impl MissionCatalogue for StandardMissionCatalogue {
    async fn create_mission(&self, request: CreateMissionRequest) -> Result<MissionOverview, WorkflowError> {
        let mut errors = ValidationErrors::new();
        errors.require("title", request.title.as_deref());
        if request.max_participants.is_some_and(|max| max > MAX_PARTICIPANTS_LIMIT) {
            errors.add(
                "maxParticipants",
                format!("maxParticipants must be at most {}", MAX_PARTICIPANTS_LIMIT),
            );
        }
        errors.into_result()?;

        let mission = Mission::new(
            request.title.unwrap_or_default(),
            request.description,
            request.location,
            request.starts_at,
            request.ends_at,
            request.max_participants,
        )
        .map_err(|e| match e {
            MissionError::InvalidTitle(message) => ValidationErrors::single("title", message),
            MissionError::InvalidSchedule { .. } => {
                ValidationErrors::single("endsAt", "endsAt cannot be before startsAt")
            }
        })?;

        self.missions.save(&mission).await?;
        info!(mission_id = %mission.id, title = %mission.title, "Mission created");

        Ok(MissionOverview {
            mission,
            participant_count: 0,
        })
    }

    async fn get_mission(&self, id: MissionId) -> Result<MissionOverview, WorkflowError> {
        let mission = self
            .missions
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::MissionNotFound(id))?;
        let participant_count = self.missions.participant_count(id).await?;

        Ok(MissionOverview {
            mission,
            participant_count,
        })
    }

    async fn list_participants(&self, id: MissionId) -> Result<Vec<Volunteer>, WorkflowError> {
        if self.missions.find_by_id(id).await?.is_none() {
            return Err(WorkflowError::MissionNotFound(id));
        }

        let mut participants = Vec::new();
        for volunteer_id in self.missions.list_participants(id).await? {
            if let Some(volunteer) = self.volunteers.find_by_id(volunteer_id).await? {
                participants.push(volunteer);
            }
        }
        Ok(participants)
    }
}
