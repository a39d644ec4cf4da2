// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::mission::MissionId;
use crate::domain::volunteer::{Matricule, VolunteerId, VolunteerStatus};

/// Facts emitted by the registration workflow. Notification collaborators
/// (email, dashboards) subscribe to these through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistrationEvent {
    VolunteerRegistered {
        volunteer_id: VolunteerId,
        matricule: Matricule,
        email: String,
        registered_at: DateTime<Utc>,
    },
    VolunteerJoinedMission {
        mission_id: MissionId,
        volunteer_id: VolunteerId,
        matricule: Matricule,
        participant_count: usize,
        joined_at: DateTime<Utc>,
    },
    VolunteerStatusChanged {
        volunteer_id: VolunteerId,
        matricule: Matricule,
        from: VolunteerStatus,
        to: VolunteerStatus,
        changed_at: DateTime<Utc>,
    },
}

impl RegistrationEvent {
    pub fn matricule(&self) -> &Matricule {
        match self {
            Self::VolunteerRegistered { matricule, .. }
            | Self::VolunteerJoinedMission { matricule, .. }
            | Self::VolunteerStatusChanged { matricule, .. } => matricule,
        }
    }
}
