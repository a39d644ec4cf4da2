// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub Uuid);

impl MissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mission lifecycle. Transitions are driven by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PLANNED" => Some(Self::Planned),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn accepts_registrations(&self) -> bool {
        matches!(self, Self::Planned | Self::InProgress)
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of trying to add one participant to a mission, decided while the
/// store holds the mission exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { participant_count: usize },
    NotOpen(MissionStatus),
    Full { max_participants: u32 },
    AlreadyRegistered,
}

// ============================================================================
// Aggregate Root: Mission
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// `None` or `Some(0)` means unbounded.
    pub max_participants: Option<u32>,
    pub status: MissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    pub fn new(
        title: String,
        description: Option<String>,
        location: Option<String>,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
        max_participants: Option<u32>,
    ) -> Result<Self, MissionError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(MissionError::InvalidTitle("Mission title cannot be empty".to_string()));
        }

        if let (Some(start), Some(end)) = (starts_at, ends_at) {
            if end < start {
                return Err(MissionError::InvalidSchedule { starts_at: start, ends_at: end });
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: MissionId::new(),
            title,
            description,
            location,
            starts_at,
            ends_at,
            max_participants,
            status: MissionStatus::Planned,
            created_at: now,
            updated_at: now,
        })
    }

    /// Effective upper bound on participants.
    pub fn capacity(&self) -> Option<u32> {
        self.max_participants.filter(|max| *max > 0)
    }

    /// Capacity guard: true when the mission is unbounded or has at least one
    /// free seat for `participant_count` existing participants.
    pub fn can_admit(&self, participant_count: usize) -> bool {
        match self.capacity() {
            None => true,
            Some(max) => participant_count < max as usize,
        }
    }

    /// Decide whether a volunteer may join, given the mission's current
    /// participants. The caller must hold the mission exclusively between
    /// this decision and the write.
    pub fn admit(&self, participant_count: usize, already_registered: bool) -> Admission {
        if !self.status.accepts_registrations() {
            return Admission::NotOpen(self.status);
        }
        if !self.can_admit(participant_count) {
            return Admission::Full {
                max_participants: self.max_participants.unwrap_or_default(),
            };
        }
        if already_registered {
            return Admission::AlreadyRegistered;
        }
        Admission::Admitted {
            participant_count: participant_count + 1,
        }
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Invalid mission title: {0}")]
    InvalidTitle(String),

    #[error("Mission cannot end ({ends_at}) before it starts ({starts_at})")]
    InvalidSchedule {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn mission(max_participants: Option<u32>) -> Mission {
        Mission::new("Distribution de kits".to_string(), None, None, None, None, max_participants)
            .unwrap()
    }

    #[test]
    fn test_mission_creation_defaults_to_planned() {
        let mission = mission(Some(10));
        assert_eq!(mission.status, MissionStatus::Planned);
        assert_eq!(mission.capacity(), Some(10));
    }

    #[test]
    fn test_mission_creation_empty_title() {
        let result = Mission::new("   ".to_string(), None, None, None, None, None);
        assert!(matches!(result, Err(MissionError::InvalidTitle(_))));
    }

    #[test]
    fn test_mission_creation_end_before_start() {
        let start = Utc::now();
        let result = Mission::new(
            "Maraude".to_string(),
            None,
            None,
            Some(start),
            Some(start - Duration::hours(1)),
            None,
        );
        assert!(matches!(result, Err(MissionError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_capacity_guard_unbounded() {
        assert!(mission(None).can_admit(10_000));
        assert!(mission(Some(0)).can_admit(10_000));
    }

    #[test]
    fn test_capacity_guard_bounded() {
        let mission = mission(Some(2));
        assert!(mission.can_admit(0));
        assert!(mission.can_admit(1));
        assert!(!mission.can_admit(2));
        assert!(!mission.can_admit(3));
    }

    #[test]
    fn test_admit_open_statuses() {
        let mut mission = mission(Some(1));
        assert_eq!(mission.admit(0, false), Admission::Admitted { participant_count: 1 });

        mission.status = MissionStatus::InProgress;
        assert_eq!(mission.admit(0, false), Admission::Admitted { participant_count: 1 });
    }

    #[test]
    fn test_admit_closed_statuses() {
        for status in [MissionStatus::Completed, MissionStatus::Cancelled] {
            let mut mission = mission(None);
            mission.status = status;
            assert_eq!(mission.admit(0, false), Admission::NotOpen(status));
        }
    }

    #[test]
    fn test_admit_full_and_duplicate() {
        let mission = mission(Some(1));
        assert_eq!(mission.admit(1, false), Admission::Full { max_participants: 1 });
        assert_eq!(mission.admit(1, true), Admission::Full { max_participants: 1 });

        let open = self::mission(Some(5));
        assert_eq!(open.admit(1, true), Admission::AlreadyRegistered);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(MissionStatus::parse("IN_PROGRESS"), Some(MissionStatus::InProgress));
        assert_eq!(MissionStatus::parse("in_progress"), None);
        assert!(!MissionStatus::Cancelled.accepts_registrations());
    }
}
