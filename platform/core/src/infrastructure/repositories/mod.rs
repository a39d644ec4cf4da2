// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository contracts defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve domain aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresVolunteerRepository** - volunteers, skill links, matricule sequence
//! - **PostgresReferenceDataRepository** - reference entries with native upsert
//! - **PostgresMissionRepository** - missions and the locked participant insert
//!
//! ## In-Memory Repositories
//!
//! Used for development and tests. Each one keeps its state behind a single
//! lock, so every trait method is atomic with respect to the others.

pub mod postgres_mission;
pub mod postgres_reference;
pub mod postgres_volunteer;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::mission::{Admission, Mission, MissionId};
use crate::domain::reference::{ReferenceEntry, ReferenceId, ReferenceKind};
use crate::domain::repository::{
    MissionRepository, ReferenceDataRepository, RepositoryError, VolunteerRepository,
};
use crate::domain::volunteer::{Matricule, Volunteer, VolunteerId, VolunteerStatus};

// ============================================================================
// Volunteers
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryVolunteerRepository {
    volunteers: Arc<RwLock<HashMap<VolunteerId, Volunteer>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryVolunteerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VolunteerRepository for InMemoryVolunteerRepository {
    async fn insert(&self, volunteer: &Volunteer) -> Result<(), RepositoryError> {
        let mut volunteers = self.volunteers.write();

        for existing in volunteers.values() {
            if existing.email == volunteer.email {
                return Err(RepositoryError::UniqueViolation {
                    constraint: "volunteers_email_key".to_string(),
                });
            }
            if existing.matricule == volunteer.matricule {
                return Err(RepositoryError::UniqueViolation {
                    constraint: "volunteers_matricule_key".to_string(),
                });
            }
        }

        volunteers.insert(volunteer.id, volunteer.clone());
        Ok(())
    }

    async fn update(&self, volunteer: &Volunteer, expected_status: VolunteerStatus) -> Result<(), RepositoryError> {
        let mut volunteers = self.volunteers.write();
        match volunteers.get_mut(&volunteer.id) {
            Some(stored) if stored.status != expected_status => Err(RepositoryError::Conflict(format!(
                "volunteer {} is {}, expected {}",
                volunteer.id, stored.status, expected_status
            ))),
            Some(stored) => {
                *stored = volunteer.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("volunteer {}", volunteer.id))),
        }
    }

    async fn find_by_id(&self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        Ok(self.volunteers.read().get(&id).cloned())
    }

    async fn find_by_matricule(&self, matricule: &Matricule) -> Result<Option<Volunteer>, RepositoryError> {
        let volunteers = self.volunteers.read();
        Ok(volunteers.values().find(|v| &v.matricule == matricule).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Volunteer>, RepositoryError> {
        let volunteers = self.volunteers.read();
        Ok(volunteers.values().find(|v| v.email == email).cloned())
    }

    async fn next_matricule_number(&self) -> Result<u64, RepositoryError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

// ============================================================================
// Reference data
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryReferenceDataRepository {
    entries: Arc<RwLock<HashMap<(ReferenceKind, String), ReferenceEntry>>>,
}

impl InMemoryReferenceDataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries of `kind`
    pub fn count(&self, kind: ReferenceKind) -> usize {
        self.entries.read().keys().filter(|(k, _)| *k == kind).count()
    }
}

#[async_trait]
impl ReferenceDataRepository for InMemoryReferenceDataRepository {
    async fn upsert(&self, kind: ReferenceKind, name: &str) -> Result<ReferenceId, RepositoryError> {
        let mut entries = self.entries.write();
        let entry = entries
            .entry((kind, name.to_string()))
            .or_insert_with(|| ReferenceEntry::new(kind, name.to_string()));
        Ok(entry.id)
    }

    async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, RepositoryError> {
        let mut listed: Vec<ReferenceEntry> = self
            .entries
            .read()
            .values()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }
}

// ============================================================================
// Missions
// ============================================================================

#[derive(Default)]
struct MissionState {
    missions: HashMap<MissionId, Mission>,
    participants: HashMap<MissionId, Vec<VolunteerId>>,
}

#[derive(Clone, Default)]
pub struct InMemoryMissionRepository {
    state: Arc<RwLock<MissionState>>,
}

impl InMemoryMissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MissionRepository for InMemoryMissionRepository {
    async fn save(&self, mission: &Mission) -> Result<(), RepositoryError> {
        let mut state = self.state.write();
        state.missions.insert(mission.id, mission.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        Ok(self.state.read().missions.get(&id).cloned())
    }

    async fn add_participant(
        &self,
        mission_id: MissionId,
        volunteer_id: VolunteerId,
    ) -> Result<Admission, RepositoryError> {
        // One write guard spans the decision and the insert
        let mut state = self.state.write();

        let mission = state
            .missions
            .get(&mission_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("mission {}", mission_id)))?;

        let roster = state.participants.entry(mission_id).or_default();
        let admission = mission.admit(roster.len(), roster.contains(&volunteer_id));

        if let Admission::Admitted { .. } = admission {
            roster.push(volunteer_id);
        }

        Ok(admission)
    }

    async fn participant_count(&self, mission_id: MissionId) -> Result<usize, RepositoryError> {
        Ok(self
            .state
            .read()
            .participants
            .get(&mission_id)
            .map(Vec::len)
            .unwrap_or_default())
    }

    async fn list_participants(&self, mission_id: MissionId) -> Result<Vec<VolunteerId>, RepositoryError> {
        Ok(self
            .state
            .read()
            .participants
            .get(&mission_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mission::MissionStatus;
    use crate::domain::volunteer::VolunteerDraft;

    fn volunteer(email: &str, number: u64) -> Volunteer {
        Volunteer::register(VolunteerDraft {
            matricule: Matricule::from_sequence("VOL", number),
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            email: email.to_string(),
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

    fn mission(max_participants: Option<u32>) -> Mission {
        Mission::new("Distribution alimentaire".to_string(), None, None, None, None, max_participants).unwrap()
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic() {
        let repo = InMemoryVolunteerRepository::new();
        assert_eq!(repo.next_matricule_number().await.unwrap(), 1);
        assert_eq!(repo.next_matricule_number().await.unwrap(), 2);
        assert_eq!(repo.clone().next_matricule_number().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_enforces_unique_email_and_matricule() {
        let repo = InMemoryVolunteerRepository::new();
        repo.insert(&volunteer("awa@example.com", 1)).await.unwrap();

        match repo.insert(&volunteer("awa@example.com", 2)).await {
            Err(RepositoryError::UniqueViolation { constraint }) => assert!(constraint.contains("email")),
            other => panic!("expected email violation, got {:?}", other),
        }
        match repo.insert(&volunteer("other@example.com", 1)).await {
            Err(RepositoryError::UniqueViolation { constraint }) => assert!(constraint.contains("matricule")),
            other => panic!("expected matricule violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_unknown_volunteer() {
        let repo = InMemoryVolunteerRepository::new();
        let result = repo
            .update(&volunteer("awa@example.com", 1), VolunteerStatus::Pending)
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_requires_expected_status() {
        let repo = InMemoryVolunteerRepository::new();
        let original = volunteer("awa@example.com", 1);
        repo.insert(&original).await.unwrap();

        let mut activated = original.clone();
        activated.change_status(VolunteerStatus::Active).unwrap();
        repo.update(&activated, VolunteerStatus::Pending).await.unwrap();

        // A second writer still holding the PENDING copy loses
        let mut rejected = original.clone();
        rejected.change_status(VolunteerStatus::Rejected).unwrap();
        let result = repo.update(&rejected, VolunteerStatus::Pending).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let stored = repo.find_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VolunteerStatus::Active);
    }

    #[tokio::test]
    async fn test_upsert_returns_same_id_and_lists_sorted() {
        let repo = InMemoryReferenceDataRepository::new();
        let first = repo.upsert(ReferenceKind::Skill, "Premiers secours").await.unwrap();
        let again = repo.upsert(ReferenceKind::Skill, "Premiers secours").await.unwrap();
        repo.upsert(ReferenceKind::Skill, "Logistique").await.unwrap();
        repo.upsert(ReferenceKind::Profession, "Logistique").await.unwrap();

        assert_eq!(first, again);
        assert_eq!(repo.count(ReferenceKind::Skill), 2);

        let names: Vec<String> = repo
            .list(ReferenceKind::Skill)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Logistique", "Premiers secours"]);
    }

    #[tokio::test]
    async fn test_add_participant_enforces_capacity() {
        let repo = InMemoryMissionRepository::new();
        let m = mission(Some(1));
        repo.save(&m).await.unwrap();

        let a = VolunteerId::new();
        let b = VolunteerId::new();
        assert_eq!(
            repo.add_participant(m.id, a).await.unwrap(),
            Admission::Admitted { participant_count: 1 }
        );
        assert_eq!(
            repo.add_participant(m.id, b).await.unwrap(),
            Admission::Full { max_participants: 1 }
        );
        assert_eq!(repo.list_participants(m.id).await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_add_participant_rejects_duplicate_and_closed() {
        let repo = InMemoryMissionRepository::new();
        let mut m = mission(None);
        repo.save(&m).await.unwrap();

        let a = VolunteerId::new();
        repo.add_participant(m.id, a).await.unwrap();
        assert_eq!(repo.add_participant(m.id, a).await.unwrap(), Admission::AlreadyRegistered);

        m.status = MissionStatus::Cancelled;
        repo.save(&m).await.unwrap();
        assert_eq!(
            repo.add_participant(m.id, VolunteerId::new()).await.unwrap(),
            Admission::NotOpen(MissionStatus::Cancelled)
        );
        assert_eq!(repo.participant_count(m.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_participant_unknown_mission() {
        let repo = InMemoryMissionRepository::new();
        let result = repo.add_participant(MissionId::new(), VolunteerId::new()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
