// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::reference::ReferenceId;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolunteerId(pub Uuid);

impl VolunteerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VolunteerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VolunteerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

static MATRICULE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]*-\d{6,}$").expect("matricule pattern is valid"));

/// Human-readable volunteer identifier, e.g. `VOL-000042`.
///
/// Assigned once at registration and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Matricule(String);

impl Matricule {
    pub const DEFAULT_PREFIX: &'static str = "VOL";

    /// Format a sequence number as `{prefix}-{number:06}`. Numbers wider than
    /// six digits are kept whole.
    pub fn from_sequence(prefix: &str, number: u64) -> Self {
        Self(format!("{}-{:06}", prefix, number))
    }

    pub fn parse(s: &str) -> Result<Self, VolunteerError> {
        let candidate = s.trim();
        if MATRICULE_PATTERN.is_match(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(VolunteerError::InvalidMatricule(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> &str {
        self.0.split_once('-').map(|(prefix, _)| prefix).unwrap_or_default()
    }

    pub fn number(&self) -> Option<u64> {
        self.0.split_once('-').and_then(|(_, digits)| digits.parse().ok())
    }
}

impl TryFrom<String> for Matricule {
    type Error = VolunteerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Matricule> for String {
    fn from(value: Matricule) -> Self {
        value.0
    }
}

impl std::fmt::Display for Matricule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Volunteer lifecycle.
///
/// New registrations start `Pending`; administrators move them on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolunteerStatus {
    Pending,
    Active,
    Inactive,
    Rejected,
}

impl VolunteerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: VolunteerStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Pending, Self::Rejected)
                | (Self::Active, Self::Inactive)
                | (Self::Inactive, Self::Active)
        )
    }
}

impl std::fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured place of residence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl Residence {
    pub fn is_empty(&self) -> bool {
        [&self.country, &self.region, &self.city, &self.district, &self.street]
            .iter()
            .all(|part| part.as_deref().map(str::trim).unwrap_or_default().is_empty())
    }
}

// ============================================================================
// Aggregate Root: Volunteer
// ============================================================================

/// Everything needed to create a volunteer once input has been validated,
/// the password hashed and reference data resolved.
#[derive(Debug, Clone)]
pub struct VolunteerDraft {
    pub matricule: Matricule,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub skill_ids: Vec<ReferenceId>,
    pub profession_id: Option<ReferenceId>,
    pub education_level_id: Option<ReferenceId>,
    pub nationality_id: Option<ReferenceId>,
    pub residence: Option<Residence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: VolunteerId,
    pub matricule: Matricule,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub status: VolunteerStatus,
    pub skill_ids: Vec<ReferenceId>,
    pub profession_id: Option<ReferenceId>,
    pub education_level_id: Option<ReferenceId>,
    pub nationality_id: Option<ReferenceId>,
    pub residence: Option<Residence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Volunteer {
    /// Create a freshly registered volunteer in `Pending` status.
    pub fn register(draft: VolunteerDraft) -> Self {
        let now = Utc::now();
        let mut skill_ids = draft.skill_ids;
        let mut seen = std::collections::HashSet::new();
        skill_ids.retain(|id| seen.insert(*id));

        Self {
            id: VolunteerId::new(),
            matricule: draft.matricule,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            password_hash: draft.password_hash,
            phone: draft.phone,
            birth_date: draft.birth_date,
            national_id: draft.national_id,
            status: VolunteerStatus::Pending,
            skill_ids,
            profession_id: draft.profession_id,
            education_level_id: draft.education_level_id,
            nationality_id: draft.nationality_id,
            residence: draft.residence.filter(|r| !r.is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply an administrator status change. Setting the current status again
    /// is a no-op.
    pub fn change_status(&mut self, next: VolunteerStatus) -> Result<bool, VolunteerError> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(VolunteerError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(true)
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum VolunteerError {
    #[error("Invalid matricule: '{0}'")]
    InvalidMatricule(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: VolunteerStatus,
        to: VolunteerStatus,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> VolunteerDraft {
        VolunteerDraft {
            matricule: Matricule::from_sequence("VOL", 42),
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            email: "awa@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            phone: None,
            birth_date: None,
            national_id: None,
            skill_ids: vec![],
            profession_id: None,
            education_level_id: None,
            nationality_id: None,
            residence: None,
        }
    }

    #[test]
    fn test_matricule_format() {
        assert_eq!(Matricule::from_sequence("VOL", 42).as_str(), "VOL-000042");
        assert_eq!(Matricule::from_sequence("VOL", 1).as_str(), "VOL-000001");
        assert_eq!(Matricule::from_sequence("VOL", 1_234_567).as_str(), "VOL-1234567");
    }

    #[test]
    fn test_matricule_parse() {
        let matricule = Matricule::parse(" VOL-000042 ").unwrap();
        assert_eq!(matricule.as_str(), "VOL-000042");
        assert_eq!(matricule.prefix(), "VOL");
        assert_eq!(matricule.number(), Some(42));

        assert!(Matricule::parse("VOL-42").is_err());
        assert!(Matricule::parse("vol-000042").is_err());
        assert!(Matricule::parse("").is_err());
        assert!(Matricule::parse("000042").is_err());
    }

    #[test]
    fn test_matricule_serde_rejects_garbage() {
        let parsed: Result<Matricule, _> = serde_json::from_str("\"not-a-matricule\"");
        assert!(parsed.is_err());

        let parsed: Matricule = serde_json::from_str("\"VOL-000007\"").unwrap();
        assert_eq!(parsed.number(), Some(7));
    }

    #[test]
    fn test_register_starts_pending() {
        let volunteer = Volunteer::register(draft());
        assert_eq!(volunteer.status, VolunteerStatus::Pending);
        assert_eq!(volunteer.full_name(), "Awa Diop");
    }

    #[test]
    fn test_register_deduplicates_skills_and_drops_empty_residence() {
        let skill = ReferenceId::new();
        let mut d = draft();
        d.skill_ids = vec![skill, skill];
        d.residence = Some(Residence {
            city: Some("  ".to_string()),
            ..Residence::default()
        });

        let volunteer = Volunteer::register(d);
        assert_eq!(volunteer.skill_ids, vec![skill]);
        assert!(volunteer.residence.is_none());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let volunteer = Volunteer::register(draft());
        let json = serde_json::to_value(&volunteer).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["matricule"], "VOL-000042");
    }

    #[test]
    fn test_status_transitions() {
        let mut volunteer = Volunteer::register(draft());

        // Pending -> Active
        assert!(volunteer.change_status(VolunteerStatus::Active).unwrap());
        // Active -> Active is a no-op
        assert!(!volunteer.change_status(VolunteerStatus::Active).unwrap());
        // Active -> Inactive -> Active
        assert!(volunteer.change_status(VolunteerStatus::Inactive).unwrap());
        assert!(volunteer.change_status(VolunteerStatus::Active).unwrap());
        // Active -> Rejected is not allowed
        assert!(volunteer.change_status(VolunteerStatus::Rejected).is_err());
        assert_eq!(volunteer.status, VolunteerStatus::Active);
    }

    #[test]
    fn test_rejected_is_terminal() {
        let mut volunteer = Volunteer::register(draft());
        volunteer.change_status(VolunteerStatus::Rejected).unwrap();
        for next in [VolunteerStatus::Pending, VolunteerStatus::Active, VolunteerStatus::Inactive] {
            assert!(volunteer.change_status(next).is_err());
        }
    }
}
