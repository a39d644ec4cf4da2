// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Reference entities: skills, professions, education levels and nationalities.
//!
//! Each kind is a small lookup table keyed by a unique `name`, populated lazily
//! from free text supplied at volunteer registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(pub Uuid);

impl ReferenceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReferenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Skill,
    Profession,
    EducationLevel,
    Nationality,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Skill,
        ReferenceKind::Profession,
        ReferenceKind::EducationLevel,
        ReferenceKind::Nationality,
    ];

    /// Value stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Profession => "profession",
            Self::EducationLevel => "education_level",
            Self::Nationality => "nationality",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Plural URL segment used by the HTTP surface (`/reference/{kind}`).
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "skills" => Some(Self::Skill),
            "professions" => Some(Self::Profession),
            "education-levels" => Some(Self::EducationLevel),
            "nationalities" => Some(Self::Nationality),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: ReferenceId,
    pub kind: ReferenceKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ReferenceEntry {
    pub fn new(kind: ReferenceKind, name: String) -> Self {
        Self {
            id: ReferenceId::new(),
            kind,
            name,
            created_at: Utc::now(),
        }
    }
}

/// Canonical form of a user-supplied label, or `None` when nothing is left
/// after trimming.
pub fn normalize_reference_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in ReferenceKind::ALL {
            assert_eq!(ReferenceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ReferenceKind::parse("hobby"), None);
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(ReferenceKind::from_path_segment("skills"), Some(ReferenceKind::Skill));
        assert_eq!(
            ReferenceKind::from_path_segment("education-levels"),
            Some(ReferenceKind::EducationLevel)
        );
        assert_eq!(ReferenceKind::from_path_segment("skill"), None);
    }

    #[test]
    fn test_normalize_reference_name() {
        assert_eq!(normalize_reference_name("  Premiers secours "), Some("Premiers secours".to_string()));
        assert_eq!(normalize_reference_name("   "), None);
        assert_eq!(normalize_reference_name(""), None);
    }
}
