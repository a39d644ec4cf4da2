// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

//! Application Layer
//!
//! Use cases orchestrating the domain model against the repositories.

pub mod error;
pub mod matricule;
pub mod mission_catalogue;
pub mod reference_data;
pub mod register_for_mission;
pub mod register_volunteer;
pub mod repository_factory;
pub mod volunteer_admin;

pub use error::WorkflowError;
pub use matricule::MatriculeGenerator;
pub use mission_catalogue::{CreateMissionRequest, MissionCatalogue, MissionOverview, StandardMissionCatalogue};
pub use reference_data::ReferenceDataResolver;
pub use register_for_mission::{MissionRegistration, RegisterForMissionUseCase, StandardRegisterForMissionUseCase};
pub use register_volunteer::{RegisterVolunteerRequest, RegisterVolunteerUseCase, StandardRegisterVolunteerUseCase};
pub use volunteer_admin::{StandardVolunteerAdministration, VolunteerAdministration};
