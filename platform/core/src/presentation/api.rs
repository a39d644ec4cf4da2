// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API
//!
//! axum router exposing the registration workflows. Request and response
//! bodies are camelCase JSON.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `GET` | `/health` | 200 |
//! | `POST` | `/register` | 201 `{userId, matricule}` |
//! | `GET` | `/volunteers/{matricule}` | 200 volunteer |
//! | `PATCH` | `/volunteers/{matricule}/status` | 200 volunteer |
//! | `POST` | `/missions` | 201 mission |
//! | `GET` | `/missions/{id}` | 200 mission |
//! | `GET` | `/missions/{id}/participants` | 200 volunteers |
//! | `POST` | `/missions/{id}/register` | 200 `{success, participantCount}` |
//! | `GET` | `/reference/{kind}` | 200 `[{id, name}]` |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::error::WorkflowError;
use crate::application::matricule::MatriculeGenerator;
use crate::application::mission_catalogue::{CreateMissionRequest, MissionCatalogue, StandardMissionCatalogue};
use crate::application::reference_data::ReferenceDataResolver;
use crate::application::register_for_mission::{RegisterForMissionUseCase, StandardRegisterForMissionUseCase};
use crate::application::register_volunteer::{
    RegisterVolunteerRequest, RegisterVolunteerUseCase, StandardRegisterVolunteerUseCase,
};
use crate::application::repository_factory::Repositories;
use crate::application::volunteer_admin::{StandardVolunteerAdministration, VolunteerAdministration};
use crate::domain::credentials::PasswordHasher;
use crate::domain::mission::MissionId;
use crate::domain::platform_config::RegistrationConfig;
use crate::domain::reference::{ReferenceId, ReferenceKind};
use crate::domain::validation::ValidationErrors;
use crate::domain::volunteer::{Matricule, VolunteerId, VolunteerStatus};
use crate::infrastructure::event_bus::EventBus;
use crate::presentation::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub register_volunteer: Arc<dyn RegisterVolunteerUseCase>,
    pub register_for_mission: Arc<dyn RegisterForMissionUseCase>,
    pub volunteers: Arc<dyn VolunteerAdministration>,
    pub missions: Arc<dyn MissionCatalogue>,
    pub reference_data: Arc<ReferenceDataResolver>,
}

impl AppState {
    /// Wire the standard use cases over one set of repositories
    pub fn new(
        repositories: Repositories,
        hasher: Arc<dyn PasswordHasher>,
        event_bus: Arc<EventBus>,
        registration: &RegistrationConfig,
    ) -> Self {
        let reference_data = Arc::new(ReferenceDataResolver::new(repositories.reference_data.clone()));
        let matricules = Arc::new(MatriculeGenerator::new(
            repositories.volunteers.clone(),
            registration.matricule_prefix.clone(),
        ));

        Self {
            register_volunteer: Arc::new(StandardRegisterVolunteerUseCase::new(
                repositories.volunteers.clone(),
                reference_data.clone(),
                matricules,
                hasher,
                event_bus.clone(),
                registration.password_min_length,
            )),
            register_for_mission: Arc::new(StandardRegisterForMissionUseCase::new(
                repositories.missions.clone(),
                repositories.volunteers.clone(),
                event_bus.clone(),
            )),
            volunteers: Arc::new(StandardVolunteerAdministration::new(
                repositories.volunteers.clone(),
                event_bus,
            )),
            missions: Arc::new(StandardMissionCatalogue::new(
                repositories.missions,
                repositories.volunteers,
            )),
            reference_data,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register_volunteer))
        .route("/volunteers/{matricule}", get(get_volunteer))
        .route("/volunteers/{matricule}/status", patch(change_volunteer_status))
        .route("/missions", post(create_mission))
        .route("/missions/{id}", get(get_mission))
        .route("/missions/{id}/participants", get(list_participants))
        .route("/missions/{id}/register", post(register_for_mission))
        .route("/reference/{kind}", get(list_reference_entries))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_mission_id(raw: &str) -> Result<MissionId, ApiError> {
    MissionId::from_string(raw).map_err(|_| ApiError::NotFound(format!("mission {} not found", raw)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisteredVolunteer {
    user_id: VolunteerId,
    matricule: Matricule,
}

#[derive(Debug, Deserialize)]
struct MissionRegistrationBody {
    matricule: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MissionRegistrationResult {
    success: bool,
    participant_count: usize,
}

#[derive(Debug, Deserialize)]
struct StatusChangeBody {
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReferenceView {
    id: ReferenceId,
    name: String,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn register_volunteer(
    State(state): State<AppState>,
    payload: Result<Json<RegisterVolunteerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let volunteer = state.register_volunteer.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredVolunteer {
            user_id: volunteer.id,
            matricule: volunteer.matricule,
        }),
    ))
}

async fn get_volunteer(
    State(state): State<AppState>,
    Path(matricule): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let volunteer = state.volunteers.get_volunteer(&matricule).await?;
    Ok(Json(volunteer))
}

async fn change_volunteer_status(
    State(state): State<AppState>,
    Path(matricule): Path<String>,
    payload: Result<Json<StatusChangeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let status = body
        .status
        .as_deref()
        .map(|s| s.trim().to_uppercase())
        .and_then(|s| VolunteerStatus::parse(&s))
        .ok_or_else(|| {
            WorkflowError::from(ValidationErrors::single(
                "status",
                "status must be one of PENDING, ACTIVE, INACTIVE, REJECTED",
            ))
        })?;

    let volunteer = state.volunteers.change_status(&matricule, status).await?;
    Ok(Json(volunteer))
}

async fn create_mission(
    State(state): State<AppState>,
    payload: Result<Json<CreateMissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let mission = state.missions.create_mission(request).await?;
    Ok((StatusCode::CREATED, Json(mission)))
}

async fn get_mission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mission = state.missions.get_mission(parse_mission_id(&id)?).await?;
    Ok(Json(mission))
}

async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let participants = state.missions.list_participants(parse_mission_id(&id)?).await?;
    Ok(Json(participants))
}

async fn register_for_mission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MissionRegistrationBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mission_id = parse_mission_id(&id)?;
    let Json(body) = payload?;

    let registration = state
        .register_for_mission
        .register_volunteer(mission_id, body.matricule.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(MissionRegistrationResult {
        success: true,
        participant_count: registration.participant_count,
    }))
}

async fn list_reference_entries(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = ReferenceKind::from_path_segment(&kind)
        .ok_or_else(|| ApiError::NotFound(format!("unknown reference list '{}'", kind)))?;

    let entries = state
        .reference_data
        .list(kind)
        .await
        .map_err(WorkflowError::from)?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| ReferenceView {
                id: entry.id,
                name: entry.name,
            })
            .collect::<Vec<_>>(),
    ))
}
