// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Mission Repository
//!
//! `MissionRepository` backed by the `missions` and `mission_participants`
//! tables.
//!
//! `add_participant` runs in one transaction holding the mission row with
//! `SELECT ... FOR UPDATE`. Concurrent registrations for the same mission
//! queue on that lock, so the capacity check always sees every committed
//! participant. The `(mission_id, volunteer_id)` primary key backs the
//! duplicate check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::mission::{Admission, Mission, MissionId, MissionStatus};
use crate::domain::repository::{MissionRepository, RepositoryError};
use crate::domain::volunteer::VolunteerId;

const SELECT_MISSION: &str = r#"
    SELECT id, title, description, location, starts_at, ends_at,
           max_participants, status, created_at, updated_at
    FROM missions
    WHERE id = $1
"#;

pub struct PostgresMissionRepository {
    pool: PgPool,
}

impl PostgresMissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn mission_from_row(row: &PgRow) -> Result<Mission, RepositoryError> {
    let status: String = row.try_get("status")?;
    let max_participants: Option<i32> = row.try_get("max_participants")?;
    let starts_at: Option<DateTime<Utc>> = row.try_get("starts_at")?;
    let ends_at: Option<DateTime<Utc>> = row.try_get("ends_at")?;

    Ok(Mission {
        id: MissionId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        starts_at,
        ends_at,
        max_participants: max_participants.map(|max| max.max(0) as u32),
        status: MissionStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Serialization(format!("unknown mission status '{}'", status)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl MissionRepository for PostgresMissionRepository {
    async fn save(&self, mission: &Mission) -> Result<(), RepositoryError> {
        let max_participants = mission
            .max_participants
            .map(i32::try_from)
            .transpose()
            .map_err(|_| RepositoryError::Serialization("maxParticipants out of range".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO missions (
                id, title, description, location, starts_at, ends_at,
                max_participants, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                max_participants = EXCLUDED.max_participants,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(mission.id.0)
        .bind(&mission.title)
        .bind(&mission.description)
        .bind(&mission.location)
        .bind(mission.starts_at)
        .bind(mission.ends_at)
        .bind(max_participants)
        .bind(mission.status.as_str())
        .bind(mission.created_at)
        .bind(mission.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        let row = sqlx::query(SELECT_MISSION)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(mission_from_row).transpose()
    }

    async fn add_participant(
        &self,
        mission_id: MissionId,
        volunteer_id: VolunteerId,
    ) -> Result<Admission, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{} FOR UPDATE", SELECT_MISSION))
            .bind(mission_id.0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("mission {}", mission_id)))?;
        let mission = mission_from_row(&row)?;

        let (count, already_registered): (i64, bool) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(BOOL_OR(volunteer_id = $2), FALSE)
            FROM mission_participants
            WHERE mission_id = $1
            "#,
        )
        .bind(mission_id.0)
        .bind(volunteer_id.0)
        .fetch_one(&mut *tx)
        .await?;

        let admission = mission.admit(count.max(0) as usize, already_registered);

        if let Admission::Admitted { .. } = admission {
            sqlx::query("INSERT INTO mission_participants (mission_id, volunteer_id) VALUES ($1, $2)")
                .bind(mission_id.0)
                .bind(volunteer_id.0)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }

        Ok(admission)
    }

    async fn participant_count(&self, mission_id: MissionId) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mission_participants WHERE mission_id = $1")
            .bind(mission_id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as usize)
    }

    async fn list_participants(&self, mission_id: MissionId) -> Result<Vec<VolunteerId>, RepositoryError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT volunteer_id
            FROM mission_participants
            WHERE mission_id = $1
            ORDER BY registered_at, volunteer_id
            "#,
        )
        .bind(mission_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(VolunteerId).collect())
    }
}
