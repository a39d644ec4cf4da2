// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Volunteer Repository
//!
//! `VolunteerRepository` backed by the `volunteers` and `volunteer_skills`
//! tables. Matricule numbers come from the `volunteer_matricule_seq`
//! sequence, which never hands out the same value twice.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::reference::ReferenceId;
use crate::domain::repository::{RepositoryError, VolunteerRepository};
use crate::domain::volunteer::{Matricule, Residence, Volunteer, VolunteerId, VolunteerStatus};

const SELECT_VOLUNTEER: &str = r#"
    SELECT id, matricule, first_name, last_name, email, password_hash, phone,
           birth_date, national_id, status, profession_id, education_level_id,
           nationality_id, residence, created_at, updated_at
    FROM volunteers
"#;

pub struct PostgresVolunteerRepository {
    pool: PgPool,
}

impl PostgresVolunteerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_skills(&self, volunteer_id: Uuid) -> Result<Vec<ReferenceId>, RepositoryError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT skill_id FROM volunteer_skills WHERE volunteer_id = $1 ORDER BY position",
        )
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(ReferenceId).collect())
    }

    async fn hydrate(&self, row: Option<PgRow>) -> Result<Option<Volunteer>, RepositoryError> {
        match row {
            Some(row) => {
                let mut volunteer = volunteer_from_row(&row)?;
                volunteer.skill_ids = self.load_skills(volunteer.id.0).await?;
                Ok(Some(volunteer))
            }
            None => Ok(None),
        }
    }
}

fn volunteer_from_row(row: &PgRow) -> Result<Volunteer, RepositoryError> {
    let matricule: String = row.try_get("matricule")?;
    let status: String = row.try_get("status")?;
    let residence: Option<Json<Residence>> = row.try_get("residence")?;
    let birth_date: Option<NaiveDate> = row.try_get("birth_date")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    let reference = |column: &str| -> Result<Option<ReferenceId>, RepositoryError> {
        Ok(row.try_get::<Option<Uuid>, _>(column)?.map(ReferenceId))
    };

    Ok(Volunteer {
        id: VolunteerId(row.try_get("id")?),
        matricule: Matricule::parse(&matricule).map_err(|e| RepositoryError::Serialization(e.to_string()))?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        phone: row.try_get("phone")?,
        birth_date,
        national_id: row.try_get("national_id")?,
        status: VolunteerStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Serialization(format!("unknown volunteer status '{}'", status)))?,
        skill_ids: Vec::new(),
        profession_id: reference("profession_id")?,
        education_level_id: reference("education_level_id")?,
        nationality_id: reference("nationality_id")?,
        residence: residence.map(|json| json.0),
        created_at,
        updated_at,
    })
}

#[async_trait]
impl VolunteerRepository for PostgresVolunteerRepository {
    async fn insert(&self, volunteer: &Volunteer) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO volunteers (
                id, matricule, first_name, last_name, email, password_hash, phone,
                birth_date, national_id, status, profession_id, education_level_id,
                nationality_id, residence, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(volunteer.id.0)
        .bind(volunteer.matricule.as_str())
        .bind(&volunteer.first_name)
        .bind(&volunteer.last_name)
        .bind(&volunteer.email)
        .bind(&volunteer.password_hash)
        .bind(&volunteer.phone)
        .bind(volunteer.birth_date)
        .bind(&volunteer.national_id)
        .bind(volunteer.status.as_str())
        .bind(volunteer.profession_id.map(|id| id.0))
        .bind(volunteer.education_level_id.map(|id| id.0))
        .bind(volunteer.nationality_id.map(|id| id.0))
        .bind(volunteer.residence.clone().map(Json))
        .bind(volunteer.created_at)
        .bind(volunteer.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, skill_id) in volunteer.skill_ids.iter().enumerate() {
            sqlx::query("INSERT INTO volunteer_skills (volunteer_id, skill_id, position) VALUES ($1, $2, $3)")
                .bind(volunteer.id.0)
                .bind(skill_id.0)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, volunteer: &Volunteer, expected_status: VolunteerStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE volunteers SET
                first_name = $2,
                last_name = $3,
                phone = $4,
                birth_date = $5,
                national_id = $6,
                status = $7,
                profession_id = $8,
                education_level_id = $9,
                nationality_id = $10,
                residence = $11,
                updated_at = $12
            WHERE id = $1 AND status = $13
            "#,
        )
        .bind(volunteer.id.0)
        .bind(&volunteer.first_name)
        .bind(&volunteer.last_name)
        .bind(&volunteer.phone)
        .bind(volunteer.birth_date)
        .bind(&volunteer.national_id)
        .bind(volunteer.status.as_str())
        .bind(volunteer.profession_id.map(|id| id.0))
        .bind(volunteer.education_level_id.map(|id| id.0))
        .bind(volunteer.nationality_id.map(|id| id.0))
        .bind(volunteer.residence.clone().map(Json))
        .bind(volunteer.updated_at)
        .bind(expected_status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM volunteers WHERE id = $1)")
                .bind(volunteer.id.0)
                .fetch_one(&self.pool)
                .await?;

            return Err(if exists {
                RepositoryError::Conflict(format!(
                    "volunteer {} is no longer {}",
                    volunteer.id, expected_status
                ))
            } else {
                RepositoryError::NotFound(format!("volunteer {}", volunteer.id))
            });
        }
        Ok(())
    }

    async fn find_by_id(&self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_VOLUNTEER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn find_by_matricule(&self, matricule: &Matricule) -> Result<Option<Volunteer>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE matricule = $1", SELECT_VOLUNTEER))
            .bind(matricule.as_str())
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Volunteer>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE email = $1", SELECT_VOLUNTEER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn next_matricule_number(&self) -> Result<u64, RepositoryError> {
        let next: i64 = sqlx::query_scalar("SELECT nextval('volunteer_matricule_seq')")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(next).map_err(|_| RepositoryError::Database(format!("sequence returned {}", next)))
    }
}
