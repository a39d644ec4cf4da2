// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Reference Data Repository
//!
//! `ReferenceDataRepository` backed by the `reference_entries` table. The
//! `(kind, name)` unique constraint plus `INSERT ... ON CONFLICT` make
//! find-or-create a single atomic statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::reference::{ReferenceEntry, ReferenceId, ReferenceKind};
use crate::domain::repository::{ReferenceDataRepository, RepositoryError};

pub struct PostgresReferenceDataRepository {
    pool: PgPool,
}

impl PostgresReferenceDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &PgRow) -> Result<ReferenceEntry, RepositoryError> {
    let kind: String = row.try_get("kind")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let id: Uuid = row.try_get("id")?;

    Ok(ReferenceEntry {
        id: ReferenceId(id),
        kind: ReferenceKind::parse(&kind)
            .ok_or_else(|| RepositoryError::Serialization(format!("unknown reference kind '{}'", kind)))?,
        name: row.try_get("name")?,
        created_at,
    })
}

#[async_trait]
impl ReferenceDataRepository for PostgresReferenceDataRepository {
    async fn upsert(&self, kind: ReferenceKind, name: &str) -> Result<ReferenceId, RepositoryError> {
        // The no-op DO UPDATE makes RETURNING yield the existing row's id
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO reference_entries (id, kind, name, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (kind, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind.as_str())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(ReferenceId(id))
    }

    async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, name, created_at
            FROM reference_entries
            WHERE kind = $1
            ORDER BY name
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }
}
