use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::project::{CorrectionDiff, HistoryAction, HistoryEntry, LocationApproval, Project};
use crate::roles::Location;
use crate::status::ProjectStatus;
use crate::store::{ProjectStore, ReplayOrder};

/// SQLite-backed store. Row-level transactions are the sole concurrency
/// control; no application-level locks exist.
pub struct SqliteProjectStore {
    pool: SqlitePool,
}

impl SqliteProjectStore {
    /// Connect to a database file, creating and migrating it as needed.
    pub async fn connect(database_url: &str, auto_migrate: bool) -> Result<Self, WorkflowError> {
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| WorkflowError::Corrupt(format!("migration failed: {e}")))?;
        }

        Ok(Self { pool })
    }

    /// Private in-memory database, migrated and ready. A single connection
    /// keeps the pool pinned to one memory instance.
    pub async fn in_memory() -> Result<Self, WorkflowError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| WorkflowError::Corrupt(format!("migration failed: {e}")))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, WorkflowError> {
    Uuid::from_str(value).map_err(|e| WorkflowError::Corrupt(format!("bad uuid '{value}': {e}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, WorkflowError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WorkflowError::Corrupt(format!("bad timestamp '{value}': {e}")))
}

fn parse_date(value: &str) -> Result<NaiveDate, WorkflowError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| WorkflowError::Corrupt(format!("bad date '{value}': {e}")))
}

fn project_from_row(row: &SqliteRow) -> Result<Project, WorkflowError> {
    let id: String = row.get("id");
    let creator_id: String = row.get("creator_id");
    let status_code: i64 = row.get("status");
    let distribution_json: String = row.get("distribution");
    let first_delivery: Option<String> = row.get("first_delivery");
    let last_delivery: Option<String> = row.get("last_delivery");
    let archived_at: Option<String> = row.get("archived_at");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    let distribution: BTreeMap<String, f64> = serde_json::from_str(&distribution_json)?;
    let status = ProjectStatus::from_code(status_code)
        .ok_or_else(|| WorkflowError::Corrupt(format!("unknown status code {status_code}")))?;

    Ok(Project {
        id: parse_uuid(&id)?,
        number: row.get("number"),
        customer: row.get("customer"),
        article: row.get("article"),
        total_quantity: row.get("total_quantity"),
        quantity_fixed: row.get::<i64, _>("quantity_fixed") != 0,
        first_delivery: first_delivery.as_deref().map(parse_date).transpose()?,
        last_delivery: last_delivery.as_deref().map(parse_date).transpose()?,
        distribution,
        status,
        creator_id: parse_uuid(&creator_id)?,
        creator_name: row.get("creator_name"),
        archived: row.get::<i64, _>("archived") != 0,
        archived_at: archived_at.as_deref().map(parse_timestamp).transpose()?,
        rejection_reason: row.get("rejection_reason"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn history_from_row(row: &SqliteRow) -> Result<HistoryEntry, WorkflowError> {
    let id: String = row.get("id");
    let project_id: String = row.get("project_id");
    let actor_id: String = row.get("actor_id");
    let action: String = row.get("action");
    let previous_status: Option<i64> = row.get("previous_status");
    let new_status: Option<i64> = row.get("new_status");
    let diff_json: Option<String> = row.get("diff");
    let operation_id: Option<String> = row.get("operation_id");
    let created_at: String = row.get("created_at");

    let diff: Option<CorrectionDiff> = diff_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    Ok(HistoryEntry {
        id: parse_uuid(&id)?,
        project_id: parse_uuid(&project_id)?,
        actor_id: parse_uuid(&actor_id)?,
        actor_name: row.get("actor_name"),
        action: HistoryAction::from_str(&action)
            .ok_or_else(|| WorkflowError::Corrupt(format!("unknown action tag '{action}'")))?,
        previous_status: previous_status.and_then(ProjectStatus::from_code),
        new_status: new_status.and_then(ProjectStatus::from_code),
        reason: row.get("reason"),
        diff,
        operation_id: operation_id.as_deref().map(parse_uuid).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn approval_from_row(row: &SqliteRow) -> Result<LocationApproval, WorkflowError> {
    let project_id: String = row.get("project_id");
    let location: String = row.get("location");
    let actor_id: String = row.get("actor_id");
    let approved_at: String = row.get("approved_at");

    Ok(LocationApproval {
        project_id: parse_uuid(&project_id)?,
        location: Location::resolve(&location)
            .ok_or_else(|| WorkflowError::Corrupt(format!("unknown location '{location}'")))?,
        actor_id: parse_uuid(&actor_id)?,
        actor_name: row.get("actor_name"),
        approved_at: parse_timestamp(&approved_at)?,
    })
}

async fn insert_history_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    entry: &HistoryEntry,
) -> Result<(), WorkflowError> {
    sqlx::query(
        r#"
        INSERT INTO history_entries
            (id, project_id, actor_id, actor_name, action, previous_status,
             new_status, reason, diff, operation_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(entry.project_id.to_string())
    .bind(entry.actor_id.to_string())
    .bind(&entry.actor_name)
    .bind(entry.action.as_str())
    .bind(entry.previous_status.map(|s| s.code()))
    .bind(entry.new_status.map(|s| s.code()))
    .bind(&entry.reason)
    .bind(
        entry
            .diff
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
    )
    .bind(entry.operation_id.map(|id| id.to_string()))
    .bind(entry.created_at.to_rfc3339())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl ProjectStore for SqliteProjectStore {
    async fn insert_project(
        &self,
        project: &Project,
        entry: &HistoryEntry,
    ) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects
                (id, number, customer, article, total_quantity, quantity_fixed,
                 first_delivery, last_delivery, distribution, status,
                 creator_id, creator_name, archived, archived_at,
                 rejection_reason, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(project.id.to_string())
        .bind(project.number)
        .bind(&project.customer)
        .bind(&project.article)
        .bind(project.total_quantity)
        .bind(project.quantity_fixed as i64)
        .bind(project.first_delivery.map(|d| d.to_string()))
        .bind(project.last_delivery.map(|d| d.to_string()))
        .bind(serde_json::to_string(&project.distribution)?)
        .bind(project.status.code())
        .bind(project.creator_id.to_string())
        .bind(&project.creator_name)
        .bind(project.archived as i64)
        .bind(project.archived_at.map(|t| t.to_rfc3339()))
        .bind(&project.rejection_reason)
        .bind(project.created_at.to_rfc3339())
        .bind(project.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        insert_history_entry(&mut tx, entry).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_project(&self, id: Uuid) -> Result<Option<Project>, WorkflowError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn fetch_project_by_number(
        &self,
        number: i64,
    ) -> Result<Option<Project>, WorkflowError> {
        let row = sqlx::query("SELECT * FROM projects WHERE number = ?1")
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn next_project_number(&self) -> Result<i64, WorkflowError> {
        let row = sqlx::query("SELECT COALESCE(MAX(number), 0) AS max_number FROM projects")
            .fetch_one(&self.pool)
            .await?;
        let max_number: i64 = row.get("max_number");
        Ok(max_number + 1)
    }

    async fn apply_transition(
        &self,
        project: &Project,
        entry: &HistoryEntry,
        approval: Option<&LocationApproval>,
    ) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE projects
            SET total_quantity = ?2, quantity_fixed = ?3, first_delivery = ?4,
                last_delivery = ?5, distribution = ?6, status = ?7,
                archived = ?8, archived_at = ?9, rejection_reason = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(project.id.to_string())
        .bind(project.total_quantity)
        .bind(project.quantity_fixed as i64)
        .bind(project.first_delivery.map(|d| d.to_string()))
        .bind(project.last_delivery.map(|d| d.to_string()))
        .bind(serde_json::to_string(&project.distribution)?)
        .bind(project.status.code())
        .bind(project.archived as i64)
        .bind(project.archived_at.map(|t| t.to_rfc3339()))
        .bind(&project.rejection_reason)
        .bind(project.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        insert_history_entry(&mut tx, entry).await?;

        if let Some(approval) = approval {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO location_approvals
                    (project_id, location, actor_id, actor_name, approved_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(approval.project_id.to_string())
            .bind(approval.location.code())
            .bind(approval.actor_id.to_string())
            .bind(&approval.actor_name)
            .bind(approval.approved_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_projects(&self, archived: bool) -> Result<Vec<Project>, WorkflowError> {
        let rows = sqlx::query("SELECT * FROM projects WHERE archived = ?1 ORDER BY number ASC")
            .bind(archived as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn approved_projects_past_delivery(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Project>, WorkflowError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM projects
            WHERE status = ?1 AND archived = 0
              AND last_delivery IS NOT NULL AND last_delivery < ?2
            ORDER BY number ASC
            "#,
        )
        .bind(ProjectStatus::Genehmigt.code())
        .bind(today.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn location_approvals(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<LocationApproval>, WorkflowError> {
        let rows = sqlx::query(
            "SELECT * FROM location_approvals WHERE project_id = ?1 ORDER BY approved_at ASC",
        )
        .bind(project_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(approval_from_row).collect()
    }

    async fn history_for_project(
        &self,
        project_id: Uuid,
        order: ReplayOrder,
    ) -> Result<Vec<HistoryEntry>, WorkflowError> {
        let query = match order {
            ReplayOrder::NewestFirst => {
                "SELECT * FROM history_entries WHERE project_id = ?1 ORDER BY created_at DESC, id DESC"
            }
            ReplayOrder::OldestFirst => {
                "SELECT * FROM history_entries WHERE project_id = ?1 ORDER BY created_at ASC, id ASC"
            }
        };
        let rows = sqlx::query(query)
            .bind(project_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(history_from_row).collect()
    }

    async fn history_for_actor(&self, actor_id: Uuid) -> Result<Vec<HistoryEntry>, WorkflowError> {
        let rows = sqlx::query(
            "SELECT * FROM history_entries WHERE actor_id = ?1 ORDER BY created_at DESC",
        )
        .bind(actor_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(history_from_row).collect()
    }

    async fn all_history(&self) -> Result<Vec<HistoryEntry>, WorkflowError> {
        let rows = sqlx::query("SELECT * FROM history_entries ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(history_from_row).collect()
    }

    async fn find_history_by_operation(
        &self,
        project_id: Uuid,
        operation_id: Uuid,
    ) -> Result<Option<HistoryEntry>, WorkflowError> {
        let row = sqlx::query(
            "SELECT * FROM history_entries WHERE project_id = ?1 AND operation_id = ?2",
        )
        .bind(project_id.to_string())
        .bind(operation_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(history_from_row).transpose()
    }
}
