//! SQLite store — persistent local memory across runs.
//!
//! Uses a single database file with two tables:
//! - `resources` — the named memory resources
//! - `records`   — consolidated records with a `visible_at` column that
//!   gates retrieval, modeling consolidation lag the same way the
//!   in-memory store does.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use memento_core::error::StoreError;
use memento_core::identity::{ActorId, Namespace, SessionId};
use memento_core::store::{
    EventTurn, ExtractionStrategy, MemoryRecord, MemoryResource, MemoryStore, ResourceSpec,
};
use memento_core::transcript::Role;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// A SQLite-backed memory store.
pub struct SqliteStore {
    pool: SqlitePool,
    consolidation_delay: Duration,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// Pass `":memory:"` for an in-process ephemeral database (useful for
    /// tests).
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // An in-memory database exists per connection; pooling more than
        // one would scatter tables across databases.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self {
            pool,
            consolidation_delay: Duration::zero(),
        };
        store.run_migrations().await?;
        info!("SQLite memory store initialized at {path}");
        Ok(store)
    }

    /// Set the simulated consolidation delay.
    pub fn with_consolidation_delay(mut self, delay: std::time::Duration) -> Self {
        self.consolidation_delay = Duration::from_std(delay).unwrap_or_else(|_| Duration::zero());
        self
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                id                    TEXT PRIMARY KEY,
                name                  TEXT UNIQUE NOT NULL,
                strategies            TEXT NOT NULL,
                event_retention_days  INTEGER NOT NULL,
                created_at            TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("resources table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id           TEXT PRIMARY KEY,
                resource_id  TEXT NOT NULL,
                namespace    TEXT NOT NULL,
                content      TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                visible_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("records table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_records_scope ON records(resource_id, namespace)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("records index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_resource(row: &sqlx::sqlite::SqliteRow) -> Result<MemoryResource, StoreError> {
        let strategies_json: String = row
            .try_get("strategies")
            .map_err(|e| StoreError::Storage(format!("strategies column: {e}")))?;
        let strategies: Vec<ExtractionStrategy> =
            serde_json::from_str(&strategies_json).unwrap_or_default();
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::Storage(format!("created_at column: {e}")))?;
        let created_at = parse_timestamp(&created_at_str);
        let retention: i64 = row
            .try_get("event_retention_days")
            .map_err(|e| StoreError::Storage(format!("retention column: {e}")))?;

        Ok(MemoryResource {
            id: row
                .try_get("id")
                .map_err(|e| StoreError::Storage(format!("id column: {e}")))?,
            name: row
                .try_get("name")
                .map_err(|e| StoreError::Storage(format!("name column: {e}")))?,
            strategies,
            event_retention_days: retention as u32,
            created_at,
        })
    }

    async fn resource_exists(&self, resource_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM resources WHERE id = ?1")
            .bind(resource_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("resource lookup: {e}")))?;
        Ok(row.is_some())
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl MemoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create_resource(&self, spec: ResourceSpec) -> Result<MemoryResource, StoreError> {
        let existing = sqlx::query("SELECT 1 FROM resources WHERE name = ?1")
            .bind(&spec.name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("name lookup: {e}")))?;
        if existing.is_some() {
            return Err(StoreError::AlreadyExists(spec.name));
        }

        let resource = MemoryResource {
            id: Uuid::new_v4().to_string(),
            name: spec.name,
            strategies: spec.strategies,
            event_retention_days: spec.event_retention_days,
            created_at: Utc::now(),
        };
        let strategies_json = serde_json::to_string(&resource.strategies)
            .map_err(|e| StoreError::Storage(format!("strategies serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO resources (id, name, strategies, event_retention_days, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&resource.id)
        .bind(&resource.name)
        .bind(&strategies_json)
        .bind(resource.event_retention_days as i64)
        .bind(resource.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("resource insert: {e}")))?;

        Ok(resource)
    }

    async fn list_resources(&self) -> Result<Vec<MemoryResource>, StoreError> {
        let rows = sqlx::query("SELECT * FROM resources ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("resource list: {e}")))?;
        rows.iter().map(Self::row_to_resource).collect()
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resources WHERE id = ?1")
            .bind(resource_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("resource delete: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }
        sqlx::query("DELETE FROM records WHERE resource_id = ?1")
            .bind(resource_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("records delete: {e}")))?;
        Ok(())
    }

    async fn retrieve(
        &self,
        resource_id: &str,
        namespace: &Namespace,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        if !self.resource_exists(resource_id).await? {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }

        let rows = sqlx::query(
            r#"
            SELECT id, namespace, content, created_at
            FROM records
            WHERE resource_id = ?1 AND namespace = ?2 AND visible_at <= ?3
            "#,
        )
        .bind(resource_id)
        .bind(namespace.as_str())
        .bind(Utc::now().to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("record query: {e}")))?;

        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        let mut results: Vec<MemoryRecord> = rows
            .iter()
            .filter_map(|row| {
                let content: String = row.try_get("content").ok()?;
                let content_lower = content.to_lowercase();
                let occurrences: usize = terms
                    .iter()
                    .map(|t| content_lower.matches(t).count())
                    .sum();
                if occurrences == 0 {
                    return None;
                }
                Some(MemoryRecord {
                    id: row.try_get("id").ok()?,
                    namespace: row.try_get("namespace").ok()?,
                    score: occurrences as f32 / (content.len() as f32 / 100.0).max(1.0),
                    created_at: parse_timestamp(&row.try_get::<String, _>("created_at").ok()?),
                    content,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);
        Ok(results)
    }

    async fn append_event(
        &self,
        resource_id: &str,
        actor: &ActorId,
        _session: &SessionId,
        turns: &[EventTurn],
    ) -> Result<(), StoreError> {
        if !self.resource_exists(resource_id).await? {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }
        if turns.is_empty() {
            return Ok(());
        }

        let content = turns
            .iter()
            .map(|t| {
                let role = match t.role {
                    Role::User => "USER",
                    Role::Assistant => "ASSISTANT",
                    Role::System => "SYSTEM",
                };
                format!("{role}: {}", t.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO records (id, resource_id, namespace, content, created_at, visible_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(resource_id)
        .bind(Namespace::for_actor(actor).as_str())
        .bind(&content)
        .bind(now.to_rfc3339())
        .bind((now + self.consolidation_delay).to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("record insert: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ephemeral() -> SqliteStore {
        SqliteStore::open(":memory:").await.unwrap()
    }

    fn spec(name: &str) -> ResourceSpec {
        ResourceSpec {
            name: name.into(),
            strategies: vec![ExtractionStrategy::Semantic],
            event_retention_days: 30,
        }
    }

    #[tokio::test]
    async fn resources_roundtrip() {
        let store = ephemeral().await;
        let created = store.create_resource(spec("travel")).await.unwrap();

        let listed = store.list_resources().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].strategies, vec![ExtractionStrategy::Semantic]);
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let store = ephemeral().await;
        store.create_resource(spec("travel")).await.unwrap();
        let err = store.create_resource(spec("travel")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn save_and_retrieve_scoped_by_namespace() {
        let store = ephemeral().await;
        let resource = store.create_resource(spec("travel")).await.unwrap();
        let john = ActorId::new("john");
        let jane = ActorId::new("jane");
        let session = SessionId::generate();

        store
            .append_event(
                &resource.id,
                &john,
                &session,
                &[
                    EventTurn::new(Role::User, "Hi, I'm John, I like aisle seats"),
                    EventTurn::new(Role::Assistant, "Noted, John"),
                ],
            )
            .await
            .unwrap();

        let records = store
            .retrieve(&resource.id, &Namespace::for_actor(&john), "seats", 10)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].content.contains("John"));

        let other = store
            .retrieve(&resource.id, &Namespace::for_actor(&jane), "seats", 10)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_resource_is_not_found() {
        let store = ephemeral().await;
        let err = store.delete_resource("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
