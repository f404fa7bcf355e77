//! PostgreSQL-backed document store.
//!
//! Collections map to tables created by the migrations in `migrations/`.
//! Toggles are single `UPDATE ... RETURNING` statements, so row-level locking in
//! PostgreSQL serializes concurrent toggles of the same row.

use async_trait::async_trait;
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::{
    db::DbPool,
    models::{
        api_key::ApiKey,
        configuration::Configuration,
        song_request::{NewSongRequest, SongRequest},
    },
};

/// Store implementation on top of a sqlx connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_requests(&self, skip: i64, limit: i64) -> Result<Vec<SongRequest>, StoreError> {
        let requests = sqlx::query_as::<_, SongRequest>(
            r#"
            SELECT id, key, name, audience, done, created_at, updated_at
            FROM song_requests
            ORDER BY updated_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn count_requests(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM song_requests")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert_request(&self, request: NewSongRequest) -> Result<SongRequest, StoreError> {
        let created = sqlx::query_as::<_, SongRequest>(
            r#"
            INSERT INTO song_requests (key, name, audience, done, created_at, updated_at)
            VALUES ($1, $2, $3, false, $4, $4)
            RETURNING id, key, name, audience, done, created_at, updated_at
            "#,
        )
        .bind(request.key)
        .bind(request.name)
        .bind(request.audience)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn toggle_request(&self, id: Uuid) -> Result<Option<SongRequest>, StoreError> {
        // GREATEST keeps updated_at strictly increasing even if the clock stalls
        let updated = sqlx::query_as::<_, SongRequest>(
            r#"
            UPDATE song_requests
            SET done = NOT done,
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING id, key, name, audience, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete_request(&self, id: Uuid) -> Result<Option<SongRequest>, StoreError> {
        let deleted = sqlx::query_as::<_, SongRequest>(
            r#"
            DELETE FROM song_requests
            WHERE id = $1
            RETURNING id, key, name, audience, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }

    async fn find_api_key(&self, value: &str) -> Result<Option<ApiKey>, StoreError> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            "SELECT id, value, created_at FROM api_keys WHERE value = $1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(api_key)
    }

    async fn find_config(&self, name: &str) -> Result<Option<Configuration>, StoreError> {
        let config = sqlx::query_as::<_, Configuration>(
            "SELECT id, name, value, created_at, updated_at FROM configs WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    async fn toggle_config(&self, name: &str) -> Result<Option<Configuration>, StoreError> {
        let updated = sqlx::query_as::<_, Configuration>(
            r#"
            UPDATE configs
            SET value = to_jsonb(NOT value::boolean),
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE name = $1 AND jsonb_typeof(value) = 'boolean'
            RETURNING id, name, value, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            return Ok(updated);
        }

        // Nothing flipped: either the document is missing or it is not a bool
        match self.find_config(name).await? {
            Some(existing) => Err(StoreError::NotBoolean {
                name: existing.name,
                kind: existing.value.kind(),
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};
    use chrono::Utc;

    // Run with `cargo test -- --ignored` against a scratch database.
    async fn connect() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        PgStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn double_toggle_restores_done_and_advances_updated_at() {
        let store = connect().await;
        let now = Utc::now();
        let created = store
            .insert_request(NewSongRequest::new(
                "Song".to_string(),
                "Bob".to_string(),
                now.date_naive(),
                now,
            ))
            .await
            .unwrap();

        let once = store.toggle_request(created.id).await.unwrap().unwrap();
        let twice = store.toggle_request(created.id).await.unwrap().unwrap();

        assert!(once.done);
        assert!(!twice.done);
        assert!(once.updated_at > created.updated_at);
        assert!(twice.updated_at > once.updated_at);
        assert_eq!(twice.created_at, created.created_at);

        assert!(store.delete_request(created.id).await.unwrap().is_some());
        assert!(store.toggle_request(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn config_toggle_flips_bools_and_rejects_other_values() {
        let store = connect().await;
        let flag = format!("flag-{}", Uuid::new_v4());
        let text = format!("text-{}", Uuid::new_v4());

        sqlx::query(
            r#"INSERT INTO configs (name, value) VALUES ($1, 'false'::jsonb), ($2, '"x"'::jsonb)"#,
        )
        .bind(&flag)
        .bind(&text)
        .execute(&store.pool)
        .await
        .unwrap();

        let flipped = store.toggle_config(&flag).await.unwrap().unwrap();
        assert_eq!(flipped.value.as_bool(), Some(true));
        let flipped_back = store.toggle_config(&flag).await.unwrap().unwrap();
        assert_eq!(flipped_back.value.as_bool(), Some(false));
        assert!(flipped_back.updated_at > flipped.updated_at);

        let err = store.toggle_config(&text).await.unwrap_err();
        assert!(matches!(err, StoreError::NotBoolean { ref name, .. } if *name == text));
        let unchanged = store.find_config(&text).await.unwrap().unwrap();
        assert_eq!(unchanged.value.as_bool(), None);

        let missing = format!("missing-{}", Uuid::new_v4());
        assert!(store.toggle_config(&missing).await.unwrap().is_none());

        sqlx::query("DELETE FROM configs WHERE name = $1 OR name = $2")
            .bind(&flag)
            .bind(&text)
            .execute(&store.pool)
            .await
            .unwrap();
    }
}
