use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// To-do row. Every query below filters by `user_id`; rows belonging to
/// other users are indistinguishable from rows that do not exist.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Todo {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, completed, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &PgPool, user_id: Uuid, title: &str) -> sqlx::Result<Todo> {
        sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (user_id, title)
            VALUES ($1, $2)
            RETURNING id, user_id, title, completed, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(db)
        .await
    }

    /// Partial update; absent fields keep their current value. Returns None
    /// when the row does not exist or is owned by someone else.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> sqlx::Result<Option<Todo>> {
        sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = COALESCE($1, title),
                completed = COALESCE($2, completed),
                updated_at = now()
            WHERE id = $3 AND user_id = $4
            RETURNING id, user_id, title, completed, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(completed)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Returns whether a row was deleted.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
