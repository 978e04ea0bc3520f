use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::todos::repo::Todo;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Todo> for TodoItem {
    fn from(t: Todo) -> Self {
        Self {
            id: t.id,
            title: t.title,
            completed: t.completed,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Postgres rejects negative LIMIT/OFFSET outright, so client input is
    /// clamped here rather than surfacing as a store failure.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_negative_values() {
        let p = Pagination {
            limit: -1,
            offset: -10,
        };
        assert_eq!(p.clamped(), (1, 0));
    }

    #[test]
    fn pagination_caps_oversized_limit() {
        let p = Pagination {
            limit: 10_000,
            offset: 5,
        };
        assert_eq!(p.clamped(), (100, 5));
    }

    #[test]
    fn pagination_passes_sane_values_through() {
        let p = Pagination {
            limit: default_limit(),
            offset: 20,
        };
        assert_eq!(p.clamped(), (50, 20));
    }
}
