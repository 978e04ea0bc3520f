use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::MessageResponse, extractors::AuthUser},
    error::{ApiError, FieldError},
    state::AppState,
    todos::dto::{CreateTodoRequest, Pagination, TodoItem, UpdateTodoRequest},
    todos::repo::Todo,
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos", post(create_todo))
        .route("/todos/:id", put(update_todo))
        .route("/todos/:id", delete(delete_todo))
}

fn validate_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(ApiError::Validation(vec![FieldError {
            field: "title",
            message: "Title must be between 1 and 255 characters",
        }]));
    }
    Ok(title)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_todos(
    State(state): State<AppState>,
    user: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let (limit, offset) = p.clamped();
    let todos = Todo::list_by_user(&state.db, user.id, limit, offset).await?;
    Ok(Json(todos.into_iter().map(TodoItem::from).collect()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    let title = validate_title(&payload.title)?;
    let todo = Todo::create(&state.db, user.id, title).await?;
    info!(todo_id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo.into())))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<TodoItem>, ApiError> {
    let title = payload.title.as_deref().map(validate_title).transpose()?;

    // Not-owned and not-existing are the same 404; ownership must not leak.
    let todo = Todo::update(&state.db, user.id, id, title, payload.completed)
        .await?
        .ok_or_else(|| {
            warn!(todo_id = %id, "update on missing or foreign todo");
            ApiError::NotFound("Todo")
        })?;
    Ok(Json(todo.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !Todo::delete(&state.db, user.id, id).await? {
        warn!(todo_id = %id, "delete on missing or foreign todo");
        return Err(ApiError::NotFound("Todo"));
    }
    info!(todo_id = %id, "todo deleted");
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  buy milk  ").unwrap(), "buy milk");
    }

    #[test]
    fn empty_title_rejected() {
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn oversized_title_rejected() {
        let long = "x".repeat(256);
        assert!(validate_title(&long).is_err());
        let max = "x".repeat(255);
        assert!(validate_title(&max).is_ok());
    }
}
