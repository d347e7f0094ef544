//! Folder routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::auth::{AdminUser, AuthUser};
use crate::routes::blogs::catalog_error_to_status;
use crate::services::catalog::{self, FolderDraft, FolderRow};
use crate::state::AppState;

/// `GET /api/folders`: folders by name with article counts.
pub async fn list_folders(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<Vec<FolderRow>>, StatusCode> {
    let rows = catalog::list_folders(&state.pool)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/folders` (admin).
pub async fn create_folder(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<FolderDraft>,
) -> Result<(StatusCode, Json<FolderRow>), StatusCode> {
    let row = catalog::create_folder(&state.pool, draft)
        .await
        .map_err(catalog_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/folders/:id`: rename or re-describe (admin).
pub async fn update_folder(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(folder_id): Path<Uuid>,
    Json(draft): Json<FolderDraft>,
) -> Result<Json<FolderRow>, StatusCode> {
    let row = catalog::update_folder(&state.pool, folder_id, draft)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/folders/:id`: its articles become uncategorized (admin).
pub async fn delete_folder(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(folder_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    catalog::delete_folder(&state.pool, folder_id)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "folders_test.rs"]
mod tests;
