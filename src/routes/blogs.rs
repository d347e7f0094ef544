//! Article (blog) catalog routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::routes::auth::{AdminUser, AuthUser};
use crate::services::catalog::{
    self, ArticleDraft, ArticlePatch, ArticleRow, CatalogError, CatalogStats, FolderFilter, SortOption,
};
use crate::state::AppState;

/// Listing entry: everything but the page bodies.
#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub author_name: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub ai_insights_enabled: bool,
    pub folder_id: Option<Uuid>,
    pub folder_name: Option<String>,
    pub page_count: usize,
    pub read_time: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn to_summary(row: ArticleRow) -> ArticleSummary {
    ArticleSummary {
        read_time: row.read_time(),
        page_count: row.pages.len(),
        id: row.id,
        title: row.title,
        summary: row.summary,
        author_name: row.author_name,
        tags: row.tags,
        featured: row.featured,
        ai_insights_enabled: row.ai_insights_enabled,
        folder_id: row.folder_id,
        folder_name: row.folder_name,
        created_at: row.created_at,
    }
}

/// Full article with pages.
#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: ArticleRow,
    pub read_time: u32,
}

fn to_detail(row: ArticleRow) -> ArticleDetail {
    ArticleDetail { read_time: row.read_time(), article: row }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub sort: String,
}

impl ListQuery {
    pub(crate) fn parse(&self) -> Result<(FolderFilter, SortOption), StatusCode> {
        let folder = FolderFilter::parse(self.folder.trim()).ok_or(StatusCode::BAD_REQUEST)?;
        let sort = SortOption::parse(self.sort.trim()).ok_or(StatusCode::BAD_REQUEST)?;
        Ok((folder, sort))
    }
}

/// `GET /api/blogs`: list summaries with search, folder filter and sort.
pub async fn list_blogs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ArticleSummary>>, StatusCode> {
    let (folder, sort) = query.parse()?;
    let rows = catalog::list_articles(&state.pool)
        .await
        .map_err(catalog_error_to_status)?;

    let rows = catalog::filter_and_sort(rows, &query.search, folder, sort);
    Ok(Json(rows.into_iter().map(to_summary).collect()))
}

/// `GET /api/blogs/stats`
pub async fn blog_stats(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<CatalogStats>, StatusCode> {
    let rows = catalog::list_articles(&state.pool)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(catalog::catalog_stats(&rows)))
}

/// `GET /api/blogs/:id`: one article with pages.
pub async fn get_blog(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleDetail>, StatusCode> {
    let row = catalog::get_article(&state.pool, article_id)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(to_detail(row)))
}

/// `POST /api/blogs`: create an article (admin).
pub async fn create_blog(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(draft): Json<ArticleDraft>,
) -> Result<(StatusCode, Json<ArticleDetail>), StatusCode> {
    let row = catalog::create_article(&state.pool, draft)
        .await
        .map_err(catalog_error_to_status)?;
    Ok((StatusCode::CREATED, Json(to_detail(row))))
}

/// `PATCH /api/blogs/:id`: partial update (admin).
pub async fn update_blog(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(article_id): Path<Uuid>,
    Json(patch): Json<ArticlePatch>,
) -> Result<Json<ArticleDetail>, StatusCode> {
    let row = catalog::update_article(&state.pool, article_id, patch)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(to_detail(row)))
}

/// `DELETE /api/blogs/:id` (admin).
pub async fn delete_blog(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(article_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    catalog::delete_article(&state.pool, article_id)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn catalog_error_to_status(err: CatalogError) -> StatusCode {
    match &err {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Invalid(_) => StatusCode::BAD_REQUEST,
        CatalogError::Database(_) => {
            warn!(code = err.error_code(), error = %err, "catalog: query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "blogs_test.rs"]
mod tests;
