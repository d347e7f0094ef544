//! Catalog service: articles (blogs) and folders.
//!
//! DESIGN
//! ======
//! Articles own an ordered list of pages stored as JSONB. Rows written before
//! pages existed only carry a single `content` body, so every read goes
//! through [`normalize_pages`], which presents such rows as one page.
//! `content` is kept equal to the first page's body on every write.
//!
//! Listing fetches all summaries and applies search, folder filter and sort
//! in memory. The catalog is editorially curated and small, and sorting by
//! read time needs the derived estimate anyway.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use super::reading_time;

const DEFAULT_PAGE_TITLE: &str = "Page 1";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// One page of an article: a sub-title and a markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub blog_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub author_name: String,
    pub pages: Vec<Page>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub ai_insights_enabled: bool,
    pub folder_id: Option<Uuid>,
    pub folder_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ArticleRow {
    /// Estimated minutes to read every page.
    #[must_use]
    pub fn read_time(&self) -> u32 {
        reading_time::total_reading_time(&self.pages)
    }

    /// Article text handed to the insight assistant: page bodies separated by
    /// blank lines.
    #[must_use]
    pub fn insight_content(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
            || self.summary.to_lowercase().contains(needle)
    }
}

/// Fields for a new article.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub ai_insights_enabled: bool,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// Partial article update. `folder_id: null` moves the article to
/// "Uncategorized"; an absent `folder_id` leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub author_name: Option<String>,
    pub pages: Option<Vec<Page>>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub ai_insights_enabled: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Stored pages, or the legacy body presented as a single page.
#[must_use]
pub fn normalize_pages(pages: Option<Vec<Page>>, legacy_content: &str) -> Vec<Page> {
    match pages {
        Some(pages) if !pages.is_empty() => pages,
        _ => vec![Page { title: DEFAULT_PAGE_TITLE.into(), content: legacy_content.to_owned() }],
    }
}

/// Trim tags and drop empty ones, keeping order.
#[must_use]
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

fn require_title(title: &str) -> Result<String, CatalogError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CatalogError::Invalid("title must not be blank".into()));
    }
    Ok(title.to_owned())
}

fn require_folder_name(name: &str) -> Result<String, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Invalid("folder name must not be blank".into()));
    }
    Ok(name.to_owned())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_owned())
    })
}

// =============================================================================
// LISTING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderFilter {
    All,
    Uncategorized,
    Folder(Uuid),
}

impl FolderFilter {
    /// Parse `all`, `uncategorized`, or a folder id. Unknown values are `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" | "all" => Some(Self::All),
            "uncategorized" => Some(Self::Uncategorized),
            other => Uuid::parse_str(other).ok().map(Self::Folder),
        }
    }

    fn matches(self, article: &ArticleRow) -> bool {
        match self {
            Self::All => true,
            Self::Uncategorized => article.folder_id.is_none(),
            Self::Folder(id) => article.folder_id == Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
    ReadTimeAsc,
    ReadTimeDesc,
    FeaturedFirst,
    TagsCount,
}

impl SortOption {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" | "date-desc" => Some(Self::DateDesc),
            "date-asc" => Some(Self::DateAsc),
            "name-asc" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            "readtime-asc" => Some(Self::ReadTimeAsc),
            "readtime-desc" => Some(Self::ReadTimeDesc),
            "featured-first" => Some(Self::FeaturedFirst),
            "tags-count" => Some(Self::TagsCount),
            _ => None,
        }
    }
}

/// Apply search and folder filter, then sort. Sorting is stable.
#[must_use]
pub fn filter_and_sort(
    articles: Vec<ArticleRow>,
    search: &str,
    folder: FolderFilter,
    sort: SortOption,
) -> Vec<ArticleRow> {
    let needle = search.trim().to_lowercase();
    let mut out: Vec<ArticleRow> = articles
        .into_iter()
        .filter(|a| folder.matches(a) && (needle.is_empty() || a.matches_search(&needle)))
        .collect();

    match sort {
        SortOption::DateDesc => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::DateAsc => out.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOption::NameAsc => out.sort_by_cached_key(|a| a.title.to_lowercase()),
        SortOption::NameDesc => {
            out.sort_by_cached_key(|a| std::cmp::Reverse(a.title.to_lowercase()));
        }
        SortOption::ReadTimeAsc => out.sort_by_cached_key(ArticleRow::read_time),
        SortOption::ReadTimeDesc => out.sort_by_cached_key(|a| std::cmp::Reverse(a.read_time())),
        SortOption::FeaturedFirst => {
            out.sort_by(|a, b| b.featured.cmp(&a.featured).then(b.created_at.cmp(&a.created_at)));
        }
        SortOption::TagsCount => out.sort_by(|a, b| b.tags.len().cmp(&a.tags.len())),
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_blogs: usize,
    pub unique_topics: usize,
    pub avg_read_time: u32,
    pub uncategorized_count: usize,
}

#[must_use]
pub fn catalog_stats(articles: &[ArticleRow]) -> CatalogStats {
    let unique_topics = articles
        .iter()
        .flat_map(|a| a.tags.iter().map(String::as_str))
        .collect::<HashSet<_>>()
        .len();
    let read_times: Vec<u32> = articles.iter().map(ArticleRow::read_time).collect();
    CatalogStats {
        total_blogs: articles.len(),
        unique_topics,
        avg_read_time: reading_time::average_reading_time(&read_times),
        uncategorized_count: articles.iter().filter(|a| a.folder_id.is_none()).count(),
    }
}

// =============================================================================
// ARTICLE QUERIES
// =============================================================================

const ARTICLE_COLUMNS: &str = r"b.id, b.title, b.summary, b.author_name, b.content, b.pages, b.tags,
    b.featured, b.ai_insights_enabled, b.folder_id, f.name AS folder_name, b.created_at, b.updated_at";

fn article_from_row(row: &PgRow) -> ArticleRow {
    let content: String = row.get("content");
    // Anything other than an array of pages reads as the legacy single body.
    let pages: Option<Json<Vec<Page>>> = row.try_get("pages").ok().flatten();
    ArticleRow {
        id: row.get("id"),
        title: row.get("title"),
        summary: row.get("summary"),
        author_name: row.get("author_name"),
        pages: normalize_pages(pages.map(|Json(p)| p), &content),
        tags: row.get("tags"),
        featured: row.get("featured"),
        ai_insights_enabled: row.get("ai_insights_enabled"),
        folder_id: row.get("folder_id"),
        folder_name: row.get("folder_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// All articles, newest first.
pub async fn list_articles(pool: &PgPool) -> Result<Vec<ArticleRow>, CatalogError> {
    let rows = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM blogs b LEFT JOIN blog_folders f ON f.id = b.folder_id
         ORDER BY b.created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(article_from_row).collect())
}

pub async fn get_article(pool: &PgPool, article_id: Uuid) -> Result<ArticleRow, CatalogError> {
    let row = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM blogs b LEFT JOIN blog_folders f ON f.id = b.folder_id WHERE b.id = $1"
    ))
    .bind(article_id)
    .fetch_optional(pool)
    .await?
    .ok_or(CatalogError::NotFound(article_id))?;
    Ok(article_from_row(&row))
}

pub async fn create_article(pool: &PgPool, draft: ArticleDraft) -> Result<ArticleRow, CatalogError> {
    let title = require_title(&draft.title)?;
    let pages = normalize_pages(Some(draft.pages), "");
    let tags = normalize_tags(draft.tags);
    let legacy_content = pages[0].content.clone();

    let id: Uuid = sqlx::query_scalar(
        r"INSERT INTO blogs (title, summary, author_name, content, pages, tags, featured, ai_insights_enabled, folder_id)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
          RETURNING id",
    )
    .bind(&title)
    .bind(draft.summary.trim())
    .bind(draft.author_name.trim())
    .bind(&legacy_content)
    .bind(Json(&pages))
    .bind(&tags)
    .bind(draft.featured)
    .bind(draft.ai_insights_enabled)
    .bind(draft.folder_id)
    .fetch_one(pool)
    .await
    .map_err(|e| folder_reference_error(e, draft.folder_id))?;

    tracing::info!(article_id = %id, %title, pages = pages.len(), "catalog: article created");
    get_article(pool, id).await
}

pub async fn update_article(pool: &PgPool, article_id: Uuid, patch: ArticlePatch) -> Result<ArticleRow, CatalogError> {
    let current = get_article(pool, article_id).await?;

    let title = match patch.title.as_deref() {
        Some(t) => require_title(t)?,
        None => current.title,
    };
    let pages = match patch.pages {
        Some(pages) => normalize_pages(Some(pages), ""),
        None => current.pages,
    };
    let tags = patch.tags.map_or(current.tags, normalize_tags);
    let folder_id = patch.folder_id.unwrap_or(current.folder_id);
    let legacy_content = pages[0].content.clone();

    sqlx::query(
        r"UPDATE blogs SET
              title = $2, summary = $3, author_name = $4, content = $5, pages = $6, tags = $7,
              featured = $8, ai_insights_enabled = $9, folder_id = $10, updated_at = now()
          WHERE id = $1",
    )
    .bind(article_id)
    .bind(&title)
    .bind(patch.summary.unwrap_or(current.summary).trim())
    .bind(patch.author_name.unwrap_or(current.author_name).trim())
    .bind(&legacy_content)
    .bind(Json(&pages))
    .bind(&tags)
    .bind(patch.featured.unwrap_or(current.featured))
    .bind(patch.ai_insights_enabled.unwrap_or(current.ai_insights_enabled))
    .bind(folder_id)
    .execute(pool)
    .await
    .map_err(|e| folder_reference_error(e, folder_id))?;

    tracing::info!(%article_id, "catalog: article updated");
    get_article(pool, article_id).await
}

pub async fn delete_article(pool: &PgPool, article_id: Uuid) -> Result<(), CatalogError> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(article_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CatalogError::NotFound(article_id));
    }
    tracing::info!(%article_id, "catalog: article deleted");
    Ok(())
}

/// Map a foreign-key violation on `folder_id` to `NotFound(folder)`.
fn folder_reference_error(err: sqlx::Error, folder_id: Option<Uuid>) -> CatalogError {
    let is_fk_violation = err
        .as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation());
    match (is_fk_violation, folder_id) {
        (true, Some(id)) => CatalogError::NotFound(id),
        _ => CatalogError::Database(err),
    }
}

// =============================================================================
// FOLDER QUERIES
// =============================================================================

fn folder_from_row(row: &PgRow) -> FolderRow {
    FolderRow {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        blog_count: row.get("blog_count"),
        created_at: row.get("created_at"),
    }
}

/// All folders by name, each with the number of articles it holds.
pub async fn list_folders(pool: &PgPool) -> Result<Vec<FolderRow>, CatalogError> {
    let rows = sqlx::query(
        r"SELECT f.id, f.name, f.description, f.created_at, COUNT(b.id) AS blog_count
          FROM blog_folders f
          LEFT JOIN blogs b ON b.folder_id = f.id
          GROUP BY f.id
          ORDER BY f.name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(folder_from_row).collect())
}

pub async fn create_folder(pool: &PgPool, draft: FolderDraft) -> Result<FolderRow, CatalogError> {
    let name = require_folder_name(&draft.name)?;
    let row = sqlx::query(
        r"INSERT INTO blog_folders (name, description) VALUES ($1, $2)
          RETURNING id, name, description, created_at, 0::BIGINT AS blog_count",
    )
    .bind(&name)
    .bind(blank_to_none(draft.description))
    .fetch_one(pool)
    .await?;
    tracing::info!(%name, "catalog: folder created");
    Ok(folder_from_row(&row))
}

pub async fn update_folder(pool: &PgPool, folder_id: Uuid, draft: FolderDraft) -> Result<FolderRow, CatalogError> {
    let name = require_folder_name(&draft.name)?;
    let row = sqlx::query(
        r"UPDATE blog_folders SET name = $2, description = $3 WHERE id = $1
          RETURNING id, name, description, created_at,
                    (SELECT COUNT(*) FROM blogs WHERE folder_id = $1) AS blog_count",
    )
    .bind(folder_id)
    .bind(&name)
    .bind(blank_to_none(draft.description))
    .fetch_optional(pool)
    .await?
    .ok_or(CatalogError::NotFound(folder_id))?;
    Ok(folder_from_row(&row))
}

/// Delete a folder. Its articles become uncategorized (`ON DELETE SET NULL`).
pub async fn delete_folder(pool: &PgPool, folder_id: Uuid) -> Result<(), CatalogError> {
    let result = sqlx::query("DELETE FROM blog_folders WHERE id = $1")
        .bind(folder_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CatalogError::NotFound(folder_id));
    }
    tracing::info!(%folder_id, "catalog: folder deleted");
    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
