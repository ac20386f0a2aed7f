//! Post service — task listings (CRUD).

use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("post not found: {0}")]
    NotFound(Uuid),
    #[error("title, description, budget and deadline are required")]
    InvalidFields,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A task listing, author enriched for display.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: i64,
    /// Milliseconds since Unix epoch.
    pub deadline: i64,
    pub skills: Vec<String>,
    pub status: String,
    pub category: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_profile_pic: String,
    /// Milliseconds since Unix epoch.
    pub created_at: i64,
}

const POST_COLUMNS: &str = r"p.id, p.title, p.description, p.budget,
    (EXTRACT(EPOCH FROM p.deadline) * 1000)::BIGINT AS deadline_ms,
    p.skills, p.status, p.category, p.author,
    u.full_name AS author_name, u.profile_pic AS author_profile_pic,
    (EXTRACT(EPOCH FROM p.created_at) * 1000)::BIGINT AS created_at_ms";

fn row_to_post(row: &sqlx::postgres::PgRow) -> PostRow {
    PostRow {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        budget: row.get("budget"),
        deadline: row.get("deadline_ms"),
        skills: row.get("skills"),
        status: row.get("status"),
        category: row.get("category"),
        author_id: row.get("author"),
        author_name: row.get("author_name"),
        author_profile_pic: row.get("author_profile_pic"),
        created_at: row.get("created_at_ms"),
    }
}

/// List all posts, newest first.
pub async fn list_posts(pool: &PgPool) -> Result<Vec<PostRow>, PostError> {
    let rows = sqlx::query(&format!(
        "SELECT {POST_COLUMNS} FROM posts p
         JOIN users u ON u.id = p.author
         ORDER BY p.created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(row_to_post).collect())
}

/// Create a post. `deadline_ms` is milliseconds since Unix epoch.
pub async fn create_post(
    pool: &PgPool,
    author: Uuid,
    title: &str,
    description: &str,
    budget: i64,
    deadline_ms: i64,
    skills: &[String],
    category: &str,
) -> Result<PostRow, PostError> {
    if title.trim().is_empty() || description.trim().is_empty() || budget <= 0 {
        return Err(PostError::InvalidFields);
    }

    let row = sqlx::query(
        "INSERT INTO posts (title, description, budget, deadline, skills, author, category)
         VALUES ($1, $2, $3, to_timestamp($4 / 1000.0), $5, $6, $7)
         RETURNING id",
    )
    .bind(title.trim())
    .bind(description.trim())
    .bind(budget)
    .bind(deadline_ms)
    .bind(skills)
    .bind(author)
    .bind(category)
    .fetch_one(pool)
    .await?;

    get_post(pool, row.get("id")).await
}

/// Fetch one post by ID.
pub async fn get_post(pool: &PgPool, post_id: Uuid) -> Result<PostRow, PostError> {
    let row = sqlx::query(&format!(
        "SELECT {POST_COLUMNS} FROM posts p
         JOIN users u ON u.id = p.author
         WHERE p.id = $1"
    ))
    .bind(post_id)
    .fetch_optional(pool)
    .await?
    .ok_or(PostError::NotFound(post_id))?;
    Ok(row_to_post(&row))
}
