use super::PostScope;
use crate::models::Post;
use sqlx::{PgPool, Row};
use uuid::Uuid;

impl PostScope {
    /// (group filter, author filter) for the `$n::uuid IS NULL OR ...` clauses
    fn filters(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            PostScope::All => (None, None),
            PostScope::Group(group_id) => (Some(group_id), None),
            PostScope::Author(author_id) => (None, Some(author_id)),
        }
    }
}

/// Count posts in a scope
pub async fn count_posts(pool: &PgPool, scope: PostScope) -> Result<i64, sqlx::Error> {
    let (group_id, author_id) = scope.filters();

    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM posts p
        WHERE ($1::uuid IS NULL OR p.group_id = $1)
          AND ($2::uuid IS NULL OR p.author_id = $2)
        "#,
    )
    .bind(group_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}

/// List posts in a scope, newest first, with author and group joined
pub async fn list_posts(
    pool: &PgPool,
    scope: PostScope,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    let (group_id, author_id) = scope.filters();

    sqlx::query_as::<_, Post>(
        r#"
        SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author_username,
               p.group_id, g.slug AS group_slug, g.title AS group_title
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_groups g ON g.id = p.group_id
        WHERE ($1::uuid IS NULL OR p.group_id = $1)
          AND ($2::uuid IS NULL OR p.author_id = $2)
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(group_id)
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author_username,
               p.group_id, g.slug AS group_slug, g.title AS group_title
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_groups g ON g.id = p.group_id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Insert a post and return it with author and group resolved
pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    text: &str,
    group_id: Option<Uuid>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        WITH inserted AS (
            INSERT INTO posts (author_id, text, group_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, created_at, author_id, group_id
        )
        SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author_username,
               p.group_id, g.slug AS group_slug, g.title AS group_title
        FROM inserted p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_groups g ON g.id = p.group_id
        "#,
    )
    .bind(author_id)
    .bind(text)
    .bind(group_id)
    .fetch_one(pool)
    .await
}

/// Replace a post's text and group. Returns `None` if the post is gone.
pub async fn update_post(
    pool: &PgPool,
    post_id: Uuid,
    text: &str,
    group_id: Option<Uuid>,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        WITH updated AS (
            UPDATE posts
            SET text = $2, group_id = $3
            WHERE id = $1
            RETURNING id, text, created_at, author_id, group_id
        )
        SELECT p.id, p.text, p.created_at, p.author_id, u.username AS author_username,
               p.group_id, g.slug AS group_slug, g.title AS group_title
        FROM updated p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_groups g ON g.id = p.group_id
        "#,
    )
    .bind(post_id)
    .bind(text)
    .bind(group_id)
    .fetch_optional(pool)
    .await
}
