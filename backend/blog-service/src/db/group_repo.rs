use crate::models::Group;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_group_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn find_group_by_id(pool: &PgPool, group_id: Uuid) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_groups(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups ORDER BY title, slug",
    )
    .fetch_all(pool)
    .await
}

/// Insert a group. Groups are curated by operators; this is used by
/// seeding and tests.
pub async fn create_group(
    pool: &PgPool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO post_groups (title, slug, description)
        VALUES ($1, $2, $3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await
}
