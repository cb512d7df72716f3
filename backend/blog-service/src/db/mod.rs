/// Database access layer
///
/// `BlogRepository` is the seam between services and storage.
/// `PgBlogRepository` implements it on PostgreSQL by delegating to the
/// per-entity query modules.
pub mod group_repo;
pub mod post_repo;
pub mod user_repo;

use crate::error::{AppError, Result};
use crate::forms::{FieldErrors, INVALID_CHOICE_MESSAGE};
use crate::models::{Group, NewUser, Post, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Which posts a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(Uuid),
    Author(Uuid),
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    // ---- posts ----

    async fn count_posts(&self, scope: PostScope) -> Result<i64>;

    /// Newest first
    async fn list_posts(&self, scope: PostScope, limit: i64, offset: i64) -> Result<Vec<Post>>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    async fn create_post(&self, author_id: Uuid, text: &str, group_id: Option<Uuid>)
        -> Result<Post>;

    /// Replace text and group; author and publication time are kept.
    /// `None` when the post does not exist.
    async fn update_post(
        &self,
        post_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
    ) -> Result<Option<Post>>;

    // ---- groups ----

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn find_group_by_id(&self, group_id: Uuid) -> Result<Option<Group>>;

    /// Ordered by title
    async fn list_groups(&self) -> Result<Vec<Group>>;

    // ---- users ----

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Fails with `AppError::Conflict` when the username is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;
}

/// FK name on `posts.group_id`, fixed in the schema migration
pub const POST_GROUP_FK: &str = "posts_group_id_fkey";

/// A group deleted between form validation and the write surfaces as a
/// field error on `group`, the same as choosing an unknown group.
fn group_choice_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation() && db.constraint() == Some(POST_GROUP_FK) =>
        {
            AppError::InvalidForm(FieldErrors::single("group", INVALID_CHOICE_MESSAGE))
        }
        _ => AppError::from(err),
    }
}

#[derive(Clone)]
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogRepository for PgBlogRepository {
    async fn count_posts(&self, scope: PostScope) -> Result<i64> {
        Ok(post_repo::count_posts(&self.pool, scope).await?)
    }

    async fn list_posts(&self, scope: PostScope, limit: i64, offset: i64) -> Result<Vec<Post>> {
        Ok(post_repo::list_posts(&self.pool, scope, limit, offset).await?)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(post_repo::find_post_by_id(&self.pool, post_id).await?)
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
    ) -> Result<Post> {
        post_repo::create_post(&self.pool, author_id, text, group_id)
            .await
            .map_err(group_choice_error)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
    ) -> Result<Option<Post>> {
        post_repo::update_post(&self.pool, post_id, text, group_id)
            .await
            .map_err(group_choice_error)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        Ok(group_repo::find_group_by_slug(&self.pool, slug).await?)
    }

    async fn find_group_by_id(&self, group_id: Uuid) -> Result<Option<Group>> {
        Ok(group_repo::find_group_by_id(&self.pool, group_id).await?)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(group_repo::list_groups(&self.pool).await?)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(user_repo::find_user_by_id(&self.pool, user_id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(user_repo::find_user_by_username(&self.pool, username).await?)
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        Ok(user_repo::create_user(&self.pool, &user).await?)
    }
}
