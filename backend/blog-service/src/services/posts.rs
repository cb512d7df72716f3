/// Post service - listings, detail, creation and editing of posts
use crate::db::{BlogRepository, PostScope};
use crate::error::{AppError, Result};
use crate::forms::{FieldErrors, PostForm, INVALID_CHOICE_MESSAGE};
use crate::metrics::posts::record_post_write;
use crate::middleware::{is_post_author, AuthenticatedUser};
use crate::models::{Author, Group, Post};
use crate::pagination::{Page, Paginator};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_POSTS_PER_PAGE: i64 = 10;

#[derive(Debug, Serialize)]
pub struct IndexView {
    pub page: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct GroupPostsView {
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub author: Author,
    pub page: Page<Post>,
    pub posts_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PostDetailView {
    pub post: Post,
    pub author: Author,
    /// Total posts by the same author
    pub posts_count: i64,
}

/// Everything a client needs to render the create/edit form
#[derive(Debug, Serialize)]
pub struct PostFormView {
    pub form: PostForm,
    pub groups: Vec<Group>,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

/// Result of an operation restricted to the post's author
#[derive(Debug)]
pub enum AuthorOnly<T> {
    Allowed(T),
    /// The caller is not the author; nothing was changed
    NotAuthor { post_id: Uuid },
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn BlogRepository>,
    per_page: i64,
}

impl PostService {
    pub fn new(repo: Arc<dyn BlogRepository>, per_page: i64) -> Self {
        Self {
            repo,
            per_page: per_page.max(1),
        }
    }

    async fn page(&self, scope: PostScope, raw_page: Option<&str>) -> Result<Page<Post>> {
        let count = self.repo.count_posts(scope).await?;
        let paginator = Paginator::new(count, self.per_page);
        let window = paginator.get_page(raw_page);
        let posts = self
            .repo
            .list_posts(scope, window.limit, window.offset)
            .await?;

        Ok(Page::new(posts, window, &paginator))
    }

    /// All posts, newest first
    pub async fn index(&self, raw_page: Option<&str>) -> Result<IndexView> {
        Ok(IndexView {
            page: self.page(PostScope::All, raw_page).await?,
        })
    }

    pub async fn group_posts(&self, slug: &str, raw_page: Option<&str>) -> Result<GroupPostsView> {
        let group = self
            .repo
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let page = self.page(PostScope::Group(group.id), raw_page).await?;
        Ok(GroupPostsView { group, page })
    }

    pub async fn profile(&self, username: &str, raw_page: Option<&str>) -> Result<ProfileView> {
        let user = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        let page = self.page(PostScope::Author(user.id), raw_page).await?;
        Ok(ProfileView {
            author: Author::from(&user),
            posts_count: page.count,
            page,
        })
    }

    pub async fn post_detail(&self, post_id: Uuid) -> Result<PostDetailView> {
        let post = self.find_post(post_id).await?;
        let author = self
            .repo
            .find_user_by_id(post.author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("author of post {}", post_id)))?;
        let posts_count = self.repo.count_posts(PostScope::Author(author.id)).await?;

        Ok(PostDetailView {
            post,
            author: Author::from(&author),
            posts_count,
        })
    }

    pub async fn groups(&self) -> Result<Vec<Group>> {
        self.repo.list_groups().await
    }

    /// Blank create form
    pub async fn create_form(&self) -> Result<PostFormView> {
        Ok(PostFormView {
            form: PostForm::default(),
            groups: self.repo.list_groups().await?,
            is_edit: false,
            post: None,
        })
    }

    /// Publish a post as `user`
    pub async fn create_post(&self, user: &AuthenticatedUser, form: PostForm) -> Result<Post> {
        // Tokens outlive accounts; the author row must still exist
        if self.repo.find_user_by_id(user.id).await?.is_none() {
            return Err(AppError::Unauthorized("User account no longer exists".to_string()));
        }

        let form = match self.clean_post_form(form).await {
            Ok(form) => form,
            Err(err) => {
                record_post_write("create", "invalid");
                return Err(err);
            }
        };

        let post = self
            .repo
            .create_post(user.id, &form.text, form.group)
            .await?;

        record_post_write("create", "ok");
        tracing::info!(
            post_id = %post.id,
            author = %user.username,
            group_id = ?post.group_id,
            "post created"
        );

        Ok(post)
    }

    /// Prefilled edit form, for the author only
    pub async fn edit_form(
        &self,
        user: &AuthenticatedUser,
        post_id: Uuid,
    ) -> Result<AuthorOnly<PostFormView>> {
        let post = self.find_post(post_id).await?;
        if !is_post_author(user, &post) {
            return Ok(AuthorOnly::NotAuthor { post_id });
        }

        Ok(AuthorOnly::Allowed(PostFormView {
            form: PostForm {
                text: post.text.clone(),
                group: post.group_id,
            },
            groups: self.repo.list_groups().await?,
            is_edit: true,
            post: Some(post),
        }))
    }

    /// Replace text and group of a post.
    ///
    /// `form` is the body as it was decoded, failure included. The post and
    /// its ownership are resolved first, so a non-author is redirected
    /// whatever they sent and a body error only reaches the author.
    pub async fn edit_post(
        &self,
        user: &AuthenticatedUser,
        post_id: Uuid,
        form: Result<PostForm>,
    ) -> Result<AuthorOnly<Post>> {
        let post = self.find_post(post_id).await?;
        if !is_post_author(user, &post) {
            record_post_write("edit", "not_author");
            tracing::warn!(
                %post_id,
                user = %user.username,
                author = %post.author_username,
                "edit attempt by non-author"
            );
            return Ok(AuthorOnly::NotAuthor { post_id });
        }

        let cleaned = match form {
            Ok(form) => self.clean_post_form(form).await,
            Err(err) => Err(err),
        };
        let form = match cleaned {
            Ok(form) => form,
            Err(err) => {
                record_post_write("edit", "invalid");
                return Err(err);
            }
        };

        let updated = self
            .repo
            .update_post(post_id, &form.text, form.group)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        record_post_write("edit", "ok");
        tracing::info!(%post_id, author = %user.username, "post edited");

        Ok(AuthorOnly::Allowed(updated))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Field validation plus the group lookup; all errors are reported together
    async fn clean_post_form(&self, form: PostForm) -> Result<PostForm> {
        let group = form.group;
        let (cleaned, mut errors) = match form.clean() {
            Ok(cleaned) => (Some(cleaned), FieldErrors::default()),
            Err(AppError::InvalidForm(fields)) => (None, fields),
            Err(other) => return Err(other),
        };

        if let Some(group_id) = group {
            if self.repo.find_group_by_id(group_id).await?.is_none() {
                errors.add("group", INVALID_CHOICE_MESSAGE);
            }
        }

        match cleaned {
            Some(form) if errors.is_empty() => Ok(form),
            _ => Err(AppError::InvalidForm(errors)),
        }
    }
}
