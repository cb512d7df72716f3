#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use blog_service::db::{BlogRepository, PostScope};
use blog_service::handlers::{self, API_PREFIX};
use blog_service::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use blog_service::models::{Group, NewUser, Post, User};
use blog_service::services::{AuthService, PostService, DEFAULT_POSTS_PER_PAGE};
use blog_service::{AppError, Result};
use chrono::{DateTime, TimeZone, Utc};
use crypto_core::jwt;
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

static JWT_INIT: Once = Once::new();

pub fn init_jwt() {
    JWT_INIT.call_once(|| {
        jwt::initialize_jwt_keys(
            include_str!("../fixtures/jwt_private.pem"),
            include_str!("../fixtures/jwt_public.pem"),
        )
        .expect("test keys should load");
    });
}

pub fn bearer(user: &User) -> (&'static str, String) {
    init_jwt();
    let token = jwt::generate_access_token(user.id, &user.username).expect("sign token");
    ("Authorization", format!("Bearer {}", token))
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    group_id: Option<Uuid>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<StoredPost>,
    /// Seconds added to the base time; keeps publication order deterministic
    clock: i64,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_opt(1_704_067_200 + self.clock, 0).unwrap()
    }

    fn resolve(&self, stored: &StoredPost) -> Post {
        let author = self.users.iter().find(|u| u.id == stored.author_id);
        let group = stored
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id));

        Post {
            id: stored.id,
            text: stored.text.clone(),
            created_at: stored.created_at,
            author_id: stored.author_id,
            author_username: author.map(|u| u.username.clone()).unwrap_or_default(),
            group_id: stored.group_id,
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
        }
    }

    fn in_scope(&self, scope: PostScope) -> Vec<&StoredPost> {
        let mut posts: Vec<&StoredPost> = self
            .posts
            .iter()
            .filter(|p| match scope {
                PostScope::All => true,
                PostScope::Group(id) => p.group_id == Some(id),
                PostScope::Author(id) => p.author_id == id,
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

/// `BlogRepository` backed by vectors, for HTTP tests without PostgreSQL
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, username: &str) -> User {
        let mut state = self.state.lock().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: None,
            first_name: None,
            last_name: None,
            password_hash: "!".to_string(),
            created_at: state.tick(),
        };
        state.users.push(user.clone());
        user
    }

    pub fn add_group(&self, title: &str, slug: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("All about {}", title),
        };
        self.state.lock().unwrap().groups.push(group.clone());
        group
    }

    pub fn add_post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let mut state = self.state.lock().unwrap();
        let stored = StoredPost {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: state.tick(),
            author_id: author.id,
            group_id: group.map(|g| g.id),
        };
        state.posts.push(stored.clone());
        state.resolve(&stored)
    }

    pub fn post(&self, post_id: Uuid) -> Option<Post> {
        let state = self.state.lock().unwrap();
        state
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| state.resolve(p))
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }
}

#[async_trait]
impl BlogRepository for InMemoryRepository {
    async fn count_posts(&self, scope: PostScope) -> Result<i64> {
        Ok(self.state.lock().unwrap().in_scope(scope).len() as i64)
    }

    async fn list_posts(&self, scope: PostScope, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .in_scope(scope)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| state.resolve(p))
            .collect())
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.post(post_id))
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
    ) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let stored = StoredPost {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: state.tick(),
            author_id,
            group_id,
        };
        state.posts.push(stored.clone());
        Ok(state.resolve(&stored))
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
    ) -> Result<Option<Post>> {
        let mut state = self.state.lock().unwrap();
        let updated = state.posts.iter_mut().find(|p| p.id == post_id).map(|p| {
            p.text = text.to_string();
            p.group_id = group_id;
            p.clone()
        });
        Ok(updated.map(|p| state.resolve(&p)))
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let state = self.state.lock().unwrap();
        Ok(state.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_group_by_id(&self, group_id: Uuid) -> Result<Option<Group>> {
        let state = self.state.lock().unwrap();
        Ok(state.groups.iter().find(|g| g.id == group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups = self.state.lock().unwrap().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.slug.cmp(&b.slug)));
        Ok(groups)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("duplicate username".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            created_at: state.tick(),
        };
        state.users.push(created.clone());
        Ok(created)
    }
}

/// The blog routes wired the way `main` wires them, minus PostgreSQL
pub async fn init_app(
    repo: Arc<InMemoryRepository>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    init_jwt();

    let repo: Arc<dyn BlogRepository> = repo;
    test::init_service(
        App::new()
            .app_data(web::Data::new(PostService::new(
                repo.clone(),
                DEFAULT_POSTS_PER_PAGE,
            )))
            .app_data(web::Data::new(AuthService::new(repo)))
            .service(
                web::scope(API_PREFIX)
                    .wrap(JwtAuthMiddleware)
                    .wrap(MetricsMiddleware)
                    .configure(handlers::configure),
            ),
    )
    .await
}
