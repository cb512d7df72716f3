/// Business logic layer for blog-service
///
/// - Post service: listings, detail, create and edit with ownership checks
/// - Auth service: signup and login
pub mod auth;
pub mod posts;

pub use auth::{AuthResponse, AuthService};
pub use posts::{AuthorOnly, PostService, DEFAULT_POSTS_PER_PAGE};
