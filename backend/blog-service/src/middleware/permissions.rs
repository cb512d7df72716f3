/// Ownership rules for posts
use crate::middleware::AuthenticatedUser;
use crate::models::Post;

/// Only the author may edit a post
pub fn is_post_author(user: &AuthenticatedUser, post: &Post) -> bool {
    post.author_id == user.id
}
