/// HTTP handlers for blog endpoints
///
/// - Posts: index, group and profile listings, detail, create and edit
/// - Auth: signup and login
pub mod auth;
pub mod posts;

pub use auth::{login, signup};
pub use posts::{
    create_form, create_post, edit_form, edit_post, group_posts, list_groups, post_detail,
    posts_index, profile,
};

use crate::error::AppError;
use actix_web::web;

/// Mount prefix for every route below; used to build `Location` headers
pub const API_PREFIX: &str = "/api/v1";

/// Register blog routes; the caller mounts them under [`API_PREFIX`]
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Malformed bodies get the same JSON error shape as everything else
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.route("/posts", web::get().to(posts_index))
        .service(
            web::resource("/posts/{post_id}/edit")
                .route(web::get().to(edit_form))
                .route(web::post().to(edit_post)),
        )
        .route("/posts/{post_id}", web::get().to(post_detail))
        .route("/group/{slug}", web::get().to(group_posts))
        .route("/profile/{username}", web::get().to(profile))
        .route("/groups", web::get().to(list_groups))
        .service(
            web::resource("/create")
                .route(web::get().to(create_form))
                .route(web::post().to(create_post)),
        )
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(signup))
                .route("/login", web::post().to(login)),
        );
}

pub fn post_detail_url(post_id: uuid::Uuid) -> String {
    format!("{}/posts/{}", API_PREFIX, post_id)
}

/// Usernames may hold non-ASCII letters and `@`/`+`; the segment is percent-encoded
pub fn profile_url(username: &str) -> String {
    format!("{}/profile/{}", API_PREFIX, urlencoding::encode(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_url_encodes_the_username() {
        assert_eq!(profile_url("leo"), "/api/v1/profile/leo");
        assert_eq!(profile_url("anna+k@mail"), "/api/v1/profile/anna%2Bk%40mail");
        assert_eq!(profile_url("Лев"), "/api/v1/profile/%D0%9B%D0%B5%D0%B2");
    }
}
