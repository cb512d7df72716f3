/// Post handlers - HTTP endpoints for post listings and authoring
use super::{post_detail_url, profile_url};
use crate::error::{AppError, Result};
use crate::forms::PostForm;
use crate::middleware::AuthenticatedUser;
use crate::pagination::PageQuery;
use crate::services::{AuthorOnly, PostService};
use actix_web::{http::header, web, HttpResponse};
use uuid::Uuid;

fn redirect_to(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// All posts, newest first
/// GET /api/v1/posts?page=N
pub async fn posts_index(
    service: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let view = service.index(query.as_deref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Posts of one group
/// GET /api/v1/group/{slug}?page=N
pub async fn group_posts(
    service: web::Data<PostService>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let view = service.group_posts(&slug, query.as_deref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// An author's profile with their posts
/// GET /api/v1/profile/{username}?page=N
pub async fn profile(
    service: web::Data<PostService>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let view = service.profile(&username, query.as_deref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// GET /api/v1/posts/{post_id}
pub async fn post_detail(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let view = service.post_detail(*post_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// GET /api/v1/groups
pub async fn list_groups(service: web::Data<PostService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.groups().await?))
}

/// Empty form for a new post
/// GET /api/v1/create
pub async fn create_form(
    service: web::Data<PostService>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.create_form().await?))
}

/// Publish a post as the current user; points at the author's profile
/// POST /api/v1/create
pub async fn create_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    form: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let post = service.create_post(&user, form.into_inner()).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, profile_url(&user.username)))
        .json(post))
}

/// Prefilled form; non-authors are sent to the post page
/// GET /api/v1/posts/{post_id}/edit
pub async fn edit_form(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match service.edit_form(&user, *post_id).await? {
        AuthorOnly::Allowed(view) => Ok(HttpResponse::Ok().json(view)),
        AuthorOnly::NotAuthor { post_id } => Ok(redirect_to(post_detail_url(post_id))),
    }
}

/// Save an edit; non-authors are sent to the post page untouched
/// POST /api/v1/posts/{post_id}/edit
///
/// The body is extracted as a `Result` so that a malformed payload cannot
/// pre-empt the 404 and ownership checks.
pub async fn edit_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    form: std::result::Result<web::Json<PostForm>, actix_web::Error>,
) -> Result<HttpResponse> {
    let form = form.map(web::Json::into_inner).map_err(body_error);

    match service.edit_post(&user, *post_id, form).await? {
        AuthorOnly::Allowed(post) => Ok(HttpResponse::Ok()
            .insert_header((header::LOCATION, post_detail_url(post.id)))
            .json(post)),
        AuthorOnly::NotAuthor { post_id } => Ok(redirect_to(post_detail_url(post_id))),
    }
}

/// Recover the `AppError` built by the `JsonConfig` error handler
fn body_error(err: actix_web::Error) -> AppError {
    match err.as_error::<AppError>() {
        Some(AppError::BadRequest(message)) => AppError::BadRequest(message.clone()),
        _ => AppError::BadRequest(err.to_string()),
    }
}
