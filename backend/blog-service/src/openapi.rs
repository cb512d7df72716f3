/// OpenAPI documentation for Yatube Blog Service
use crate::forms::{LoginForm, PostForm, SignupForm};
use crate::models::{Author, Group, Post};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Yatube Blog Service API",
        version = "1.0.0",
        description = "Blog backend for posts, groups and author profiles. Lists are paginated and newest first; creating and editing posts requires a bearer token, and only a post's author may edit it.",
        contact(
            name = "Yatube Team",
            email = "team@yatube.dev"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "posts", description = "Post listings, detail, creation and editing"),
        (name = "groups", description = "Topic groups posts can belong to"),
        (name = "profiles", description = "Author pages"),
        (name = "auth", description = "Signup and login"),
    ),
    components(schemas(Post, Group, Author, PostForm, SignupForm, LoginForm)),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/auth/login"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_carries_schemas_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.schemas.contains_key("Post"));
        assert!(components.schemas.contains_key("PostForm"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
