/// Data models for blog-service
///
/// - `User`: account row (never serialized directly, see `Author`)
/// - `Author`: public view of a user
/// - `Group`: a named category posts may belong to
/// - `Post`: a post with author and group resolved by join
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", or `None` when neither part is set
    pub fn full_name(&self) -> Option<String> {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        (!full.is_empty()).then(|| full.to_string())
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    /// Publication time; set on insert and never changed by edits
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub group_id: Option<Uuid>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "leo".into(),
            email: None,
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_name_joins_present_parts() {
        assert_eq!(
            user(Some("Leo"), Some("Tolstoy")).full_name().as_deref(),
            Some("Leo Tolstoy")
        );
        assert_eq!(user(Some("Leo"), None).full_name().as_deref(), Some("Leo"));
        assert_eq!(user(None, Some("Tolstoy")).full_name().as_deref(), Some("Tolstoy"));
        assert_eq!(user(None, None).full_name(), None);
    }

    #[test]
    fn author_view_hides_credentials() {
        let json = serde_json::to_value(Author::from(&user(None, None))).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "leo");
    }
}
