//! Records, request bodies and response DTOs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Kind of resource a content item points to.
///
/// Serialized lowercase. This is the single accepted enumeration; older clients
/// that sent other values get a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Article,
    Video,
    Audio,
    Tweet,
}

impl ContentType {
    pub const ALL: [ContentType; 5] =
        [ContentType::Image, ContentType::Article, ContentType::Video, ContentType::Audio, ContentType::Tweet];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Image => "image",
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
            ContentType::Tweet => "tweet",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown content type: {}", s))
    }
}

// ---------- stored rows ----------

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub title: String,
}

/// Content row joined with its owner's username.
#[derive(Debug, Clone, FromRow)]
pub struct ContentRow {
    pub id: String,
    pub link: String,
    pub kind: String,
    pub title: String,
    pub user_id: String,
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ContentTagRow {
    pub content_id: String,
    pub id: String,
    pub title: String,
}

// ---------- response DTOs ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub username: String,
}

/// A content item with owner and tags resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub title: String,
    pub tags: Vec<Tag>,
    #[serde(rename = "userid")]
    pub owner: Owner,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub username: String,
    pub email: String,
    /// Number of content items the user owns.
    pub links: i64,
    #[serde(rename = "isShared")]
    pub is_shared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

// ---------- request bodies ----------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 5, max = 12, message = "must be 5 to 12 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 20, message = "must be 8 to 20 characters"))]
    pub password: String,
}

/// Either `username` or `email` identifies the account; `username` wins if both are sent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContentRequest {
    #[validate(url(message = "must be a valid URL"))]
    pub link: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateContentRequest {
    #[validate(url(message = "must be a valid URL"))]
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ContentType>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdateContentRequest {
    pub fn is_empty(&self) -> bool {
        self.link.is_none() && self.kind.is_none() && self.title.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub old_pwd: String,
    #[validate(length(min = 8, max = 20, message = "must be 8 to 20 characters"))]
    pub new_pwd: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_round_trip_names() {
        for t in ContentType::ALL {
            assert_eq!(t.as_str().parse::<ContentType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), serde_json::json!(t.as_str()));
        }
        assert!("podcast".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_signup_validation() {
        let ok = SignupRequest {
            email: "alice@example.com".into(),
            username: "alice".into(),
            password: "password1".into(),
        };
        assert!(ok.validate().is_ok());

        let short_name = SignupRequest { username: "al".into(), ..ok.clone() };
        assert!(short_name.validate().is_err());

        let bad_email = SignupRequest { email: "not-an-email".into(), ..ok.clone() };
        assert!(bad_email.validate().is_err());

        let long_pwd = SignupRequest { password: "x".repeat(21), ..ok };
        assert!(long_pwd.validate().is_err());
    }

    #[test]
    fn test_create_content_validation() {
        let body: CreateContentRequest = serde_json::from_value(serde_json::json!({
            "link": "https://example.com/post",
            "type": "article",
            "title": "A post",
            "tags": ["rust"]
        }))
        .unwrap();
        assert!(body.validate().is_ok());
        assert_eq!(body.kind, ContentType::Article);

        let bad_link = CreateContentRequest { link: "not a url".into(), ..body.clone() };
        assert!(bad_link.validate().is_err());

        let long_title = CreateContentRequest { title: "t".repeat(21), ..body };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_unknown_content_type_rejected_by_serde() {
        let res: Result<CreateContentRequest, _> = serde_json::from_value(serde_json::json!({
            "link": "https://example.com",
            "type": "podcast",
            "title": "x",
            "tags": []
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_settings_serialization() {
        let s = SettingsResponse {
            username: "alice".into(),
            email: "alice@example.com".into(),
            links: 3,
            is_shared: false,
            hash: None,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["isShared"], false);
        assert!(v.get("hash").is_none());
    }
}
