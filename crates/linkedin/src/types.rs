use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MAX_COMMENTARY_CHARS: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
    LoggedIn,
}

impl Visibility {
    pub const ALL: &'static [&'static str] = &["PUBLIC", "CONNECTIONS", "LOGGED_IN"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Connections => "CONNECTIONS",
            Self::LoggedIn => "LOGGED_IN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub commentary: String,
    pub visibility: Visibility,
}

impl NewPost {
    pub fn new(commentary: impl Into<String>) -> Self {
        Self {
            commentary: commentary.into(),
            visibility: Visibility::default(),
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn char_count(&self) -> usize {
        self.commentary.chars().count()
    }
}

/// Request body for `POST /rest/posts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostPayload<'a> {
    pub author: &'a str,
    pub commentary: &'a str,
    pub visibility: Visibility,
    pub distribution: Distribution,
    pub lifecycle_state: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Distribution {
    pub feed_distribution: &'static str,
}

impl<'a> PostPayload<'a> {
    pub fn new(author: &'a str, post: &'a NewPost) -> Self {
        Self {
            author,
            commentary: &post.commentary,
            visibility: post.visibility,
            distribution: Distribution {
                feed_distribution: "MAIN_FEED",
            },
            lifecycle_state: "PUBLISHED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedPost {
    pub id: String,
    pub url: String,
}

impl PublishedPost {
    pub fn new(id: String) -> Self {
        Self {
            url: format!("https://www.linkedin.com/feed/update/{}", id),
            id,
        }
    }
}

/// OpenID userinfo for the token's member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visibility_wire_names() {
        assert_eq!(serde_json::to_value(Visibility::LoggedIn).unwrap(), json!("LOGGED_IN"));
        let parsed: Visibility = serde_json::from_value(json!("CONNECTIONS")).unwrap();
        assert_eq!(parsed, Visibility::Connections);
        for name in Visibility::ALL {
            let v: Visibility = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(v.as_str(), *name);
        }
    }

    #[test]
    fn payload_shape() {
        let post = NewPost::new("hello").visibility(Visibility::Connections);
        let body = serde_json::to_value(PostPayload::new("urn:li:person:abc", &post)).unwrap();
        assert_eq!(
            body,
            json!({
                "author": "urn:li:person:abc",
                "commentary": "hello",
                "visibility": "CONNECTIONS",
                "distribution": { "feedDistribution": "MAIN_FEED" },
                "lifecycleState": "PUBLISHED"
            })
        );
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(NewPost::new("héllo").char_count(), 5);
    }
}
