use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a new post should be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Publication {
    /// Leave it to the Graph API default (published immediately).
    #[default]
    Default,
    Immediate,
    /// Created unpublished.
    Draft,
    /// Unix timestamp; implies unpublished until then.
    Scheduled(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub message: String,
    pub link: Option<String>,
    pub publication: Publication,
}

impl NewPost {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            link: None,
            publication: Publication::Default,
        }
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn publication(mut self, publication: Publication) -> Self {
        self.publication = publication;
        self
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("message", self.message.clone())];
        if let Some(link) = &self.link {
            params.push(("link", link.clone()));
        }
        match self.publication {
            Publication::Default => {}
            Publication::Immediate => params.push(("published", "true".to_string())),
            Publication::Draft => params.push(("published", "false".to_string())),
            Publication::Scheduled(at) => {
                params.push(("published", "false".to_string()));
                params.push(("scheduled_publish_time", at.to_string()));
            }
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub url: String,
    pub caption: Option<String>,
    pub published: Option<bool>,
}

impl NewPhoto {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: None,
            published: None,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("url", self.url.clone())];
        if let Some(caption) = &self.caption {
            params.push(("caption", caption.clone()));
        }
        if let Some(published) = self.published {
            params.push(("published", published.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub message: String,
    pub created_time: String,
    pub permalink_url: String,
    pub shares: u64,
    pub reactions: u64,
    pub comments: u64,
}

impl Post {
    /// A post the Graph API just acknowledged with nothing but its id.
    pub fn created(id: String, message: String) -> Self {
        Self {
            permalink_url: permalink(&id),
            id,
            message,
            created_time: String::new(),
            shares: 0,
            reactions: 0,
            comments: 0,
        }
    }
}

pub(crate) fn permalink(id: &str) -> String {
    format!("https://www.facebook.com/{}", id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoPost {
    pub id: String,
    pub post_id: String,
    pub permalink_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub fan_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub title: String,
    pub value: i64,
}

/// Post analytics. Not every post exposes them, so absence is a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Insights {
    Available(Vec<Metric>),
    Unavailable,
}

// Graph API wire shapes.

#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    pub id: String,
    #[serde(default)]
    pub post_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Count {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    total_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct WithSummary {
    #[serde(default)]
    summary: Summary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphPost {
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    created_time: String,
    #[serde(default)]
    permalink_url: String,
    #[serde(default)]
    shares: Count,
    #[serde(default)]
    reactions: WithSummary,
    #[serde(default)]
    comments: WithSummary,
}

impl From<GraphPost> for Post {
    fn from(raw: GraphPost) -> Self {
        Self {
            id: raw.id,
            message: raw.message,
            created_time: raw.created_time,
            permalink_url: raw.permalink_url,
            shares: raw.shares.count,
            reactions: raw.reactions.summary.total_count,
            comments: raw.comments.summary.total_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphMetric {
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    values: Vec<GraphMetricValue>,
}

#[derive(Debug, Deserialize)]
struct GraphMetricValue {
    #[serde(default)]
    value: Value,
}

impl From<GraphMetric> for Metric {
    fn from(raw: GraphMetric) -> Self {
        let value = raw
            .values
            .first()
            .and_then(|v| v.value.as_i64())
            .unwrap_or(0);
        Self {
            name: raw.name,
            title: raw.title,
            value,
        }
    }
}
