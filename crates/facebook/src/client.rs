//! Facebook Graph API client.
//!
//! Every operation goes through [`Simulation::run`]: in dry-run mode the
//! synthetic builder from [`crate::dry_run`] answers and no request is built.
//! Live calls send the access token as a query parameter and surface the
//! Graph API's `error.message` on failure.

use bridge_core::{
    Error, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, Result, Simulation,
};
use tracing::{debug, warn};

use crate::dry_run;
use crate::types::{
    permalink, Created, GraphMetric, GraphPost, Insights, Metric, NewPhoto, NewPost, Page, Paged,
    PhotoPost, Post, Profile,
};

pub const DEFAULT_API_VERSION: &str = "v19.0";
const GRAPH_API: &str = "https://graph.facebook.com";
const POST_FIELDS: &str =
    "id,message,created_time,permalink_url,shares,reactions.summary(true),comments.summary(true)";
const INSIGHT_METRICS: &str =
    "post_impressions,post_impressions_unique,post_engaged_users,post_clicks";
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct FacebookConfig {
    pub access_token: String,
    pub api_version: String,
    pub page_id: Option<String>,
    pub dry_run: bool,
}

impl FacebookConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            page_id: None,
            dry_run: false,
        }
    }
}

pub struct FacebookClient {
    http: Box<dyn HttpTransport>,
    access_token: String,
    api_version: String,
    page_id: Option<String>,
    simulation: Simulation,
}

impl FacebookClient {
    pub fn new(config: FacebookConfig) -> Result<Self> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }

    pub fn with_transport(config: FacebookConfig, http: impl HttpTransport + 'static) -> Self {
        debug!(
            dry_run = config.dry_run,
            api_version = %config.api_version,
            has_page_id = config.page_id.is_some(),
            "facebook client initialized"
        );
        Self {
            http: Box::new(http),
            access_token: config.access_token,
            api_version: config.api_version,
            page_id: config.page_id.filter(|p| !p.is_empty()),
            simulation: Simulation::new("facebook", config.dry_run),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.simulation.is_dry_run()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    /// The page when one is configured, the token's own profile otherwise.
    fn node(&self) -> &str {
        self.page_id.as_deref().unwrap_or("me")
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", GRAPH_API, self.api_version, path)
    }

    fn send(&self, action: &str, request: HttpRequest) -> Result<HttpResponse> {
        let request = request.query("access_token", &self.access_token);
        let response = self
            .http
            .send(request)
            .map_err(|e| Error::transport(format!("Failed to {}: {}", action, e)))?;

        if !response.is_success() {
            let detail = response
                .error_message()
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            debug!(status = response.status, body = %response.body, "graph api error");
            return Err(Error::transport(format!("Failed to {}: {}", action, detail)));
        }

        Ok(response)
    }

    pub fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.simulation.run(
            &format!("create Facebook post: {}", post.message),
            || dry_run::created_post(post),
            || {
                let mut request = HttpRequest::post(self.url(&format!("{}/feed", self.node())));
                for (key, value) in post.params() {
                    request = request.query(key, value);
                }
                let created: Created = self.send("create Facebook post", request)?.json()?;
                debug!(id = %created.id, "post created");
                Ok(Post::created(created.id, post.message.clone()))
            },
        )
    }

    pub fn create_photo_post(&self, photo: &NewPhoto) -> Result<PhotoPost> {
        self.simulation.run(
            &format!("create Facebook photo post: {}", photo.url),
            || dry_run::created_photo(photo),
            || {
                let mut request = HttpRequest::post(self.url(&format!("{}/photos", self.node())));
                for (key, value) in photo.params() {
                    request = request.query(key, value);
                }
                let created: Created = self.send("create Facebook photo post", request)?.json()?;
                let post_id = created.post_id.unwrap_or_default();
                let permalink_url = if post_id.is_empty() {
                    permalink(&created.id)
                } else {
                    permalink(&post_id)
                };
                Ok(PhotoPost {
                    id: created.id,
                    post_id,
                    permalink_url,
                })
            },
        )
    }

    pub fn get_post(&self, post_id: &str) -> Result<Post> {
        self.simulation.run(
            &format!("get Facebook post {}", post_id),
            || dry_run::post(post_id),
            || {
                let request = HttpRequest::get(self.url(&urlencoding::encode(post_id)))
                    .query("fields", POST_FIELDS);
                let raw: GraphPost = self.send("get Facebook post", request)?.json()?;
                Ok(raw.into())
            },
        )
    }

    pub fn delete_post(&self, post_id: &str) -> Result<()> {
        self.simulation.run(
            &format!("delete Facebook post {}", post_id),
            || (),
            || {
                let request = HttpRequest::delete(self.url(&urlencoding::encode(post_id)));
                self.send("delete Facebook post", request)?;
                debug!(post_id, "post deleted");
                Ok(())
            },
        )
    }

    pub fn get_posts(&self, limit: usize) -> Result<Vec<Post>> {
        self.simulation.run(
            "get Facebook posts",
            || dry_run::posts(limit),
            || {
                let request = HttpRequest::get(self.url(&format!("{}/posts", self.node())))
                    .query("fields", POST_FIELDS)
                    .query("limit", limit.min(MAX_PAGE_SIZE));
                let page: Paged<GraphPost> = self.send("get Facebook posts", request)?.json()?;
                Ok(page.data.into_iter().map(Post::from).collect())
            },
        )
    }

    pub fn get_pages(&self) -> Result<Vec<Page>> {
        self.simulation.run(
            "get Facebook pages",
            dry_run::pages,
            || {
                let request = HttpRequest::get(self.url("me/accounts"))
                    .query("fields", "id,name,category,fan_count");
                let page: Paged<Page> = self.send("get Facebook pages", request)?.json()?;
                Ok(page.data)
            },
        )
    }

    pub fn get_profile(&self) -> Result<Profile> {
        self.simulation.run(
            "get Facebook profile",
            dry_run::profile,
            || {
                let request = HttpRequest::get(self.url("me")).query("fields", "id,name,email");
                self.send("get Facebook profile", request)?.json()
            },
        )
    }

    /// Fetch failures are reported as [`Insights::Unavailable`]: the Graph
    /// API only serves insights for page posts with a page token.
    pub fn get_post_insights(&self, post_id: &str) -> Result<Insights> {
        self.simulation.run(
            &format!("get insights for {}", post_id),
            || Insights::Available(dry_run::insights()),
            || {
                let request =
                    HttpRequest::get(self.url(&format!("{}/insights", urlencoding::encode(post_id))))
                        .query("metric", INSIGHT_METRICS);

                let fetched = self
                    .send("get post insights", request)
                    .and_then(|r| r.json::<Paged<GraphMetric>>());

                match fetched {
                    Ok(page) => Ok(Insights::Available(
                        page.data.into_iter().map(Metric::from).collect(),
                    )),
                    Err(e) => {
                        warn!(post_id, error = %e, "post insights unavailable");
                        Ok(Insights::Unavailable)
                    }
                }
            },
        )
    }

    pub fn test_connection(&self) -> bool {
        match self.get_profile() {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "connection test failed");
                false
            }
        }
    }
}
