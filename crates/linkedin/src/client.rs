use bridge_core::{
    Error, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, Result, Simulation,
};
use serde::Deserialize;
use tracing::debug;

use crate::dry_run;
use crate::types::{NewPost, PostPayload, Profile, PublishedPost, MAX_COMMENTARY_CHARS};

const API_BASE: &str = "https://api.linkedin.com";
const API_VERSION: &str = "202210";
const RESTLI_PROTOCOL: &str = "2.0.0";

#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub access_token: String,
    pub person_urn: String,
    pub dry_run: bool,
}

pub struct LinkedInClient {
    http: Box<dyn HttpTransport>,
    access_token: String,
    person_urn: String,
    simulation: Simulation,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    #[serde(default)]
    id: Option<String>,
}

impl LinkedInClient {
    pub fn new(config: LinkedInConfig) -> Result<Self> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }

    pub fn with_transport(config: LinkedInConfig, http: impl HttpTransport + 'static) -> Self {
        debug!(dry_run = config.dry_run, author = %config.person_urn, "linkedin client initialized");
        Self {
            http: Box::new(http),
            access_token: config.access_token,
            person_urn: config.person_urn,
            simulation: Simulation::new("linkedin", config.dry_run),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.simulation.is_dry_run()
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("LinkedIn-Version", API_VERSION)
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .http
            .send(self.authorized(request))
            .map_err(|e| Error::transport(format!("LinkedIn API request failed: {}", e)))?;

        if !response.is_success() {
            return Err(Error::transport(format!(
                "LinkedIn API error: {} - {}",
                response.status, response.body
            )));
        }
        Ok(response)
    }

    pub fn create_post(&self, post: &NewPost) -> Result<PublishedPost> {
        if post.char_count() > MAX_COMMENTARY_CHARS {
            return Err(Error::validation(
                "commentary",
                "Post text exceeds LinkedIn maximum of 3,000 characters",
            ));
        }

        let payload = PostPayload::new(&self.person_urn, post);

        self.simulation.run(
            "post to LinkedIn",
            || {
                debug!(
                    payload = %serde_json::to_string(&payload).unwrap_or_default(),
                    "dry-run payload"
                );
                dry_run::published_post()
            },
            || {
                let body = serde_json::to_value(&payload)
                    .map_err(|e| Error::protocol(e.to_string()))?;
                let response = self.send(HttpRequest::post(format!("{}/rest/posts", API_BASE)).json(body))?;

                let id = match response.header("x-restli-id") {
                    Some(id) => id.to_string(),
                    None => response
                        .json::<CreatedPost>()
                        .ok()
                        .and_then(|c| c.id)
                        .ok_or_else(|| Error::protocol("LinkedIn response carried no post id"))?,
                };
                debug!(id = %id, "post published");
                Ok(PublishedPost::new(id))
            },
        )
    }

    pub fn get_profile(&self) -> Result<Profile> {
        self.simulation.run("fetch LinkedIn profile", dry_run::profile, || {
            self.send(HttpRequest::get(format!("{}/v2/userinfo", API_BASE)))
                .and_then(|r| r.json())
                .map_err(|e| Error::transport(format!("Failed to get user profile: {}", e)))
        })
    }

    /// `None` when the token is rejected or the API is unreachable.
    pub fn verify_token(&self) -> Option<Profile> {
        match self.get_profile() {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!(error = %e, "token verification failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Visibility;
    use bridge_core::mock::MockTransport;
    use bridge_core::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn client(dry_run: bool) -> (LinkedInClient, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let config = LinkedInConfig {
            access_token: "li-token".to_string(),
            person_urn: "urn:li:person:abc".to_string(),
            dry_run,
        };
        (LinkedInClient::with_transport(config, mock.clone()), mock)
    }

    #[test]
    fn dry_run_post_is_synthetic() {
        let (client, mock) = client(true);
        let post = client.create_post(&NewPost::new("hello")).unwrap();
        assert!(post.id.starts_with("dry-run-"));
        assert_eq!(post.url, "https://linkedin.com/feed/update/dry-run-post");
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn overlong_commentary_rejected_even_in_dry_run() {
        let (client, mock) = client(true);
        let err = client.create_post(&NewPost::new("x".repeat(3001))).unwrap_err();
        assert!(err.to_string().contains("3,000 characters"));
        assert!(client.create_post(&NewPost::new("x".repeat(3000))).is_ok());
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn live_post_sends_headers_and_reads_restli_id() {
        let (client, mock) = client(false);
        mock.push_response(
            HttpResponse::new(201, "").with_header("X-RestLi-Id", "urn:li:share:123"),
        );

        let post = client
            .create_post(&NewPost::new("hello").visibility(Visibility::LoggedIn))
            .unwrap();
        assert_eq!(post.id, "urn:li:share:123");
        assert_eq!(post.url, "https://www.linkedin.com/feed/update/urn:li:share:123");

        let req = &mock.requests()[0];
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "https://api.linkedin.com/rest/posts");
        assert_eq!(req.header_value("authorization"), Some("Bearer li-token"));
        assert_eq!(req.header_value("LinkedIn-Version"), Some("202210"));
        assert_eq!(req.header_value("X-Restli-Protocol-Version"), Some("2.0.0"));
        match &req.body {
            Some(bridge_core::http::Body::Json(body)) => {
                assert_eq!(body["author"], "urn:li:person:abc");
                assert_eq!(body["visibility"], "LOGGED_IN");
                assert_eq!(body["lifecycleState"], "PUBLISHED");
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn live_post_falls_back_to_body_id() {
        let (client, mock) = client(false);
        mock.push_json(201, json!({ "id": "urn:li:share:9" }));
        assert_eq!(client.create_post(&NewPost::new("x")).unwrap().id, "urn:li:share:9");
    }

    #[test]
    fn live_post_without_any_id_is_protocol_error() {
        let (client, mock) = client(false);
        mock.push_text(201, "");
        assert!(matches!(
            client.create_post(&NewPost::new("x")).unwrap_err(),
            Error::Protocol(_)
        ));
    }

    #[test]
    fn vendor_error_includes_status_and_body() {
        let (client, mock) = client(false);
        mock.push_json(401, json!({ "message": "Invalid access token" }));
        let err = client.create_post(&NewPost::new("x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"LinkedIn API error: 401 - {"message":"Invalid access token"}"#
        );
    }

    #[test]
    fn connection_failure_message() {
        let (client, mock) = client(false);
        mock.push_failure("dns error");
        let err = client.create_post(&NewPost::new("x")).unwrap_err();
        assert_eq!(err.to_string(), "LinkedIn API request failed: dns error");
    }

    #[test]
    fn verify_token_maps_failure_to_none() {
        let (client, mock) = client(false);
        mock.push_json(200, json!({ "sub": "abc", "name": "Ada", "email": "ada@example.com" }));
        mock.push_json(401, json!({}));

        let profile = client.verify_token().unwrap();
        assert_eq!(profile.name, "Ada");
        assert!(client.verify_token().is_none());
        assert_eq!(mock.requests()[0].url, "https://api.linkedin.com/v2/userinfo");
    }
}
