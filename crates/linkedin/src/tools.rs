use bridge_core::{parse_args, Error, Result, ToolHandler, ToolReply, ToolSpec};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::LinkedInClient;
use crate::types::{NewPost, Visibility};

pub struct LinkedInTools {
    client: LinkedInClient,
}

impl LinkedInTools {
    pub fn new(client: LinkedInClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PostArgs {
    #[schemars(description = "The text content of the post", length(max = 3000))]
    commentary: String,
    #[serde(default)]
    #[schemars(description = "Who can see this post")]
    visibility: Visibility,
}

impl ToolHandler for LinkedInTools {
    fn server_name(&self) -> &'static str {
        "linkedin-mcp-server"
    }

    fn specs(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec::new::<PostArgs>(
                "post_to_linkedin",
                "Create and publish a post to LinkedIn. Posts can be up to 3,000 characters and support PUBLIC, CONNECTIONS, or LOGGED_IN visibility.",
            ),
            ToolSpec::without_arguments(
                "verify_linkedin_connection",
                "Verify that the LinkedIn API connection is working and the access token is valid.",
            ),
        ]
    }

    fn invoke(&self, name: &str, arguments: Value) -> Result<ToolReply> {
        let mode = if self.client.is_dry_run() { "DRY RUN" } else { "LIVE" };

        match name {
            "post_to_linkedin" => {
                let args: PostArgs = parse_args(arguments)?;
                let post = NewPost::new(args.commentary).visibility(args.visibility);
                let published = self.client.create_post(&post)?;

                Ok(ToolReply::json(&json!({
                    "success": true,
                    "postId": published.id,
                    "postUrl": published.url,
                    "message": if self.client.is_dry_run() {
                        "DRY RUN: Post would be published to LinkedIn"
                    } else {
                        "Post successfully published to LinkedIn"
                    },
                    "characterCount": post.char_count(),
                    "visibility": post.visibility,
                })))
            }
            "verify_linkedin_connection" => match self.client.verify_token() {
                Some(profile) => Ok(ToolReply::json(&json!({
                    "success": true,
                    "connected": true,
                    "message": "LinkedIn connection verified",
                    "profile": profile,
                    "mode": mode,
                }))),
                None => Ok(ToolReply::json_error(&json!({
                    "success": false,
                    "connected": false,
                    "message": "LinkedIn connection failed - access token may be invalid or expired",
                }))),
            },
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }

    fn error_reply(&self, error: &Error) -> ToolReply {
        ToolReply::json_error(&json!({
            "success": false,
            "error": error.to_string(),
        }))
    }
}
