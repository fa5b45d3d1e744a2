use bridge_core::{parse_args, Error, Result, ToolHandler, ToolReply, ToolSpec};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::FacebookClient;
use crate::types::{Insights, NewPhoto, NewPost, Post, Publication};

const PREVIEW_CHARS: usize = 100;

pub struct FacebookTools {
    client: FacebookClient,
}

impl FacebookTools {
    pub fn new(client: FacebookClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FacebookClient {
        &self.client
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreatePostArgs {
    #[schemars(description = "The text content of the post", length(min = 1))]
    message: String,
    #[schemars(description = "Optional link to share in the post", url)]
    link: Option<String>,
    #[schemars(
        description = "Optional Unix timestamp for scheduled post (Pages only)",
        range(min = 0)
    )]
    scheduled_publish_time: Option<i64>,
    #[schemars(description = "Publish immediately (true) or create unpublished (false)")]
    published: Option<bool>,
}

impl CreatePostArgs {
    fn into_post(self) -> NewPost {
        let publication = match (self.scheduled_publish_time, self.published) {
            (Some(at), _) => Publication::Scheduled(at),
            (None, Some(true)) => Publication::Immediate,
            (None, Some(false)) => Publication::Draft,
            (None, None) => Publication::Default,
        };
        let mut post = NewPost::new(self.message).publication(publication);
        if let Some(link) = self.link {
            post = post.link(link);
        }
        post
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreatePhotoArgs {
    #[schemars(description = "URL of the image to post (must be publicly accessible)", url)]
    url: String,
    #[schemars(description = "Optional caption for the photo")]
    caption: Option<String>,
    #[schemars(description = "Publish immediately (true) or upload unpublished (false)")]
    published: Option<bool>,
}

impl CreatePhotoArgs {
    fn into_photo(self) -> NewPhoto {
        let mut photo = NewPhoto::new(self.url);
        if let Some(caption) = self.caption {
            photo = photo.caption(caption);
        }
        if let Some(published) = self.published {
            photo = photo.published(published);
        }
        photo
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PostIdArgs {
    #[schemars(description = "The Facebook post ID", length(min = 1))]
    post_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListArgs {
    #[serde(default = "default_limit")]
    #[schemars(
        description = "Number of posts to retrieve (1-100, default: 10)",
        range(min = 1, max = 100)
    )]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

impl ToolHandler for FacebookTools {
    fn server_name(&self) -> &'static str {
        "facebook-mcp-server"
    }

    fn specs(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec::new::<CreatePostArgs>(
                "create_facebook_post",
                "Create a new text post on Facebook (profile or page)",
            ),
            ToolSpec::new::<CreatePhotoArgs>(
                "create_facebook_photo_post",
                "Create a new photo post on Facebook with optional caption",
            ),
            ToolSpec::new::<PostIdArgs>(
                "get_facebook_post",
                "Get details of a specific Facebook post including engagement metrics",
            ),
            ToolSpec::new::<PostIdArgs>("delete_facebook_post", "Delete a Facebook post"),
            ToolSpec::new::<ListArgs>(
                "get_facebook_posts",
                "Get recent Facebook posts from profile or page",
            ),
            ToolSpec::without_arguments("get_facebook_pages", "Get list of Facebook pages you manage"),
            ToolSpec::without_arguments(
                "get_facebook_profile",
                "Get your Facebook profile information",
            ),
            ToolSpec::new::<PostIdArgs>(
                "get_facebook_post_insights",
                "Get analytics/insights for a Facebook post (Pages only)",
            ),
            ToolSpec::without_arguments(
                "test_facebook_connection",
                "Test the Facebook API connection",
            ),
        ]
    }

    fn invoke(&self, name: &str, arguments: Value) -> Result<ToolReply> {
        let dry_run = self.client.is_dry_run();

        match name {
            "create_facebook_post" => {
                let args: CreatePostArgs = parse_args(arguments)?;
                let post = self.client.create_post(&args.into_post())?;
                Ok(ToolReply::text(if dry_run {
                    format!(
                        "[DRY RUN] Facebook post created successfully!\n\nPost ID: {}\nMessage: {}\nPermalink: {}\n\nNote: This was a test. No actual post was made.",
                        post.id, post.message, post.permalink_url
                    )
                } else {
                    format!(
                        "Facebook post created successfully!\n\nPost ID: {}\nPermalink: {}\n\n{}",
                        post.id,
                        post.permalink_url,
                        engagement(&post)
                    )
                }))
            }
            "create_facebook_photo_post" => {
                let args: CreatePhotoArgs = parse_args(arguments)?;
                let created = self.client.create_photo_post(&args.into_photo())?;
                let summary = format!(
                    "Photo ID: {}\nPost ID: {}\nPermalink: {}",
                    created.id, created.post_id, created.permalink_url
                );
                Ok(ToolReply::text(if dry_run {
                    format!(
                        "[DRY RUN] Facebook photo post created successfully!\n\n{}\n\nNote: This was a test. No actual photo was posted.",
                        summary
                    )
                } else {
                    format!("Facebook photo post created successfully!\n\n{}", summary)
                }))
            }
            "get_facebook_post" => {
                let args: PostIdArgs = parse_args(arguments)?;
                let post = self.client.get_post(&args.post_id)?;
                Ok(ToolReply::text(format!(
                    "Post Details:\n\nID: {}\nMessage: {}\nCreated: {}\nPermalink: {}\n\n{}",
                    post.id,
                    or_placeholder(&post.message, "No text"),
                    post.created_time,
                    post.permalink_url,
                    engagement(&post)
                )))
            }
            "delete_facebook_post" => {
                let args: PostIdArgs = parse_args(arguments)?;
                self.client.delete_post(&args.post_id)?;
                Ok(ToolReply::text(if dry_run {
                    format!(
                        "[DRY RUN] Would delete post {}\n\nNote: This was a test. No post was deleted.",
                        args.post_id
                    )
                } else {
                    format!("Post {} deleted successfully!", args.post_id)
                }))
            }
            "get_facebook_posts" => {
                let args: ListArgs = parse_args(arguments)?;
                let posts = self.client.get_posts(args.limit)?;
                let listing = posts
                    .iter()
                    .enumerate()
                    .map(|(i, post)| {
                        format!(
                            "{}. Post ID: {}\n   Message: {}\n   Created: {}\n   Reactions: {} | Comments: {} | Shares: {}\n   Link: {}",
                            i + 1,
                            post.id,
                            preview(&post.message),
                            post.created_time,
                            post.reactions,
                            post.comments,
                            post.shares,
                            post.permalink_url
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                Ok(ToolReply::text(format!(
                    "Found {} posts:\n\n{}",
                    posts.len(),
                    or_placeholder(&listing, "No posts found")
                )))
            }
            "get_facebook_pages" => {
                let pages = self.client.get_pages()?;
                let listing = pages
                    .iter()
                    .enumerate()
                    .map(|(i, page)| {
                        format!(
                            "{}. {}\n   ID: {}\n   Category: {}\n   Fans: {}",
                            i + 1,
                            page.name,
                            page.id,
                            or_placeholder(&page.category, "N/A"),
                            page.fan_count
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                Ok(ToolReply::text(format!(
                    "Found {} pages:\n\n{}",
                    pages.len(),
                    or_placeholder(&listing, "No pages found")
                )))
            }
            "get_facebook_profile" => {
                let profile = self.client.get_profile()?;
                Ok(ToolReply::text(format!(
                    "Facebook Profile:\n\nID: {}\nName: {}\nEmail: {}",
                    profile.id,
                    profile.name,
                    or_placeholder(&profile.email, "Not available")
                )))
            }
            "get_facebook_post_insights" => {
                let args: PostIdArgs = parse_args(arguments)?;
                match self.client.get_post_insights(&args.post_id)? {
                    Insights::Available(metrics) => {
                        let rendered = serde_json::to_string_pretty(&metrics)
                            .map_err(|e| Error::protocol(e.to_string()))?;
                        Ok(ToolReply::text(format!("Post Insights:\n\n{}", rendered)))
                    }
                    Insights::Unavailable => Ok(ToolReply::text(
                        "Post insights are not available. This feature requires:\n1. A Facebook Page (not personal profile)\n2. Page access token\n3. Sufficient permissions",
                    )),
                }
            }
            "test_facebook_connection" => {
                if self.client.test_connection() {
                    Ok(ToolReply::text(format!(
                        "Facebook connection successful!\n\nMode: {}\nAPI Version: {}\nPage ID: {}",
                        if dry_run { "DRY RUN (test mode)" } else { "LIVE" },
                        self.client.api_version(),
                        self.client
                            .page_id()
                            .unwrap_or("Not configured (posting to profile)")
                    )))
                } else {
                    Ok(ToolReply::text(
                        "Facebook connection failed. Please check your access token and permissions.",
                    ))
                }
            }
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }
}

fn engagement(post: &Post) -> String {
    format!(
        "Engagement:\n- Reactions: {}\n- Comments: {}\n- Shares: {}",
        post.reactions, post.comments, post.shares
    )
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.is_empty() {
        placeholder
    } else {
        text
    }
}

fn preview(message: &str) -> String {
    if message.is_empty() {
        return "No text".to_string();
    }
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
