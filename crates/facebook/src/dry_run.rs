//! Synthetic Graph API replies used when the client runs in dry-run mode.

use bridge_core::{now_rfc3339, synthetic_id};
use chrono::{Duration, SecondsFormat, Utc};

use crate::types::{Metric, NewPhoto, NewPost, Page, PhotoPost, Post, Profile};

pub fn created_post(post: &NewPost) -> Post {
    Post {
        id: synthetic_id("dry_run_"),
        message: post.message.clone(),
        created_time: now_rfc3339(),
        permalink_url: "https://facebook.com/dry_run_post".to_string(),
        shares: 0,
        reactions: 0,
        comments: 0,
    }
}

pub fn created_photo(_photo: &NewPhoto) -> PhotoPost {
    PhotoPost {
        id: synthetic_id("dry_run_photo_"),
        post_id: synthetic_id("dry_run_post_"),
        permalink_url: "https://facebook.com/dry_run_photo".to_string(),
    }
}

pub fn post(post_id: &str) -> Post {
    Post {
        id: post_id.to_string(),
        message: "This is a dry run post".to_string(),
        created_time: now_rfc3339(),
        permalink_url: format!("https://facebook.com/post/{}", post_id),
        shares: 5,
        reactions: 25,
        comments: 3,
    }
}

pub fn posts(limit: usize) -> Vec<Post> {
    let now = Utc::now();
    (0..limit.min(3) as u64)
        .map(|i| Post {
            id: format!("dry_run_post_{}", i),
            message: format!("This is dry run post {}", i + 1),
            created_time: (now - Duration::days(i as i64)).to_rfc3339_opts(SecondsFormat::Millis, true),
            permalink_url: format!("https://facebook.com/post/{}", i),
            shares: i * 2,
            reactions: i * 10,
            comments: i,
        })
        .collect()
}

pub fn pages() -> Vec<Page> {
    vec![Page {
        id: "dry_run_page_1".to_string(),
        name: "Dry Run Page".to_string(),
        category: "Company".to_string(),
        fan_count: 1000,
    }]
}

pub fn profile() -> Profile {
    Profile {
        id: "dry_run_user_id".to_string(),
        name: "Dry Run User".to_string(),
        email: "dryrun@example.com".to_string(),
    }
}

pub fn insights() -> Vec<Metric> {
    [
        ("post_impressions", "Lifetime Post Total Impressions", 250),
        ("post_impressions_unique", "Lifetime Post Total Reach", 180),
        ("post_engaged_users", "Lifetime Engaged Users", 45),
        ("post_clicks", "Lifetime Post Clicks", 12),
    ]
    .into_iter()
    .map(|(name, title, value)| Metric {
        name: name.to_string(),
        title: title.to_string(),
        value,
    })
    .collect()
}
