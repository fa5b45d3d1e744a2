//! Synthetic LinkedIn replies for dry-run mode.

use bridge_core::synthetic_id;

use crate::types::{Profile, PublishedPost};

pub fn published_post() -> PublishedPost {
    PublishedPost {
        id: synthetic_id("dry-run-"),
        url: "https://linkedin.com/feed/update/dry-run-post".to_string(),
    }
}

pub fn profile() -> Profile {
    Profile {
        sub: "dry-run-member".to_string(),
        name: "Dry Run User".to_string(),
        email: "dryrun@example.com".to_string(),
    }
}
