pub mod client;
pub mod dry_run;
pub mod tools;
pub mod types;

pub use client::{FacebookClient, FacebookConfig, DEFAULT_API_VERSION};
pub use tools::FacebookTools;
pub use types::{Insights, Metric, NewPhoto, NewPost, Page, PhotoPost, Post, Profile, Publication};
