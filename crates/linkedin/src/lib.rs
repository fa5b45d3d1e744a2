pub mod client;
pub mod dry_run;
pub mod tools;
pub mod types;

pub use client::{LinkedInClient, LinkedInConfig};
pub use tools::LinkedInTools;
pub use types::{NewPost, Profile, PublishedPost, Visibility, MAX_COMMENTARY_CHARS};
