pub mod client;
pub mod types;

pub use client::{GithubClient, GithubError};
pub use types::{CountedItem, PopularPath, PopularReferrer, RepoInfo};
