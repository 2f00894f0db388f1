pub mod aggregate;
pub mod client;

pub use client::GithubClient;
