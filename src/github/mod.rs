pub mod client;
pub mod config;
pub mod models;
pub mod rate_limiter;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use rate_limiter::RateLimiter;
