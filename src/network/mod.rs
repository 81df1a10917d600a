//! HTTP networking for talking to search engines

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::{accept_html, accept_language, random_user_agent};
