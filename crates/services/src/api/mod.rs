//! One async method per backend operation.

mod admin;
mod assessment;
mod auth;
mod client;

pub use client::{ApiClient, ApiConfig, DEFAULT_API_URL};
