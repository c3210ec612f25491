#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;

pub use api::{ApiClient, ApiConfig, DEFAULT_API_URL};
pub use app_services::AppServices;
pub use error::{ApiError, AppServicesError};
