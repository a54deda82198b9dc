pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{ClientConfig, API_URL_ENV, DEFAULT_API_BASE_URL, REQUEST_TIMEOUT_ENV};
