mod error;
mod manager;
mod model;

pub use error::ConfigError;
pub use manager::{ConfigManager, API_URL_ENV};
pub use model::*;
