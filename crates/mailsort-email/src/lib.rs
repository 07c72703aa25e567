mod backend;
mod error;
mod http;
mod query;
mod reminder;
mod service;
mod workflow;

pub use backend::{LatencyProfile, MailBackend, MockBackend};
pub use error::EmailError;
pub use http::HttpBackend;
pub use query::{folder_counts, search, unreplied, unreplied_threshold, UNREPLIED_THRESHOLD_HOURS};
pub use reminder::UnrepliedReminder;
pub use service::MailService;
pub use workflow::validate_category;
