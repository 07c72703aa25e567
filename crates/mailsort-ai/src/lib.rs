mod service;

pub use service::{AiRuntimeConfig, AiService};
