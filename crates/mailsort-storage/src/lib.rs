mod error;
mod registry;
mod seed;
mod storage;
mod store;

pub use error::StorageError;
pub use registry::CategoryRegistry;
pub use seed::{builtin_messages, load_fixture, parse_fixture};
pub use storage::Storage;
pub use store::MessageStore;
