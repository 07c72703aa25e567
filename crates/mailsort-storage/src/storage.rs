use crate::{builtin_messages, load_fixture, CategoryRegistry, MessageStore, StorageError};
use mailsort_core::Message;
use std::path::Path;

/// Handle bundling the message store and the category registry of one mailbox.
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct Storage {
    messages: MessageStore,
    categories: CategoryRegistry,
}

impl Storage {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: MessageStore::new(messages),
            categories: CategoryRegistry::default(),
        }
    }

    pub fn seeded() -> Result<Self, StorageError> {
        Ok(Self::new(builtin_messages()?))
    }

    pub fn from_fixture(path: &Path) -> Result<Self, StorageError> {
        let messages = load_fixture(path)?;
        tracing::info!(path = %path.display(), count = messages.len(), "loaded message fixture");
        Ok(Self::new(messages))
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }
}
