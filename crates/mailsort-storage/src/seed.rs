use crate::StorageError;
use mailsort_core::Message;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_FIXTURE: &str = include_str!("../fixtures/seed_messages.json");

/// The demo mailbox shipped with the binary.
pub fn builtin_messages() -> Result<Vec<Message>, StorageError> {
    parse_fixture(BUILTIN_FIXTURE)
}

pub fn load_fixture(path: &Path) -> Result<Vec<Message>, StorageError> {
    let content = std::fs::read_to_string(path)?;
    parse_fixture(&content)
}

/// Parses a JSON array of messages, rejecting duplicate ids.
pub fn parse_fixture(content: &str) -> Result<Vec<Message>, StorageError> {
    let messages: Vec<Message> = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for message in &messages {
        if !seen.insert(message.id.clone()) {
            return Err(StorageError::Data(format!(
                "duplicate message id `{}` in fixture",
                message.id
            )));
        }
    }

    Ok(messages)
}
