//! Per-message transitions of the category suggestion and read/reply state.
//!
//! Each transition is a plain function over `&mut Message` so that the store can
//! apply it inside a single write lock.

use crate::EmailError;
use mailsort_core::Message;

/// Promotes the pending suggestion to the category and clears it.
pub(crate) fn accept(message: &mut Message) -> Result<String, EmailError> {
    let Some(suggestion) = message.pending_suggestion().map(str::to_string) else {
        return Err(EmailError::NoSuggestion(message.id.clone()));
    };

    message.category = suggestion.clone();
    message.suggested_category = None;
    Ok(suggestion)
}

/// Drops the suggestion. The category is left alone.
pub(crate) fn decline(message: &mut Message) {
    message.suggested_category = None;
}

/// Manual override. Leaves any pending suggestion in place.
pub(crate) fn recategorize(message: &mut Message, category: &str) {
    message.category = category.to_string();
}

pub(crate) fn mark_read(message: &mut Message) {
    message.read = true;
}

pub(crate) fn mark_replied(message: &mut Message) {
    message.replied = true;
}

pub fn validate_category(name: &str) -> Result<(), EmailError> {
    if name.trim().is_empty() {
        return Err(EmailError::EmptyCategory);
    }
    Ok(())
}
