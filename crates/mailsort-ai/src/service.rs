use mailsort_core::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRuntimeConfig {
    /// Closing line of generated replies.
    pub signature: String,
}

impl Default for AiRuntimeConfig {
    fn default() -> Self {
        Self {
            signature: "Your Name".to_string(),
        }
    }
}

/// Keyword rules checked in order; the first category with a hit wins.
const CATEGORY_RULES: [(&str, &[&str]); 5] = [
    ("spam", &["you've won", "prize", "claim", "lottery", "winner"]),
    (
        "newsletter",
        &["newsletter", "unsubscribe", "subscription", "highlights"],
    ),
    (
        "important",
        &["urgent", "asap", "deadline", "maintenance", "security", "important"],
    ),
    (
        "work",
        &["meeting", "proposal", "project", "review", "team", "sync"],
    ),
    (
        "personal",
        &["family", "reunion", "birthday", "order", "package"],
    ),
];

/// Stand-in for the assistant: templated replies and keyword categorization.
#[derive(Debug, Clone, Default)]
pub struct AiService {
    config: AiRuntimeConfig,
}

impl AiService {
    pub fn new(config: AiRuntimeConfig) -> Self {
        Self { config }
    }

    /// Reply draft addressed to the sender and quoting the subject. Deterministic.
    pub fn draft_reply(&self, message: &Message) -> String {
        tracing::debug!(message_id = %message.id, "drafting reply");
        format!(
            "Hi {name},\n\nThank you for your email. I've received your message about \"{subject}\" \
             and will get back to you shortly.\n\nBest regards,\n{signature}",
            name = message.sender.name,
            subject = message.subject,
            signature = self.config.signature,
        )
    }

    pub fn suggest_category(&self, subject: &str, body: &str) -> Option<String> {
        let text = format!("{subject} {body}").to_lowercase();

        CATEGORY_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|word| text.contains(word)))
            .map(|(category, _)| category.to_string())
    }
}
