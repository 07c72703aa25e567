use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category carried by every message until something real is assigned.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Seed entries of the category registry, in display order.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["personal", "work", "important", "spam", "newsletter"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Folder {
    Inbox,
    Drafts,
    Sent,
    Spam,
    Trash,
    Archive,
}

impl Folder {
    pub const ALL: [Folder; 6] = [
        Folder::Inbox,
        Folder::Drafts,
        Folder::Sent,
        Folder::Spam,
        Folder::Trash,
        Folder::Archive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Inbox => "inbox",
            Folder::Drafts => "drafts",
            Folder::Sent => "sent",
            Folder::Spam => "spam",
            Folder::Trash => "trash",
            Folder::Archive => "archive",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown folder `{0}`")]
pub struct ParseFolderError(pub String);

impl FromStr for Folder {
    type Err = ParseFolderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Folder::ALL
            .into_iter()
            .find(|folder| folder.as_str() == value)
            .ok_or_else(|| ParseFolderError(value.to_string()))
    }
}

/// Folder selector for listings. `"all"` disables folder filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderFilter {
    All,
    Only(Folder),
}

impl FolderFilter {
    pub fn matches(&self, folder: Folder) -> bool {
        match self {
            FolderFilter::All => true,
            FolderFilter::Only(expected) => *expected == folder,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FolderFilter::All => "all",
            FolderFilter::Only(folder) => folder.as_str(),
        }
    }
}

impl From<Folder> for FolderFilter {
    fn from(folder: Folder) -> Self {
        FolderFilter::Only(folder)
    }
}

impl fmt::Display for FolderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FolderFilter {
    type Err = ParseFolderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(FolderFilter::All);
        }
        value.parse().map(FolderFilter::Only)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

/// A mailbox message in its wire shape (`suggestedCategory`, ISO-8601 `date`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub subject: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub folder: Folder,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_category: Option<String>,
    pub sender: Sender,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub replied: bool,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

impl Message {
    /// True once the category holds something other than the placeholder.
    pub fn has_designated_category(&self) -> bool {
        !self.category.is_empty() && self.category != UNCATEGORIZED
    }

    /// The suggestion awaiting accept/decline, if there is a non-empty one.
    pub fn pending_suggestion(&self) -> Option<&str> {
        self.suggested_category
            .as_deref()
            .filter(|suggestion| !suggestion.is_empty())
    }

    /// Whether the "suggested category" affordance should be displayed.
    pub fn shows_suggestion(&self) -> bool {
        self.pending_suggestion().is_some() && !self.has_designated_category()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderCount {
    pub folder: Folder,
    pub total: usize,
    pub unread: usize,
}

/// Reminder entry for an inbox message still waiting for a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnrepliedSummary {
    pub id: MessageId,
    pub subject: String,
    pub date: DateTime<Utc>,
    pub folder: Folder,
    pub category: String,
}

impl From<&Message> for UnrepliedSummary {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            subject: message.subject.clone(),
            date: message.date,
            folder: message.folder,
            category: message.category.clone(),
        }
    }
}

/// Published after a write has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailEvent {
    Read(MessageId),
    ReplySent { id: MessageId, reply_all: bool },
    CategoryChanged { id: MessageId, category: String },
    SuggestionCleared(MessageId),
}
