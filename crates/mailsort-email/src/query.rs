use chrono::{DateTime, Duration, Utc};
use mailsort_core::{Folder, FolderCount, Message};

/// Age after which an unanswered inbox message is worth a reminder.
pub const UNREPLIED_THRESHOLD_HOURS: i64 = 24;

pub fn unreplied_threshold() -> Duration {
    Duration::hours(UNREPLIED_THRESHOLD_HOURS)
}

/// Case-insensitive substring match on subject, sender name and body.
/// An empty query keeps everything.
pub fn search(messages: &[Message], query: &str) -> Vec<Message> {
    if query.is_empty() {
        return messages.to_vec();
    }

    let needle = query.to_lowercase();
    messages
        .iter()
        .filter(|message| {
            message.subject.to_lowercase().contains(&needle)
                || message.sender.name.to_lowercase().contains(&needle)
                || message.body.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Inbox messages without a reply that arrived before `reference - threshold`.
/// A cutoff earlier than any representable date matches nothing.
pub fn unreplied(
    messages: &[Message],
    reference: DateTime<Utc>,
    threshold: Duration,
) -> Vec<Message> {
    let Some(cutoff) = reference.checked_sub_signed(threshold) else {
        return Vec::new();
    };
    messages
        .iter()
        .filter(|message| message.folder == Folder::Inbox)
        .filter(|message| !message.replied && message.date < cutoff)
        .cloned()
        .collect()
}

pub fn folder_counts(messages: &[Message]) -> Vec<FolderCount> {
    Folder::ALL
        .into_iter()
        .map(|folder| {
            let in_folder = messages.iter().filter(|m| m.folder == folder);
            FolderCount {
                folder,
                total: in_folder.clone().count(),
                unread: in_folder.filter(|m| !m.read).count(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mailsort_core::{MessageId, Sender, UNCATEGORIZED};

    fn message(id: &str, folder: Folder, date: DateTime<Utc>, replied: bool) -> Message {
        Message {
            id: MessageId::new(id),
            subject: format!("Subject {id}"),
            body: "body text".to_string(),
            date,
            folder,
            category: UNCATEGORIZED.to_string(),
            suggested_category: None,
            sender: Sender {
                name: "Amazon".to_string(),
                email: "no-reply@amazon.com".to_string(),
            },
            read: replied,
            replied,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_query_returns_input() {
        let messages = vec![
            message("a", Folder::Inbox, now(), false),
            message("b", Folder::Sent, now(), false),
        ];
        assert_eq!(search(&messages, ""), messages);
    }

    #[test]
    fn search_ignores_case_across_fields() {
        let mut messages = vec![
            message("a", Folder::Inbox, now(), false),
            message("b", Folder::Inbox, now(), false),
        ];
        messages[1].sender.name = "Tech News".to_string();
        messages[1].subject = "Newsletter: Tech Updates".to_string();
        messages[1].body = "This week's HIGHLIGHTS".to_string();

        let by_sender = search(&messages, "AMAZON");
        assert_eq!(by_sender.len(), 1);
        assert_eq!(by_sender[0].id.as_str(), "a");

        assert_eq!(search(&messages, "highlights")[0].id.as_str(), "b");
        assert_eq!(search(&messages, "newsletter:")[0].id.as_str(), "b");
        assert!(search(&messages, "nothing like this").is_empty());
    }

    #[test]
    fn unreplied_requires_inbox_age_and_no_reply() {
        let old = now() - Duration::hours(30);
        let fresh = now() - Duration::hours(2);
        let messages = vec![
            message("old-inbox", Folder::Inbox, old, false),
            message("old-replied", Folder::Inbox, old, true),
            message("fresh-inbox", Folder::Inbox, fresh, false),
            message("old-archive", Folder::Archive, old, false),
            message("old-spam", Folder::Spam, old, false),
        ];

        let ids: Vec<_> = unreplied(&messages, now(), unreplied_threshold())
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, ["old-inbox"]);
    }

    #[test]
    fn unreplied_cutoff_is_strict() {
        let exactly = now() - unreplied_threshold();
        let messages = vec![
            message("edge", Folder::Inbox, exactly, false),
            message("past-edge", Folder::Inbox, exactly - Duration::seconds(1), false),
        ];

        let ids: Vec<_> = unreplied(&messages, now(), unreplied_threshold())
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, ["past-edge"]);
    }

    #[test]
    fn unreplied_with_unreachable_cutoff_is_empty() {
        let messages = vec![message(
            "ancient",
            Folder::Inbox,
            now() - Duration::days(365 * 50),
            false,
        )];

        assert!(unreplied(&messages, now(), Duration::days(1_000_000_000)).is_empty());
    }

    #[test]
    fn counts_every_folder() {
        let messages = vec![
            message("a", Folder::Inbox, now(), false),
            message("b", Folder::Inbox, now(), true),
            message("c", Folder::Trash, now(), false),
        ];

        let counts = folder_counts(&messages);
        assert_eq!(counts.len(), Folder::ALL.len());
        assert_eq!(
            counts[0],
            FolderCount {
                folder: Folder::Inbox,
                total: 2,
                unread: 1
            }
        );
        let trash = counts.iter().find(|c| c.folder == Folder::Trash).unwrap();
        assert_eq!((trash.total, trash.unread), (1, 1));
        let sent = counts.iter().find(|c| c.folder == Folder::Sent).unwrap();
        assert_eq!((sent.total, sent.unread), (0, 0));
    }
}
