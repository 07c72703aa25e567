use mailsort_core::{Message, MessageId};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory message collection. Callers only ever receive clones; the backing
/// vector never leaves this type.
#[derive(Clone, Default)]
pub struct MessageStore {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStore {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(messages)),
        }
    }

    pub async fn get(&self, id: &MessageId) -> Option<Message> {
        self.messages
            .read()
            .await
            .iter()
            .find(|message| &message.id == id)
            .cloned()
    }

    /// All messages in insertion order.
    pub async fn list(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn list_matching<P>(&self, predicate: P) -> Vec<Message>
    where
        P: Fn(&Message) -> bool,
    {
        self.messages
            .read()
            .await
            .iter()
            .filter(|message| predicate(message))
            .cloned()
            .collect()
    }

    /// Replaces the message with the same id in place, or appends it.
    pub async fn upsert(&self, message: Message) {
        let mut guard = self.messages.write().await;
        match guard.iter_mut().find(|existing| existing.id == message.id) {
            Some(existing) => *existing = message,
            None => guard.push(message),
        }
    }

    /// Applies `apply` to the message under a single write lock.
    /// Returns `None` when no message has the given id.
    pub async fn update<F, T>(&self, id: &MessageId, apply: F) -> Option<T>
    where
        F: FnOnce(&mut Message) -> T,
    {
        let mut guard = self.messages.write().await;
        guard
            .iter_mut()
            .find(|message| &message.id == id)
            .map(apply)
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageStore;
    use chrono::{TimeZone, Utc};
    use mailsort_core::{Folder, Message, MessageId, Sender, UNCATEGORIZED};

    fn message(id: &str, folder: Folder) -> Message {
        Message {
            id: MessageId::new(id),
            subject: format!("subject {id}"),
            body: String::new(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            folder,
            category: UNCATEGORIZED.to_string(),
            suggested_category: None,
            sender: Sender {
                name: "Someone".to_string(),
                email: "someone@example.com".to_string(),
            },
            read: false,
            replied: false,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_appends_new_ids() {
        let store = MessageStore::new(vec![message("a", Folder::Inbox), message("b", Folder::Sent)]);

        let mut changed = message("a", Folder::Inbox);
        changed.subject = "changed".to_string();
        store.upsert(changed).await;
        store.upsert(message("c", Folder::Spam)).await;

        let ids: Vec<_> = store
            .list()
            .await
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(
            store.get(&MessageId::new("a")).await.unwrap().subject,
            "changed"
        );
    }

    #[tokio::test]
    async fn update_reports_unknown_ids() {
        let store = MessageStore::new(vec![message("a", Folder::Inbox)]);

        let hit = store
            .update(&MessageId::new("a"), |m| {
                m.read = true;
                m.read
            })
            .await;
        let miss = store.update(&MessageId::new("zzz"), |m| m.read = true).await;

        assert_eq!(hit, Some(true));
        assert!(miss.is_none());
        assert!(store.get(&MessageId::new("a")).await.unwrap().read);
    }

    #[tokio::test]
    async fn list_returns_copies() {
        let store = MessageStore::new(vec![message("a", Folder::Inbox)]);
        let mut listed = store.list().await;
        listed[0].read = true;

        assert!(!store.get(&MessageId::new("a")).await.unwrap().read);
        assert_eq!(
            store
                .list_matching(|m| m.folder == Folder::Inbox)
                .await
                .len(),
            1
        );
    }
}
