use crate::{query, workflow, EmailError, LatencyProfile, MailBackend, MockBackend};
use chrono::{DateTime, Duration, Utc};
use mailsort_ai::AiService;
use mailsort_core::{Folder, FolderCount, FolderFilter, MailEvent, Message, MessageId};
use mailsort_storage::{CategoryRegistry, Storage};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Operation surface consumed by the rendering layer.
///
/// Transport failures are logged and turned into safe defaults: empty lists for
/// reads and `false` for writes. Unknown message ids also yield `false`.
/// `generate_reply` is the exception and returns the error.
#[derive(Clone)]
pub struct MailService {
    backend: Arc<dyn MailBackend>,
    categories: CategoryRegistry,
    events: broadcast::Sender<MailEvent>,
}

impl MailService {
    pub fn new(backend: Arc<dyn MailBackend>, categories: CategoryRegistry) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            categories,
            events,
        }
    }

    /// Service over an in-memory mailbox sharing `storage`'s category registry.
    pub fn mock(storage: Storage, ai: AiService, latency: LatencyProfile) -> Self {
        let categories = storage.categories().clone();
        Self::new(
            Arc::new(MockBackend::new(storage, ai, latency)),
            categories,
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MailEvent> {
        self.events.subscribe()
    }

    pub async fn list_categories(&self) -> Vec<String> {
        self.categories.list().await
    }

    pub async fn register_category(&self, name: &str) -> bool {
        self.categories.register(name).await
    }

    pub async fn list_by_folder(&self, folder: FolderFilter) -> Vec<Message> {
        self.list_by_folder_and_category(folder, None).await
    }

    pub async fn list_by_folder_and_category(
        &self,
        folder: FolderFilter,
        category: Option<&str>,
    ) -> Vec<Message> {
        match self.backend.list_messages(folder, category).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!(%folder, ?category, "failed to list messages: {err}");
                Vec::new()
            }
        }
    }

    pub async fn find(&self, id: &MessageId) -> Option<Message> {
        self.list_by_folder(FolderFilter::All)
            .await
            .into_iter()
            .find(|message| &message.id == id)
    }

    pub fn search(messages: &[Message], query: &str) -> Vec<Message> {
        query::search(messages, query)
    }

    pub async fn find_unreplied(
        &self,
        reference: DateTime<Utc>,
        threshold: Duration,
    ) -> Vec<Message> {
        let inbox = self.list_by_folder(FolderFilter::Only(Folder::Inbox)).await;
        query::unreplied(&inbox, reference, threshold)
    }

    pub async fn folder_counts(&self) -> Vec<FolderCount> {
        query::folder_counts(&self.list_by_folder(FolderFilter::All).await)
    }

    pub async fn mark_read(&self, id: &MessageId) -> bool {
        let result = self.backend.mark_read(id).await;
        match settle("mark_read", id, result) {
            Ok(Some(())) => {
                self.publish(MailEvent::Read(id.clone()));
                true
            }
            _ => false,
        }
    }

    pub async fn send_reply(&self, id: &MessageId, content: &str, reply_all: bool) -> bool {
        if content.trim().is_empty() {
            tracing::warn!(message_id = %id, "sending a reply with empty content");
        }

        let result = self.backend.send_reply(id, content, reply_all).await;
        match settle("send_reply", id, result) {
            Ok(Some(())) => {
                tracing::info!(message_id = %id, reply_all, "reply sent");
                self.publish(MailEvent::ReplySent {
                    id: id.clone(),
                    reply_all,
                });
                true
            }
            _ => false,
        }
    }

    pub async fn generate_reply(&self, message: &Message) -> Result<String, EmailError> {
        self.backend.generate_reply(message).await.map_err(|err| {
            tracing::error!(message_id = %message.id, "failed to generate reply: {err}");
            err
        })
    }

    /// Accept the pending suggestion. `Ok(false)` when the id is unknown or the
    /// request failed; `Err(NoSuggestion)` when nothing is pending.
    pub async fn accept_suggestion(&self, id: &MessageId) -> Result<bool, EmailError> {
        let result = self.backend.accept_suggestion(id).await;
        Ok(match settle("accept_suggestion", id, result)? {
            Some(category) => {
                tracing::info!(message_id = %id, %category, "accepted suggested category");
                self.publish(MailEvent::CategoryChanged {
                    id: id.clone(),
                    category,
                });
                true
            }
            None => false,
        })
    }

    pub async fn decline_suggestion(&self, id: &MessageId) -> bool {
        let result = self.backend.decline_suggestion(id).await;
        match settle("decline_suggestion", id, result) {
            Ok(Some(())) => {
                tracing::info!(message_id = %id, "declined suggested category");
                self.publish(MailEvent::SuggestionCleared(id.clone()));
                true
            }
            _ => false,
        }
    }

    /// Set the category by hand. The name is registered before the message is
    /// touched, even when the id turns out to be unknown.
    pub async fn edit_category(&self, id: &MessageId, category: &str) -> Result<bool, EmailError> {
        workflow::validate_category(category)?;
        self.categories.register(category).await;

        let result = self.backend.set_category(id, category).await;
        Ok(match settle("edit_category", id, result)? {
            Some(()) => {
                tracing::info!(message_id = %id, %category, "category updated");
                self.publish(MailEvent::CategoryChanged {
                    id: id.clone(),
                    category: category.to_string(),
                });
                true
            }
            None => false,
        })
    }

    fn publish(&self, event: MailEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Folds unknown ids and transport failures into `Ok(None)`; rejected
/// operations stay errors.
fn settle<T>(
    operation: &str,
    id: &MessageId,
    result: Result<T, EmailError>,
) -> Result<Option<T>, EmailError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(EmailError::NotFound(_)) => {
            tracing::debug!(message_id = %id, operation, "message not found");
            Ok(None)
        }
        Err(err) if err.is_request_failure() => {
            tracing::warn!(message_id = %id, operation, "request failed: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpBackend;
    use chrono::TimeZone;

    fn service() -> MailService {
        MailService::mock(
            Storage::seeded().expect("seed fixture"),
            AiService::default(),
            LatencyProfile::none(),
        )
    }

    fn offline() -> MailService {
        let backend = HttpBackend::new("http://127.0.0.1:9/api", std::time::Duration::from_secs(2))
            .expect("client");
        MailService::new(Arc::new(backend), CategoryRegistry::default())
    }

    #[tokio::test]
    async fn writes_are_visible_to_next_read() {
        let service = service();
        let id = MessageId::new("email-6");

        assert!(service.accept_suggestion(&id).await.unwrap());

        let work = service
            .list_by_folder_and_category(FolderFilter::Only(Folder::Inbox), Some("work"))
            .await;
        assert!(work.iter().any(|m| m.id == id));
    }

    #[tokio::test]
    async fn unknown_ids_yield_false() {
        let service = service();
        let missing = MessageId::new("nope");

        assert!(!service.mark_read(&missing).await);
        assert!(!service.send_reply(&missing, "hello", false).await);
        assert!(!service.decline_suggestion(&missing).await);
        assert!(!service.accept_suggestion(&missing).await.unwrap());
        assert!(!service.edit_category(&missing, "travel").await.unwrap());
        assert!(service.list_categories().await.contains(&"travel".to_string()));
    }

    #[tokio::test]
    async fn publishes_events_after_writes() {
        let service = service();
        let mut events = service.subscribe();

        service.mark_read(&MessageId::new("1")).await;
        service.send_reply(&MessageId::new("4"), "On it.", true).await;
        service.decline_suggestion(&MessageId::new("2")).await;

        assert_eq!(events.recv().await.unwrap(), MailEvent::Read(MessageId::new("1")));
        assert_eq!(
            events.recv().await.unwrap(),
            MailEvent::ReplySent {
                id: MessageId::new("4"),
                reply_all: true
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            MailEvent::SuggestionCleared(MessageId::new("2"))
        );
    }

    #[tokio::test]
    async fn failed_edit_publishes_nothing() {
        let service = service();
        let mut events = service.subscribe();

        assert!(matches!(
            service.edit_category(&MessageId::new("1"), "  ").await,
            Err(EmailError::EmptyCategory)
        ));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn folder_counts_reflect_read_state() {
        let service = service();
        let inbox_unread = |counts: &[FolderCount]| {
            counts
                .iter()
                .find(|c| c.folder == Folder::Inbox)
                .map(|c| c.unread)
        };

        let before = service.folder_counts().await;
        assert_eq!(inbox_unread(&before), Some(10));

        service.mark_read(&MessageId::new("1")).await;
        let after = service.folder_counts().await;
        assert_eq!(inbox_unread(&after), Some(9));
    }

    #[tokio::test]
    async fn unreplied_seed_excludes_answered_mail() {
        let service = service();
        let now = Utc.with_ymd_and_hms(2025, 4, 13, 0, 0, 0).unwrap();

        let ids: Vec<_> = service
            .find_unreplied(now, query::unreplied_threshold())
            .await
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();

        // "1" arrived 13.5 hours earlier, "2" already has a reply.
        assert_eq!(
            ids,
            [
                "3", "4", "5", "6", "email-1", "email-2", "email-3", "email-4", "email-5",
                "email-6", "email-7"
            ]
        );
    }

    #[tokio::test]
    async fn offline_backend_falls_back_to_defaults() {
        let service = offline();
        let id = MessageId::new("1");

        assert!(service.list_by_folder(FolderFilter::All).await.is_empty());
        assert!(!service.send_reply(&id, "hello", false).await);
        assert!(!service.decline_suggestion(&id).await);
        assert!(!service.accept_suggestion(&id).await.unwrap());
        assert!(!service.edit_category(&id, "travel").await.unwrap());
        assert!(service.find(&id).await.is_none());
    }

    #[tokio::test]
    async fn offline_reply_generation_propagates_error() {
        let service = offline();
        let message = service_message().await;
        assert!(service.generate_reply(&message).await.is_err());
    }

    async fn service_message() -> Message {
        service()
            .find(&MessageId::new("4"))
            .await
            .expect("seed message")
    }
}
