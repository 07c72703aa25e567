use crate::{workflow, EmailError};
use async_trait::async_trait;
use mailsort_ai::AiService;
use mailsort_core::{FolderFilter, Message, MessageId};
use mailsort_storage::Storage;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[async_trait]
pub trait MailBackend: Send + Sync {
    async fn list_messages(
        &self,
        folder: FolderFilter,
        category: Option<&str>,
    ) -> Result<Vec<Message>, EmailError>;

    /// Returns the category that was accepted.
    async fn accept_suggestion(&self, id: &MessageId) -> Result<String, EmailError>;

    async fn decline_suggestion(&self, id: &MessageId) -> Result<(), EmailError>;

    async fn set_category(&self, id: &MessageId, category: &str) -> Result<(), EmailError>;

    async fn mark_read(&self, id: &MessageId) -> Result<(), EmailError>;

    async fn send_reply(
        &self,
        id: &MessageId,
        content: &str,
        reply_all: bool,
    ) -> Result<(), EmailError>;

    async fn generate_reply(&self, message: &Message) -> Result<String, EmailError>;
}

/// Artificial delay applied by [`MockBackend`] to each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub generate_reply: Duration,
    pub accept: Duration,
    pub decline: Duration,
    pub edit: Duration,
    pub send_reply: Duration,
    pub mark_read: Duration,
}

impl LatencyProfile {
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            generate_reply: Duration::ZERO,
            accept: Duration::ZERO,
            decline: Duration::ZERO,
            edit: Duration::ZERO,
            send_reply: Duration::ZERO,
            mark_read: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(500),
            generate_reply: Duration::from_millis(1000),
            accept: Duration::from_millis(500),
            decline: Duration::from_millis(500),
            edit: Duration::from_millis(800),
            send_reply: Duration::ZERO,
            mark_read: Duration::ZERO,
        }
    }
}

/// In-memory backend over a [`Storage`] that simulates network latency.
///
/// Writes run as spawned tasks: the delay elapses first, then the mutation is
/// applied in one step. Dropping the caller's future does not cancel the write.
#[derive(Clone)]
pub struct MockBackend {
    storage: Storage,
    ai: AiService,
    latency: LatencyProfile,
}

impl MockBackend {
    pub fn new(storage: Storage, ai: AiService, latency: LatencyProfile) -> Self {
        Self {
            storage,
            ai,
            latency,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    async fn deferred<F, Fut, T>(&self, delay: Duration, op: F) -> Result<T, EmailError>
    where
        F: FnOnce(Storage) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, EmailError>> + Send + 'static,
        T: Send + 'static,
    {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            op(storage).await
        })
        .await
        .map_err(|err| EmailError::RequestFailed(format!("mock backend task failed: {err}")))?
    }
}

#[async_trait]
impl MailBackend for MockBackend {
    async fn list_messages(
        &self,
        folder: FolderFilter,
        category: Option<&str>,
    ) -> Result<Vec<Message>, EmailError> {
        if !self.latency.list.is_zero() {
            sleep(self.latency.list).await;
        }

        let messages = self
            .storage
            .messages()
            .list_matching(|message| {
                folder.matches(message.folder)
                    && category.map_or(true, |category| message.category == category)
            })
            .await;
        tracing::debug!(%folder, ?category, count = messages.len(), "listed messages");
        Ok(messages)
    }

    async fn accept_suggestion(&self, id: &MessageId) -> Result<String, EmailError> {
        let id = id.clone();
        self.deferred(self.latency.accept, move |storage| async move {
            match storage.messages().update(&id, workflow::accept).await {
                Some(accepted) => accepted,
                None => Err(EmailError::NotFound(id)),
            }
        })
        .await
    }

    async fn decline_suggestion(&self, id: &MessageId) -> Result<(), EmailError> {
        let id = id.clone();
        self.deferred(self.latency.decline, move |storage| async move {
            storage
                .messages()
                .update(&id, workflow::decline)
                .await
                .ok_or(EmailError::NotFound(id))
        })
        .await
    }

    async fn set_category(&self, id: &MessageId, category: &str) -> Result<(), EmailError> {
        let id = id.clone();
        let category = category.to_string();
        self.deferred(self.latency.edit, move |storage| async move {
            storage
                .messages()
                .update(&id, |message| workflow::recategorize(message, &category))
                .await
                .ok_or(EmailError::NotFound(id))
        })
        .await
    }

    async fn mark_read(&self, id: &MessageId) -> Result<(), EmailError> {
        let id = id.clone();
        self.deferred(self.latency.mark_read, move |storage| async move {
            storage
                .messages()
                .update(&id, workflow::mark_read)
                .await
                .ok_or(EmailError::NotFound(id))
        })
        .await
    }

    async fn send_reply(
        &self,
        id: &MessageId,
        _content: &str,
        reply_all: bool,
    ) -> Result<(), EmailError> {
        // The mock keeps no sent copy; only the replied flag changes.
        let id = id.clone();
        self.deferred(self.latency.send_reply, move |storage| async move {
            match storage.messages().update(&id, workflow::mark_replied).await {
                Some(()) => {
                    tracing::debug!(message_id = %id, reply_all, "reply recorded");
                    Ok(())
                }
                None => Err(EmailError::NotFound(id)),
            }
        })
        .await
    }

    async fn generate_reply(&self, message: &Message) -> Result<String, EmailError> {
        if !self.latency.generate_reply.is_zero() {
            sleep(self.latency.generate_reply).await;
        }
        Ok(self.ai.draft_reply(message))
    }
}
