use crate::MailService;
use chrono::{DateTime, Duration, Utc};
use mailsort_core::{MailEvent, MessageId, UnrepliedSummary};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Keeps the list of inbox messages waiting too long for a reply.
///
/// The list is rebuilt on every scan; a sent reply drops its message right away
/// and then triggers a rescan.
#[derive(Clone)]
pub struct UnrepliedReminder {
    service: MailService,
    threshold: Duration,
    pending: Arc<RwLock<Vec<UnrepliedSummary>>>,
}

impl UnrepliedReminder {
    pub fn new(service: MailService, threshold: Duration) -> Self {
        Self {
            service,
            threshold,
            pending: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub async fn refresh(&self) -> usize {
        self.refresh_at(Utc::now()).await
    }

    pub async fn refresh_at(&self, reference: DateTime<Utc>) -> usize {
        let unreplied = self
            .service
            .find_unreplied(reference, self.threshold)
            .await
            .iter()
            .map(UnrepliedSummary::from)
            .collect::<Vec<_>>();
        let count = unreplied.len();

        *self.pending.write().await = unreplied;
        tracing::debug!(count, "unreplied scan finished");
        count
    }

    pub async fn pending(&self) -> Vec<UnrepliedSummary> {
        self.pending.read().await.clone()
    }

    /// Returns whether the message was listed.
    pub async fn dismiss(&self, id: &MessageId) -> bool {
        let mut guard = self.pending.write().await;
        let before = guard.len();
        guard.retain(|summary| &summary.id != id);
        guard.len() != before
    }

    /// Scans immediately, then every `interval` and after each sent reply.
    ///
    /// The task holds a clone of the service and with it the event sender, so the
    /// event channel stays open for as long as the task runs. Stop it with
    /// [`JoinHandle::abort`].
    pub fn spawn(self, interval: std::time::Duration) -> JoinHandle<()> {
        let mut events = self.service.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let count = self.refresh().await;
                        if count > 0 {
                            tracing::info!(count, "messages waiting for a reply");
                        }
                    }
                    event = events.recv() => match event {
                        Ok(MailEvent::ReplySent { id, .. }) => {
                            self.dismiss(&id).await;
                            self.refresh().await;
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "reminder fell behind mail events");
                            self.refresh().await;
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}
