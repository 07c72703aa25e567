use anyhow::Context;
use mailsort_ai::{AiRuntimeConfig, AiService};
use mailsort_config::{AppConfig, BackendKind, ConfigManager, LatencyConfig};
use mailsort_core::Message;
use mailsort_email::{HttpBackend, LatencyProfile, MailService, UnrepliedReminder};
use mailsort_storage::{CategoryRegistry, Storage};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) mail: MailService,
    pub(crate) reminder: UnrepliedReminder,
}

impl AppState {
    pub async fn initialize() -> anyhow::Result<Self> {
        let config_manager = ConfigManager::new().context("initialize config manager")?;
        let config = config_manager.load().context("load app config")?;
        tracing::info!(
            path = %config_manager.config_path().display(),
            profile = %config.profile_name,
            "loaded config"
        );
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let ai = AiService::new(ai_runtime_from_config(&config));

        let mail = match config.backend.kind {
            BackendKind::Mock => {
                let storage = match &config.seed.fixture_path {
                    Some(path) => Storage::from_fixture(path)
                        .with_context(|| format!("load fixture {}", path.display()))?,
                    None => Storage::seeded().context("load built-in mailbox")?,
                };
                if config.ai.suggest_missing {
                    let filled = suggest_missing(&storage, &ai).await;
                    if filled > 0 {
                        tracing::info!(filled, "suggested categories for uncategorized mail");
                    }
                }
                MailService::mock(storage, ai, latency_from_config(&config.latency))
            }
            BackendKind::Http => {
                let backend = HttpBackend::new(
                    config.backend.api_base_url.clone(),
                    config.backend.request_timeout(),
                )
                .context("build http client")?;
                tracing::info!(base_url = %backend.base_url(), "using http mail backend");
                MailService::new(Arc::new(backend), CategoryRegistry::default())
            }
        };

        let threshold = chrono::Duration::try_hours(config.reminder.threshold_hours)
            .with_context(|| {
                format!(
                    "reminder threshold of {} hours is out of range",
                    config.reminder.threshold_hours
                )
            })?;
        let reminder = UnrepliedReminder::new(mail.clone(), threshold);

        Ok(Self {
            config,
            mail,
            reminder,
        })
    }

    pub fn spawn_reminder(&self) -> Option<JoinHandle<()>> {
        if !self.config.reminder.enabled {
            return None;
        }

        let interval = Duration::from_secs(self.config.reminder.check_interval_secs);
        Some(self.reminder.clone().spawn(interval))
    }
}

fn ai_runtime_from_config(config: &AppConfig) -> AiRuntimeConfig {
    AiRuntimeConfig {
        signature: config.ai.signature.clone(),
    }
}

fn latency_from_config(latency: &LatencyConfig) -> LatencyProfile {
    LatencyProfile {
        list: Duration::from_millis(latency.list_ms),
        generate_reply: Duration::from_millis(latency.generate_reply_ms),
        accept: Duration::from_millis(latency.accept_ms),
        decline: Duration::from_millis(latency.decline_ms),
        edit: Duration::from_millis(latency.edit_ms),
        send_reply: Duration::from_millis(latency.send_reply_ms),
        mark_read: Duration::from_millis(latency.mark_read_ms),
    }
}

fn needs_suggestion(message: &Message) -> bool {
    !message.has_designated_category() && message.pending_suggestion().is_none()
}

/// Gives uncategorized messages without a suggestion a keyword-based one.
async fn suggest_missing(storage: &Storage, ai: &AiService) -> usize {
    let mut filled = 0;
    for message in storage.messages().list_matching(needs_suggestion).await {
        let Some(category) = ai.suggest_category(&message.subject, &message.body) else {
            continue;
        };

        let applied = storage
            .messages()
            .update(&message.id, |message| {
                if needs_suggestion(message) {
                    message.suggested_category = Some(category);
                    true
                } else {
                    false
                }
            })
            .await;
        if applied == Some(true) {
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mailsort_core::{Folder, MessageId, Sender, UNCATEGORIZED};

    fn message(id: &str, subject: &str, category: &str) -> Message {
        Message {
            id: MessageId::new(id),
            subject: subject.to_string(),
            body: String::new(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            folder: Folder::Inbox,
            category: category.to_string(),
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
    async fn fills_only_missing_suggestions() {
        let storage = Storage::new(vec![
            message("a", "Team meeting notes", UNCATEGORIZED),
            message("b", "Team meeting notes", "personal"),
            message("c", "Hello there", UNCATEGORIZED),
        ]);

        assert_eq!(suggest_missing(&storage, &AiService::default()).await, 1);

        for (id, expected) in [("a", Some("work")), ("b", None), ("c", None)] {
            let message = storage.messages().get(&MessageId::new(id)).await.unwrap();
            assert_eq!(message.suggested_category.as_deref(), expected, "message {id}");
        }
    }

    #[tokio::test]
    async fn builtin_mailbox_is_left_as_is() {
        let storage = Storage::seeded().unwrap();
        assert_eq!(suggest_missing(&storage, &AiService::default()).await, 0);
    }

    #[test]
    fn latency_maps_milliseconds() {
        let profile = latency_from_config(&LatencyConfig::default());
        assert_eq!(profile, LatencyProfile::default());
    }

    pub(crate) fn instant_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.reminder.enabled = false;
        config.latency = LatencyConfig {
            list_ms: 0,
            generate_reply_ms: 0,
            accept_ms: 0,
            decline_ms: 0,
            edit_ms: 0,
            send_reply_ms: 0,
            mark_read_ms: 0,
        };
        config
    }

    pub(crate) async fn instant_state() -> AppState {
        AppState::from_config(instant_config()).await.unwrap()
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_an_error() {
        let mut config = instant_config();
        config.reminder.threshold_hours = i64::MAX;

        let err = AppState::from_config(config).await.err().unwrap();
        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn mock_state_without_reminder() {
        let state = instant_state().await;
        assert!(state.spawn_reminder().is_none());
        assert_eq!(
            state
                .mail
                .list_by_folder(mailsort_core::FolderFilter::All)
                .await
                .len(),
            13
        );
    }
}
