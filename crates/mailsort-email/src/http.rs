use crate::{EmailError, MailBackend};
use async_trait::async_trait;
use mailsort_core::{FolderFilter, Message, MessageId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRequest<'a> {
    email_id: &'a MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendReplyRequest<'a> {
    email_id: &'a MessageId,
    content: &'a str,
    reply_all: bool,
}

#[derive(Debug, Serialize)]
struct GenerateReplyRequest<'a> {
    subject: &'a str,
    body: &'a str,
    sender: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateReplyResponse {
    reply: String,
}

/// Client for a mail API exposing `/emails`, `/accept-category`, `/decline-category`,
/// `/edit-category`, `/generate-reply` and `/send-reply`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EmailError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), EmailError> {
        self.http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl MailBackend for HttpBackend {
    async fn list_messages(
        &self,
        folder: FolderFilter,
        category: Option<&str>,
    ) -> Result<Vec<Message>, EmailError> {
        let mut request = self
            .http
            .get(self.endpoint("emails"))
            .query(&[("folder", folder.as_str())]);
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        let messages: Vec<Message> = request.send().await?.error_for_status()?.json().await?;

        // The server may ignore the category parameter.
        Ok(match category {
            Some(category) => messages
                .into_iter()
                .filter(|message| message.category == category)
                .collect(),
            None => messages,
        })
    }

    async fn accept_suggestion(&self, id: &MessageId) -> Result<String, EmailError> {
        let message = self
            .list_messages(FolderFilter::All, None)
            .await?
            .into_iter()
            .find(|message| &message.id == id)
            .ok_or_else(|| EmailError::NotFound(id.clone()))?;
        let suggestion = message
            .pending_suggestion()
            .ok_or_else(|| EmailError::NoSuggestion(id.clone()))?
            .to_string();

        self.post(
            "accept-category",
            &CategoryRequest {
                email_id: id,
                category: Some(&suggestion),
            },
        )
        .await?;
        Ok(suggestion)
    }

    async fn decline_suggestion(&self, id: &MessageId) -> Result<(), EmailError> {
        self.post(
            "decline-category",
            &CategoryRequest {
                email_id: id,
                category: None,
            },
        )
        .await
    }

    async fn set_category(&self, id: &MessageId, category: &str) -> Result<(), EmailError> {
        self.post(
            "edit-category",
            &CategoryRequest {
                email_id: id,
                category: Some(category),
            },
        )
        .await
    }

    async fn mark_read(&self, id: &MessageId) -> Result<(), EmailError> {
        // No read-state endpoint; the flag is tracked by the client.
        tracing::debug!(message_id = %id, "read state acknowledged locally");
        Ok(())
    }

    async fn send_reply(
        &self,
        id: &MessageId,
        content: &str,
        reply_all: bool,
    ) -> Result<(), EmailError> {
        self.post(
            "send-reply",
            &SendReplyRequest {
                email_id: id,
                content,
                reply_all,
            },
        )
        .await
    }

    async fn generate_reply(&self, message: &Message) -> Result<String, EmailError> {
        let response: GenerateReplyResponse = self
            .http
            .post(self.endpoint("generate-reply"))
            .json(&GenerateReplyRequest {
                subject: &message.subject,
                body: &message.body,
                sender: &message.sender.email,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.reply)
    }
}
