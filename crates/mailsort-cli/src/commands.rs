use crate::state::AppState;
use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use mailsort_core::{FolderFilter, Message, MessageId};
use mailsort_email::MailService;
use std::fmt::Write as _;

#[derive(Debug, Parser)]
#[command(name = "mailsort", no_binary_name = true, disable_version_flag = true)]
pub(crate) struct CommandLine {
    #[command(subcommand)]
    pub(crate) command: MailCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum MailCommand {
    /// List a folder ("all" for every folder)
    List {
        #[arg(default_value = "inbox")]
        folder: FolderFilter,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Search subject, sender and body
    Search {
        #[arg(long, default_value = "all")]
        folder: FolderFilter,
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Inbox messages still waiting for a reply
    Unreplied,
    /// Total and unread counts per folder
    Counts,
    /// Known categories
    Categories,
    /// Show a message and mark it read
    Read { id: MessageId },
    /// Accept the suggested category
    Accept { id: MessageId },
    /// Dismiss the suggested category
    Decline { id: MessageId },
    /// Set the category by hand
    Edit { id: MessageId, category: String },
    /// Generate a reply draft
    Draft { id: MessageId },
    /// Send a reply; the generated draft is used when no text is given
    Reply {
        id: MessageId,
        #[arg(long)]
        all: bool,
        content: Vec<String>,
    },
    /// Messages flagged by the background reminder
    Reminders,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

pub(crate) fn parse(line: &str) -> Result<MailCommand, clap::Error> {
    CommandLine::try_parse_from(split_words(line)).map(|parsed| parsed.command)
}

/// Whitespace split that keeps double-quoted runs together.
pub(crate) fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            ch => {
                current.push(ch);
                pending = true;
            }
        }
    }
    if pending {
        words.push(current);
    }
    words
}

pub(crate) async fn execute(state: &AppState, command: MailCommand) -> anyhow::Result<String> {
    let mail = &state.mail;
    match command {
        MailCommand::List {
            folder,
            category,
            search,
        } => {
            let messages = mail
                .list_by_folder_and_category(folder, category.as_deref())
                .await;
            let messages = match search {
                Some(query) => MailService::search(&messages, &query),
                None => messages,
            };
            Ok(format_listing(&messages))
        }
        MailCommand::Search { folder, query } => {
            let messages = mail.list_by_folder(folder).await;
            Ok(format_listing(&MailService::search(
                &messages,
                &query.join(" "),
            )))
        }
        MailCommand::Unreplied => {
            let messages = mail
                .find_unreplied(Utc::now(), state.reminder.threshold())
                .await;
            Ok(format_listing(&messages))
        }
        MailCommand::Counts => {
            let mut out = String::new();
            for count in mail.folder_counts().await {
                let _ = writeln!(
                    out,
                    "{:<8} {:>4} total {:>4} unread",
                    count.folder, count.total, count.unread
                );
            }
            Ok(out)
        }
        MailCommand::Categories => Ok(mail.list_categories().await.join("\n")),
        MailCommand::Read { id } => {
            let Some(message) = mail.find(&id).await else {
                bail!("no message with id {id}");
            };
            if !mail.mark_read(&id).await {
                tracing::warn!(%id, "could not mark message read");
            }
            Ok(format_message(&message))
        }
        MailCommand::Accept { id } => {
            if mail.accept_suggestion(&id).await? {
                Ok(format!("accepted suggestion for {id}"))
            } else {
                bail!("could not accept suggestion for {id}")
            }
        }
        MailCommand::Decline { id } => {
            if mail.decline_suggestion(&id).await {
                Ok(format!("declined suggestion for {id}"))
            } else {
                bail!("could not decline suggestion for {id}")
            }
        }
        MailCommand::Edit { id, category } => {
            if mail.edit_category(&id, &category).await? {
                Ok(format!("{id} filed under {category}"))
            } else {
                bail!("could not change category of {id}")
            }
        }
        MailCommand::Draft { id } => {
            let Some(message) = mail.find(&id).await else {
                bail!("no message with id {id}");
            };
            Ok(mail.generate_reply(&message).await?)
        }
        MailCommand::Reply { id, all, content } => {
            let content = if content.is_empty() {
                let Some(message) = mail.find(&id).await else {
                    bail!("no message with id {id}");
                };
                mail.generate_reply(&message).await?
            } else {
                content.join(" ")
            };
            if mail.send_reply(&id, &content, all).await {
                Ok(format!("reply sent for {id}"))
            } else {
                bail!("could not send reply for {id}")
            }
        }
        MailCommand::Reminders => {
            if !state.config.reminder.enabled {
                state.reminder.refresh().await;
            }
            let mut out = String::new();
            for summary in state.reminder.pending().await {
                let _ = writeln!(
                    out,
                    "{:<8} {} {:<10} {}",
                    summary.id,
                    summary.date.format("%Y-%m-%d %H:%M"),
                    summary.category,
                    summary.subject
                );
            }
            Ok(out)
        }
        MailCommand::Quit => Ok(String::new()),
    }
}

fn format_row(message: &Message) -> String {
    let marker = if message.read { ' ' } else { '*' };
    let mut row = format!(
        "{marker} {:<8} {} {:<16} {} [{}",
        message.id,
        message.date.format("%Y-%m-%d %H:%M"),
        message.sender.name,
        message.subject,
        message.category
    );
    if message.shows_suggestion() {
        if let Some(suggestion) = message.pending_suggestion() {
            let _ = write!(row, ", suggested: {suggestion}");
        }
    }
    row.push(']');
    row
}

fn format_listing(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "no messages".to_string();
    }
    messages
        .iter()
        .map(format_row)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_message(message: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "From:     {} <{}>", message.sender.name, message.sender.email);
    let _ = writeln!(out, "Subject:  {}", message.subject);
    let _ = writeln!(out, "Date:     {}", message.date.to_rfc2822());
    let _ = writeln!(out, "Folder:   {}", message.folder);
    let _ = writeln!(out, "Category: {}", message.category);
    if message.shows_suggestion() {
        if let Some(suggestion) = message.pending_suggestion() {
            let _ = writeln!(out, "Suggested category: {suggestion} (accept / decline)");
        }
    }
    out.push('\n');
    out.push_str(&message.body);
    out
}
