use thiserror::Error;
use tokio::sync::watch;

use super::PollTimer;
use crate::api::messages::{CreateMessage, ListMessages};
use crate::api::{ApiClient, ApiError};
use crate::http_api::HttpCallSource;
use crate::models::{Conversations, Message};
use crate::utils::NonEmptyString;

pub const LOAD_FAILED: &str = "Failed to load messages.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub conversations: Conversations,
    /// The counterparty whose conversation is open.
    pub selected: Option<String>,
    pub loading: bool,
    /// Last error worth showing to the user.
    pub error: Option<String>,
}

impl ChatState {
    pub fn selected_messages(&self) -> &[Message] {
        self.selected
            .as_deref()
            .map(|who| self.conversations.messages_with(who))
            .unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Receiver: {0}")]
    Receiver(String),

    #[error("Message: {0}")]
    Content(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to send message.")]
    Failed(#[source] ApiError),
}

impl From<ApiError> for SendError {
    fn from(value: ApiError) -> Self {
        let ApiError::Validation(fields) = value else {
            return SendError::Failed(value);
        };

        if let Some(msg) = fields.field("receiver_username") {
            SendError::Receiver(msg)
        } else if let Some(msg) = fields.field("content") {
            SendError::Content(msg)
        } else if !fields.is_empty() {
            SendError::Rejected(fields.to_string())
        } else {
            SendError::Failed(ApiError::Validation(fields))
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartConversationError {
    #[error("Enter a username to start a conversation.")]
    Blank,

    #[error("You cannot start a conversation with yourself.")]
    SelfChat,
}

/// Keeps the signed-in user's conversations in step with `GET /messages/`.
///
/// Every refresh rebuilds the whole conversation map from the server's
/// answer. Sent messages are merged in as soon as the server accepts them, so
/// they show up before the next refresh; merging by id keeps the later server
/// echo from duplicating them.
pub struct MessageSynchronizer<'a, CS> {
    client: &'a ApiClient<CS>,
    me: String,
    state: watch::Sender<ChatState>,
}

impl<'a, CS: HttpCallSource> MessageSynchronizer<'a, CS> {
    pub fn new(client: &'a ApiClient<CS>, me: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self {
            client,
            me: me.into(),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Refreshes once immediately, then on every tick until the timer's
    /// handle is dropped.
    pub async fn run(&self, mut timer: PollTimer) {
        log::info!("Start syncing messages for {}", self.me);

        let mut initial = true;
        while timer.tick().await {
            self.refresh(initial).await;
            initial = false;
        }

        log::info!("Stop syncing messages for {}", self.me);
    }

    pub async fn refresh(&self, initial: bool) {
        if initial {
            self.state.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });
        }

        let messages = match self.client.call(&ListMessages).await {
            Ok(list) => list.into_messages(),
            Err(e) if initial => {
                log::error!("Error loading messages: {e}");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(LOAD_FAILED.to_string());
                });
                return;
            }
            Err(e) => {
                log::warn!("Background message refresh failed: {e}");
                return;
            }
        };

        let total = messages.len();
        let conversations = Conversations::group(&self.me, messages);
        log::debug!(
            "Fetched {total} messages across {} conversations",
            conversations.len()
        );

        self.state.send_modify(|s| {
            s.conversations = conversations;
            s.loading = false;
            s.error = None;
            if s.selected.is_none() {
                s.selected = s.conversations.most_recently_active().map(str::to_string);
            }
        });
    }

    /// Sends `text` to `counterparty`. Blank text or a blank counterparty is
    /// a no-op. On failure nothing local changes and `text` stays with the
    /// caller for a retry.
    pub async fn send(&self, counterparty: &str, text: &str) -> Result<Option<Message>, SendError> {
        let (Some(counterparty), Some(content)) = (
            NonEmptyString::trimmed(counterparty),
            NonEmptyString::trimmed(text),
        ) else {
            return Ok(None);
        };

        let sent = self
            .client
            .call(&CreateMessage::new(counterparty.as_str(), content.as_str()))
            .await
            .inspect_err(|e| log::error!("Error sending message to {counterparty}: {e}"))?;

        self.state.send_modify(|s| {
            let bucket = sent.counterparty(&self.me).unwrap_or(counterparty.as_str());
            s.conversations.merge(bucket, sent.clone());
        });

        Ok(Some(sent))
    }

    /// Opens a conversation with `counterparty` without touching the network.
    pub fn start_conversation(&self, counterparty: &str) -> Result<(), StartConversationError> {
        let counterparty =
            NonEmptyString::trimmed(counterparty).ok_or(StartConversationError::Blank)?;
        if counterparty.as_str() == self.me {
            return Err(StartConversationError::SelfChat);
        }

        self.state.send_modify(|s| {
            s.conversations.ensure(counterparty.as_str());
            s.selected = Some(counterparty.into_inner());
        });

        Ok(())
    }

    pub fn select(&self, counterparty: &str) {
        self.state.send_if_modified(|s| {
            if s.selected.as_deref() == Some(counterparty) {
                return false;
            }

            s.selected = Some(counterparty.to_string());
            true
        });
    }
}
