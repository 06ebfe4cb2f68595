use crate::clock::Timestamp;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Display, From, Ord, PartialOrd, Eq, PartialEq, Hash,
)]
#[serde(transparent)]
pub struct MessageId(u64);

/// A chat message as served by `GET /messages/`. Never edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    pub content: String,
    pub timestamp: Timestamp,
}

impl Message {
    /// The participant that is not `me`. `None` when either side of the
    /// message is missing.
    pub fn counterparty(&self, me: &str) -> Option<&str> {
        let sender = self.sender.as_deref().filter(|s| !s.trim().is_empty())?;
        let receiver = self.receiver.as_deref().filter(|s| !s.trim().is_empty())?;

        if sender == me {
            Some(receiver)
        } else {
            Some(sender)
        }
    }

    pub fn is_from(&self, who: &str) -> bool {
        self.sender.as_deref() == Some(who)
    }
}
