use crate::http_api::HttpJsonApi;
use crate::models::Message;
use http::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// `GET /messages/`: every message the signed-in user sent or received.
pub struct ListMessages;

impl HttpJsonApi for ListMessages {
    type Request = ();
    type SuccessResponse = MessageList;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        std::iter::once(Cow::Borrowed("messages"))
    }
}

/// The collection is served either bare or wrapped in a page. Entries are
/// kept as raw JSON so one malformed message cannot reject the whole list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum MessageList {
    Plain(Vec<serde_json::Value>),
    Paginated { results: Vec<serde_json::Value> },
}

impl MessageList {
    /// Decodes every entry on its own, skipping the ones that do not parse.
    pub fn into_messages(self) -> Vec<Message> {
        let items = match self {
            MessageList::Plain(items) | MessageList::Paginated { results: items } => items,
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Message>(item) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    log::warn!("Skipping malformed message: {e}");
                    None
                }
            })
            .collect()
    }
}

#[derive(Serialize, Debug)]
pub struct CreateMessageRequest<'a> {
    pub receiver_username: &'a str,
    pub content: &'a str,
}

/// `POST /messages/`. Answers with the stored message.
pub struct CreateMessage<'a> {
    request: CreateMessageRequest<'a>,
}

impl<'a> CreateMessage<'a> {
    pub fn new(receiver_username: &'a str, content: &'a str) -> Self {
        Self {
            request: CreateMessageRequest {
                receiver_username,
                content,
            },
        }
    }
}

impl<'a> HttpJsonApi for CreateMessage<'a> {
    type Request = CreateMessageRequest<'a>;
    type SuccessResponse = Message;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        std::iter::once(Cow::Borrowed("messages"))
    }

    fn request(&self) -> Option<&Self::Request> {
        Some(&self.request)
    }
}
