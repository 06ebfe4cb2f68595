use super::Message;
use derive_more::Deref;
use std::collections::BTreeMap;

/// Messages partitioned by counterparty, each bucket unique by id and
/// ordered by timestamp ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Conversations(BTreeMap<String, Vec<Message>>);

impl Conversations {
    /// Builds the conversation map for `me` from a flat message list.
    /// Messages without a resolvable counterparty are skipped.
    pub fn group(me: &str, messages: impl IntoIterator<Item = Message>) -> Self {
        let mut conversations = Self::default();
        for msg in messages {
            let Some(counterparty) = msg.counterparty(me).map(str::to_string) else {
                log::warn!(
                    "Skipping message {} with missing sender or receiver",
                    msg.id
                );
                continue;
            };

            conversations.insert(&counterparty, msg);
        }

        for bucket in conversations.0.values_mut() {
            sort_chronologically(bucket);
        }

        conversations
    }

    /// Inserts `msg` into the bucket for `counterparty` unless a message with
    /// the same id is already there, then re-sorts the bucket. Returns whether
    /// the message was new.
    pub fn merge(&mut self, counterparty: &str, msg: Message) -> bool {
        let inserted = self.insert(counterparty, msg);
        if let Some(bucket) = self.0.get_mut(counterparty) {
            sort_chronologically(bucket);
        }
        inserted
    }

    /// Makes sure a (possibly empty) bucket exists for `counterparty`.
    pub fn ensure(&mut self, counterparty: &str) {
        self.0.entry(counterparty.to_string()).or_default();
    }

    pub fn messages_with(&self, counterparty: &str) -> &[Message] {
        self.0.get(counterparty).map(Vec::as_slice).unwrap_or_default()
    }

    /// The counterparty whose latest message is the newest overall.
    pub fn most_recently_active(&self) -> Option<&str> {
        self.0
            .iter()
            .filter_map(|(who, bucket)| Some((who, bucket.last()?.timestamp)))
            .max_by_key(|(_, last)| *last)
            .map(|(who, _)| who.as_str())
    }

    fn insert(&mut self, counterparty: &str, msg: Message) -> bool {
        let bucket = self.0.entry(counterparty.to_string()).or_default();
        if bucket.iter().any(|m| m.id == msg.id) {
            return false;
        }

        bucket.push(msg);
        true
    }
}

fn sort_chronologically(bucket: &mut [Message]) {
    bucket.sort_by_key(|m| m.timestamp);
}
