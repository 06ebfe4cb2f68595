use crate::clock::Timestamp;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Display, From, Ord, PartialOrd, Eq, PartialEq, Hash,
)]
#[serde(transparent)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub project: Option<u64>,
    #[serde(default)]
    pub proposal: Option<u64>,
    #[serde(default)]
    pub related_message: Option<u64>,
}

pub fn count_unread<'a>(notifications: impl IntoIterator<Item = &'a Notification>) -> usize {
    notifications.into_iter().filter(|n| !n.read).count()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn decodes_server_payload() {
        let n: Notification = serde_json::from_value(notification_json(4, false)).unwrap();
        assert_eq!(n.id, NotificationId::from(4));
        assert_eq!(n.project, Some(3));
        assert!(!n.read);
    }

    #[test]
    fn counts_unread() {
        let list = [notification(1, false), notification(2, true), notification(3, false)];
        assert_eq!(count_unread(&list), 2);
    }
}
