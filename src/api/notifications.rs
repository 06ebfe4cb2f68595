use crate::http_api::HttpJsonApi;
use crate::models::{Notification, NotificationId};
use http::Method;
use serde::Deserialize;
use std::borrow::Cow;

/// `GET /notifications/`, optionally narrowed to unread ones.
pub struct ListNotifications {
    pub unread_only: bool,
}

impl HttpJsonApi for ListNotifications {
    type Request = ();
    type SuccessResponse = NotificationList;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        std::iter::once(Cow::Borrowed("notifications"))
    }

    fn queries(&self) -> impl Iterator<Item = (Cow<str>, Cow<str>)> {
        self.unread_only
            .then(|| (Cow::Borrowed("read"), Cow::Borrowed("false")))
            .into_iter()
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum NotificationList {
    Plain(Vec<Notification>),
    Paginated {
        count: Option<usize>,
        results: Vec<Notification>,
    },
    Counted {
        #[serde(alias = "unread_count")]
        count: usize,
    },
}

impl NotificationList {
    /// The number of entries the server reports, preferring an explicit count
    /// over the length of a (possibly truncated) page.
    pub fn reported_count(&self) -> usize {
        match self {
            NotificationList::Plain(items) => items.len(),
            NotificationList::Paginated { count, results } => count.unwrap_or(results.len()),
            NotificationList::Counted { count } => *count,
        }
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        match self {
            NotificationList::Plain(items) | NotificationList::Paginated { results: items, .. } => {
                items
            }
            NotificationList::Counted { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFlag {
    Read,
    Unread,
}

/// `PATCH /notifications/{id}/mark_read/` or `.../mark_unread/`.
pub struct MarkNotification {
    pub id: NotificationId,
    pub flag: ReadFlag,
}

impl HttpJsonApi for MarkNotification {
    type Request = ();
    type SuccessResponse = serde_json::Value;

    fn method(&self) -> Method {
        Method::PATCH
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        let action = match self.flag {
            ReadFlag::Read => "mark_read",
            ReadFlag::Unread => "mark_unread",
        };

        [
            Cow::Borrowed("notifications"),
            Cow::Owned(self.id.to_string()),
            Cow::Borrowed(action),
        ]
        .into_iter()
    }
}

/// `POST /notifications/mark-all-read/`.
pub struct MarkAllRead;

impl HttpJsonApi for MarkAllRead {
    type Request = ();
    type SuccessResponse = serde_json::Value;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path_segments(&self) -> impl Iterator<Item = Cow<str>> {
        [Cow::Borrowed("notifications"), Cow::Borrowed("mark-all-read")].into_iter()
    }
}
