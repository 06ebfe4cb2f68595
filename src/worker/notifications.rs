use tokio::sync::watch;

use super::PollTimer;
use crate::api::notifications::{ListNotifications, MarkAllRead, MarkNotification, ReadFlag};
use crate::api::ApiClient;
use crate::http_api::HttpCallSource;
use crate::models::{count_unread, Notification, NotificationId};

pub const MARK_READ_FAILED: &str = "Failed to mark notification as read.";
pub const MARK_ALL_READ_FAILED: &str = "Failed to mark all notifications as read.";
pub const MARK_UNREAD_FAILED: &str = "Failed to mark notification as unread.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub unread_count: usize,
    pub notifications: Vec<Notification>,
    pub panel_open: bool,
    pub panel_loading: bool,
    pub alert: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledge {
    One(NotificationId),
    All,
}

/// Tracks the unread badge and the notification panel.
///
/// Whatever completes last wins: a poll result, a panel fetch, or a local
/// adjustment after an acknowledgement all overwrite the count.
pub struct NotificationSynchronizer<'a, CS> {
    client: &'a ApiClient<CS>,
    state: watch::Sender<NotificationState>,
}

impl<'a, CS: HttpCallSource> NotificationSynchronizer<'a, CS> {
    pub fn new(client: &'a ApiClient<CS>) -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        Self { client, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    pub async fn run(&self, mut timer: PollTimer) {
        log::info!("Start polling unread notifications");
        while timer.tick().await {
            self.poll_unread_count().await;
        }
        log::info!("Stop polling unread notifications");
    }

    pub async fn poll_unread_count(&self) {
        let count = match self.client.call(&ListNotifications { unread_only: true }).await {
            Ok(list) => list.reported_count(),
            Err(e) => {
                log::warn!("Polling unread notifications failed: {e}");
                return;
            }
        };

        self.state.send_if_modified(|s| {
            if s.unread_count == count {
                return false;
            }

            log::debug!("Unread notifications: {} -> {count}", s.unread_count);
            s.unread_count = count;
            true
        });
    }

    pub async fn open_panel(&self) {
        self.state.send_modify(|s| {
            s.panel_open = true;
            s.panel_loading = true;
        });

        match self.client.call(&ListNotifications { unread_only: false }).await {
            Ok(list) => {
                let notifications = list.into_notifications();
                self.state.send_modify(|s| {
                    s.unread_count = count_unread(&notifications);
                    s.notifications = notifications;
                    s.panel_loading = false;
                });
            }
            Err(e) => {
                log::error!("Error fetching notifications: {e}");
                self.state.send_modify(|s| s.panel_loading = false);
            }
        }
    }

    pub fn close_panel(&self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.panel_open, false));
    }

    /// Marks one or all notifications read on the server, then locally. On
    /// failure only the alert changes.
    pub async fn acknowledge(&self, ack: Acknowledge) -> crate::api::Result<()> {
        let result = match ack {
            Acknowledge::One(id) => self
                .client
                .call(&MarkNotification {
                    id,
                    flag: ReadFlag::Read,
                })
                .await
                .map(|_| ()),
            Acknowledge::All => self.client.call(&MarkAllRead).await.map(|_| ()),
        };

        if let Err(e) = result {
            log::error!("Error acknowledging {ack:?}: {e}");
            let alert = match ack {
                Acknowledge::One(_) => MARK_READ_FAILED,
                Acknowledge::All => MARK_ALL_READ_FAILED,
            };
            self.state.send_modify(|s| s.alert = Some(alert.to_string()));
            return Err(e);
        }

        self.state.send_modify(|s| {
            s.alert = None;
            match ack {
                Acknowledge::One(id) => {
                    let was_unread = match s.notifications.iter_mut().find(|n| n.id == id) {
                        Some(n) => !std::mem::replace(&mut n.read, true),
                        None => true,
                    };

                    if was_unread {
                        s.unread_count = s.unread_count.saturating_sub(1);
                    }
                }
                Acknowledge::All => {
                    s.notifications.iter_mut().for_each(|n| n.read = true);
                    s.unread_count = 0;
                }
            }
        });

        Ok(())
    }

    pub async fn mark_unread(&self, id: NotificationId) -> crate::api::Result<()> {
        if let Err(e) = self
            .client
            .call(&MarkNotification {
                id,
                flag: ReadFlag::Unread,
            })
            .await
        {
            log::error!("Error marking notification {id} unread: {e}");
            self.state
                .send_modify(|s| s.alert = Some(MARK_UNREAD_FAILED.to_string()));
            return Err(e);
        }

        self.state.send_modify(|s| {
            s.alert = None;
            if let Some(n) = s.notifications.iter_mut().find(|n| n.id == id) {
                if std::mem::replace(&mut n.read, false) {
                    s.unread_count += 1;
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::fixtures::client;
    use crate::http_api::testing::{FakeCallSource, FakeError};
    use crate::models::fixtures::notification_json;
    use http::StatusCode;
    use serde_json::json;

    const UNREAD: &str = "GET /notifications/?read=false";
    const ALL: &str = "GET /notifications/";
    const MARK_ALL: &str = "POST /notifications/mark-all-read/";

    fn mark_read(id: u64) -> String {
        format!("PATCH /notifications/{id}/mark_read/")
    }

    fn source<'a>(sync: &NotificationSynchronizer<'a, FakeCallSource>) -> &'a FakeCallSource {
        sync.client.source()
    }

    #[tokio::test]
    async fn poll_updates_only_on_change() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(
                UNREAD,
                StatusCode::OK,
                json!([notification_json(1, false), notification_json(2, false)]),
            )
            .respond(UNREAD, StatusCode::OK, json!({"count": 2, "results": []}))
            .respond(UNREAD, StatusCode::OK, json!({"unread_count": 0}));

        let mut rx = sync.subscribe();

        sync.poll_unread_count().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().unread_count, 2);

        sync.poll_unread_count().await;
        assert!(!rx.has_changed().unwrap());

        sync.poll_unread_count().await;
        assert_eq!(rx.borrow_and_update().unread_count, 0);
    }

    #[tokio::test]
    async fn poll_failure_keeps_count() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(UNREAD, StatusCode::OK, json!([notification_json(1, false)]))
            .fail(UNREAD, FakeError::TimedOut);

        sync.poll_unread_count().await;
        sync.poll_unread_count().await;

        let state = sync.snapshot();
        assert_eq!(state.unread_count, 1);
        assert_eq!(state.alert, None);
    }

    #[tokio::test]
    async fn panel_fetch_recounts_unread() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(UNREAD, StatusCode::OK, json!({"count": 7}))
            .respond(
                ALL,
                StatusCode::OK,
                json!([
                    notification_json(1, false),
                    notification_json(2, true),
                    notification_json(3, true)
                ]),
            );

        sync.poll_unread_count().await;
        assert_eq!(sync.snapshot().unread_count, 7);

        sync.open_panel().await;
        let state = sync.snapshot();
        assert!(state.panel_open);
        assert!(!state.panel_loading);
        assert_eq!(state.notifications.len(), 3);
        assert_eq!(state.unread_count, 1);

        sync.close_panel();
        assert!(!sync.snapshot().panel_open);
        assert_eq!(source(&sync).calls().len(), 2);
    }

    #[tokio::test]
    async fn panel_fetch_failure_stops_loading() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync).fail(ALL, FakeError::TimedOut);

        sync.open_panel().await;

        let state = sync.snapshot();
        assert!(state.panel_open);
        assert!(!state.panel_loading);
    }

    #[tokio::test]
    async fn acknowledge_one_flips_and_decrements() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(
                ALL,
                StatusCode::OK,
                json!([notification_json(1, false), notification_json(2, false)]),
            )
            .respond(&mark_read(1), StatusCode::OK, notification_json(1, true));

        sync.open_panel().await;
        sync.acknowledge(Acknowledge::One(1.into())).await.unwrap();

        let state = sync.snapshot();
        assert!(state.notifications[0].read);
        assert!(!state.notifications[1].read);
        assert_eq!(state.unread_count, 1);
    }

    #[tokio::test]
    async fn acknowledge_never_goes_below_zero() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(&mark_read(9), StatusCode::OK, json!({}))
            .respond(&mark_read(9), StatusCode::OK, json!({}));

        sync.acknowledge(Acknowledge::One(9.into())).await.unwrap();
        sync.acknowledge(Acknowledge::One(9.into())).await.unwrap();

        assert_eq!(sync.snapshot().unread_count, 0);
    }

    #[tokio::test]
    async fn acknowledge_failure_alerts_without_mutation() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(ALL, StatusCode::OK, json!([notification_json(1, false)]))
            .respond(&mark_read(1), StatusCode::NOT_FOUND, json!({"detail": "Not found."}))
            .fail(MARK_ALL, FakeError::TimedOut);

        sync.open_panel().await;

        assert!(sync.acknowledge(Acknowledge::One(1.into())).await.is_err());
        let state = sync.snapshot();
        assert_eq!(state.alert.as_deref(), Some(MARK_READ_FAILED));
        assert!(!state.notifications[0].read);
        assert_eq!(state.unread_count, 1);

        assert!(sync.acknowledge(Acknowledge::All).await.is_err());
        let state = sync.snapshot();
        assert_eq!(state.alert.as_deref(), Some(MARK_ALL_READ_FAILED));
        assert_eq!(state.unread_count, 1);
    }

    #[tokio::test]
    async fn acknowledge_all_zeroes() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(
                ALL,
                StatusCode::OK,
                json!({"count": 2, "results": [notification_json(1, false), notification_json(2, false)]}),
            )
            .respond(
                MARK_ALL,
                StatusCode::OK,
                json!({"status": "All notifications marked as read"}),
            );

        sync.open_panel().await;
        sync.acknowledge(Acknowledge::All).await.unwrap();

        let state = sync.snapshot();
        assert!(state.notifications.iter().all(|n| n.read));
        assert_eq!(state.unread_count, 0);
        assert_eq!(source(&sync).calls_to(MARK_ALL), 1);
    }

    #[tokio::test]
    async fn mark_unread_restores_count() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(ALL, StatusCode::OK, json!([notification_json(4, true)]))
            .respond(
                "PATCH /notifications/4/mark_unread/",
                StatusCode::OK,
                notification_json(4, false),
            );

        sync.open_panel().await;
        assert_eq!(sync.snapshot().unread_count, 0);

        sync.mark_unread(4.into()).await.unwrap();
        let state = sync.snapshot();
        assert!(!state.notifications[0].read);
        assert_eq!(state.unread_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_polls_until_cancelled() {
        let client = client();
        let sync = NotificationSynchronizer::new(&client);
        source(&sync)
            .respond(UNREAD, StatusCode::OK, json!([]))
            .respond(UNREAD, StatusCode::OK, json!([notification_json(1, false)]));

        let (handle, timer) = super::super::poll_timer(std::time::Duration::from_secs(30));
        let mut rx = sync.subscribe();

        let observe = async {
            rx.wait_for(|s| s.unread_count == 1).await.unwrap();
            handle.cancel();
        };

        tokio::join!(sync.run(timer), observe);

        assert_eq!(source(&sync).calls_to(UNREAD), 2);
    }
}
