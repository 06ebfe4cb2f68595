use anyhow::{bail, Context};
use std::collections::HashSet;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tokio::sync::watch;

use crate::http_api::HttpCallSource;
use crate::models::{Message, MessageId, Notification};
use crate::session::SessionState;
use crate::worker::{
    poll_timer, Acknowledge, ChatState, MessageSynchronizer, NotificationState,
    NotificationSynchronizer, PollHandle,
};

pub fn parse_acknowledge(s: &str) -> Result<Acknowledge, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(Acknowledge::All);
    }

    s.parse::<u64>()
        .map(|id| Acknowledge::One(id.into()))
        .map_err(|_| format!("expected a notification id or \"all\", got {s:?}"))
}

fn format_message(msg: &Message, me: &str) -> String {
    let who = if msg.is_from(me) {
        "you"
    } else {
        msg.sender.as_deref().unwrap_or("?")
    };
    format!("[{}] {who}: {}", msg.timestamp.local_time_label(), msg.content)
}

pub fn print_conversations(state: &ChatState) {
    if state.conversations.is_empty() {
        println!("No conversations yet.");
        return;
    }

    for (who, messages) in state.conversations.iter() {
        let marker = if state.selected.as_deref() == Some(who.as_str()) {
            '*'
        } else {
            ' '
        };

        match messages.last() {
            Some(last) => println!("{marker} {who} ({}): {}", messages.len(), last.content),
            None => println!("{marker} {who} (new)"),
        }
    }
}

pub fn print_notifications(state: &NotificationState) {
    if let Some(alert) = &state.alert {
        eprintln!("! {alert}");
    }

    if state.panel_open && state.panel_loading {
        println!("Loading notifications...");
        return;
    }

    println!("{} unread", state.unread_count);
    for n in &state.notifications {
        let flag = if n.read { ' ' } else { '•' };
        println!(
            "{flag} #{} [{}] {}{}",
            n.id,
            n.timestamp.local_time_label(),
            n.message,
            notification_refs(n)
        );
    }
}

fn notification_refs(n: &Notification) -> String {
    [
        ("project", n.project),
        ("proposal", n.proposal),
        ("message", n.related_message),
    ]
    .into_iter()
    .filter_map(|(label, id)| Some(format!(" ({label} #{})", id?)))
    .collect()
}

/// Incrementally prints the open conversation as the synchronizer's state
/// changes.
#[derive(Default)]
struct ConversationPrinter {
    selected: Option<String>,
    shown: HashSet<MessageId>,
    error: Option<String>,
    loading: bool,
}

impl ConversationPrinter {
    fn print(&mut self, state: &ChatState, me: &str) {
        if state.loading && !self.loading {
            println!("Loading messages...");
        }
        self.loading = state.loading;

        if state.error != self.error {
            if let Some(error) = &state.error {
                eprintln!("! {error}");
            }
            self.error = state.error.clone();
        }

        if state.selected != self.selected {
            self.selected = state.selected.clone();
            self.shown.clear();
            if let Some(who) = &self.selected {
                println!("--- conversation with {who} ---");
            }
        }

        for msg in state.selected_messages() {
            if self.shown.insert(msg.id) {
                println!("{}", format_message(msg, me));
            }
        }
    }
}

async fn render(mut rx: watch::Receiver<ChatState>, me: &str) -> anyhow::Result<()> {
    let mut printer = ConversationPrinter::default();
    loop {
        printer.print(&rx.borrow_and_update(), me);
        rx.changed().await.context("Message synchronizer stopped")?;
    }
}

async fn read_input<CS: HttpCallSource>(
    sync: &MessageSynchronizer<'_, CS>,
    handle: PollHandle,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut unsent: Option<String> = None;

    while let Some(line) = lines.next_line().await.context("Reading input")? {
        let line = line.trim();
        let text = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/list", _) => {
                print_conversations(&sync.snapshot());
                continue;
            }
            ("/open", who) => {
                if sync.snapshot().conversations.contains_key(who.trim()) {
                    sync.select(who.trim());
                } else {
                    eprintln!("! No conversation with {who:?}, use /with to start one");
                }
                continue;
            }
            ("/with", who) => {
                if let Err(e) = sync.start_conversation(who) {
                    eprintln!("! {e}");
                }
                continue;
            }
            ("/retry", _) => match unsent.take() {
                Some(text) => text,
                None => {
                    eprintln!("! Nothing to retry");
                    continue;
                }
            },
            _ => line.to_string(),
        };

        let Some(to) = sync.snapshot().selected else {
            eprintln!("! Pick a conversation first with /with <username>");
            unsent = Some(text);
            continue;
        };

        if let Err(e) = sync.send(&to, &text).await {
            eprintln!("! {e} (type /retry to send it again)");
            unsent = Some(text);
        }
    }

    handle.cancel();
    Ok(())
}

pub async fn chat<CS: HttpCallSource>(
    sync: &MessageSynchronizer<'_, CS>,
    me: &str,
    with: Option<&str>,
    session: watch::Receiver<SessionState>,
    poll_interval: Duration,
) -> anyhow::Result<()> {
    if let Some(with) = with {
        sync.start_conversation(with)?;
    }

    println!("Commands: /with <username>, /open <username>, /list, /retry, /quit. Anything else is sent.");

    let (handle, timer) = poll_timer(poll_interval);
    let ui = async {
        select! {
            r = read_input(sync, handle) => r,
            r = render(sync.subscribe(), me) => r,
            _ = signed_out(session) => bail!("Session expired, please sign in again"),
        }
    };

    let ((), result) = tokio::join!(sync.run(timer), ui);
    result
}

pub async fn watch_notifications<CS: HttpCallSource>(
    sync: &NotificationSynchronizer<'_, CS>,
    session: watch::Receiver<SessionState>,
    poll_interval: Duration,
) -> anyhow::Result<()> {
    let (handle, timer) = poll_timer(poll_interval);

    let stop = async {
        let result = select! {
            r = print_unread_changes(sync.subscribe()) => r,
            r = tokio::signal::ctrl_c() => r.context("Waiting for Ctrl-C"),
            _ = signed_out(session) => Err(anyhow::anyhow!("Session expired, please sign in again")),
        };
        handle.cancel();
        result
    };

    let ((), result) = tokio::join!(sync.run(timer), stop);
    result
}

async fn print_unread_changes(mut rx: watch::Receiver<NotificationState>) -> anyhow::Result<()> {
    loop {
        rx.changed()
            .await
            .context("Notification synchronizer stopped")?;
        println!("{} unread", rx.borrow_and_update().unread_count);
    }
}

async fn signed_out(mut session: watch::Receiver<SessionState>) {
    let _ = session.wait_for(|s| *s == SessionState::SignedOut).await;
}
