use crate::api::ApiClient;
use crate::config::ConnectionConfig;
use crate::session::Session;
use crate::worker::{Acknowledge, MessageSynchronizer, NotificationSynchronizer};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

mod api;
mod cli;
mod clock;
mod config;
mod http_api;
mod models;
mod session;
mod utils;
mod worker;

#[derive(Parser, Debug)]
#[command(version, about = "Keeps marketplace conversations and notifications in sync")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionConfig,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow your conversations and send messages from stdin
    Chat {
        /// Open the conversation with this user first
        #[clap(short, long)]
        with: Option<String>,
    },
    /// List conversations once
    Conversations,
    /// Send a single message
    Send { to: String, text: String },
    /// List notifications, optionally following the unread count
    Notifications {
        #[clap(short, long)]
        watch: bool,
    },
    /// Mark a notification (or "all") as read
    Ack {
        #[clap(value_parser = cli::parse_acknowledge)]
        target: Acknowledge,
    },
    /// Mark a notification as unread again
    Unread { id: u64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let Cli {
        connection,
        commands,
    } = Cli::parse();

    let client = ApiClient::new(
        connection.http_client()?,
        connection.base_url()?,
        Session::new(connection.credentials()),
    );
    let me = connection.username.as_str();

    match commands {
        Commands::Chat { with } => {
            let sync = MessageSynchronizer::new(&client, me);
            cli::chat(
                &sync,
                me,
                with.as_deref(),
                client.session().subscribe(),
                connection.message_poll_interval(),
            )
            .await
        }

        Commands::Conversations => {
            let sync = MessageSynchronizer::new(&client, me);
            sync.refresh(true).await;

            let state = sync.snapshot();
            if let Some(error) = state.error {
                bail!(error);
            }
            cli::print_conversations(&state);
            Ok(())
        }

        Commands::Send { to, text } => {
            let sync = MessageSynchronizer::new(&client, me);
            match sync.send(&to, &text).await? {
                Some(sent) => println!("Sent #{} to {to}", sent.id),
                None => bail!("Nothing to send"),
            }
            Ok(())
        }

        Commands::Notifications { watch } => {
            let sync = NotificationSynchronizer::new(&client);
            sync.open_panel().await;
            cli::print_notifications(&sync.snapshot());
            sync.close_panel();

            if watch {
                cli::watch_notifications(
                    &sync,
                    client.session().subscribe(),
                    connection.notification_poll_interval(),
                )
                .await?;
            }
            Ok(())
        }

        Commands::Ack { target } => {
            let sync = NotificationSynchronizer::new(&client);
            sync.acknowledge(target)
                .await
                .with_context(|| format!("Acknowledging {target:?}"))
        }

        Commands::Unread { id } => {
            let sync = NotificationSynchronizer::new(&client);
            sync.mark_unread(id.into())
                .await
                .with_context(|| format!("Marking notification {id} unread"))
        }
    }
}
