//! Notify command implementation.
//!
//! Reads the JSON-line result stream and publishes the expired, non-silenced
//! results as one notification. Delivery failures are logged and do not
//! change the exit status.

use std::io;

use chrono::{DateTime, Utc};
use tally_store::query::QueryOutput;
use tracing::{debug, error, info};

use super::config::{Config, DEFAULT_NOTIFY_SERVER};
use super::display::{filter_results, read_results, sort_results};
use super::{CommandContext, CommandError, Result};
use crate::cli::{SortKey, SortOrder};
use crate::notify::NotifyClient;
use crate::output::format_notification_line;
use crate::silence::SilenceList;

/// Options for the notify command.
#[derive(Debug, Clone, Default)]
pub struct NotifyOptions {
    /// Topic from `--topic` or `TALLY_NOTIFY_TOPIC`.
    pub topic: Option<String>,
    /// Server from `--server` or `TALLY_NOTIFY_SERVER`.
    pub server: Option<String>,
    /// Print the message instead of sending it.
    pub dry_run: bool,
}

/// A resolved notification target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub server: String,
    pub topic: String,
}

impl NotifyOptions {
    /// Resolves the target, falling back to the config file and then the
    /// default server.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if no topic is set anywhere.
    pub fn resolve(&self, config: &Config) -> Result<Target> {
        let topic = self
            .topic
            .clone()
            .or_else(|| config.notify.topic.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CommandError::Config(
                    "notification topic is not set (use --topic, TALLY_NOTIFY_TOPIC or [notify] topic)"
                        .to_string(),
                )
            })?;

        let server = self
            .server
            .clone()
            .or_else(|| config.notify.server.clone())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFY_SERVER.to_string());

        Ok(Target { server, topic })
    }
}

/// A notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
}

/// Builds the message for the expired, non-silenced results.
///
/// Returns `None` when nothing is expired.
pub fn build_message(
    results: Vec<QueryOutput>,
    silenced: &SilenceList,
    now: DateTime<Utc>,
) -> Option<Message> {
    let mut expired = filter_results(results, silenced, true, false);
    if expired.is_empty() {
        return None;
    }
    sort_results(&mut expired, SortKey::NextEpoch, SortOrder::Asc);

    let body = expired
        .iter()
        .map(|r| format_notification_line(r, now))
        .collect::<Vec<_>>()
        .join("\n");

    Some(Message {
        title: format!("tally: {} expired", expired.len()),
        body,
    })
}

/// Publishes a message, logging delivery failures.
///
/// Returns true if the server accepted the message.
pub async fn send(target: &Target, message: &Message) -> bool {
    let client = NotifyClient::new(&target.server, &target.topic);
    match client.publish(&message.title, &message.body).await {
        Ok(()) => {
            info!(server = %target.server, "notification sent");
            true
        }
        Err(e) => {
            error!(server = %target.server, "failed to send notification: {}", e);
            false
        }
    }
}

/// Executes the notify command.
pub async fn execute(ctx: &CommandContext, opts: &NotifyOptions) -> Result<()> {
    let target = opts.resolve(&ctx.config)?;
    let results = read_results(io::stdin().lock())?;
    let silenced = SilenceList::load(ctx.config.resolve_silence_file().as_deref())?;

    let Some(message) = build_message(results, &silenced, Utc::now()) else {
        debug!("nothing expired, not notifying");
        return Ok(());
    };

    if opts.dry_run {
        if ctx.json_output {
            let output = serde_json::json!({
                "server": target.server,
                "topic": target.topic,
                "title": message.title,
                "body": message.body,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", message.body);
        }
        return Ok(());
    }

    send(&target, &message).await;
    Ok(())
}
