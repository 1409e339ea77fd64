use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use cep_client::{PacketListener, RawRuleParser, RuleParser, Session};
use cep_core::{EngineType, EventType, Notification};
use clap::Parser;

/// Command-line client for a CEP engine: submit rules, subscribe to
/// event types, publish events, print notifications.
#[derive(Debug, Parser)]
#[command(name = "cep")]
struct Cli {
    /// Server host.
    host: String,
    /// Server port.
    port: u16,
    /// Path to a rule definition to submit.
    #[arg(long)]
    rule: Option<PathBuf>,
    /// Event-type id assigned to the rule's derived events.
    #[arg(long, default_value = "2000")]
    rule_id: EventType,
    /// Execution backend for submitted rules.
    #[arg(long, value_enum, default_value = "cpu")]
    engine: EngineArg,
    /// Event-type ids to subscribe to. Keeps the process listening.
    #[arg(long = "sub", num_args = 1.., value_name = "EVENT_TYPE")]
    subscriptions: Vec<EventType>,
    /// Publish one event: an event-type id followed by key/value pairs.
    /// Repeatable.
    #[arg(long = "pub", num_args = 1.., value_name = "EVENT_TYPE [KEY VALUE]...")]
    publications: Vec<Vec<String>>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum EngineArg {
    Cpu,
    Gpu,
}

impl From<EngineArg> for EngineType {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Cpu => EngineType::Cpu,
            EngineArg::Gpu => EngineType::Gpu,
        }
    }
}

/// Prints each notification with its typed attributes and the server
/// timestamp; exits the process when the connection drops.
struct ConsoleListener;

#[async_trait]
impl PacketListener for ConsoleListener {
    async fn on_notification(&self, notification: Notification) {
        println!("notification received: {notification}");
    }

    async fn on_connection_error(&self) {
        tracing::error!("connection lost, exiting");
        process::exit(-1);
    }
}

#[tokio::main]
async fn main() {
    cep_telemetry::init_telemetry(&cep_telemetry::TelemetryConfig::default());

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(-1);
        }
    };

    if let Err(e) = run(cli).await {
        tracing::error!("client error: {e:#}");
        process::exit(-1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let session = Session::connect(&cli.host, cli.port).await?;

    let listening = !cli.subscriptions.is_empty();
    if listening {
        session.add_listener(Arc::new(ConsoleListener)).await;
        session.start()?;
        for (event_type, outcome) in session.subscribe(&cli.subscriptions).await? {
            match outcome {
                Ok(()) => tracing::info!(event_type = %event_type, "subscribed"),
                Err(e) => {
                    tracing::warn!(event_type = %event_type, error = %e, "subscription failed");
                }
            }
        }
    }

    if let Some(path) = &cli.rule {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading rule file {}", path.display()))?;
        let rule = RawRuleParser.parse(&text, cli.rule_id)?;
        session.submit_rule(rule, cli.engine.into()).await?;
        tracing::info!(assigned_id = %cli.rule_id, "rule submitted");
    }

    for group in &cli.publications {
        let (event_type, keys, values) = split_publication(group)?;
        session.publish(event_type, &keys, &values).await?;
        tracing::info!(event_type = %event_type, attributes = keys.len(), "event published");
    }

    if listening {
        tokio::signal::ctrl_c().await?;
        session.close().await;
    }

    Ok(())
}

/// Split one --pub group: the event type first, then alternating
/// key/value tokens. An odd tail is an argument error.
fn split_publication(group: &[String]) -> anyhow::Result<(EventType, Vec<&str>, Vec<&str>)> {
    let (first, rest) = group
        .split_first()
        .context("--pub needs an event type")?;
    let event_type: EventType = first
        .parse()
        .with_context(|| format!("invalid event type: {first}"))?;
    if rest.len() % 2 != 0 {
        anyhow::bail!("--pub {first}: key without a value");
    }
    let keys = rest.iter().step_by(2).map(String::as_str).collect();
    let values = rest.iter().skip(1).step_by(2).map(String::as_str).collect();
    Ok((event_type, keys, values))
}
