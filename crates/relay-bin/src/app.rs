//! Host bridge: wires stdin, the relay connection and link commands together.

use crate::commands::{self, GcCommand, Input};
use crate::output::TerminalObserver;
use anyhow::Context;
use relay_auth::{AuthClient, Identity, LinkClient, MojangSessionVerifier};
use relay_client::{ChatLine, ReconnectPolicy, RelayConfig, RelayConnection};
use relay_config_and_utils::Config;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use url::Url;

/// Relay settings derived from the loaded configuration.
pub fn relay_config(config: &Config) -> RelayConfig {
    RelayConfig {
        reconnect: ReconnectPolicy::new(
            Duration::from_millis(config.reconnect_base_delay_ms),
            Duration::from_millis(config.reconnect_max_delay_ms),
        ),
    }
}

fn auth_client(config: &Config, server_url: Url) -> AuthClient {
    let verifier = MojangSessionVerifier::new(config.session_server_url.clone());
    AuthClient::new(server_url, Arc::new(verifier))
}

/// Authenticate and run a single `!gc` command.
pub async fn run_link_command(
    config: &Config,
    identity: &Identity,
    command: GcCommand,
) -> anyhow::Result<()> {
    let server_url = config.server_url()?;
    let session = auth_client(config, server_url.clone())
        .authenticate(identity)
        .await
        .context("Failed to authenticate with GooberCord")?;

    let links = LinkClient::new(server_url, session.token);
    let replies = commands::execute(&command, Some(&links), &config.local_prefix).await;

    let mut out = TerminalObserver::new(std::io::stdout());
    out.print_replies(&replies);
    Ok(())
}

/// Interactive chat bridge.
///
/// Authentication failure leaves the bridge running without relay
/// features.
pub async fn run_chat(config: Config, identity: Option<Identity>) -> anyhow::Result<()> {
    let server_url = config.server_url()?;
    let (relay, mut events) = RelayConnection::channel(relay_config(&config));
    let mut links = None;
    let player = identity
        .as_ref()
        .map(|id| id.name.clone())
        .unwrap_or_else(|| "you".to_string());

    match identity {
        Some(identity) => {
            let auth = auth_client(&config, server_url.clone());
            match auth.authenticate(&identity).await {
                Ok(session) => {
                    info!(player = %session.identity, "Authenticated with GooberCord");
                    if let Err(e) = relay.connect(server_url.as_str(), &session.token).await {
                        error!(error = %e, "Failed to start relay connection");
                    }
                    links = Some(LinkClient::new(server_url.clone(), session.token));
                }
                Err(e) => {
                    error!(error = %e, "Authentication failed, running without relay");
                }
            }
        }
        None => warn!("No identity configured, running without relay"),
    }

    let mut observer = TerminalObserver::new(std::io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let input = commands::parse_input(&line, &config.local_prefix);
                handle_input(input, &relay, links.as_ref(), &player, &config, &mut observer).await;
            }
            Some(event) = events.recv() => {
                event.dispatch(&mut observer);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    relay.disconnect().await;
    Ok(())
}

async fn handle_input<W: Write>(
    input: Input,
    relay: &RelayConnection,
    links: Option<&LinkClient>,
    player: &str,
    config: &Config,
    out: &mut TerminalObserver<W>,
) {
    match input {
        Input::Gc(command) => {
            let replies = commands::execute(&command, links, &config.local_prefix).await;
            out.print_replies(&replies);
        }
        Input::Join(room) => relay.join(&room).await,
        Input::Leave => relay.leave().await,
        Input::Local(text) => {
            relay.send_local(&text).await;
            out.print(&crate::output::format_chat_line(&ChatLine::Message {
                sender: player.to_string(),
                text,
            }));
        }
        Input::Global(text) => relay.send_global(&text).await,
        Input::Invalid(usage) => out.print(&usage),
        Input::Empty => {}
    }
}
