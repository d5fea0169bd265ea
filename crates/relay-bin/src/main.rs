//! GooberCord terminal client - bridges terminal chat to the GooberCord relay.

mod app;
mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::GcCommand;
use relay_auth::Identity;
use relay_config_and_utils::{init_logging, Config, Paths};

/// GooberCord command-line interface.
#[derive(Parser)]
#[command(name = "goobercord")]
#[command(about = "Cross-server Minecraft chat relay client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Defaults to the config file value
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (config, logs). Defaults to ~/.goobercord
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Relay server URL, overrides the config file
    #[arg(long, global = true)]
    server: Option<String>,

    /// Mirror logs to stderr
    #[arg(long, global = true)]
    log_stderr: bool,

    /// Player name
    #[arg(long, global = true, env = "GOOBERCORD_USERNAME")]
    username: Option<String>,

    /// Player profile UUID
    #[arg(long, global = true, env = "GOOBERCORD_UUID")]
    uuid: Option<String>,

    /// Game session access token
    #[arg(long, global = true, env = "GOOBERCORD_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive chat bridge (default)
    Chat,
    /// Link this account to Discord
    Link {
        /// Linking code from the Discord bot
        code: String,
    },
    /// Unlink this account from Discord
    Unlink {
        /// Linking code that was used
        code: String,
    },
    /// List linked Discord accounts/guilds
    Links,
}

impl Cli {
    fn identity(&self) -> Option<Identity> {
        match (&self.username, &self.uuid, &self.access_token) {
            (Some(name), Some(uuid), Some(token)) => {
                Some(Identity::new(name.as_str(), uuid.as_str(), token.as_str()))
            }
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.base_dir {
        Some(base) => Paths::with_base_dir(base.clone()),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
        config.validate()?;
    }

    paths.ensure_dirs()?;
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &paths, cli.log_stderr);
    tracing::info!(server = %config.server_url, "Starting GooberCord");

    let identity = cli.identity();
    let link_command = match &cli.command {
        None | Some(Commands::Chat) => None,
        Some(Commands::Link { code }) => Some(GcCommand::Link(Some(code.clone()))),
        Some(Commands::Unlink { code }) => Some(GcCommand::Unlink(Some(code.clone()))),
        Some(Commands::Links) => Some(GcCommand::Links),
    };

    match link_command {
        None => app::run_chat(config, identity).await?,
        Some(command) => {
            let identity = identity
                .context("--username, --uuid and --access-token are required for link commands")?;
            app::run_link_command(&config, &identity, command).await?;
        }
    }

    Ok(())
}
