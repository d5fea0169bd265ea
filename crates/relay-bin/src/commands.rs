//! Chat input parsing and `!gc` link commands.

use relay_auth::{Link, LinkClient};

/// What a line typed into the chat loop means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `!gc ...`
    Gc(GcCommand),
    /// `/join <room>`, stands in for connecting to a game server.
    Join(String),
    /// `/leave`, stands in for disconnecting from a game server.
    Leave,
    /// Line with the local prefix, prefix stripped.
    Local(String),
    /// Ordinary game chat.
    Global(String),
    /// Malformed host command, with a usage hint.
    Invalid(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcCommand {
    Help,
    Link(Option<String>),
    Unlink(Option<String>),
    Links,
    Unknown(String),
}

/// Classify one input line.
pub fn parse_input(line: &str, local_prefix: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return Input::Empty;
    }
    if line.to_lowercase().starts_with("!gc") {
        return Input::Gc(parse_gc(line));
    }
    if let Some(rest) = line.strip_prefix("/join") {
        if rest.is_empty() || rest.starts_with(' ') {
            return match rest.trim() {
                "" => Input::Invalid("Usage: /join <room>".to_string()),
                room => Input::Join(room.to_string()),
            };
        }
    }
    if line.trim() == "/leave" {
        return Input::Leave;
    }
    if let Some(text) = line.strip_prefix(local_prefix) {
        return Input::Local(text.to_string());
    }

    Input::Global(line.to_string())
}

fn parse_gc(line: &str) -> GcCommand {
    let args: Vec<&str> = line.split(' ').collect();
    if args.len() == 1 {
        return GcCommand::Help;
    }

    let code = args.get(2).map(|c| c.to_string());
    match args[1] {
        "link" => GcCommand::Link(code),
        "unlink" => GcCommand::Unlink(code),
        "links" => GcCommand::Links,
        other => GcCommand::Unknown(other.to_string()),
    }
}

/// The `!gc` help text.
pub fn help_text(local_prefix: &str) -> String {
    format!(
        "GooberCord commands:\n\
         !gc link [code] - Links Minecraft account to Discord\n\
         !gc unlink [code] - Unlinks Minecraft account from Discord\n\
         !gc links - Lists all linked Discord accounts/guilds\n\
         \n\
         Current local chat prefix: '{}'",
        local_prefix
    )
}

/// Result of a `!gc` command, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Printed as is.
    Plain(String),
    /// Printed behind the GooberCord tag.
    Tagged(String),
}

/// Run a `!gc` command. Without a link client (not authenticated) every
/// network command is refused.
pub async fn execute(
    command: &GcCommand,
    links: Option<&LinkClient>,
    local_prefix: &str,
) -> Vec<Reply> {
    match command {
        GcCommand::Help => vec![Reply::Plain(help_text(local_prefix))],
        GcCommand::Unknown(_) => vec![Reply::Tagged(
            "Unknown command, type !gc for help.".to_string(),
        )],
        GcCommand::Link(None) => vec![Reply::Tagged("Usage: !gc link [code]".to_string())],
        GcCommand::Unlink(None) => vec![Reply::Tagged("Usage: !gc unlink [code]".to_string())],
        _ => {
            let Some(client) = links else {
                return vec![Reply::Tagged(
                    "Not signed in to GooberCord, link commands are unavailable.".to_string(),
                )];
            };
            execute_remote(command, client).await
        }
    }
}

async fn execute_remote(command: &GcCommand, client: &LinkClient) -> Vec<Reply> {
    match command {
        GcCommand::Link(Some(code)) => {
            vec![Reply::Tagged(link_reply(client.link(code).await))]
        }
        GcCommand::Unlink(Some(code)) => {
            vec![Reply::Tagged(unlink_reply(client.unlink(code).await))]
        }
        GcCommand::Links => links_reply(&client.links().await),
        _ => Vec::new(),
    }
}

pub fn link_reply(ok: bool) -> String {
    if ok {
        "Successfully linked this account to Discord!".to_string()
    } else {
        "This code either does not exist, expired or was used!".to_string()
    }
}

pub fn unlink_reply(ok: bool) -> String {
    if ok {
        "Successfully unlinked this account from Discord!".to_string()
    } else {
        "This code either does not exist or wasn't used by you!".to_string()
    }
}

pub fn links_reply(links: &[Link]) -> Vec<Reply> {
    if links.is_empty() {
        return vec![Reply::Tagged("You haven't used any linking codes!".to_string())];
    }

    let mut replies = vec![Reply::Plain("====== Linked Accounts ======".to_string())];
    replies.extend(links.iter().map(|link| {
        Reply::Plain(format!(
            "-> '{}'\n  ^ User: {}, guild: {}",
            link.code, link.user_id, link.guild_id
        ))
    }));
    replies
}
