pub mod chat;
pub mod config;
pub mod sessions;

use clap::{Parser, Subcommand};

/// conversationbot — a guided "tell me about yourself" chat bot.
#[derive(Debug, Parser)]
#[command(name = "conversationbot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the Telegram bot (default when no subcommand is given).
    Serve,
    /// Talk to the bot from the terminal, using the same session store.
    Chat {
        /// Actor ID to chat as.  Negative IDs (Telegram groups) are allowed.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        actor: i64,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Inspect the session snapshot.
    #[command(subcommand)]
    Sessions(SessionsCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List every stored session.
    List {
        /// Print the raw snapshot JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `CB_CONFIG` (or `config.toml`).
/// A missing file yields the defaults.  Returns the config and the path that
/// was used.
pub fn load_config() -> anyhow::Result<(cb_domain::config::Config, String)> {
    let config_path = std::env::var("CB_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        cb_domain::config::Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["conversationbot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn chat_actor_defaults_to_one() {
        let cli = Cli::try_parse_from(["conversationbot", "chat"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Chat { actor: 1 })));
    }

    #[test]
    fn chat_accepts_negative_actor_ids() {
        let cli = Cli::try_parse_from(["conversationbot", "chat", "--actor", "-42"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Chat { actor: -42 })));

        let cli = Cli::try_parse_from(["conversationbot", "chat", "--actor=-1001234"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Chat { actor: -1001234 })));
    }

    #[test]
    fn sessions_list_json_flag() {
        let cli = Cli::try_parse_from(["conversationbot", "sessions", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Sessions(SessionsCommand::List { json: true }))
        ));
    }
}
