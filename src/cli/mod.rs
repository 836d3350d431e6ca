pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "collab")]
#[command(about = "Collab CLI - Database and moderation tasks for the Collaborate API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Schema management and connectivity")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "User roles and lookup")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Project curation")]
    Project {
        #[command(subcommand)]
        cmd: commands::project::ProjectCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Project { cmd } => commands::project::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::parse_from(["collab", "--json", "user", "promote", "ada@example.com"]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::User { cmd: commands::user::UserCommands::Promote { ref email } } if email == "ada@example.com"
        ));
    }

    #[test]
    fn reset_requires_confirmation_flag_to_be_explicit() {
        let cli = Cli::parse_from(["collab", "db", "reset"]);
        assert!(matches!(
            cli.command,
            Commands::Db { cmd: commands::db::DbCommands::Reset { yes: false } }
        ));
    }
}
