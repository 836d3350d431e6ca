use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{schema, DatabaseManager};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and indexes if they are missing")]
    Migrate,

    #[command(about = "Check that the database is reachable")]
    Ping,

    #[command(about = "Delete every row, keeping the schema")]
    Reset {
        #[arg(long, help = "Confirm the reset")]
        yes: bool,
    },
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let result = match cmd {
        DbCommands::Migrate => {
            let pool = DatabaseManager::pool().await?;
            schema::migrate(&pool).await?;
            output_success(&output_format, "Schema is up to date", None)
        }
        DbCommands::Ping => match DatabaseManager::health_check().await {
            Ok(()) => output_success(&output_format, "Database connected", None),
            Err(e) => Err(CliError::new("DATABASE_UNAVAILABLE", e.to_string()).into()),
        },
        DbCommands::Reset { yes } => {
            if !yes {
                return Err(CliError::new("CONFIRMATION_REQUIRED", "Refusing to reset without --yes").into());
            }
            let pool = DatabaseManager::pool().await?;
            let deleted = schema::reset(&pool).await?;
            output_success(&output_format, "Database reset", Some(json!({ "rowsDeleted": deleted })))
        }
    };

    DatabaseManager::close().await;
    result
}
