use clap::Subcommand;
use serde_json::json;

use crate::auth::{ROLE_ADMIN, ROLE_STUDENT};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::User;
use crate::database::{DatabaseManager, UserRepository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Grant the admin role")]
    Promote {
        #[arg(help = "Account email")]
        email: String,
    },

    #[command(about = "Return an admin to the student role")]
    Demote {
        #[arg(help = "Account email")]
        email: String,
    },

    #[command(about = "Show an account")]
    Show {
        #[arg(help = "Account email")]
        email: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserRepository::shared().await?;

    let result = match cmd {
        UserCommands::Promote { email } => set_role(&users, &email, ROLE_ADMIN, &output_format).await,
        UserCommands::Demote { email } => set_role(&users, &email, ROLE_STUDENT, &output_format).await,
        UserCommands::Show { email } => match users.find_by_email(&email).await? {
            Some(user) => output_success(&output_format, &user.name, Some(summary(&user))),
            None => Err(not_found(&email)),
        },
    };

    DatabaseManager::close().await;
    result
}

async fn set_role(
    users: &UserRepository,
    email: &str,
    role: &str,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    match users.set_role(email, role).await? {
        Some(user) => output_success(
            output_format,
            &format!("{} is now {}", user.email, user.role),
            Some(summary(&user)),
        ),
        None => Err(not_found(email)),
    }
}

fn not_found(email: &str) -> anyhow::Error {
    CliError::new("NOT_FOUND", format!("No user with email '{}'", email)).into()
}

fn summary(user: &User) -> serde_json::Value {
    json!({
        "_id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "authProvider": user.auth_provider,
        "githubUsername": user.github_username,
    })
}
