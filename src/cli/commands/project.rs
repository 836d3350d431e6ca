use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, ProjectRepository};

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "Mark a project as featured")]
    Feature {
        #[arg(help = "Project id")]
        id: Uuid,
    },

    #[command(about = "Remove a project from the featured list")]
    Unfeature {
        #[arg(help = "Project id")]
        id: Uuid,
    },
}

pub async fn handle(cmd: ProjectCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (id, featured) = match cmd {
        ProjectCommands::Feature { id } => (id, true),
        ProjectCommands::Unfeature { id } => (id, false),
    };

    let projects = ProjectRepository::shared().await?;
    let updated = projects.set_featured(id, featured).await;
    DatabaseManager::close().await;

    match updated? {
        Some(project) => output_success(
            &output_format,
            &format!("'{}' featured: {}", project.title, project.featured),
            Some(json!({ "_id": project.id, "featured": project.featured })),
        ),
        None => Err(CliError::new("NOT_FOUND", format!("No project with id {}", id)).into()),
    }
}
