// handlers/protected/projects/mod.rs - Authenticated project operations

pub mod feature; // PUT /api/projects/:id/featured (admin)
pub mod github; // POST /api/projects/:id/refresh-github
pub mod mine;   // GET /api/projects/my-projects
pub mod social; // POST /api/projects/:id/like, POST /api/projects/:id/comments
pub mod write;  // POST /api/projects, PUT /api/projects/:id, DELETE /api/projects/:id

pub use feature::set_featured;
pub use github::refresh_github;
pub use mine::my_projects;
pub use social::{add_comment, toggle_like};
pub use write::{create, delete, update};

use serde::Serialize;

use crate::api::ProjectView;

pub(crate) const NOT_FOUND: &str = "Project not found";

#[derive(Debug, Serialize)]
pub struct ProjectPayload {
    pub project: ProjectView,
}
