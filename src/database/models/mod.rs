pub mod comment;
pub mod project;
pub mod user;

pub use comment::CommentRow;
pub use project::{GithubData, NewProject, Project, ProjectRow, ProjectUpdate};
pub use user::{GithubLink, NewUser, ProfileUpdate, User, UserSummary};
