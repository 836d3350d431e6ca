pub mod account_service;
pub mod github_service;
pub mod upload_service;

pub use account_service::{link_github_account, AccountStore};
pub use github_service::{parse_github_url, GithubError, GithubProfile, GithubService, RepoRef};
pub use upload_service::{UploadError, UploadStore, UploadedFile};
