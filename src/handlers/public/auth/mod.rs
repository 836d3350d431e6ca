// handlers/public/auth/mod.rs - Public authentication handlers

pub mod github;   // GET /api/auth/github, GET /api/auth/github/callback
pub mod register; // POST /api/auth/register
pub mod session;  // POST /api/auth/login, POST /api/auth/refresh

pub use github::{github_callback, github_login};
pub use register::register_post;
pub use session::{login_post, refresh_post};
