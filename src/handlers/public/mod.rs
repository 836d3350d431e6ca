// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, the GitHub OAuth flow and read-only catalog endpoints.

pub mod auth;
pub mod projects;
pub mod root;
pub mod users;
