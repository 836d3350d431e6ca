// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route in this tree sits behind `jwt_auth_middleware`, which injects
// the caller as an `AuthUser` extension.

pub mod auth;
pub mod projects;
pub mod users;
