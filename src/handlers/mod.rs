// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) and protected (JWT auth) handlers live in separate trees so
// the router can apply the auth middleware per tier.

pub mod protected;
pub mod public;
pub mod utils;
