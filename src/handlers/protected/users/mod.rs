// handlers/protected/users/mod.rs - Own profile and the follow graph

pub mod follow;  // POST /api/users/follow/:id, POST /api/users/unfollow/:id
pub mod profile; // GET /api/users/profile, PUT /api/users/profile

pub use follow::{follow, unfollow};
pub use profile::{profile_get, profile_put};
