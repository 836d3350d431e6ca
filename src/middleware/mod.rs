pub mod auth;
pub mod rate_limit;
pub mod response;
pub mod security;

pub use auth::{jwt_auth_middleware, require_admin, AuthUser};
pub use rate_limit::rate_limit_middleware;
pub use response::{ApiResponse, ApiResult};
pub use security::with_security_headers;
