pub mod jwt_auth;

pub use jwt_auth::{CurrentUser, JwtAuthMiddleware, UserId};
