//! Authentication module
//!
//! Bearer-token authentication. Identities are issued externally; the API
//! only validates JWT access tokens.

mod jwt;
mod middleware;

pub use jwt::{Claims, JwtService};
pub use middleware::{bearer_user, AuthUser};
