//! Authentication module

pub mod cookies;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cookies::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
pub use jwt::{Claims, JwtService, TokenPair};
pub use middleware::{extract_access_token, require_auth, CurrentUser};
pub use password::PasswordHasher;
