pub mod auth;
pub mod client;
pub mod faults;
pub mod rate_limit;
pub mod roles;

pub use auth::{authenticate, extract_jwt_from_headers, jwt_auth_middleware, AuthUser};
pub use client::{client_addr, ClientAddr};
pub use faults::report_faults;
pub use rate_limit::{rate_limit, RateLimiter};
pub use roles::{require_roles, ADMIN_ONLY, ANY_ROLE, BOOKING_READERS, CONTENT_EDITORS, STAFF};
