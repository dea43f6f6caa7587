//! Authentication: JWT issuance and validation, password hashing, and the
//! [`CurrentUser`] extractor with its role gates.

mod context;
mod jwt;
mod password;

pub use context::CurrentUser;
pub use jwt::{extract_bearer_token, Claims, JwtService};
pub use password::{hash_password, verify_password};
