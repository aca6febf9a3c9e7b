pub mod hashing;
pub mod token;

pub use hashing::{hash_password, verify_password};
pub use token::{SessionClaims, TokenSigner};
