pub mod auth;
pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod auth;
    pub mod common;
    pub mod health;
    pub mod products;
    pub mod profile;
}

pub use auth::AuthUser;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
