pub mod auth_service;
pub mod product_service;
pub mod profile_service;

pub use auth_service::{AuthService, LoginOutcome};
pub use product_service::{ImageUpload, ListingDraft, ProductService};
pub use profile_service::ProfileService;
