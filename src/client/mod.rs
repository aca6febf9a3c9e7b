//! Marketplace client: REST bindings, session cache and page controller.

pub mod api;
pub mod catalog;
pub mod contact;
pub mod session;
pub mod view;

pub use api::{ApiClient, ApiError, ImageFile, ListingForm};
pub use catalog::ProductCatalog;
pub use contact::{normalize_phone, whatsapp_link, ContactError};
pub use session::{Session, SessionStore};
pub use view::{AuthForm, AuthMode, Dashboard, Notice, NoticeKind, Page, ProductDetail, RemovalReason, ViewController};
