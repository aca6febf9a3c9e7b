pub mod app;
pub mod client;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::{MarketError, MarketResult};
pub use infra::config::AppConfig;
pub use storage::{MarketStore, MemoryStore, PostgresStore, UploadStore};
pub use transport::http::{create_router, ApiDoc, AppState};
