pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod server;
pub mod sources;

pub use cache::SeriesCache;
pub use error::ServiceError;
