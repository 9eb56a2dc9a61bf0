use energy_core::EngineError;

/// Service-level failures. Sparse or missing data is not represented here:
/// it degrades to zeroed metrics with an explicit flag, because partial data
/// is the steady state for a live competition with rolling imports.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("source error: {0}")]
    Source(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
