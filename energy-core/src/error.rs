use time::Date;

/// Errors produced by the comparison engine.
///
/// Missing or sparse data is never an error here: a request over an empty
/// range yields zeroed metrics with the `insufficient_data` flag set. Errors
/// are reserved for inputs the engine refuses to interpret.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: Date, end: Date },
}
