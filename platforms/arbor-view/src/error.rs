use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("cannot decode sentence: {0}")]
    Decode(String),
    #[error("invalid column snapshot: {0}")]
    Snapshot(String),
}
