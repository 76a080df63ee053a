use thiserror::Error;

/// Core error type shared across Fairgauge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A sensitive attribute violates the partitioning contract.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),
    /// The evaluation rows violate internal invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}

/// Convenience alias for results returned by Fairgauge crates.
pub type Result<T> = std::result::Result<T, Error>;
