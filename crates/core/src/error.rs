#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Stored data breaks an invariant the authoring pipeline is supposed to
    /// uphold (e.g. an active movie without clues).
    #[error("Data integrity violation: {0}")]
    Integrity(String),
}
