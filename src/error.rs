use thiserror::Error;

/// Failure taxonomy for the reconciliation pipeline.
///
/// Empty streams are never errors; they are handled as degenerate cases by
/// the stages themselves.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Either external engine call rejected. Propagated unchanged; retries,
    /// if any, belong to the collaborator.
    #[error("transcription source failed: {0}")]
    Source(#[from] anyhow::Error),

    /// Requested speaker count below 1, rejected before the reducer runs
    #[error("target speaker count must be at least 1 (got {0})")]
    InvalidTarget(usize),

    /// A segment violated its invariants at the boundary
    #[error("malformed segment at index {index}: {reason}")]
    MalformedSegment { index: usize, reason: String },
}
