// src/error.rs
//! Closed error taxonomy for the summary-to-post pipeline.
//!
//! Every failure the scheduler has to react to maps onto exactly one variant,
//! so recovery is a single exhaustive `match` instead of downcasting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upstream has not published this ID yet. Expected and recoverable.
    #[error("summary with ID {id} not found")]
    SummaryNotFound { id: u64 },

    /// Transport failure, timeout, or a body that could not be decoded.
    #[error("API request failed: {cause}")]
    RequestFailed { cause: String },

    /// Any non-2xx status other than not-found.
    #[error("unexpected status code: {code}")]
    UnexpectedStatus { code: u16 },

    /// Content lacks one or more of the section headers. Lists every missing one.
    #[error("missing sections in content: {names:?}")]
    MissingSections { names: Vec<String> },

    /// Publisher rejected a post.
    #[error("failed to post {target}: {cause}")]
    PostFailed { target: String, cause: String },
}

impl PipelineError {
    pub fn request_failed(cause: impl std::fmt::Display) -> Self {
        Self::RequestFailed {
            cause: cause.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SummaryNotFound { .. })
    }

    /// Errors worth retrying after a delay without operator attention.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::UnexpectedStatus { .. } | Self::PostFailed { .. }
        )
    }

    /// Short label for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SummaryNotFound { .. } => "not_found",
            Self::RequestFailed { .. } => "request_failed",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::MissingSections { .. } => "missing_sections",
            Self::PostFailed { .. } => "post_failed",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
