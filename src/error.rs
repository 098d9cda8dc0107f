use thiserror::Error;

/// Failures surfaced by the analysis pipeline.
///
/// None of these are recovered inside the library; they propagate to the
/// driver, which aborts the run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Resource unreachable, HTTP failure or unreadable workbook.
    #[error("fetch failed for {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    /// Requested country, column or sheet is absent from the source.
    #[error("{kind} not found: {name:?}")]
    Lookup { kind: &'static str, name: String },

    /// Inputs that must line up do not.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Statistics or figures requested on empty input.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Header or table shape disagrees with the declared schema.
    #[error("schema violation: {0}")]
    Schema(String),

    /// The plotting backend failed.
    #[error("render failed: {0}")]
    Render(String),
}

impl AnalysisError {
    pub(crate) fn lookup(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn fetch(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
