//! Fatal export errors.
//!
//! Anything here aborts the run before commit. Recoverable conditions are
//! diagnostics, not errors.

use tlx_diagnostic::{Diagnostic, ErrorCode};
use tlx_meta::{Guid, LoadError};
use tlx_typelib::BuildError;

/// A condition that aborts the export.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("source unit cannot be loaded: {0}")]
    Load(#[from] LoadError),
    #[error("type #{id} is listed by the unit but cannot be read")]
    MissingType { id: u32 },
    #[error("library guid {guid} is also the guid of referenced library `{other}`")]
    DuplicateLibrary { guid: Guid, other: String },
    #[error("types `{first}` and `{second}` share guid {guid}")]
    DuplicateType {
        guid: Guid,
        first: String,
        second: String,
    },
    #[error("type-library builder rejected {context}: {source}")]
    Build {
        context: String,
        #[source]
        source: BuildError,
    },
    #[error("dependency `{unit}` cannot be exported: {source}")]
    Dependency {
        unit: String,
        #[source]
        source: Box<ExportFailure>,
    },
    #[error("internal exporter error: {0}")]
    Internal(String),
}

impl ExportError {
    pub(crate) fn build(context: impl Into<String>) -> impl FnOnce(BuildError) -> ExportError {
        let context = context.into();
        move |source| ExportError::Build { context, source }
    }

    /// Stable code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ExportError::Load(_) => ErrorCode::E0001,
            ExportError::MissingType { .. } => ErrorCode::E0002,
            ExportError::DuplicateLibrary { .. } => ErrorCode::E1001,
            ExportError::DuplicateType { .. } => ErrorCode::E1002,
            ExportError::Build { .. } => ErrorCode::E1003,
            ExportError::Dependency { source, .. } => source.code(),
            ExportError::Internal(_) => ErrorCode::E9001,
        }
    }

    /// The error as a diagnostic, for callers that report uniformly.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            ExportError::Build { context, .. } => diag.with_subject(context.clone()),
            ExportError::DuplicateType { second, .. } => diag.with_subject(second.clone()),
            ExportError::Dependency { unit, .. } => diag.with_subject(unit.clone()),
            _ => diag,
        }
    }
}

/// A failed run: the fatal error plus everything diagnosed before it.
///
/// Nothing was committed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct ExportFailure {
    pub error: ExportError,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExportFailure {
    pub fn code(&self) -> ErrorCode {
        self.error.code()
    }
}

impl From<ExportError> for ExportFailure {
    fn from(error: ExportError) -> Self {
        ExportFailure {
            error,
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests;
