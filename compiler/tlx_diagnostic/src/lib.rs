//! Diagnostic system for the type-library exporter.
//!
//! Every recoverable condition the exporter hits (an unmappable member, an
//! unresolvable reference, a renamed type) is reported as a [`Diagnostic`]
//! carrying:
//! - a stable [`ErrorCode`] with a numeric part for tooling
//! - a [`Severity`]
//! - the subject entity it concerns (`Namespace.Type.Member`)
//! - notes explaining the degradation that was applied
//!
//! Diagnostics are collected in processing order by a [`DiagnosticQueue`].
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn commit() -> Result<Library, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
