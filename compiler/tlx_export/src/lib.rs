//! Type-library export engine.
//!
//! Turns the reflected types of one unit into the descriptors of an
//! automation type library, driving a [`TypeLibBuilder`] through two
//! phases: every type is created before any type refers to another, then
//! each type is populated and laid out.
//!
//! # Architecture
//!
//! - [`classify`]: the target kind of every source type, decided once
//! - [`names`] / [`unique`]: alias resolution and library-wide uniqueness
//! - [`references`]: referenced libraries and the reference table
//! - [`marshal`]: source type expressions to type descriptors
//! - [`members`]: function synthesis, dispatch ids, vtable offsets
//! - [`inherit`]: base interfaces and class implemented-type lists
//! - [`export`]: the pass driver, [`Exporter`]
//!
//! Recoverable conditions become diagnostics on the output; fatal ones
//! abandon the builder and return an [`ExportFailure`].
//!
//! # Tracing
//!
//! Passes are instrumented with `tracing`. Call [`init_tracing`] and set
//! `RUST_LOG=tlx_export=debug` to see them.
//!
//! [`TypeLibBuilder`]: tlx_typelib::TypeLibBuilder

pub mod classify;
mod error;
mod export;
pub mod inherit;
pub mod marshal;
pub mod members;
pub mod names;
pub mod references;
mod settings;
pub mod unique;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use classify::{InterfaceMode, TargetKind, TypeClassifier};
pub use error::{ExportError, ExportFailure};
pub use export::{ExportOutput, ExportedType, Exporter};
pub use names::{AliasResolver, AliasTable, EntityKind, IdentityResolver, NameMapper};
pub use references::{ReferencedKind, ReferencedLibrary, ReferencedType};
pub use settings::{ExportSettings, DEFAULT_FIRST_AUTO_DISPID};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for export debugging.
///
/// Safe to call multiple times. Enable with `RUST_LOG=tlx_export=debug`
/// or `RUST_LOG=tlx_export=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
