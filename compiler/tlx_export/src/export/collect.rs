//! Classification of the unit and the scan for imports.

use tlx_typelib::TypeLibBuilder;

use crate::classify::TypeClassifier;
use crate::error::ExportError;
use crate::references::ImportNeeds;

use super::library::{source, LibraryExport};

/// Classify every type of the unit, in unit order, and record what the
/// exported declarations will need imported.
#[tracing::instrument(level = "debug", skip_all, fields(unit = %lx.unit()))]
pub(super) fn collect_types<B: TypeLibBuilder>(lx: &mut LibraryExport<'_, B>) -> Result<(), ExportError> {
    let provider = lx.provider;
    for id in provider.type_ids() {
        let ty = source(provider, id)?;
        match TypeClassifier.classify(ty) {
            Some(kind) => {
                tracing::trace!(ty = %ty.qualified_name(), ?kind, "classified");
                lx.classified.push((id, kind));
            }
            None => tracing::trace!(ty = %ty.qualified_name(), "not exported"),
        }
    }
    lx.needs = ImportNeeds::scan(provider, &lx.classified);
    tracing::debug!(
        types = lx.classified.len(),
        stdole = lx.needs.stdole,
        externals = lx.needs.externals.len(),
        "unit collected"
    );
    Ok(())
}
