//! Import registration.
//!
//! The standard library is imported when anything needs it; a referenced
//! library is imported the first time one of its types is used. External
//! types nothing covers stay out of the reference table and degrade when
//! they are mapped.

use rustc_hash::FxHashMap;

use tlx_typelib::{stdole, HRef, ImportId, TypeLibBuilder};

use crate::error::ExportError;
use crate::references::{lookup, ExternalRef};

use super::library::LibraryExport;

#[tracing::instrument(level = "debug", skip_all, fields(
    stdole = lx.needs.stdole,
    externals = lx.needs.externals.len(),
))]
pub(super) fn register_imports<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
) -> Result<(), ExportError> {
    if lx.needs.stdole {
        let id = lx
            .builder
            .add_import(stdole::library())
            .map_err(ExportError::build(format!("import of `{}`", stdole::NAME)))?;
        lx.refs.set_stdole(id);
    }

    let mut imported: FxHashMap<usize, ImportId> = FxHashMap::default();
    for ext in &lx.needs.externals {
        let Some((pos, index, ty)) = lookup(&lx.references, ext) else {
            tracing::debug!(ty = %ext.qualified_name(), unit = %ext.unit, "no referenced library covers type");
            continue;
        };
        let lib = match imported.get(&pos) {
            Some(&id) => id,
            None => {
                let reference = &lx.references[pos];
                let id = lx
                    .builder
                    .add_import(reference.to_import())
                    .map_err(ExportError::build(format!("import of `{}`", reference.name)))?;
                imported.insert(pos, id);
                id
            }
        };
        lx.refs.insert_external(
            ext,
            ExternalRef {
                href: HRef::Imported { lib, index },
                kind: ty.kind,
                default: ty
                    .default_interface
                    .map(|index| HRef::Imported { lib, index }),
            },
        );
        tracing::trace!(ty = %ext.qualified_name(), library = %lx.references[pos].name, index, "external resolved");
    }
    Ok(())
}
