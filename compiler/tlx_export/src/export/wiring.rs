//! Inheritance and default-interface wiring.
//!
//! Interfaces get their base as implemented type 0; classes get their
//! implemented-type list with exactly one default. Class defaults are
//! recorded in the reference table so that references to a class map to
//! its default interface.

use tlx_typelib::{HRef, ImplTypeFlags, TypeLibBuilder};

use crate::classify::TargetKind;
use crate::error::ExportError;
use crate::inherit::InheritanceResolver;

use super::library::{source, LibraryExport};
use super::writer::TypeInfoWriter;

#[tracing::instrument(level = "debug", skip_all, fields(count = lx.placed.len()))]
pub(super) fn wire_inheritance<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
) -> Result<(), ExportError> {
    let LibraryExport {
        provider,
        builder,
        diagnostics,
        placed,
        refs,
        exported,
        ..
    } = lx;
    let provider = *provider;
    let missing_standard = |what: &str| {
        ExportError::Internal(format!("{what} needs the standard library, which was not imported"))
    };

    let mut defaults = Vec::new();
    {
        let resolver = InheritanceResolver::new(provider, refs);
        for ty in placed.iter_mut() {
            let source_ty = source(provider, ty.id)?;
            match ty.kind {
                TargetKind::Interface(mode) => {
                    let base = resolver
                        .interface_base(source_ty, mode)
                        .ok_or_else(|| missing_standard(&ty.name))?;
                    TypeInfoWriter::new(builder, ty.handle, &ty.name)
                        .impl_type(base.href(), ImplTypeFlags::empty())?;
                    ty.base = Some(base);
                }
                TargetKind::CoClass { .. } => {
                    if let Some(ci) = &ty.class_interface {
                        let base = refs
                            .stdole(ci.mode.stdole_base())
                            .ok_or_else(|| missing_standard(&ci.name))?;
                        TypeInfoWriter::new(builder, ci.handle, &ci.name)
                            .impl_type(base, ImplTypeFlags::empty())?;
                    }
                    let impls = resolver
                        .class_impls(
                            source_ty,
                            ty.class_interface.as_ref().map(|ci| ci.handle),
                            diagnostics,
                        )
                        .ok_or_else(|| missing_standard(&ty.name))?;
                    let mut writer = TypeInfoWriter::new(builder, ty.handle, &ty.name);
                    for entry in &impls.entries {
                        writer.impl_type(entry.href, entry.flags)?;
                    }
                    drop(writer);
                    defaults.push((ty.id, ty.handle, impls.default));
                    ty.impls = Some(impls);
                }
                TargetKind::Enum | TargetKind::Record => {}
            }
        }
    }

    for (id, handle, default) in defaults {
        refs.set_default(id, default);
        if let HRef::Local(local) = default {
            if let Some(entry) = exported.iter_mut().find(|e| e.handle == handle) {
                entry.default_interface = Some(local);
            }
        }
    }
    Ok(())
}
