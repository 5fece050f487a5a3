//! Library names for every type, class interface and enum constant.
//!
//! Types register first, in unit order, so type names win over the
//! synthesized names reserved afterwards.

use tlx_diagnostic::ErrorCode;
use tlx_meta::SourceKind;
use tlx_typelib::TypeLibBuilder;

use crate::classify::TargetKind;
use crate::error::ExportError;
use crate::unique::TypeCandidate;

use super::library::{source, LibraryExport, NamedType};

#[tracing::instrument(level = "debug", skip_all, fields(count = lx.classified.len()))]
pub(super) fn assign_names<B: TypeLibBuilder>(lx: &mut LibraryExport<'_, B>) -> Result<(), ExportError> {
    let LibraryExport {
        provider,
        names,
        registry,
        diagnostics,
        classified,
        named,
        ..
    } = lx;
    let provider = *provider;

    for &(id, _) in classified.iter() {
        let ty = source(provider, id)?;
        registry.add_type(
            TypeCandidate {
                id,
                namespace: ty.namespace.clone(),
                qualified: ty.qualified_name(),
                name: names.type_name(ty),
            },
            diagnostics,
        );
    }

    for &(id, kind) in classified.iter() {
        let ty = source(provider, id)?;
        let qualified = ty.qualified_name();
        let name = registry
            .type_name(id)
            .ok_or_else(|| ExportError::Internal(format!("`{qualified}` has no library name")))?
            .to_owned();

        let class_interface = match kind {
            TargetKind::CoClass {
                class_interface: Some(_),
                ..
            } => Some(registry.reserve(
                &qualified,
                &format!("_{name}"),
                ErrorCode::W5001,
                diagnostics,
            )),
            _ => None,
        };

        let constants = match &ty.kind {
            SourceKind::Enum { fields, .. } => {
                // Constants compose with the mapped name, not the
                // disambiguated one.
                let enum_name = names.type_name(ty);
                fields
                    .iter()
                    .map(|field| {
                        i32::try_from(field.value).ok().map(|_| {
                            let wanted = names.enum_constant(ty, &enum_name, field);
                            registry.reserve(
                                &format!("{qualified}.{}", field.name),
                                &wanted,
                                ErrorCode::W5002,
                                diagnostics,
                            )
                        })
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        named.push(NamedType {
            id,
            kind,
            name,
            class_interface,
            constants,
        });
    }
    Ok(())
}
