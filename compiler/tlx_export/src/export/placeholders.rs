//! Placeholder creation.
//!
//! Every exported type (and every class interface, right before its class)
//! receives its type info, guid, version, flags and help string before any
//! type refers to another.

use rustc_hash::FxHashMap;

use tlx_meta::Guid;
use tlx_typelib::{TypeFlags, TypeHandle, TypeKind, TypeLibBuilder};

use crate::classify::{class_interface_flags, type_flags, TargetKind};
use crate::error::ExportError;

use super::library::{derived_guid, source, ClassInterface, LibraryExport, PlacedType};
use super::ExportedType;

#[tracing::instrument(level = "debug", skip_all, fields(count = lx.named.len()))]
pub(super) fn create_placeholders<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
) -> Result<(), ExportError> {
    lx.builder
        .set_library_attrs(lx.attrs.clone())
        .map_err(ExportError::build(format!("library `{}`", lx.attrs.name)))?;

    let provider = lx.provider;
    let mut guids: FxHashMap<Guid, String> = FxHashMap::default();
    for named in std::mem::take(&mut lx.named) {
        let ty = source(provider, named.id)?;
        let qualified = ty.qualified_name();

        let class_interface = match (named.kind, named.class_interface) {
            (
                TargetKind::CoClass {
                    class_interface: Some(mode),
                    ..
                },
                Some(name),
            ) => {
                let handle = create(
                    lx,
                    &mut guids,
                    Placeholder {
                        name: &name,
                        kind: mode.type_kind(),
                        guid: derived_guid(&format!("_{qualified}")),
                        flags: class_interface_flags(ty, mode),
                        doc: ty.help_string(),
                    },
                )?;
                lx.exported.push(ExportedType {
                    name: name.clone(),
                    kind: mode.type_kind(),
                    handle,
                    id: None,
                    source: None,
                    default_interface: None,
                });
                Some(ClassInterface { name, handle, mode })
            }
            _ => None,
        };

        let kind = named.kind.type_kind();
        let handle = create(
            lx,
            &mut guids,
            Placeholder {
                name: &named.name,
                kind,
                guid: ty.guid.unwrap_or_else(|| derived_guid(&qualified)),
                flags: type_flags(ty, named.kind),
                doc: ty.help_string(),
            },
        )?;
        lx.refs.insert_local(named.id, handle, named.kind);
        lx.exported.push(ExportedType {
            name: named.name.clone(),
            kind,
            handle,
            id: Some(named.id),
            source: Some(qualified),
            default_interface: None,
        });
        lx.placed.push(PlacedType {
            id: named.id,
            kind: named.kind,
            name: named.name,
            handle,
            class_interface,
            constants: named.constants,
            base: None,
            impls: None,
        });
    }
    Ok(())
}

struct Placeholder<'p> {
    name: &'p str,
    kind: TypeKind,
    guid: Guid,
    flags: TypeFlags,
    doc: Option<&'p str>,
}

fn create<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
    guids: &mut FxHashMap<Guid, String>,
    p: Placeholder<'_>,
) -> Result<TypeHandle, ExportError> {
    if let Some(first) = guids.get(&p.guid) {
        return Err(ExportError::DuplicateType {
            guid: p.guid,
            first: first.clone(),
            second: p.name.to_owned(),
        });
    }
    guids.insert(p.guid, p.name.to_owned());

    let context = || format!("type `{}`", p.name);
    let builder = &mut lx.builder;
    let handle = builder
        .create_type(p.name, p.kind)
        .map_err(ExportError::build(context()))?;
    builder
        .set_guid(handle, p.guid)
        .map_err(ExportError::build(context()))?;
    builder
        .set_version(handle, lx.attrs.version)
        .map_err(ExportError::build(context()))?;
    builder
        .set_type_flags(handle, p.flags)
        .map_err(ExportError::build(context()))?;
    if let Some(doc) = p.doc {
        builder
            .set_doc_string(handle, doc)
            .map_err(ExportError::build(context()))?;
    }
    tracing::debug!(name = p.name, kind = ?p.kind, guid = %p.guid, "placeholder created");
    Ok(handle)
}
