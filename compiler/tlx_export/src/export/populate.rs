//! Member population.
//!
//! Interfaces are populated base-first so that each knows the dispatch ids,
//! automatic ids and slot count it inherits. Class interfaces, records and
//! enums follow.

use rustc_hash::FxHashMap;

use tlx_diagnostic::{Diagnostic, ErrorCode};
use tlx_meta::{SourceKind, TypeId, Visibility};
use tlx_typelib::{ElemDesc, TypeLibBuilder, VarDesc, VarFlags, VarKind, VariantValue, MEMBERID_NIL};

use crate::classify::TargetKind;
use crate::error::ExportError;
use crate::inherit::BaseInterface;
use crate::marshal::{MapContext, TypeMapper};
use crate::members::{report_fallback, BaseChain, InterfaceFuncs, MemberSynthesizer};

use super::library::{source, LibraryExport, PlacedType};
use super::writer::TypeInfoWriter;

/// Member id of the first record field.
const FIRST_FIELD_MEMID: i32 = 0x4000_0000;

#[tracing::instrument(level = "debug", skip_all)]
pub(super) fn populate_interfaces<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
) -> Result<(), ExportError> {
    let LibraryExport {
        provider,
        settings,
        names,
        builder,
        diagnostics,
        placed,
        refs,
        ..
    } = lx;
    let (provider, settings) = (*provider, *settings);
    let mapper = TypeMapper::new(provider, refs, settings.pointer_width);
    let mut chains: FxHashMap<TypeId, BaseChain> = FxHashMap::default();

    for index in base_first(placed) {
        let ty = &placed[index];
        let TargetKind::Interface(mode) = ty.kind else {
            continue;
        };
        let source_ty = source(provider, ty.id)?;
        let base = match ty.base {
            Some(BaseInterface::Local { id, .. }) => chains.get(&id).cloned().unwrap_or_default(),
            _ => BaseChain::default(),
        };

        let synth = MemberSynthesizer::new(&mapper, *names, settings, mode);
        let InterfaceFuncs { funcs, chain } = synth.interface_funcs(source_ty, &base, diagnostics);
        tracing::debug!(ty = %ty.name, funcs = funcs.len(), slots = chain.slots, "interface populated");
        chains.insert(ty.id, chain);

        let mut writer = TypeInfoWriter::new(builder, ty.handle, &ty.name);
        for func in funcs {
            writer.func(func)?;
        }
    }
    Ok(())
}

/// Indices of the placed interfaces, every local base before the
/// interfaces deriving from it. Cycles are cut where they close.
fn base_first(placed: &[PlacedType]) -> Vec<usize> {
    let index_of: FxHashMap<TypeId, usize> = placed
        .iter()
        .enumerate()
        .map(|(i, ty)| (ty.id, i))
        .collect();
    let mut done = vec![false; placed.len()];
    let mut order = Vec::with_capacity(placed.len());

    for start in 0..placed.len() {
        let mut chain: Vec<usize> = Vec::new();
        let mut cur = Some(start);
        while let Some(i) = cur {
            if done[i] || chain.contains(&i) || !matches!(placed[i].kind, TargetKind::Interface(_)) {
                break;
            }
            chain.push(i);
            cur = match placed[i].base {
                Some(BaseInterface::Local { id, .. }) => index_of.get(&id).copied(),
                _ => None,
            };
        }
        for &i in chain.iter().rev() {
            done[i] = true;
            order.push(i);
        }
    }
    order
}

/// The class's own exportable members, on its synthesized interface.
#[tracing::instrument(level = "debug", skip_all)]
pub(super) fn populate_class_interfaces<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
) -> Result<(), ExportError> {
    let LibraryExport {
        provider,
        settings,
        names,
        builder,
        diagnostics,
        placed,
        refs,
        ..
    } = lx;
    let (provider, settings) = (*provider, *settings);
    let mapper = TypeMapper::new(provider, refs, settings.pointer_width);

    for ty in placed.iter() {
        let Some(ci) = &ty.class_interface else {
            continue;
        };
        let class = source(provider, ty.id)?;
        let synth = MemberSynthesizer::new(&mapper, *names, settings, ci.mode);
        let funcs = synth
            .interface_funcs(class, &BaseChain::default(), diagnostics)
            .funcs;
        tracing::debug!(ty = %ci.name, funcs = funcs.len(), "class interface populated");

        let mut writer = TypeInfoWriter::new(builder, ci.handle, &ci.name);
        for func in funcs {
            writer.func(func)?;
        }
    }
    Ok(())
}

/// Public instance fields; an unmappable field is left out.
#[tracing::instrument(level = "debug", skip_all)]
pub(super) fn populate_records<B: TypeLibBuilder>(
    lx: &mut LibraryExport<'_, B>,
) -> Result<(), ExportError> {
    let LibraryExport {
        provider,
        settings,
        names,
        builder,
        diagnostics,
        placed,
        refs,
        ..
    } = lx;
    let (provider, settings) = (*provider, *settings);
    let mapper = TypeMapper::new(provider, refs, settings.pointer_width);

    for ty in placed.iter().filter(|t| t.kind == TargetKind::Record) {
        let record = source(provider, ty.id)?;
        let SourceKind::Record { fields } = &record.kind else {
            continue;
        };
        let mut writer = TypeInfoWriter::new(builder, ty.handle, &ty.name);
        for field in fields.iter().filter(|f| f.visibility == Visibility::Public) {
            let subject = format!("{}.{}", record.qualified_name(), field.name);
            let mapped = match mapper.map(&field.ty, field.marshal.as_ref(), MapContext::FIELD) {
                Ok(mapped) => mapped,
                Err(err) => {
                    tracing::warn!(field = %subject, %err, "field excluded");
                    diagnostics.add(
                        Diagnostic::warning(ErrorCode::W2002)
                            .with_subject(subject)
                            .with_message(format!("field `{}` is not exported", field.name))
                            .with_note(err.to_string()),
                    );
                    continue;
                }
            };
            for fallback in mapped.fallbacks {
                report_fallback(&subject, fallback, diagnostics);
            }
            let memid = i32::try_from(writer.next_var())
                .ok()
                .and_then(|i| FIRST_FIELD_MEMID.checked_add(i))
                .ok_or_else(|| ExportError::Internal(format!("`{}` has too many fields", ty.name)))?;
            let var = VarDesc {
                memid,
                kind: VarKind::PerInstance(ElemDesc::new(mapped.desc)),
                flags: VarFlags::empty(),
            };
            let name = names.field_name(record, &field.name, field.alias.as_deref());
            writer.var(var, &name, field.doc.as_deref())?;
        }
    }
    Ok(())
}

/// Constants as 32-bit integers; wider values are left out.
#[tracing::instrument(level = "debug", skip_all)]
pub(super) fn populate_enums<B: TypeLibBuilder>(lx: &mut LibraryExport<'_, B>) -> Result<(), ExportError> {
    let LibraryExport {
        provider,
        builder,
        diagnostics,
        placed,
        ..
    } = lx;
    let provider = *provider;

    for ty in placed.iter().filter(|t| t.kind == TargetKind::Enum) {
        let enumeration = source(provider, ty.id)?;
        let SourceKind::Enum { fields, .. } = &enumeration.kind else {
            continue;
        };
        let mut writer = TypeInfoWriter::new(builder, ty.handle, &ty.name);
        for (field, name) in fields.iter().zip(&ty.constants) {
            let (Some(name), Ok(value)) = (name, i32::try_from(field.value)) else {
                let subject = format!("{}.{}", enumeration.qualified_name(), field.name);
                tracing::warn!(constant = %subject, value = field.value, "constant excluded");
                diagnostics.add(
                    Diagnostic::warning(ErrorCode::W2003)
                        .with_subject(subject)
                        .with_message(format!(
                            "value {} does not fit a 32-bit constant",
                            field.value
                        )),
                );
                continue;
            };
            let var = VarDesc {
                memid: MEMBERID_NIL,
                kind: VarKind::Const(VariantValue::I4(value)),
                flags: VarFlags::empty(),
            };
            writer.var(var, name, field.doc.as_deref())?;
        }
    }
    Ok(())
}
