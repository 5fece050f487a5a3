//! Member synthesis.
//!
//! Turns the exportable members of an interface (or of a class, for its
//! class interface) into function descriptors:
//!
//! - the shape (method, property get, put or put-by-ref) is chosen once
//! - parameters and the return type go through the [`TypeMapper`]; a
//!   member with any unmappable type is dropped with W2001
//! - the status-code transformation moves a natural return into a
//!   trailing `[out, retval]` parameter
//! - dispatch ids and vtable offsets are assigned per interface

pub mod dispid;
pub mod vtable;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use tlx_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use tlx_meta::{ConstValue, Direction, Markers, MemberRole, Parameter, SourceMember, SourceType};
use tlx_typelib::{
    name_key, CallConv, ElemDesc, FuncDesc, FuncFlags, InvokeKind, ParamFlags, TypeDesc,
    VariantValue, VarType, MEMBERID_NIL,
};

pub use dispid::{Assignment, DispIdAssigner, Reassignment};
pub use vtable::VtableLayout;

use crate::classify::InterfaceMode;
use crate::marshal::{Fallback, MapContext, TypeMapper, Unmappable};
use crate::names::NameMapper;
use crate::settings::ExportSettings;

/// Name of the parameter that receives a transformed return value.
pub const RETVAL_NAME: &str = "pRetVal";

/// Whether a member can appear in a library at all.
///
/// Non-visible, static and generic members and constructors are left out
/// without a diagnostic.
pub fn is_exportable_member(member: &SourceMember) -> bool {
    member.is_visible()
        && !member.is_static
        && !member.is_generic
        && member.role != MemberRole::Constructor
}

/// How a member is invoked.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberShape {
    Method,
    PropertyGet,
    PropertyPut,
    /// Setter whose value is an object reference.
    PropertyPutRef,
}

impl MemberShape {
    pub const fn invoke_kind(self) -> InvokeKind {
        match self {
            MemberShape::Method => InvokeKind::Func,
            MemberShape::PropertyGet => InvokeKind::PropertyGet,
            MemberShape::PropertyPut => InvokeKind::PropertyPut,
            MemberShape::PropertyPutRef => InvokeKind::PropertyPutRef,
        }
    }

    pub const fn is_put(self) -> bool {
        matches!(self, MemberShape::PropertyPut | MemberShape::PropertyPutRef)
    }
}

/// Whether a function returns a raw status code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StatusMode {
    /// Status-code return; the natural return becomes `[out, retval]`.
    Raw,
    /// The natural return type is returned as is.
    Natural,
}

impl StatusMode {
    pub fn select(mode: InterfaceMode, member: &SourceMember, settings: &ExportSettings) -> Self {
        if !member.preserve_sig && mode.raw_status_codes(settings) {
            StatusMode::Raw
        } else {
            StatusMode::Natural
        }
    }
}

/// A function descriptor with its names, before it is written.
#[derive(Clone, PartialEq, Debug)]
pub struct SynthesizedFunc {
    pub desc: FuncDesc,
    /// Function name followed by parameter names.
    pub names: Vec<String>,
    pub doc: Option<String>,
    /// Case-folded property name for accessors.
    pub property: Option<String>,
    /// Explicitly requested dispatch id.
    pub requested: Option<i32>,
    /// Parameter defaults, encoded when the function is written.
    pub defaults: SmallVec<[(usize, VariantValue); 2]>,
}

/// What an interface passes on to interfaces deriving from it.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct BaseChain {
    /// Dispatch ids of every function in the chain.
    pub ids: Vec<i32>,
    /// Vtable slots the chain occupies past the reserved ones.
    pub slots: u32,
    /// Identities in the chain that took an automatic id.
    pub auto_numbered: u32,
}

/// The functions of one interface and the chain it passes on.
#[derive(Clone, PartialEq, Debug)]
pub struct InterfaceFuncs {
    pub funcs: Vec<SynthesizedFunc>,
    pub chain: BaseChain,
}

/// Dispatch identities of an interface's functions.
struct Identities {
    /// Explicit request per identity.
    requested: Vec<Option<i32>>,
    /// Identity per function.
    of: Vec<usize>,
}

/// Group functions into dispatch identities.
///
/// Accessors of one property share an identity, which holds at most one
/// accessor of each invoke kind. A further accessor of the same kind (an
/// overloaded indexer) joins the next identity of that property with room
/// for it, or opens a new one.
fn group_identities(funcs: &[SynthesizedFunc]) -> Identities {
    let mut requested: Vec<Option<i32>> = Vec::new();
    let mut kinds: Vec<SmallVec<[InvokeKind; 2]>> = Vec::new();
    let mut of: Vec<usize> = Vec::with_capacity(funcs.len());
    let mut by_property: FxHashMap<&str, SmallVec<[usize; 1]>> = FxHashMap::default();
    for func in funcs {
        let kind = func.desc.invkind;
        let shared = func.property.as_deref().and_then(|p| {
            by_property
                .get(p)?
                .iter()
                .copied()
                .find(|&i| !kinds[i].contains(&kind))
        });
        let identity = match shared {
            Some(identity) => {
                if requested[identity].is_none() {
                    requested[identity] = func.requested;
                }
                identity
            }
            None => {
                requested.push(func.requested);
                kinds.push(SmallVec::new());
                let identity = requested.len() - 1;
                if let Some(p) = func.property.as_deref() {
                    by_property.entry(p).or_default().push(identity);
                }
                identity
            }
        };
        kinds[identity].push(kind);
        of.push(identity);
    }
    Identities { requested, of }
}

/// Synthesizes the functions of one interface.
pub(crate) struct MemberSynthesizer<'a> {
    mapper: &'a TypeMapper<'a>,
    names: NameMapper<'a>,
    settings: &'a ExportSettings,
    mode: InterfaceMode,
}

impl<'a> MemberSynthesizer<'a> {
    pub fn new(
        mapper: &'a TypeMapper<'a>,
        names: NameMapper<'a>,
        settings: &'a ExportSettings,
        mode: InterfaceMode,
    ) -> Self {
        MemberSynthesizer {
            mapper,
            names,
            settings,
            mode,
        }
    }

    /// Every exportable member of `owner`, with dispatch ids and vtable
    /// offsets assigned after what `base` already occupies.
    pub fn interface_funcs(
        &self,
        owner: &SourceType,
        base: &BaseChain,
        diagnostics: &mut DiagnosticQueue,
    ) -> InterfaceFuncs {
        let mut funcs: Vec<SynthesizedFunc> = owner
            .members
            .iter()
            .filter(|m| is_exportable_member(m))
            .filter_map(|m| self.synthesize(owner, m, diagnostics))
            .collect();

        let identities = group_identities(&funcs);
        let first_auto = i32::try_from(base.auto_numbered)
            .ok()
            .and_then(|n| self.settings.first_auto_dispid.checked_add(n))
            .unwrap_or(self.settings.first_auto_dispid);
        let assignment = DispIdAssigner::new(first_auto)
            .with_inherited(base.ids.iter().copied())
            .assign(&identities.requested);
        for moved in &assignment.reassigned {
            let name = identities
                .of
                .iter()
                .position(|&i| i == moved.identity)
                .and_then(|f| funcs.get(f))
                .map_or("", |f| f.names[0].as_str());
            tracing::warn!(owner = %owner.qualified_name(), name, wanted = moved.wanted, assigned = moved.assigned, "dispatch id reassigned");
            diagnostics.add(
                Diagnostic::warning(ErrorCode::W4001)
                    .with_subject(format!("{}.{name}", owner.qualified_name()))
                    .with_message(format!(
                        "dispatch id {} is already in use; assigned {}",
                        moved.wanted, moved.assigned
                    )),
            );
        }

        let layout = VtableLayout::new(self.mode, base.slots, self.settings.pointer_width);
        disambiguate_overloads(&mut funcs, &identities.of);
        for (index, func) in funcs.iter_mut().enumerate() {
            func.desc.memid = assignment.ids[identities.of[index]];
            func.desc.vtable_offset = layout.offset(index);
        }

        let own_autos = identities
            .requested
            .iter()
            .filter(|r| !matches!(r, Some(id) if *id != MEMBERID_NIL))
            .count();
        let chain = BaseChain {
            ids: base
                .ids
                .iter()
                .copied()
                .chain(funcs.iter().map(|f| f.desc.memid))
                .collect(),
            slots: base
                .slots
                .saturating_add(u32::try_from(funcs.len()).unwrap_or(u32::MAX)),
            auto_numbered: base
                .auto_numbered
                .saturating_add(u32::try_from(own_autos).unwrap_or(u32::MAX)),
        };
        InterfaceFuncs { funcs, chain }
    }

    /// One member's function, or `None` when it cannot be exported.
    pub fn synthesize(
        &self,
        owner: &SourceType,
        member: &SourceMember,
        diagnostics: &mut DiagnosticQueue,
    ) -> Option<SynthesizedFunc> {
        let shape = self.shape(member)?;
        let subject = format!("{}.{}", owner.qualified_name(), member.name);
        let mut fallbacks: Vec<Fallback> = Vec::new();

        let value_param = if shape.is_put() {
            member.params.len().checked_sub(1)
        } else {
            None
        };
        let mut names = vec![self.names.member_name(owner, member)];
        let mut params = Vec::with_capacity(member.params.len() + 1);
        let mut defaults = SmallVec::new();
        for (index, param) in member.params.iter().enumerate() {
            let ctx = if param.by_ref {
                MapContext::BY_REF
            } else {
                MapContext::empty()
            };
            let mapped = match self.mapper.map(&param.ty, param.marshal.as_ref(), ctx) {
                Ok(mapped) => mapped,
                Err(err) => {
                    unmappable(&subject, &format!("parameter `{}`", param.name), &err, diagnostics);
                    return None;
                }
            };
            fallbacks.extend(mapped.fallbacks);
            params.push(ElemDesc::new(mapped.desc).with_flags(param_flags(param)));
            if let Some(value) = param.default.as_ref().and_then(default_value) {
                defaults.push((index, value));
            }
            if Some(index) != value_param {
                names.push(self.names.param_name(owner, member, param));
            }
        }

        let ret = match self
            .mapper
            .map(&member.ret, member.ret_marshal.as_ref(), MapContext::RETURN)
        {
            Ok(mapped) => {
                fallbacks.extend(mapped.fallbacks);
                mapped.desc
            }
            Err(err) => {
                unmappable(&subject, "return type", &err, diagnostics);
                return None;
            }
        };
        let ret = match StatusMode::select(self.mode, member, self.settings) {
            StatusMode::Natural => ret,
            StatusMode::Raw => {
                if ret.vt() != VarType::VT_VOID {
                    params.push(
                        ElemDesc::new(TypeDesc::ptr(ret))
                            .with_flags(ParamFlags::OUT | ParamFlags::RETVAL),
                    );
                    names.push(RETVAL_NAME.to_owned());
                }
                TypeDesc::Base(VarType::VT_HRESULT)
            }
        };

        for fallback in fallbacks {
            report_fallback(&subject, fallback, diagnostics);
        }

        Some(SynthesizedFunc {
            desc: FuncDesc {
                memid: MEMBERID_NIL,
                invkind: shape.invoke_kind(),
                funckind: self.mode.func_kind(),
                callconv: CallConv::default(),
                params,
                ret: ElemDesc::new(ret),
                vtable_offset: 0,
                flags: func_flags(member.markers),
            },
            names,
            doc: member.help_string().map(str::to_owned),
            property: member.property().map(name_key),
            requested: member.dispid,
            defaults,
        })
    }

    fn shape(&self, member: &SourceMember) -> Option<MemberShape> {
        match &member.role {
            MemberRole::Method => Some(MemberShape::Method),
            MemberRole::Getter { .. } => Some(MemberShape::PropertyGet),
            MemberRole::Setter { .. } => {
                let by_ref = member
                    .params
                    .last()
                    .is_some_and(|p| self.mapper.is_reference_type(&p.ty));
                Some(if by_ref {
                    MemberShape::PropertyPutRef
                } else {
                    MemberShape::PropertyPut
                })
            }
            MemberRole::Constructor => None,
        }
    }
}

/// Rename methods whose name is already used by another identity.
fn disambiguate_overloads(funcs: &mut [SynthesizedFunc], identity_of: &[usize]) {
    let mut owners: FxHashMap<String, usize> = FxHashMap::default();
    for (func, &identity) in funcs.iter_mut().zip(identity_of) {
        let base = func.names[0].clone();
        let mut name = base.clone();
        let mut n = 2u32;
        while owners
            .get(&name_key(&name))
            .is_some_and(|&owner| owner != identity)
        {
            name = format!("{base}_{n}");
            n += 1;
        }
        owners.insert(name_key(&name), identity);
        func.names[0] = name;
    }
}

fn param_flags(param: &Parameter) -> ParamFlags {
    let mut flags = match param.direction {
        Direction::In => ParamFlags::IN,
        Direction::Out => ParamFlags::OUT,
        Direction::InOut => ParamFlags::IN | ParamFlags::OUT,
    };
    if param.optional {
        flags |= ParamFlags::OPT;
    }
    flags
}

fn func_flags(markers: Markers) -> FuncFlags {
    let mut flags = FuncFlags::empty();
    if markers.contains(Markers::HIDDEN) {
        flags |= FuncFlags::HIDDEN;
    }
    if markers.contains(Markers::RESTRICTED) {
        flags |= FuncFlags::RESTRICTED;
    }
    flags
}

/// Variant form of a declared default value.
fn default_value(value: &ConstValue) -> Option<VariantValue> {
    Some(match value {
        ConstValue::Null => VariantValue::Empty,
        ConstValue::Bool(b) => VariantValue::Bool(*b),
        ConstValue::Char(c) => VariantValue::UI2(u16::try_from(u32::from(*c)).ok()?),
        ConstValue::I64(v) => match i32::try_from(*v) {
            Ok(v) => VariantValue::I4(v),
            Err(_) => VariantValue::I8(*v),
        },
        ConstValue::U64(v) => match u32::try_from(*v) {
            Ok(v) => VariantValue::UI4(v),
            Err(_) => VariantValue::UI8(*v),
        },
        ConstValue::F64(v) => VariantValue::R8(*v),
        ConstValue::Str(s) => VariantValue::Bstr(s.clone()),
    })
}

fn unmappable(subject: &str, what: &str, err: &Unmappable, diagnostics: &mut DiagnosticQueue) {
    tracing::warn!(subject, what, %err, "member excluded");
    diagnostics.add(
        Diagnostic::warning(ErrorCode::W2001)
            .with_subject(subject)
            .with_message(format!("`{subject}` is not exported"))
            .with_note(format!("{what}: {err}")),
    );
}

pub(crate) fn report_fallback(subject: &str, fallback: Fallback, diagnostics: &mut DiagnosticQueue) {
    let diag = match fallback {
        Fallback::GenericObject(target) => Diagnostic::warning(ErrorCode::W3001)
            .with_message(format!("`{target}` has no descriptor; using the generic object")),
        Fallback::EnumAsInteger(target) => Diagnostic::warning(ErrorCode::W3004)
            .with_message(format!("`{target}` has no descriptor; using its underlying integer")),
    };
    diagnostics.add(diag.with_subject(subject));
}

#[cfg(test)]
mod tests;
