//! Referenced libraries and the reference table.
//!
//! A [`ReferencedLibrary`] describes a library that was already exported
//! from another unit. External types in the unit being exported resolve
//! against these descriptions and become imported references.
//!
//! The [`RefTable`] is filled while placeholders are created and imports
//! are registered. Everything after that only reads it.

use rustc_hash::{FxHashMap, FxHashSet};

use tlx_meta::{
    ExternalTypeRef, Guid, ReflectionProvider, SourceKind, SourceTy, SourceType, TypeId, Version,
    Visibility, WellKnown,
};
use tlx_typelib::{HRef, ImportId, ImportedLibrary, TypeHandle, TypeKind};

use crate::classify::TargetKind;
use crate::members::is_exportable_member;

/// One type of a referenced library, at its library index.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferencedType {
    /// Name in the referenced library.
    pub name: String,
    pub kind: ReferencedKind,
    /// `Namespace.Name` of the source type; `None` for synthesized types.
    pub source: Option<String>,
    /// Library index of a class's default interface.
    pub default_interface: Option<u32>,
}

/// Kind of a referenced type, as far as reference mapping cares.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferencedKind {
    Interface,
    CoClass,
    Enum,
    Record,
}

impl ReferencedKind {
    pub fn from_type_kind(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Interface | TypeKind::Dispatch => ReferencedKind::Interface,
            TypeKind::CoClass => ReferencedKind::CoClass,
            TypeKind::Enum => ReferencedKind::Enum,
            TypeKind::Record => ReferencedKind::Record,
        }
    }
}

impl ReferencedType {
    pub fn new(source: impl Into<String>, name: impl Into<String>, kind: ReferencedKind) -> Self {
        ReferencedType {
            name: name.into(),
            kind,
            source: Some(source.into()),
            default_interface: None,
        }
    }

    /// A type with no source counterpart (a class interface).
    pub fn synthesized(name: impl Into<String>, kind: ReferencedKind) -> Self {
        ReferencedType {
            name: name.into(),
            kind,
            source: None,
            default_interface: None,
        }
    }

    #[must_use]
    pub fn with_default_interface(mut self, index: u32) -> Self {
        self.default_interface = Some(index);
        self
    }
}

/// An already-exported library.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferencedLibrary {
    /// Name of the unit the library was exported from.
    pub unit: String,
    pub name: String,
    pub guid: Guid,
    pub version: Version,
    pub lcid: u32,
    /// Every type of the library, in library order.
    pub types: Vec<ReferencedType>,
}

impl ReferencedLibrary {
    pub fn new(unit: impl Into<String>, name: impl Into<String>, guid: Guid, version: Version) -> Self {
        ReferencedLibrary {
            unit: unit.into(),
            name: name.into(),
            guid,
            version,
            lcid: 0,
            types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: ReferencedType) -> Self {
        self.types.push(ty);
        self
    }

    /// Index and entry of the type exported from `qualified`.
    pub fn find(&self, qualified: &str) -> Option<(u32, &ReferencedType)> {
        let pos = self
            .types
            .iter()
            .position(|t| t.source.as_deref() == Some(qualified))?;
        let index = u32::try_from(pos).ok()?;
        Some((index, &self.types[pos]))
    }

    /// The import-table entry for this library.
    pub fn to_import(&self) -> ImportedLibrary {
        ImportedLibrary {
            name: self.name.clone(),
            guid: self.guid,
            version: self.version,
            lcid: self.lcid,
            type_names: self.types.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

/// Descriptor of a local type.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct LocalRef {
    pub handle: TypeHandle,
    pub kind: TargetKind,
    /// Default interface of a class, once wiring has chosen it.
    pub default: Option<HRef>,
}

/// Descriptor of an external type found in a referenced library.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct ExternalRef {
    pub href: HRef,
    pub kind: ReferencedKind,
    pub default: Option<HRef>,
}

/// Everything reference mapping can point at.
#[derive(Clone, Debug, Default)]
pub(crate) struct RefTable {
    locals: FxHashMap<TypeId, LocalRef>,
    externals: FxHashMap<(String, String), ExternalRef>,
    stdole: Option<ImportId>,
}

impl RefTable {
    pub fn insert_local(&mut self, id: TypeId, handle: TypeHandle, kind: TargetKind) {
        self.locals.insert(
            id,
            LocalRef {
                handle,
                kind,
                default: None,
            },
        );
    }

    pub fn set_default(&mut self, id: TypeId, default: HRef) {
        if let Some(local) = self.locals.get_mut(&id) {
            local.default = Some(default);
        }
    }

    pub fn local(&self, id: TypeId) -> Option<&LocalRef> {
        self.locals.get(&id)
    }

    pub fn insert_external(&mut self, ext: &ExternalTypeRef, target: ExternalRef) {
        self.externals
            .insert((ext.unit.clone(), ext.qualified_name()), target);
    }

    pub fn external(&self, ext: &ExternalTypeRef) -> Option<&ExternalRef> {
        self.externals.get(&(ext.unit.clone(), ext.qualified_name()))
    }

    pub fn set_stdole(&mut self, id: ImportId) {
        self.stdole = Some(id);
    }

    /// Reference to the standard library type at `index`.
    pub fn stdole(&self, index: u32) -> Option<HRef> {
        self.stdole.map(|lib| HRef::Imported { lib, index })
    }
}

/// What the unit needs imported, found by scanning exported declarations.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ImportNeeds {
    pub stdole: bool,
    /// External references in first-use order, without duplicates.
    pub externals: Vec<ExternalTypeRef>,
}

impl ImportNeeds {
    /// Scan every exported type and the members that will be exported.
    pub fn scan(provider: &dyn ReflectionProvider, exported: &[(TypeId, TargetKind)]) -> Self {
        let mut needs = ImportNeeds::default();
        let mut seen = FxHashSet::default();
        for &(id, kind) in exported {
            let Some(ty) = provider.source_type(id) else {
                continue;
            };
            if matches!(kind, TargetKind::Interface(_) | TargetKind::CoClass { .. }) {
                needs.stdole = true;
            }
            for expr in signature_types(ty) {
                needs.note(expr, &mut seen);
            }
        }
        needs
    }

    fn note(&mut self, expr: &SourceTy, seen: &mut FxHashSet<ExternalTypeRef>) {
        match expr {
            SourceTy::WellKnown(WellKnown::Guid | WellKnown::Color) => self.stdole = true,
            SourceTy::Array(inner) | SourceTy::Pointer(inner) => self.note(inner, seen),
            SourceTy::External(ext) => {
                if seen.insert(ext.clone()) {
                    self.externals.push(ext.clone());
                }
            }
            _ => {}
        }
    }
}

/// Every type expression that can end up in `ty`'s descriptor.
fn signature_types(ty: &SourceType) -> Vec<&SourceTy> {
    let mut out: Vec<&SourceTy> = ty.interfaces.iter().collect();
    match &ty.kind {
        SourceKind::Class {
            default_interface,
            source_interfaces,
            ..
        } => {
            out.extend(default_interface.iter());
            out.extend(source_interfaces.iter());
        }
        SourceKind::Record { fields } => {
            out.extend(fields.iter().filter(|f| f.visibility == Visibility::Public).map(|f| &f.ty));
        }
        SourceKind::Interface { .. } | SourceKind::Enum { .. } => {}
    }
    for member in ty.members.iter().filter(|m| is_exportable_member(m)) {
        out.push(&member.ret);
        out.extend(member.params.iter().map(|p| &p.ty));
    }
    out
}

/// Resolve `ext` against `libs`, returning the library position and the
/// type's entry.
pub(crate) fn lookup<'l>(
    libs: &'l [ReferencedLibrary],
    ext: &ExternalTypeRef,
) -> Option<(usize, u32, &'l ReferencedType)> {
    let qualified = ext.qualified_name();
    libs.iter()
        .enumerate()
        .filter(|(_, lib)| lib.unit == ext.unit)
        .find_map(|(pos, lib)| lib.find(&qualified).map(|(index, ty)| (pos, index, ty)))
}
