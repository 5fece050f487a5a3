//! Source units and the reflection provider contract.
//!
//! A unit is the assembly-equivalent the exporter turns into one library.
//! Types are stored in declaration order and addressed by [`TypeId`], a
//! dense index into that order.

use rustc_hash::FxHashMap;

use crate::guid::Guid;
use crate::item::{SourceKind, SourceType};
use crate::ty::SourceTy;

/// Index of a type within its unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Two-part version number.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16) -> Self {
        Version { major, minor }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Identity of a unit; becomes the default identity of its library.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitIdentity {
    pub name: String,
    pub version: Version,
    /// Declared library guid; derived from the name when absent.
    pub guid: Option<Guid>,
    /// Locale id.
    pub lcid: u32,
    pub doc: Option<String>,
}

impl UnitIdentity {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        UnitIdentity {
            name: name.into(),
            version,
            guid: None,
            lcid: 0,
            doc: None,
        }
    }

    #[must_use]
    pub fn with_guid(mut self, guid: Guid) -> Self {
        self.guid = Some(guid);
        self
    }

    /// The declared guid, or one derived from the unit name.
    pub fn guid_or_derived(&self) -> Guid {
        self.guid
            .unwrap_or_else(|| Guid::derive(&Guid::EXPORT_NAMESPACE, &self.name))
    }
}

/// What the exporter needs from a reflection provider.
///
/// Implementations hand out immutable views; the exporter never mutates
/// source metadata.
pub trait ReflectionProvider {
    /// Identity of the unit.
    fn identity(&self) -> &UnitIdentity;

    /// Every type in the unit, in declaration order.
    fn type_ids(&self) -> Vec<TypeId>;

    /// The type behind `id`, if it exists.
    fn source_type(&self, id: TypeId) -> Option<&SourceType>;

    /// Look a type up by namespace and simple name.
    fn find(&self, namespace: &str, name: &str) -> Option<TypeId>;
}

/// Failure to load a unit.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("type `{name}` refers to type #{missing}, which is not in the unit")]
    MissingType { name: String, missing: u32 },
    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),
    #[error("enum `{0}` has a non-integer underlying type")]
    InvalidEnum(String),
}

/// An in-memory unit.
#[derive(Clone, Debug)]
pub struct Unit {
    identity: UnitIdentity,
    types: Vec<SourceType>,
    by_name: FxHashMap<(String, String), TypeId>,
}

impl Unit {
    /// Build a unit from its serialized form.
    pub fn from_data(data: UnitData) -> Result<Unit, LoadError> {
        let mut builder = UnitBuilder::new(data.identity);
        for ty in data.types {
            builder.add(ty);
        }
        builder.build()
    }

    /// The serialized form of this unit.
    pub fn to_data(&self) -> UnitData {
        UnitData {
            identity: self.identity.clone(),
            types: self.types.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &SourceType)> {
        self.types.iter().enumerate().map(|(i, ty)| (type_id(i), ty))
    }
}

impl ReflectionProvider for Unit {
    fn identity(&self) -> &UnitIdentity {
        &self.identity
    }

    fn type_ids(&self) -> Vec<TypeId> {
        (0..self.types.len()).map(type_id).collect()
    }

    fn source_type(&self, id: TypeId) -> Option<&SourceType> {
        self.types.get(id.index())
    }

    fn find(&self, namespace: &str, name: &str) -> Option<TypeId> {
        self.by_name
            .get(&(namespace.to_owned(), name.to_owned()))
            .copied()
    }
}

/// Plain serializable form of a unit.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitData {
    pub identity: UnitIdentity,
    pub types: Vec<SourceType>,
}

/// Assembles a [`Unit`], validating it on [`build`](UnitBuilder::build).
pub struct UnitBuilder {
    identity: UnitIdentity,
    types: Vec<SourceType>,
}

impl UnitBuilder {
    pub fn new(identity: UnitIdentity) -> Self {
        UnitBuilder {
            identity,
            types: Vec::new(),
        }
    }

    /// The id the next added type will receive.
    pub fn next_id(&self) -> TypeId {
        type_id(self.types.len())
    }

    pub fn add(&mut self, ty: SourceType) -> TypeId {
        let id = self.next_id();
        self.types.push(ty);
        id
    }

    /// Mutate a type already added, e.g. to close a reference cycle.
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut SourceType> {
        self.types.get_mut(id.index())
    }

    /// Validate and freeze the unit.
    ///
    /// Every local reference must point inside the unit, qualified names
    /// must be unique and enums must sit on an integer type.
    pub fn build(self) -> Result<Unit, LoadError> {
        let count = self.types.len();
        let mut by_name = FxHashMap::default();
        by_name.reserve(count);

        for (i, ty) in self.types.iter().enumerate() {
            let key = (ty.namespace.clone(), ty.name.clone());
            if by_name.insert(key, type_id(i)).is_some() {
                return Err(LoadError::DuplicateType(ty.qualified_name()));
            }

            if let SourceKind::Enum { underlying, .. } = &ty.kind {
                if !underlying.is_integer() {
                    return Err(LoadError::InvalidEnum(ty.qualified_name()));
                }
            }

            if let Some(missing) = referenced_types(ty).find(|id| id.index() >= count) {
                return Err(LoadError::MissingType {
                    name: ty.qualified_name(),
                    missing: missing.raw(),
                });
            }
        }

        Ok(Unit {
            identity: self.identity,
            types: self.types,
            by_name,
        })
    }
}

/// Every local id mentioned anywhere in `ty`'s declaration.
fn referenced_types(ty: &SourceType) -> impl Iterator<Item = TypeId> + '_ {
    let mut exprs: Vec<&SourceTy> = Vec::new();
    exprs.extend(ty.interfaces.iter());
    exprs.extend(ty.base.iter());
    match &ty.kind {
        SourceKind::Class {
            default_interface,
            source_interfaces,
            ..
        } => {
            exprs.extend(default_interface.iter());
            exprs.extend(source_interfaces.iter());
        }
        SourceKind::Record { fields } => exprs.extend(fields.iter().map(|f| &f.ty)),
        SourceKind::Interface { .. } | SourceKind::Enum { .. } => {}
    }
    for member in &ty.members {
        exprs.push(&member.ret);
        exprs.extend(member.params.iter().map(|p| &p.ty));
    }
    exprs.into_iter().flat_map(SourceTy::local_refs)
}

#[inline]
#[allow(clippy::cast_possible_truncation)] // unit sizes stay far below u32::MAX
fn type_id(index: usize) -> TypeId {
    TypeId::new(index as u32)
}
