//! Name emission and alias resolution.
//!
//! Every name the exporter writes goes through [`NameMapper`], which applies
//! the entity's declared alias first and then asks the injected
//! [`AliasResolver`]. The resolver sees the entity's source identity
//! (`Namespace.Type.Member`) and the default name, and returns the name to
//! emit.

use rustc_hash::FxHashMap;

use tlx_meta::{EnumField, Parameter, SourceMember, SourceType};

/// What kind of entity a name belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EntityKind {
    Type,
    Member,
    Property,
    Parameter,
    EnumConstant,
}

/// Pluggable name override capability.
pub trait AliasResolver {
    fn map(&self, kind: EntityKind, identity: &str, default_name: &str) -> String;
}

/// Resolver that keeps every default name.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityResolver;

impl AliasResolver for IdentityResolver {
    fn map(&self, _kind: EntityKind, _identity: &str, default_name: &str) -> String {
        default_name.to_owned()
    }
}

/// Resolver backed by an explicit table of overrides.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    entries: FxHashMap<(EntityKind, String), String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, identity: impl Into<String>, name: impl Into<String>) {
        self.entries.insert((kind, identity.into()), name.into());
    }

    #[must_use]
    pub fn with(mut self, kind: EntityKind, identity: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert(kind, identity, name);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AliasResolver for AliasTable {
    fn map(&self, kind: EntityKind, identity: &str, default_name: &str) -> String {
        self.entries
            .get(&(kind, identity.to_owned()))
            .cloned()
            .unwrap_or_else(|| default_name.to_owned())
    }
}

/// Applies declared aliases and the injected resolver.
#[derive(Copy, Clone)]
pub struct NameMapper<'a> {
    resolver: &'a dyn AliasResolver,
}

impl<'a> NameMapper<'a> {
    pub fn new(resolver: &'a dyn AliasResolver) -> Self {
        NameMapper { resolver }
    }

    /// Candidate library name of a type, before uniqueness.
    pub fn type_name(&self, ty: &SourceType) -> String {
        let default = ty.alias.as_deref().unwrap_or(&ty.name);
        self.resolver
            .map(EntityKind::Type, &ty.qualified_name(), default)
    }

    /// Function name of a member: the property name for accessors.
    pub fn member_name(&self, owner: &SourceType, member: &SourceMember) -> String {
        let (kind, base) = match member.property() {
            Some(property) => (EntityKind::Property, property),
            None => (EntityKind::Member, member.name.as_str()),
        };
        let default = member.alias.as_deref().unwrap_or(base);
        let identity = format!("{}.{base}", owner.qualified_name());
        self.resolver.map(kind, &identity, default)
    }

    pub fn param_name(&self, owner: &SourceType, member: &SourceMember, param: &Parameter) -> String {
        let default = param.alias.as_deref().unwrap_or(&param.name);
        let identity = format!("{}.{}.{}", owner.qualified_name(), member.name, param.name);
        self.resolver.map(EntityKind::Parameter, &identity, default)
    }

    /// Field name of a record.
    pub fn field_name(&self, owner: &SourceType, name: &str, alias: Option<&str>) -> String {
        let identity = format!("{}.{name}", owner.qualified_name());
        self.resolver
            .map(EntityKind::Member, &identity, alias.unwrap_or(name))
    }

    /// Constant name: the field alias verbatim, else `<EnumName>_<Field>`
    /// built from the enum's mapped name.
    pub fn enum_constant(&self, owner: &SourceType, enum_name: &str, field: &EnumField) -> String {
        let default = match &field.alias {
            Some(alias) => alias.clone(),
            None => format!("{enum_name}_{}", field.name),
        };
        let identity = format!("{}.{}", owner.qualified_name(), field.name);
        self.resolver
            .map(EntityKind::EnumConstant, &identity, &default)
    }
}
