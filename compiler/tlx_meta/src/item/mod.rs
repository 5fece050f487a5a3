//! Source items: types, members, parameters, fields.
//!
//! Every item carries the declared markers the exporter honors. Builders
//! are consuming (`with_*`, `param`, `implements`) so fixtures and
//! reflectors can describe a type in one expression.

use bitflags::bitflags;

use crate::guid::Guid;
use crate::marshal::MarshalAs;
use crate::ty::{qualify, Primitive, SourceTy};

/// Declared accessibility.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

bitflags! {
    /// Declared markers on a type, member or field.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Markers: u8 {
        /// Present in the library but hidden from browsers.
        const HIDDEN = 1 << 0;
        /// Not callable from macro-level languages.
        const RESTRICTED = 1 << 1;
        /// Explicitly excluded from export although public.
        const NOT_VISIBLE = 1 << 2;
    }
}

/// Declared interface capability.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterfaceCapability {
    Dual,
    DispatchOnly,
    UnknownOnly,
}

/// Whether and how a class interface is synthesized for a class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassInterfaceMode {
    /// No class interface.
    None,
    /// Dispatch-only class interface.
    #[default]
    AutoDispatch,
    /// Dual class interface.
    AutoDual,
}

/// A compile-time constant (parameter default value).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    Null,
    Bool(bool),
    Char(char),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
}

/// One named constant of an enum.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumField {
    pub name: String,
    pub value: i64,
    pub alias: Option<String>,
    pub doc: Option<String>,
}

/// One instance field of a record.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordField {
    pub name: String,
    pub ty: SourceTy,
    pub marshal: Option<MarshalAs>,
    pub visibility: Visibility,
    pub alias: Option<String>,
    pub doc: Option<String>,
}

impl RecordField {
    pub fn new(name: impl Into<String>, ty: SourceTy) -> Self {
        RecordField {
            name: name.into(),
            ty,
            marshal: None,
            visibility: Visibility::Public,
            alias: None,
            doc: None,
        }
    }

    #[must_use]
    pub fn marshal_as(mut self, marshal: impl Into<MarshalAs>) -> Self {
        self.marshal = Some(marshal.into());
        self
    }
}

/// Declared kind of a source type, with the kind-specific payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    Interface {
        /// `None` means no declaration (exported as dual).
        capability: Option<InterfaceCapability>,
    },
    Class {
        default_interface: Option<SourceTy>,
        /// Outgoing (event) interfaces, in declaration order.
        source_interfaces: Vec<SourceTy>,
        class_interface: ClassInterfaceMode,
    },
    Enum {
        underlying: Primitive,
        fields: Vec<EnumField>,
    },
    Record {
        fields: Vec<RecordField>,
    },
}

/// Parameter passing direction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    In,
    Out,
    InOut,
}

/// A method or accessor parameter.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    pub name: String,
    pub ty: SourceTy,
    pub by_ref: bool,
    pub direction: Direction,
    pub optional: bool,
    pub default: Option<ConstValue>,
    pub marshal: Option<MarshalAs>,
    pub alias: Option<String>,
}

impl Parameter {
    /// A by-value input parameter.
    pub fn new(name: impl Into<String>, ty: SourceTy) -> Self {
        Parameter {
            name: name.into(),
            ty,
            by_ref: false,
            direction: Direction::In,
            optional: false,
            default: None,
            marshal: None,
            alias: None,
        }
    }

    /// Pass by reference (in and out).
    #[must_use]
    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self.direction = Direction::InOut;
        self
    }

    /// Output-only by-reference parameter.
    #[must_use]
    pub fn out(mut self) -> Self {
        self.by_ref = true;
        self.direction = Direction::Out;
        self
    }

    /// Optional parameter, with an optional default value.
    #[must_use]
    pub fn optional(mut self, default: Option<ConstValue>) -> Self {
        self.optional = true;
        self.default = default;
        self
    }

    #[must_use]
    pub fn marshal_as(mut self, marshal: impl Into<MarshalAs>) -> Self {
        self.marshal = Some(marshal.into());
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// The role a member plays.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberRole {
    Method,
    Getter { property: String },
    Setter { property: String },
    Constructor,
}

/// A method, property accessor or constructor.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceMember {
    pub name: String,
    pub role: MemberRole,
    /// For setters the value parameter is always last.
    pub params: Vec<Parameter>,
    pub ret: SourceTy,
    pub ret_marshal: Option<MarshalAs>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_generic: bool,
    /// Keep the natural return instead of the status-code shape.
    pub preserve_sig: bool,
    pub dispid: Option<i32>,
    pub doc: Option<String>,
    pub description: Option<String>,
    pub alias: Option<String>,
    pub markers: Markers,
}

impl SourceMember {
    fn new(name: String, role: MemberRole, ret: SourceTy) -> Self {
        SourceMember {
            name,
            role,
            params: Vec::new(),
            ret,
            ret_marshal: None,
            visibility: Visibility::Public,
            is_static: false,
            is_generic: false,
            preserve_sig: false,
            dispid: None,
            doc: None,
            description: None,
            alias: None,
            markers: Markers::empty(),
        }
    }

    pub fn method(name: impl Into<String>, ret: SourceTy) -> Self {
        Self::new(name.into(), MemberRole::Method, ret)
    }

    /// Property getter returning `ty`.
    pub fn getter(property: impl Into<String>, ty: SourceTy) -> Self {
        let property = property.into();
        Self::new(
            format!("get_{property}"),
            MemberRole::Getter { property },
            ty,
        )
    }

    /// Property setter taking a `value` of type `ty`.
    pub fn setter(property: impl Into<String>, ty: SourceTy) -> Self {
        let property = property.into();
        let mut member = Self::new(
            format!("set_{property}"),
            MemberRole::Setter { property },
            SourceTy::Void,
        );
        member.params.push(Parameter::new("value", ty));
        member
    }

    pub fn constructor() -> Self {
        Self::new(".ctor".to_owned(), MemberRole::Constructor, SourceTy::Void)
    }

    /// Append a parameter. On setters it is inserted before the value.
    #[must_use]
    pub fn param(mut self, param: Parameter) -> Self {
        if matches!(self.role, MemberRole::Setter { .. }) && !self.params.is_empty() {
            let at = self.params.len() - 1;
            self.params.insert(at, param);
        } else {
            self.params.push(param);
        }
        self
    }

    #[must_use]
    pub fn dispid(mut self, id: i32) -> Self {
        self.dispid = Some(id);
        self
    }

    #[must_use]
    pub fn preserve_sig(mut self) -> Self {
        self.preserve_sig = true;
        self
    }

    #[must_use]
    pub fn returns_marshal(mut self, marshal: impl Into<MarshalAs>) -> Self {
        self.ret_marshal = Some(marshal.into());
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers |= markers;
        self
    }

    #[must_use]
    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    /// The property this accessor belongs to.
    pub fn property(&self) -> Option<&str> {
        match &self.role {
            MemberRole::Getter { property } | MemberRole::Setter { property } => Some(property),
            MemberRole::Method | MemberRole::Constructor => None,
        }
    }

    /// Whether the member is public and not marked invisible.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Public && !self.markers.contains(Markers::NOT_VISIBLE)
    }

    /// Help text: the description when present, the doc comment otherwise.
    pub fn help_string(&self) -> Option<&str> {
        self.description.as_deref().or(self.doc.as_deref())
    }
}

/// A type in the source unit.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceType {
    pub name: String,
    pub namespace: String,
    pub kind: SourceKind,
    pub visibility: Visibility,
    pub guid: Option<Guid>,
    pub doc: Option<String>,
    pub description: Option<String>,
    pub alias: Option<String>,
    pub markers: Markers,
    pub is_generic: bool,
    pub members: Vec<SourceMember>,
    /// For classes: implemented interfaces. For interfaces: base interfaces.
    pub interfaces: Vec<SourceTy>,
    /// Base class (classes only).
    pub base: Option<SourceTy>,
}

impl SourceType {
    fn new(namespace: impl Into<String>, name: impl Into<String>, kind: SourceKind) -> Self {
        SourceType {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            visibility: Visibility::Public,
            guid: None,
            doc: None,
            description: None,
            alias: None,
            markers: Markers::empty(),
            is_generic: false,
            members: Vec::new(),
            interfaces: Vec::new(),
            base: None,
        }
    }

    pub fn interface(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, SourceKind::Interface { capability: None })
    }

    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(
            namespace,
            name,
            SourceKind::Class {
                default_interface: None,
                source_interfaces: Vec::new(),
                class_interface: ClassInterfaceMode::default(),
            },
        )
    }

    pub fn enumeration(
        namespace: impl Into<String>,
        name: impl Into<String>,
        underlying: Primitive,
    ) -> Self {
        Self::new(
            namespace,
            name,
            SourceKind::Enum {
                underlying,
                fields: Vec::new(),
            },
        )
    }

    pub fn record(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, SourceKind::Record { fields: Vec::new() })
    }

    /// `Namespace.Name`.
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Public and not explicitly excluded.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Public && !self.markers.contains(Markers::NOT_VISIBLE)
    }

    /// Help text: the description when present, the doc comment otherwise.
    pub fn help_string(&self) -> Option<&str> {
        self.description.as_deref().or(self.doc.as_deref())
    }

    /// Whether a public parameterless constructor exists.
    pub fn has_default_constructor(&self) -> bool {
        self.members.iter().any(|m| {
            m.role == MemberRole::Constructor && m.params.is_empty() && m.is_visible()
        })
    }

    #[must_use]
    pub fn with_member(mut self, member: SourceMember) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn implements(mut self, iface: SourceTy) -> Self {
        self.interfaces.push(iface);
        self
    }

    #[must_use]
    pub fn base(mut self, base: SourceTy) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_guid(mut self, guid: Guid) -> Self {
        self.guid = Some(guid);
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers |= markers;
        self
    }

    #[must_use]
    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    #[must_use]
    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    /// Declare the interface capability (interfaces only).
    #[must_use]
    pub fn capability(mut self, cap: InterfaceCapability) -> Self {
        if let SourceKind::Interface { capability } = &mut self.kind {
            *capability = Some(cap);
        }
        self
    }

    /// Declare the default interface (classes only).
    #[must_use]
    pub fn default_interface(mut self, iface: SourceTy) -> Self {
        if let SourceKind::Class {
            default_interface, ..
        } = &mut self.kind
        {
            *default_interface = Some(iface);
        }
        self
    }

    /// Add an event-source interface (classes only).
    #[must_use]
    pub fn source_interface(mut self, iface: SourceTy) -> Self {
        if let SourceKind::Class {
            source_interfaces, ..
        } = &mut self.kind
        {
            source_interfaces.push(iface);
        }
        self
    }

    /// Choose the class-interface mode (classes only).
    #[must_use]
    pub fn class_interface(mut self, mode: ClassInterfaceMode) -> Self {
        if let SourceKind::Class {
            class_interface, ..
        } = &mut self.kind
        {
            *class_interface = mode;
        }
        self
    }

    /// Add a constant (enums only).
    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: i64) -> Self {
        if let SourceKind::Enum { fields, .. } = &mut self.kind {
            fields.push(EnumField {
                name: name.into(),
                value,
                alias: None,
                doc: None,
            });
        }
        self
    }

    /// Add an aliased constant (enums only).
    #[must_use]
    pub fn with_aliased_constant(
        mut self,
        name: impl Into<String>,
        value: i64,
        alias: impl Into<String>,
    ) -> Self {
        if let SourceKind::Enum { fields, .. } = &mut self.kind {
            fields.push(EnumField {
                name: name.into(),
                value,
                alias: Some(alias.into()),
                doc: None,
            });
        }
        self
    }

    /// Add a field (records only).
    #[must_use]
    pub fn with_field(mut self, field: RecordField) -> Self {
        if let SourceKind::Record { fields } = &mut self.kind {
            fields.push(field);
        }
        self
    }
}

#[cfg(test)]
mod tests;
