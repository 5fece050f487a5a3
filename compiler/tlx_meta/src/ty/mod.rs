//! Source-side type expressions.
//!
//! A [`SourceTy`] is what appears in a parameter, return, field or
//! implements-list position. Types defined in the unit being exported are
//! referenced by [`TypeId`]; types defined elsewhere are described by an
//! [`ExternalTypeRef`] carrying enough identity to look them up in a
//! referenced library.

use std::fmt;

use crate::unit::TypeId;

/// Primitive value types with a fixed bit width.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Pointer-sized signed integer.
    ISize,
    /// Pointer-sized unsigned integer.
    USize,
}

impl Primitive {
    /// Width in bits, or `None` for the pointer-sized integers.
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            Primitive::Bool | Primitive::I8 | Primitive::U8 => Some(8),
            Primitive::Char | Primitive::I16 | Primitive::U16 => Some(16),
            Primitive::I32 | Primitive::U32 | Primitive::F32 => Some(32),
            Primitive::I64 | Primitive::U64 | Primitive::F64 => Some(64),
            Primitive::ISize | Primitive::USize => None,
        }
    }

    /// Whether this is an integer type usable as an enum's underlying type.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::I8
                | Primitive::U8
                | Primitive::I16
                | Primitive::U16
                | Primitive::I32
                | Primitive::U32
                | Primitive::I64
                | Primitive::U64
        )
    }

    /// Source-level spelling, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::I8 => "i8",
            Primitive::U8 => "u8",
            Primitive::I16 => "i16",
            Primitive::U16 => "u16",
            Primitive::I32 => "i32",
            Primitive::U32 => "u32",
            Primitive::I64 => "i64",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::ISize => "isize",
            Primitive::USize => "usize",
        }
    }
}

/// Value types the automation runtime represents with a fixed built-in
/// code regardless of their structure layout.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WellKnown {
    DateTime,
    Decimal,
    Guid,
    /// Platform color value.
    Color,
}

/// What kind of type an external reference points at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExternalKind {
    Interface,
    Class,
    Enum { underlying: Primitive },
    Record,
}

/// A type defined outside the unit being exported.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalTypeRef {
    /// Name of the unit that defines the type.
    pub unit: String,
    pub namespace: String,
    pub name: String,
    pub kind: ExternalKind,
}

impl ExternalTypeRef {
    pub fn new(
        unit: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: ExternalKind,
    ) -> Self {
        ExternalTypeRef {
            unit: unit.into(),
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    /// `Namespace.Name`.
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// A type expression in a signature or field.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceTy {
    /// No value (return position only).
    Void,
    Primitive(Primitive),
    /// Immutable text.
    String,
    /// Mutable text buffer.
    StringBuilder,
    /// The root object type.
    Object,
    WellKnown(WellKnown),
    /// Single- or multi-dimensional array.
    Array(Box<SourceTy>),
    /// Unmanaged pointer.
    Pointer(Box<SourceTy>),
    /// A type defined in the unit being exported.
    Named(TypeId),
    /// A type defined in another unit.
    External(ExternalTypeRef),
    /// An open or constructed generic type, by display name.
    Generic(String),
}

impl SourceTy {
    pub fn array_of(elem: SourceTy) -> SourceTy {
        SourceTy::Array(Box::new(elem))
    }

    pub fn pointer_to(pointee: SourceTy) -> SourceTy {
        SourceTy::Pointer(Box::new(pointee))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, SourceTy::Void)
    }

    /// Whether values of this type are text.
    pub fn is_text(&self) -> bool {
        matches!(self, SourceTy::String | SourceTy::StringBuilder)
    }

    /// Whether this type contains a generic component anywhere.
    pub fn is_generic(&self) -> bool {
        match self {
            SourceTy::Generic(_) => true,
            SourceTy::Array(inner) | SourceTy::Pointer(inner) => inner.is_generic(),
            _ => false,
        }
    }

    /// Every local type this expression refers to, outermost first.
    pub fn local_refs(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        self.collect_local_refs(&mut out);
        out
    }

    fn collect_local_refs(&self, out: &mut Vec<TypeId>) {
        match self {
            SourceTy::Named(id) => out.push(*id),
            SourceTy::Array(inner) | SourceTy::Pointer(inner) => inner.collect_local_refs(out),
            _ => {}
        }
    }

    /// The external reference inside this expression, if any.
    pub fn external_ref(&self) -> Option<&ExternalTypeRef> {
        match self {
            SourceTy::External(ext) => Some(ext),
            SourceTy::Array(inner) | SourceTy::Pointer(inner) => inner.external_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for SourceTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTy::Void => write!(f, "void"),
            SourceTy::Primitive(p) => write!(f, "{}", p.name()),
            SourceTy::String => write!(f, "string"),
            SourceTy::StringBuilder => write!(f, "string-builder"),
            SourceTy::Object => write!(f, "object"),
            SourceTy::WellKnown(w) => write!(f, "{w:?}"),
            SourceTy::Array(inner) => write!(f, "{inner}[]"),
            SourceTy::Pointer(inner) => write!(f, "{inner}*"),
            SourceTy::Named(id) => write!(f, "type#{}", id.raw()),
            SourceTy::External(ext) => write!(f, "{}", ext.qualified_name()),
            SourceTy::Generic(name) => write!(f, "{name}"),
        }
    }
}

/// Join a namespace and a simple name with `.`, omitting an empty namespace.
pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{namespace}.{name}")
    }
}

#[cfg(test)]
mod tests;
