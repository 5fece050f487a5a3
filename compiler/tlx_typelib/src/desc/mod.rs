//! Target descriptors handed to a [`TypeLibBuilder`](crate::TypeLibBuilder).

use std::fmt;

use smallvec::SmallVec;

use crate::flags::{FuncFlags, ParamFlags, VarFlags};
use crate::value::{DefaultValue, VariantValue};
use crate::vartype::VarType;

/// Dispatch id of a type's default ("value") member.
pub const DISPID_VALUE: i32 = 0;
/// Dispatch id of the member supplying an enumerator.
pub const DISPID_NEWENUM: i32 = -4;
/// Unassigned member id.
pub const MEMBERID_NIL: i32 = -1;

/// Handle to a type info created in the library under construction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeHandle(u32);

impl TypeHandle {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        TypeHandle(raw)
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

/// Index into the library's import table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct ImportId(u32);

impl ImportId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ImportId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reference to a user-defined type, local or imported.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HRef {
    Local(TypeHandle),
    Imported { lib: ImportId, index: u32 },
}

/// Kind of a type info.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Enum,
    Record,
    /// Direct-binding interface (unknown-only, or dual with `DUAL`).
    Interface,
    /// Dispatch-only interface.
    Dispatch,
    CoClass,
}

impl TypeKind {
    pub const fn is_interface(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Dispatch)
    }

    pub const fn has_vars(self) -> bool {
        matches!(self, TypeKind::Enum | TypeKind::Record)
    }
}

/// Target width of pointers; drives vtable slot size.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerWidth {
    Bits32,
    #[default]
    Bits64,
}

impl PointerWidth {
    /// Size of one pointer (and one vtable slot) in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

/// A (possibly composite) type descriptor.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeDesc {
    Base(VarType),
    Ptr(Box<TypeDesc>),
    SafeArray(Box<TypeDesc>),
    CArray {
        elem: Box<TypeDesc>,
        bounds: SmallVec<[u32; 2]>,
    },
    UserDefined(HRef),
}

impl TypeDesc {
    pub fn ptr(inner: TypeDesc) -> TypeDesc {
        TypeDesc::Ptr(Box::new(inner))
    }

    pub fn safe_array(elem: TypeDesc) -> TypeDesc {
        TypeDesc::SafeArray(Box::new(elem))
    }

    pub fn c_array(elem: TypeDesc, len: u32) -> TypeDesc {
        TypeDesc::CArray {
            elem: Box::new(elem),
            bounds: smallvec::smallvec![len],
        }
    }

    /// The outermost elemental code.
    pub fn vt(&self) -> VarType {
        match self {
            TypeDesc::Base(vt) => *vt,
            TypeDesc::Ptr(_) => VarType::VT_PTR,
            TypeDesc::SafeArray(_) => VarType::VT_SAFEARRAY,
            TypeDesc::CArray { .. } => VarType::VT_CARRAY,
            TypeDesc::UserDefined(_) => VarType::VT_USERDEFINED,
        }
    }

    /// The descriptor wrapped by a pointer or array.
    pub fn inner(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Ptr(inner) | TypeDesc::SafeArray(inner) => Some(inner),
            TypeDesc::CArray { elem, .. } => Some(elem),
            TypeDesc::Base(_) | TypeDesc::UserDefined(_) => None,
        }
    }

    /// The user-defined reference at the core of this descriptor, if any.
    pub fn href(&self) -> Option<HRef> {
        match self {
            TypeDesc::UserDefined(href) => Some(*href),
            _ => self.inner().and_then(TypeDesc::href),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Base(vt) => write!(f, "{vt}"),
            TypeDesc::Ptr(inner) => write!(f, "{inner}*"),
            TypeDesc::SafeArray(inner) => write!(f, "SAFEARRAY({inner})"),
            TypeDesc::CArray { elem, bounds } => {
                write!(f, "{elem}")?;
                for b in bounds {
                    write!(f, "[{b}]")?;
                }
                Ok(())
            }
            TypeDesc::UserDefined(HRef::Local(h)) => write!(f, "type#{}", h.raw()),
            TypeDesc::UserDefined(HRef::Imported { lib, index }) => {
                write!(f, "import#{}:{index}", lib.index())
            }
        }
    }
}

/// A parameter, return or field descriptor.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ElemDesc {
    pub desc: TypeDesc,
    pub flags: ParamFlags,
    /// Encoded default value; set together with `HASDEFAULT`.
    pub default: Option<DefaultValue>,
}

impl ElemDesc {
    pub fn new(desc: TypeDesc) -> Self {
        ElemDesc {
            desc,
            flags: ParamFlags::empty(),
            default: None,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Attach an encoded default value and set `HASDEFAULT`.
    #[must_use]
    pub fn with_default(mut self, blob: DefaultValue) -> Self {
        self.flags |= ParamFlags::HASDEFAULT;
        self.default = Some(blob);
        self
    }
}

/// How a function is invoked.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InvokeKind {
    Func,
    PropertyGet,
    PropertyPut,
    PropertyPutRef,
}

impl InvokeKind {
    /// Whether two functions with these kinds may share a dispatch id.
    ///
    /// Only the accessors of one property may.
    pub fn may_share_id(self, other: InvokeKind) -> bool {
        use InvokeKind::{PropertyGet, PropertyPut, PropertyPutRef};
        matches!(
            (self, other),
            (PropertyGet, PropertyPut | PropertyPutRef)
                | (PropertyPut | PropertyPutRef, PropertyGet)
                | (PropertyPut, PropertyPutRef)
                | (PropertyPutRef, PropertyPut)
        )
    }
}

/// How a function is bound.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FuncKind {
    /// Vtable slot of a direct-binding interface.
    PureVirtual,
    /// Late-bound only.
    Dispatch,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CallConv {
    #[default]
    StdCall,
}

/// A function descriptor.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FuncDesc {
    pub memid: i32,
    pub invkind: InvokeKind,
    pub funckind: FuncKind,
    pub callconv: CallConv,
    pub params: Vec<ElemDesc>,
    pub ret: ElemDesc,
    /// Byte offset of the vtable slot.
    pub vtable_offset: u32,
    pub flags: FuncFlags,
}

impl FuncDesc {
    /// Number of parameters flagged optional.
    pub fn optional_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.flags.contains(ParamFlags::OPT))
            .count()
    }
}

/// What a variable holds.
#[derive(Clone, PartialEq, Debug)]
pub enum VarKind {
    /// Record field.
    PerInstance(ElemDesc),
    /// Enum constant.
    Const(VariantValue),
}

/// A variable descriptor (record field or enum constant).
#[derive(Clone, PartialEq, Debug)]
pub struct VarDesc {
    pub memid: i32,
    pub kind: VarKind,
    pub flags: VarFlags,
}
