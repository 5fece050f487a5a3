//! Automation type-library descriptors.
//!
//! This crate is the target side of the exporter:
//!
//! - [`VarType`] / [`TypeDesc`] / [`ElemDesc`]: elemental codes and the
//!   recursive descriptors built from them
//! - [`FuncDesc`] / [`VarDesc`]: functions, record fields, enum constants
//! - [`TypeLibBuilder`]: the two-phase builder contract the exporter drives
//! - [`MemoryTypeLib`]: an in-memory builder committing to a [`TypeLib`]
//! - [`stdole`]: the standard automation library imported for
//!   `IUnknown`, `IDispatch`, `GUID` and `OLE_COLOR`

mod builder;
mod desc;
mod flags;
mod library;
mod memory;
pub mod stdole;
mod value;
mod vartype;

pub use builder::{BuildError, ImportedLibrary, LibAttrs, TypeLibBuilder};
pub use desc::{
    CallConv, ElemDesc, FuncDesc, FuncKind, HRef, ImportId, InvokeKind, PointerWidth, TypeDesc,
    TypeHandle, TypeKind, VarDesc, VarKind, DISPID_NEWENUM, DISPID_VALUE, MEMBERID_NIL,
};
pub use flags::{FuncFlags, ImplTypeFlags, ParamFlags, TypeFlags, VarFlags};
pub use library::{name_key, FuncInfo, ImplType, TypeInfo, TypeLib, VarInfo};
pub use memory::{reserved_slots, MemoryTypeLib, DISPATCH_SLOTS, UNKNOWN_SLOTS};
pub use value::{DefaultValue, VariantValue};
pub use vartype::VarType;
