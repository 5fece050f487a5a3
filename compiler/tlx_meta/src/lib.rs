//! Reflected source metadata for the type-library exporter.
//!
//! This crate models the public surface of an attribute-annotated object
//! type system as the exporter sees it:
//!
//! - [`SourceType`]: interfaces, classes, enums and records with their
//!   declared markers (guid, alias, hidden/restricted, capability)
//! - [`SourceMember`] / [`Parameter`]: methods, property accessors and
//!   constructors, with explicit marshaling overrides ([`MarshalAs`])
//! - [`SourceTy`]: type expressions appearing in signatures and fields
//!
//! # Provider Contract
//!
//! The exporter never reflects anything itself. It consumes a
//! [`ReflectionProvider`], which enumerates a unit's types and hands out
//! immutable [`SourceType`] records addressed by [`TypeId`]. [`Unit`] is the
//! in-memory provider, assembled with a [`UnitBuilder`].

mod guid;
mod item;
mod marshal;
mod ty;
mod unit;

pub use guid::{Guid, GuidParseError};
pub use item::{
    ClassInterfaceMode, ConstValue, Direction, EnumField, InterfaceCapability, Markers,
    MemberRole, Parameter, RecordField, SourceKind, SourceMember, SourceType, Visibility,
};
pub use marshal::{MarshalAs, NativeType};
pub use ty::{ExternalKind, ExternalTypeRef, Primitive, SourceTy, WellKnown};
pub use unit::{LoadError, ReflectionProvider, TypeId, Unit, UnitBuilder, UnitData, UnitIdentity, Version};
