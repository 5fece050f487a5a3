//! The type-library builder contract.
//!
//! The exporter drives a [`TypeLibBuilder`] in two phases: every type is
//! created (and receives its identity) before any type references another,
//! then each type is populated and laid out. Committing consumes the
//! builder, so a library can be committed at most once.

use tlx_meta::{Guid, Version};

use crate::desc::{FuncDesc, HRef, ImportId, PointerWidth, TypeHandle, TypeKind, VarDesc};
use crate::flags::{ImplTypeFlags, TypeFlags};

/// Library-level attributes.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LibAttrs {
    pub name: String,
    pub guid: Guid,
    pub version: Version,
    pub lcid: u32,
    pub doc: Option<String>,
    pub pointer_width: PointerWidth,
}

/// An entry in the library's import table.
///
/// `type_names` lists the imported library's types by index, the index an
/// [`HRef::Imported`] points at.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ImportedLibrary {
    pub name: String,
    pub guid: Guid,
    pub version: Version,
    pub lcid: u32,
    pub type_names: Vec<String>,
}

impl ImportedLibrary {
    /// Index of the type named `name`.
    pub fn index_of(&self, name: &str) -> Option<u32> {
        let pos = self.type_names.iter().position(|n| n == name)?;
        u32::try_from(pos).ok()
    }
}

/// A rejected builder call.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("library attributes were never set")]
    MissingLibraryAttrs,
    #[error("name `{0}` is already defined in this library")]
    DuplicateName(String),
    #[error("no type with handle #{0}")]
    UnknownHandle(u32),
    #[error("no import with index #{0}")]
    UnknownImport(u32),
    #[error("`{type_name}` refers to a type that does not exist")]
    DanglingReference { type_name: String },
    #[error("`{0}` is already laid out")]
    LaidOut(String),
    #[error("`{0}` was never laid out")]
    NotLaidOut(String),
    #[error("index {index} is out of range for `{type_name}` ({len} entries)")]
    IndexOutOfRange {
        type_name: String,
        index: usize,
        len: usize,
    },
    #[error("`{type_name}` cannot hold {what}")]
    InvalidKind {
        type_name: String,
        what: &'static str,
    },
    #[error("`{type_name}` gives {names} names to a function with {params} parameters")]
    TooManyNames {
        type_name: String,
        names: usize,
        params: usize,
    },
    #[error("dispatch id {memid:#x} is used twice in `{type_name}`")]
    DuplicateDispId { type_name: String, memid: i32 },
    #[error("vtable offset {offset} of `{type_name}` function {index} must be at least {min}")]
    VtableBase {
        type_name: String,
        index: usize,
        offset: u32,
        min: u32,
    },
    #[error("vtable offsets of `{type_name}` are not strictly increasing at function {index}")]
    VtableOrder { type_name: String, index: usize },
    #[error("class `{type_name}` marks {count} interfaces default")]
    DefaultInterface { type_name: String, count: usize },
}

/// The native collaborator that records a library.
pub trait TypeLibBuilder {
    /// What a successful commit produces.
    type Output;

    fn set_library_attrs(&mut self, attrs: LibAttrs) -> Result<(), BuildError>;

    /// Create an empty type info. Names are unique case-insensitively.
    fn create_type(&mut self, name: &str, kind: TypeKind) -> Result<TypeHandle, BuildError>;

    fn set_guid(&mut self, ty: TypeHandle, guid: Guid) -> Result<(), BuildError>;

    fn set_version(&mut self, ty: TypeHandle, version: Version) -> Result<(), BuildError>;

    fn set_type_flags(&mut self, ty: TypeHandle, flags: TypeFlags) -> Result<(), BuildError>;

    fn set_doc_string(&mut self, ty: TypeHandle, doc: &str) -> Result<(), BuildError>;

    /// Add an implemented (or, for interfaces, base) type at `index`.
    fn add_impl_type(
        &mut self,
        ty: TypeHandle,
        index: usize,
        href: HRef,
        flags: ImplTypeFlags,
    ) -> Result<(), BuildError>;

    fn add_func(&mut self, ty: TypeHandle, index: usize, func: FuncDesc) -> Result<(), BuildError>;

    fn add_var(&mut self, ty: TypeHandle, index: usize, var: VarDesc) -> Result<(), BuildError>;

    /// Name a function and its parameters: `names[0]` is the function.
    fn set_func_names(
        &mut self,
        ty: TypeHandle,
        index: usize,
        names: &[String],
    ) -> Result<(), BuildError>;

    fn set_var_name(&mut self, ty: TypeHandle, index: usize, name: &str) -> Result<(), BuildError>;

    fn set_func_doc_string(
        &mut self,
        ty: TypeHandle,
        index: usize,
        doc: &str,
    ) -> Result<(), BuildError>;

    fn set_var_doc_string(
        &mut self,
        ty: TypeHandle,
        index: usize,
        doc: &str,
    ) -> Result<(), BuildError>;

    /// Register an imported library; importing the same guid twice
    /// returns the existing entry.
    fn add_import(&mut self, lib: ImportedLibrary) -> Result<ImportId, BuildError>;

    /// Finalize a type. Nothing may be added to it afterwards.
    fn layout(&mut self, ty: TypeHandle) -> Result<(), BuildError>;

    /// An empty builder of the same kind, for a dependent library.
    fn new_library(&self) -> Self
    where
        Self: Sized;

    /// Write the library out.
    fn commit(self) -> Result<Self::Output, BuildError>;
}
