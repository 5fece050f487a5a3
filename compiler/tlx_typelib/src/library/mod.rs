//! Committed libraries and their type infos.

use tlx_meta::{Guid, Version};

use crate::builder::{ImportedLibrary, LibAttrs};
use crate::desc::{FuncDesc, HRef, ImportId, TypeHandle, TypeKind, VarDesc};
use crate::flags::{ImplTypeFlags, TypeFlags};

/// An implemented-type slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ImplType {
    pub href: HRef,
    pub flags: ImplTypeFlags,
}

/// A function with its names and documentation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FuncInfo {
    pub desc: FuncDesc,
    /// Function name followed by parameter names.
    pub names: Vec<String>,
    pub doc: Option<String>,
}

impl FuncInfo {
    pub fn name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    pub fn param_names(&self) -> &[String] {
        self.names.get(1..).unwrap_or_default()
    }
}

/// A variable with its name and documentation.
#[derive(Clone, PartialEq, Debug)]
pub struct VarInfo {
    pub desc: VarDesc,
    pub name: String,
    pub doc: Option<String>,
}

/// One type in a library.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    pub guid: Guid,
    pub version: Version,
    pub flags: TypeFlags,
    pub doc: Option<String>,
    pub impl_types: Vec<ImplType>,
    pub funcs: Vec<FuncInfo>,
    pub vars: Vec<VarInfo>,
}

impl TypeInfo {
    pub(crate) fn new(name: &str, kind: TypeKind) -> Self {
        TypeInfo {
            name: name.to_owned(),
            kind,
            guid: Guid::NIL,
            version: Version::default(),
            flags: TypeFlags::empty(),
            doc: None,
            impl_types: Vec::new(),
            funcs: Vec::new(),
            vars: Vec::new(),
        }
    }

    /// The first function named `name`.
    pub fn func(&self, name: &str) -> Option<&FuncInfo> {
        self.funcs.iter().find(|f| f.name() == name)
    }

    /// Names of all functions, in slot order.
    pub fn func_names(&self) -> Vec<&str> {
        self.funcs.iter().map(FuncInfo::name).collect()
    }

    pub fn var(&self, name: &str) -> Option<&VarInfo> {
        self.vars.iter().find(|v| v.name == name)
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.vars.iter().map(|v| v.name.as_str()).collect()
    }

    /// The base interface of an interface.
    pub fn base(&self) -> Option<HRef> {
        if self.kind.is_interface() {
            self.impl_types.first().map(|i| i.href)
        } else {
            None
        }
    }

    /// The default (non-source) interface of a class.
    pub fn default_interface(&self) -> Option<HRef> {
        self.impl_types
            .iter()
            .find(|i| i.flags.contains(ImplTypeFlags::DEFAULT) && !i.flags.contains(ImplTypeFlags::SOURCE))
            .map(|i| i.href)
    }

    /// The default event-source interface of a class.
    pub fn default_source(&self) -> Option<HRef> {
        self.impl_types
            .iter()
            .find(|i| i.flags.contains(ImplTypeFlags::DEFAULT | ImplTypeFlags::SOURCE))
            .map(|i| i.href)
    }
}

/// A committed library.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeLib {
    pub attrs: LibAttrs,
    pub types: Vec<TypeInfo>,
    pub imports: Vec<ImportedLibrary>,
}

impl TypeLib {
    pub fn name(&self) -> &str {
        &self.attrs.name
    }

    pub fn guid(&self) -> Guid {
        self.attrs.guid
    }

    /// Look a type up by name, case-insensitively.
    pub fn find(&self, name: &str) -> Option<TypeHandle> {
        find_type(&self.types, name)
    }

    /// The type named `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.find(name).and_then(|h| self.type_info(h))
    }

    pub fn type_info(&self, handle: TypeHandle) -> Option<&TypeInfo> {
        self.types.get(handle.index())
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn import(&self, id: ImportId) -> Option<&ImportedLibrary> {
        self.imports.get(id.index())
    }

    /// Readable name of a reference: `Name` locally, `Lib.Name` imported.
    pub fn href_name(&self, href: HRef) -> Option<String> {
        match href {
            HRef::Local(h) => self.type_info(h).map(|t| t.name.clone()),
            HRef::Imported { lib, index } => {
                let lib = self.import(lib)?;
                let name = lib.type_names.get(index as usize)?;
                Some(format!("{}.{name}", lib.name))
            }
        }
    }
}

/// Key under which a name is compared. Library names are
/// case-insensitive.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

pub(crate) fn find_type(types: &[TypeInfo], name: &str) -> Option<TypeHandle> {
    let key = name_key(name);
    let pos = types.iter().position(|t| name_key(&t.name) == key)?;
    u32::try_from(pos).ok().map(TypeHandle::new)
}
