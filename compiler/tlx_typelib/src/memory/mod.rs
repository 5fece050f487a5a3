//! In-memory type-library builder.
//!
//! [`MemoryTypeLib`] records every call and validates the structural rules
//! a native builder enforces, then commits to a [`TypeLib`] value.
//!
//! # Validation
//!
//! - type names (and enum constant names) are unique case-insensitively
//! - nothing is added to a type after `layout`
//! - at `layout`, dispatch ids are unique including those inherited along
//!   the local base chain, vtable offsets increase strictly from the
//!   reserved base, references resolve, classes mark exactly one default
//! - `commit` requires library attributes and every type laid out

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use tlx_meta::{Guid, Version};

use crate::builder::{BuildError, ImportedLibrary, LibAttrs, TypeLibBuilder};
use crate::desc::{
    FuncDesc, HRef, ImportId, TypeHandle, TypeKind, VarDesc, VarKind, MEMBERID_NIL,
};
use crate::flags::{ImplTypeFlags, TypeFlags};
use crate::library::{name_key, FuncInfo, ImplType, TypeInfo, TypeLib, VarInfo};

/// First id handed to functions laid out with [`MEMBERID_NIL`].
const FIRST_LAYOUT_DISPID: i32 = 0x6002_0000;

/// Vtable slots of the identity contract.
pub const UNKNOWN_SLOTS: u32 = 3;
/// Vtable slots of the identity plus dynamic-invocation contract.
pub const DISPATCH_SLOTS: u32 = 7;

/// Reserved vtable slots for an interface of `kind` with `flags`.
pub fn reserved_slots(kind: TypeKind, flags: TypeFlags) -> u32 {
    if kind == TypeKind::Dispatch || flags.intersects(TypeFlags::DUAL | TypeFlags::DISPATCHABLE) {
        DISPATCH_SLOTS
    } else {
        UNKNOWN_SLOTS
    }
}

/// Builder that keeps the library in memory.
#[derive(Debug, Default)]
pub struct MemoryTypeLib {
    attrs: Option<LibAttrs>,
    types: Vec<TypeInfo>,
    laid_out: Vec<bool>,
    imports: Vec<ImportedLibrary>,
    /// Case-folded names of types and enum constants.
    names: FxHashMap<String, String>,
}

impl MemoryTypeLib {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_name(&mut self, name: &str) -> Result<(), BuildError> {
        let key = name_key(name);
        if self.names.contains_key(&key) {
            return Err(BuildError::DuplicateName(name.to_owned()));
        }
        self.names.insert(key, name.to_owned());
        Ok(())
    }

    fn info(&self, ty: TypeHandle) -> Result<&TypeInfo, BuildError> {
        self.types
            .get(ty.index())
            .ok_or(BuildError::UnknownHandle(ty.raw()))
    }

    /// The type info for `ty`, if it can still be modified.
    fn open(&mut self, ty: TypeHandle) -> Result<&mut TypeInfo, BuildError> {
        let idx = ty.index();
        let laid_out = *self
            .laid_out
            .get(idx)
            .ok_or(BuildError::UnknownHandle(ty.raw()))?;
        let info = self
            .types
            .get_mut(idx)
            .ok_or(BuildError::UnknownHandle(ty.raw()))?;
        if laid_out {
            return Err(BuildError::LaidOut(info.name.clone()));
        }
        Ok(info)
    }

    fn check_href(&self, owner: &str, href: HRef) -> Result<(), BuildError> {
        let ok = match href {
            HRef::Local(h) => h.index() < self.types.len(),
            HRef::Imported { lib, index } => self
                .imports
                .get(lib.index())
                .is_some_and(|l| (index as usize) < l.type_names.len()),
        };
        if ok {
            Ok(())
        } else {
            Err(BuildError::DanglingReference {
                type_name: owner.to_owned(),
            })
        }
    }

    /// Local base chain of an interface, nearest first, cycle-guarded.
    fn base_chain(&self, ty: TypeHandle) -> Vec<TypeHandle> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(ty);
        let mut cur = self.types.get(ty.index()).and_then(TypeInfo::base);
        while let Some(HRef::Local(h)) = cur {
            if !seen.insert(h) {
                break;
            }
            chain.push(h);
            cur = self.types.get(h.index()).and_then(TypeInfo::base);
        }
        chain
    }

    fn layout_interface(&mut self, ty: TypeHandle) -> Result<(), BuildError> {
        let chain = self.base_chain(ty);
        let mut inherited_ids = FxHashSet::default();
        let mut inherited_funcs = 0u32;
        for base in &chain {
            if let Some(info) = self.types.get(base.index()) {
                inherited_ids.extend(info.funcs.iter().map(|f| f.desc.memid));
                inherited_funcs += u32::try_from(info.funcs.len()).unwrap_or(u32::MAX);
            }
        }

        let slot = self
            .attrs
            .as_ref()
            .map_or(8, |a| a.pointer_width.bytes());
        let info = self.open(ty)?;
        let name = info.name.clone();

        // Assign ids to functions that arrived without one.
        let mut taken: FxHashSet<i32> = info.funcs.iter().map(|f| f.desc.memid).collect();
        taken.extend(inherited_ids.iter().copied());
        let mut next = FIRST_LAYOUT_DISPID;
        for func in info.funcs.iter_mut().filter(|f| f.desc.memid == MEMBERID_NIL) {
            while taken.contains(&next) {
                next += 1;
            }
            func.desc.memid = next;
            taken.insert(next);
        }

        for (i, func) in info.funcs.iter().enumerate() {
            let memid = func.desc.memid;
            let clash_inherited = inherited_ids.contains(&memid);
            let clash_own = info.funcs[..i].iter().any(|prev| {
                prev.desc.memid == memid && !prev.desc.invkind.may_share_id(func.desc.invkind)
            });
            if clash_inherited || clash_own {
                return Err(BuildError::DuplicateDispId {
                    type_name: name,
                    memid,
                });
            }
        }

        let min = (reserved_slots(info.kind, info.flags) + inherited_funcs) * slot;
        let mut prev: Option<u32> = None;
        for (index, func) in info.funcs.iter().enumerate() {
            let offset = func.desc.vtable_offset;
            if offset < min {
                return Err(BuildError::VtableBase {
                    type_name: name,
                    index,
                    offset,
                    min,
                });
            }
            if prev.is_some_and(|p| offset <= p) || offset % slot != 0 {
                return Err(BuildError::VtableOrder {
                    type_name: name,
                    index,
                });
            }
            prev = Some(offset);
        }
        Ok(())
    }

    fn layout_class(&self, ty: TypeHandle) -> Result<(), BuildError> {
        let info = self.info(ty)?;
        let count = info
            .impl_types
            .iter()
            .filter(|i| {
                i.flags.contains(ImplTypeFlags::DEFAULT) && !i.flags.contains(ImplTypeFlags::SOURCE)
            })
            .count();
        if count == 1 {
            Ok(())
        } else {
            Err(BuildError::DefaultInterface {
                type_name: info.name.clone(),
                count,
            })
        }
    }

    fn check_references(&self, ty: TypeHandle) -> Result<(), BuildError> {
        let info = self.info(ty)?;
        let hrefs = info
            .impl_types
            .iter()
            .map(|i| Some(i.href))
            .chain(info.funcs.iter().flat_map(|f| {
                f.desc
                    .params
                    .iter()
                    .chain(std::iter::once(&f.desc.ret))
                    .map(|e| e.desc.href())
            }))
            .chain(info.vars.iter().map(|v| match &v.desc.kind {
                VarKind::PerInstance(e) => e.desc.href(),
                VarKind::Const(_) => None,
            }));
        for href in hrefs.flatten() {
            self.check_href(&info.name, href)?;
        }
        Ok(())
    }
}

fn insert_at<T>(items: &mut Vec<T>, index: usize, item: T, owner: &str) -> Result<(), BuildError> {
    if index > items.len() {
        return Err(BuildError::IndexOutOfRange {
            type_name: owner.to_owned(),
            index,
            len: items.len(),
        });
    }
    items.insert(index, item);
    Ok(())
}

fn out_of_range(owner: &str, index: usize, len: usize) -> BuildError {
    BuildError::IndexOutOfRange {
        type_name: owner.to_owned(),
        index,
        len,
    }
}

impl TypeLibBuilder for MemoryTypeLib {
    type Output = TypeLib;

    fn set_library_attrs(&mut self, attrs: LibAttrs) -> Result<(), BuildError> {
        debug!(name = %attrs.name, guid = %attrs.guid, "library attributes");
        self.attrs = Some(attrs);
        Ok(())
    }

    fn create_type(&mut self, name: &str, kind: TypeKind) -> Result<TypeHandle, BuildError> {
        self.claim_name(name)?;
        let raw = u32::try_from(self.types.len())
            .map_err(|_| BuildError::DuplicateName(name.to_owned()))?;
        self.types.push(TypeInfo::new(name, kind));
        self.laid_out.push(false);
        debug!(name, ?kind, handle = raw, "create type");
        Ok(TypeHandle::new(raw))
    }

    fn set_guid(&mut self, ty: TypeHandle, guid: Guid) -> Result<(), BuildError> {
        self.open(ty)?.guid = guid;
        Ok(())
    }

    fn set_version(&mut self, ty: TypeHandle, version: Version) -> Result<(), BuildError> {
        self.open(ty)?.version = version;
        Ok(())
    }

    fn set_type_flags(&mut self, ty: TypeHandle, flags: TypeFlags) -> Result<(), BuildError> {
        self.open(ty)?.flags = flags;
        Ok(())
    }

    fn set_doc_string(&mut self, ty: TypeHandle, doc: &str) -> Result<(), BuildError> {
        self.open(ty)?.doc = Some(doc.to_owned());
        Ok(())
    }

    fn add_impl_type(
        &mut self,
        ty: TypeHandle,
        index: usize,
        href: HRef,
        flags: ImplTypeFlags,
    ) -> Result<(), BuildError> {
        let owner = self.info(ty)?.name.clone();
        self.check_href(&owner, href)?;
        let info = self.open(ty)?;
        match info.kind {
            TypeKind::CoClass => {}
            TypeKind::Interface | TypeKind::Dispatch if info.impl_types.is_empty() && index == 0 => {}
            _ => {
                return Err(BuildError::InvalidKind {
                    type_name: owner,
                    what: "implemented types",
                })
            }
        }
        insert_at(&mut info.impl_types, index, ImplType { href, flags }, &owner)
    }

    fn add_func(&mut self, ty: TypeHandle, index: usize, func: FuncDesc) -> Result<(), BuildError> {
        let info = self.open(ty)?;
        if !info.kind.is_interface() {
            return Err(BuildError::InvalidKind {
                type_name: info.name.clone(),
                what: "functions",
            });
        }
        let owner = info.name.clone();
        let entry = FuncInfo {
            desc: func,
            names: Vec::new(),
            doc: None,
        };
        insert_at(&mut info.funcs, index, entry, &owner)
    }

    fn add_var(&mut self, ty: TypeHandle, index: usize, var: VarDesc) -> Result<(), BuildError> {
        let info = self.open(ty)?;
        if !info.kind.has_vars() {
            return Err(BuildError::InvalidKind {
                type_name: info.name.clone(),
                what: "variables",
            });
        }
        let owner = info.name.clone();
        let entry = VarInfo {
            desc: var,
            name: String::new(),
            doc: None,
        };
        insert_at(&mut info.vars, index, entry, &owner)
    }

    fn set_func_names(
        &mut self,
        ty: TypeHandle,
        index: usize,
        names: &[String],
    ) -> Result<(), BuildError> {
        let info = self.open(ty)?;
        let len = info.funcs.len();
        let owner = info.name.clone();
        let func = info
            .funcs
            .get_mut(index)
            .ok_or_else(|| out_of_range(&owner, index, len))?;
        let params = func.desc.params.len();
        if names.len() > params + 1 {
            return Err(BuildError::TooManyNames {
                type_name: owner,
                names: names.len(),
                params,
            });
        }
        func.names = names.to_vec();
        Ok(())
    }

    fn set_var_name(&mut self, ty: TypeHandle, index: usize, name: &str) -> Result<(), BuildError> {
        let is_enum = self.info(ty)?.kind == TypeKind::Enum;
        {
            let info = self.open(ty)?;
            if index >= info.vars.len() {
                return Err(out_of_range(&info.name, index, info.vars.len()));
            }
        }
        // Enum constants share the library namespace with types.
        if is_enum {
            self.claim_name(name)?;
        }
        let info = self.open(ty)?;
        if let Some(var) = info.vars.get_mut(index) {
            var.name = name.to_owned();
        }
        Ok(())
    }

    fn set_func_doc_string(
        &mut self,
        ty: TypeHandle,
        index: usize,
        doc: &str,
    ) -> Result<(), BuildError> {
        let info = self.open(ty)?;
        let len = info.funcs.len();
        match info.funcs.get_mut(index) {
            Some(func) => {
                func.doc = Some(doc.to_owned());
                Ok(())
            }
            None => Err(out_of_range(&info.name, index, len)),
        }
    }

    fn set_var_doc_string(
        &mut self,
        ty: TypeHandle,
        index: usize,
        doc: &str,
    ) -> Result<(), BuildError> {
        let info = self.open(ty)?;
        let len = info.vars.len();
        match info.vars.get_mut(index) {
            Some(var) => {
                var.doc = Some(doc.to_owned());
                Ok(())
            }
            None => Err(out_of_range(&info.name, index, len)),
        }
    }

    fn add_import(&mut self, lib: ImportedLibrary) -> Result<ImportId, BuildError> {
        let pos = match self.imports.iter().position(|l| l.guid == lib.guid) {
            Some(pos) => pos,
            None => {
                debug!(name = %lib.name, guid = %lib.guid, "import library");
                self.imports.push(lib);
                self.imports.len() - 1
            }
        };
        let raw = u32::try_from(pos).map_err(|_| BuildError::UnknownImport(u32::MAX))?;
        Ok(ImportId::new(raw))
    }

    fn layout(&mut self, ty: TypeHandle) -> Result<(), BuildError> {
        let kind = self.open(ty)?.kind;
        self.check_references(ty)?;
        match kind {
            TypeKind::Interface | TypeKind::Dispatch => self.layout_interface(ty)?,
            TypeKind::CoClass => self.layout_class(ty)?,
            TypeKind::Enum | TypeKind::Record => {}
        }
        if let Some(flag) = self.laid_out.get_mut(ty.index()) {
            *flag = true;
        }
        debug!(handle = ty.raw(), ?kind, "laid out");
        Ok(())
    }

    fn new_library(&self) -> Self {
        MemoryTypeLib::new()
    }

    fn commit(self) -> Result<TypeLib, BuildError> {
        let attrs = self.attrs.ok_or(BuildError::MissingLibraryAttrs)?;
        if let Some(pos) = self.laid_out.iter().position(|done| !done) {
            let name = self.types.get(pos).map(|t| t.name.clone()).unwrap_or_default();
            return Err(BuildError::NotLaidOut(name));
        }
        debug!(name = %attrs.name, types = self.types.len(), "commit");
        Ok(TypeLib {
            attrs,
            types: self.types,
            imports: self.imports,
        })
    }
}
