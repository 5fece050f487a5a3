//! Writing descriptors into one type info.

use tlx_typelib::{HRef, ImplTypeFlags, ParamFlags, TypeHandle, TypeLibBuilder, VarDesc};

use crate::error::ExportError;
use crate::members::SynthesizedFunc;

/// Appends functions, variables and implemented types to one type info.
///
/// Default values are encoded into the descriptor handed to the builder,
/// which takes the only copy. A rejected call drops it on the spot.
pub(crate) struct TypeInfoWriter<'b, B: TypeLibBuilder> {
    builder: &'b mut B,
    handle: TypeHandle,
    name: &'b str,
    funcs: usize,
    vars: usize,
    impls: usize,
}

impl<'b, B: TypeLibBuilder> TypeInfoWriter<'b, B> {
    pub fn new(builder: &'b mut B, handle: TypeHandle, name: &'b str) -> Self {
        TypeInfoWriter {
            builder,
            handle,
            name,
            funcs: 0,
            vars: 0,
            impls: 0,
        }
    }

    pub fn impl_type(&mut self, href: HRef, flags: ImplTypeFlags) -> Result<(), ExportError> {
        self.builder
            .add_impl_type(self.handle, self.impls, href, flags)
            .map_err(ExportError::build(format!("implemented type of `{}`", self.name)))?;
        self.impls += 1;
        Ok(())
    }

    pub fn func(&mut self, func: SynthesizedFunc) -> Result<(), ExportError> {
        let SynthesizedFunc {
            mut desc,
            names,
            doc,
            defaults,
            ..
        } = func;
        for (index, value) in defaults {
            if let Some(param) = desc.params.get_mut(index) {
                param.flags |= ParamFlags::HASDEFAULT;
                param.default = Some(value.encode());
            }
        }

        let index = self.funcs;
        let func_name = names.first().map_or("", String::as_str);
        let context = || format!("function `{}.{func_name}`", self.name);
        self.builder
            .add_func(self.handle, index, desc)
            .map_err(ExportError::build(context()))?;
        self.builder
            .set_func_names(self.handle, index, &names)
            .map_err(ExportError::build(context()))?;
        if let Some(doc) = &doc {
            self.builder
                .set_func_doc_string(self.handle, index, doc)
                .map_err(ExportError::build(context()))?;
        }
        self.funcs += 1;
        Ok(())
    }

    pub fn var(&mut self, var: VarDesc, name: &str, doc: Option<&str>) -> Result<(), ExportError> {
        let index = self.vars;
        let context = || format!("variable `{}.{name}`", self.name);
        self.builder
            .add_var(self.handle, index, var)
            .map_err(ExportError::build(context()))?;
        self.builder
            .set_var_name(self.handle, index, name)
            .map_err(ExportError::build(context()))?;
        if let Some(doc) = doc {
            self.builder
                .set_var_doc_string(self.handle, index, doc)
                .map_err(ExportError::build(context()))?;
        }
        self.vars += 1;
        Ok(())
    }

    /// Index the next variable will receive.
    pub fn next_var(&self) -> usize {
        self.vars
    }
}
