//! Per-library export state.
//!
//! A [`LibraryExport`] owns the builder and everything the passes share
//! while one unit is turned into one library. Passes are free functions
//! over it, run in order by [`Exporter`](super::Exporter).

use tlx_diagnostic::DiagnosticQueue;
use tlx_meta::{Guid, ReflectionProvider, SourceType, TypeId};
use tlx_typelib::{stdole, LibAttrs, TypeHandle, TypeLibBuilder};

use crate::classify::{InterfaceMode, TargetKind};
use crate::error::{ExportError, ExportFailure};
use crate::inherit::{BaseInterface, ClassImpls};
use crate::names::{AliasResolver, NameMapper};
use crate::references::{ImportNeeds, RefTable, ReferencedLibrary};
use crate::settings::ExportSettings;
use crate::unique::NameRegistry;

use super::{ExportOutput, ExportedType};

/// A classified type with its library names.
#[derive(Clone, Debug)]
pub(super) struct NamedType {
    pub id: TypeId,
    pub kind: TargetKind,
    pub name: String,
    pub class_interface: Option<String>,
    /// Constant names of an enum, by field; `None` for excluded fields.
    pub constants: Vec<Option<String>>,
}

/// A type whose placeholder exists.
#[derive(Clone, Debug)]
pub(super) struct PlacedType {
    pub id: TypeId,
    pub kind: TargetKind,
    pub name: String,
    pub handle: TypeHandle,
    pub class_interface: Option<ClassInterface>,
    pub constants: Vec<Option<String>>,
    /// Set by wiring for interfaces.
    pub base: Option<BaseInterface>,
    /// Set by wiring for classes.
    pub impls: Option<ClassImpls>,
}

/// The synthesized interface of a class.
#[derive(Clone, Debug)]
pub(super) struct ClassInterface {
    pub name: String,
    pub handle: TypeHandle,
    pub mode: InterfaceMode,
}

pub(super) struct LibraryExport<'a, B: TypeLibBuilder> {
    pub provider: &'a dyn ReflectionProvider,
    pub settings: &'a ExportSettings,
    pub names: NameMapper<'a>,
    pub builder: B,
    pub diagnostics: DiagnosticQueue,
    pub attrs: LibAttrs,
    /// Referenced libraries, including dependencies generated for this run.
    pub references: Vec<ReferencedLibrary>,
    pub classified: Vec<(TypeId, TargetKind)>,
    pub needs: ImportNeeds,
    pub registry: NameRegistry,
    pub named: Vec<NamedType>,
    pub placed: Vec<PlacedType>,
    pub refs: RefTable,
    /// Every created type, in creation order.
    pub exported: Vec<ExportedType>,
}

impl<'a, B: TypeLibBuilder> LibraryExport<'a, B> {
    pub fn new(
        provider: &'a dyn ReflectionProvider,
        settings: &'a ExportSettings,
        resolver: &'a dyn AliasResolver,
        builder: B,
    ) -> Self {
        LibraryExport {
            provider,
            settings,
            names: NameMapper::new(resolver),
            builder,
            diagnostics: DiagnosticQueue::with_config(settings.diagnostics.clone()),
            attrs: library_attrs(provider, settings),
            references: Vec::new(),
            classified: Vec::new(),
            needs: ImportNeeds::default(),
            registry: NameRegistry::new(),
            named: Vec::new(),
            placed: Vec::new(),
            refs: RefTable::default(),
            exported: Vec::new(),
        }
    }

    /// Name of the unit being exported.
    pub fn unit(&self) -> &str {
        &self.provider.identity().name
    }

    /// Commit the library. Consumes the builder.
    pub fn commit(self) -> Result<ExportOutput<B::Output>, ExportFailure> {
        let LibraryExport {
            provider,
            builder,
            mut diagnostics,
            attrs,
            exported,
            ..
        } = self;
        match builder.commit() {
            Ok(library) => {
                tracing::debug!(name = %attrs.name, types = exported.len(), "library committed");
                Ok(ExportOutput {
                    library,
                    unit: provider.identity().name.clone(),
                    attrs,
                    exported,
                    dependencies: Vec::new(),
                    diagnostics: diagnostics.flush(),
                })
            }
            Err(source) => {
                let error = ExportError::Build {
                    context: format!("commit of `{}`", attrs.name),
                    source,
                };
                Err(fail(&mut diagnostics, error))
            }
        }
    }

    /// Abandon the library. Nothing is committed.
    pub fn fail(mut self, error: ExportError) -> ExportFailure {
        fail(&mut self.diagnostics, error)
    }
}

fn fail(diagnostics: &mut DiagnosticQueue, error: ExportError) -> ExportFailure {
    tracing::debug!(%error, "export aborted");
    diagnostics.emit_error(error.to_diagnostic());
    ExportFailure {
        error,
        diagnostics: diagnostics.flush(),
    }
}

/// Library attributes: settings overrides over the unit identity.
fn library_attrs(provider: &dyn ReflectionProvider, settings: &ExportSettings) -> LibAttrs {
    let identity = provider.identity();
    LibAttrs {
        name: settings.name.clone().unwrap_or_else(|| identity.name.clone()),
        guid: settings.guid.unwrap_or_else(|| identity.guid_or_derived()),
        version: settings.version.unwrap_or(identity.version),
        lcid: settings.lcid.unwrap_or(identity.lcid),
        doc: settings.doc.clone().or_else(|| identity.doc.clone()),
        pointer_width: settings.pointer_width,
    }
}

/// The source type behind `id`.
pub(super) fn source(
    provider: &dyn ReflectionProvider,
    id: TypeId,
) -> Result<&SourceType, ExportError> {
    provider
        .source_type(id)
        .ok_or(ExportError::MissingType { id: id.raw() })
}

/// Library guid must differ from every referenced library.
#[tracing::instrument(level = "debug", skip_all, fields(guid = %lx.attrs.guid))]
pub(super) fn check_identity<B: TypeLibBuilder>(lx: &LibraryExport<'_, B>) -> Result<(), ExportError> {
    let guid = lx.attrs.guid;
    if guid == stdole::GUID {
        return Err(ExportError::DuplicateLibrary {
            guid,
            other: stdole::NAME.to_owned(),
        });
    }
    match lx.references.iter().find(|lib| lib.guid == guid) {
        Some(lib) => Err(ExportError::DuplicateLibrary {
            guid,
            other: lib.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Lay out every created type, in creation order.
#[tracing::instrument(level = "debug", skip_all, fields(count = lx.exported.len()))]
pub(super) fn lay_out<B: TypeLibBuilder>(lx: &mut LibraryExport<'_, B>) -> Result<(), ExportError> {
    for ty in &lx.exported {
        lx.builder
            .layout(ty.handle)
            .map_err(ExportError::build(format!("layout of `{}`", ty.name)))?;
    }
    Ok(())
}

/// Derived guid of a type that declares none.
pub(super) fn derived_guid(qualified: &str) -> Guid {
    Guid::derive(&Guid::EXPORT_NAMESPACE, qualified)
}
