//! The export pipeline.
//!
//! [`Exporter::export`] turns one unit into one committed library:
//!
//! 0. classification, on-demand dependency libraries, identity checks
//! 1. name uniqueness
//! 2. placeholders for every type, then imports
//! 3. inheritance and default-interface wiring
//! 4. member population (interfaces base-first, class interfaces,
//!    records, enums)
//! 5. layout of every type info
//! 6. commit
//!
//! A fatal error in any pass abandons the builder; nothing is committed.
//! The walk is deterministic, so an unchanged unit exports identically.

mod collect;
mod imports;
mod library;
mod naming;
mod placeholders;
mod populate;
mod wiring;
mod writer;

use tlx_diagnostic::{Diagnostic, ErrorCode};
use tlx_meta::{ExternalTypeRef, ReflectionProvider, TypeId};
use tlx_typelib::{LibAttrs, MemoryTypeLib, TypeHandle, TypeKind, TypeLib, TypeLibBuilder};

use crate::error::{ExportError, ExportFailure};
use crate::names::{AliasResolver, IdentityResolver};
use crate::references::{lookup, ReferencedKind, ReferencedLibrary, ReferencedType};
use crate::settings::ExportSettings;

use library::LibraryExport;

/// One type of a committed library.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExportedType {
    pub name: String,
    pub kind: TypeKind,
    pub handle: TypeHandle,
    /// Source type; `None` for class interfaces.
    pub id: Option<TypeId>,
    /// `Namespace.Name` of the source type.
    pub source: Option<String>,
    /// Local default interface of a class.
    pub default_interface: Option<TypeHandle>,
}

/// A successful run.
#[derive(Clone, Debug)]
pub struct ExportOutput<L> {
    /// What the builder committed.
    pub library: L,
    /// Name of the exported unit.
    pub unit: String,
    pub attrs: LibAttrs,
    /// Every type, in library order.
    pub exported: Vec<ExportedType>,
    /// Libraries generated on demand for dependency units, dependencies
    /// first. Always empty on the dependencies themselves.
    pub dependencies: Vec<ExportOutput<L>>,
    /// Diagnostics in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

impl<L> ExportOutput<L> {
    /// The exported type created from `qualified`.
    pub fn exported(&self, qualified: &str) -> Option<&ExportedType> {
        self.exported
            .iter()
            .find(|t| t.source.as_deref() == Some(qualified))
    }

    /// Whether a diagnostic with `code` was recorded.
    pub fn has_diagnostic(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Description of this library for exporting units that refer to it.
    pub fn reference(&self) -> ReferencedLibrary {
        let mut lib = ReferencedLibrary::new(
            self.unit.clone(),
            self.attrs.name.clone(),
            self.attrs.guid,
            self.attrs.version,
        );
        lib.lcid = self.attrs.lcid;
        for ty in &self.exported {
            let kind = ReferencedKind::from_type_kind(ty.kind);
            let mut entry = match &ty.source {
                Some(source) => ReferencedType::new(source.clone(), ty.name.clone(), kind),
                None => ReferencedType::synthesized(ty.name.clone(), kind),
            };
            let default = ty
                .default_interface
                .and_then(|handle| self.exported.iter().position(|t| t.handle == handle))
                .and_then(|pos| u32::try_from(pos).ok());
            if let Some(index) = default {
                entry = entry.with_default_interface(index);
            }
            lib.types.push(entry);
        }
        lib
    }
}

/// Exports a unit into a type library.
pub struct Exporter<'a> {
    provider: &'a dyn ReflectionProvider,
    settings: ExportSettings,
    resolver: &'a dyn AliasResolver,
    dependencies: Vec<&'a dyn ReflectionProvider>,
}

/// State shared by a run and the dependency runs it starts.
struct Session<L> {
    /// Units being exported, outermost first.
    in_progress: Vec<String>,
    references: Vec<ReferencedLibrary>,
    generated: Vec<ExportOutput<L>>,
}

impl<'a> Exporter<'a> {
    pub fn new(provider: &'a dyn ReflectionProvider, settings: ExportSettings) -> Self {
        Exporter {
            provider,
            settings,
            resolver: &IdentityResolver,
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: &'a dyn AliasResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Make a dependency unit available for on-demand export.
    #[must_use]
    pub fn with_dependency(mut self, unit: &'a dyn ReflectionProvider) -> Self {
        self.dependencies.push(unit);
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Run every pass and commit `builder`.
    #[tracing::instrument(level = "debug", skip_all, fields(unit = %self.provider.identity().name))]
    pub fn export<B: TypeLibBuilder>(&self, builder: B) -> Result<ExportOutput<B::Output>, ExportFailure> {
        let mut session = Session {
            in_progress: Vec::new(),
            references: self.settings.references.clone(),
            generated: Vec::new(),
        };
        let mut output = self.export_unit(self.provider, &self.settings, builder, &mut session)?;
        output.dependencies = session.generated;
        Ok(output)
    }

    /// Export into an in-memory library.
    pub fn export_to_memory(&self) -> Result<ExportOutput<TypeLib>, ExportFailure> {
        self.export(MemoryTypeLib::new())
    }

    fn export_unit<B: TypeLibBuilder>(
        &self,
        provider: &dyn ReflectionProvider,
        settings: &ExportSettings,
        builder: B,
        session: &mut Session<B::Output>,
    ) -> Result<ExportOutput<B::Output>, ExportFailure> {
        let mut lx = LibraryExport::new(provider, settings, self.resolver, builder);
        session.in_progress.push(lx.unit().to_owned());
        let result = self.run_passes(&mut lx, session);
        session.in_progress.pop();
        match result {
            Ok(()) => lx.commit(),
            Err(error) => Err(lx.fail(error)),
        }
    }

    fn run_passes<B: TypeLibBuilder>(
        &self,
        lx: &mut LibraryExport<'_, B>,
        session: &mut Session<B::Output>,
    ) -> Result<(), ExportError> {
        // Pass 0: classification, dependencies, identity
        collect::collect_types(lx)?;
        if lx.settings.auto_generate_references {
            self.generate_dependencies(lx, session)?;
        }
        lx.references = session.references.clone();
        library::check_identity(lx)?;

        // Pass 1: names
        naming::assign_names(lx)?;

        // Pass 2: placeholders and imports
        placeholders::create_placeholders(lx)?;
        imports::register_imports(lx)?;

        // Pass 3: inheritance
        wiring::wire_inheritance(lx)?;

        // Pass 4: members
        populate::populate_interfaces(lx)?;
        populate::populate_class_interfaces(lx)?;
        populate::populate_records(lx)?;
        populate::populate_enums(lx)?;
        tracing::debug!("population complete");

        // Pass 5: layout
        library::lay_out(lx)
    }

    /// Export every dependency unit whose types the library needs but no
    /// referenced library covers.
    #[tracing::instrument(level = "debug", skip_all, fields(unit = %lx.unit()))]
    fn generate_dependencies<B: TypeLibBuilder>(
        &self,
        lx: &mut LibraryExport<'_, B>,
        session: &mut Session<B::Output>,
    ) -> Result<(), ExportError> {
        let uncovered: Vec<ExternalTypeRef> = lx
            .needs
            .externals
            .iter()
            .filter(|ext| lookup(&session.references, ext).is_none())
            .cloned()
            .collect();

        for ext in uncovered {
            let unit = ext.unit.as_str();
            if session.in_progress.iter().any(|u| u == unit) {
                tracing::debug!(unit, "dependency cycle; left to degrade");
                continue;
            }
            if session.generated.iter().any(|g| g.unit == unit)
                || session.references.iter().any(|r| r.unit == unit)
            {
                continue;
            }
            let Some(dependency) = self
                .dependencies
                .iter()
                .find(|d| d.identity().name == unit)
            else {
                tracing::debug!(unit, "no dependency unit supplied");
                continue;
            };

            let settings = lx.settings.for_dependency();
            let output = self
                .export_unit(*dependency, &settings, lx.builder.new_library(), session)
                .map_err(|failure| ExportError::Dependency {
                    unit: unit.to_owned(),
                    source: Box::new(failure),
                })?;
            tracing::debug!(unit, library = %output.attrs.name, "dependency exported");
            lx.diagnostics.add(
                Diagnostic::note(ErrorCode::W3005)
                    .with_subject(unit)
                    .with_message(format!("dependency exported as library `{}`", output.attrs.name)),
            );
            session.references.push(output.reference());
            session.generated.push(output);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
