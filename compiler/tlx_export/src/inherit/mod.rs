//! Inheritance and default-interface resolution.
//!
//! Decides the implemented-type list of every class and the base of every
//! interface, using only descriptors that already exist.

use smallvec::SmallVec;

use tlx_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use tlx_meta::{ReflectionProvider, SourceKind, SourceTy, SourceType};
use tlx_typelib::{stdole, HRef, ImplTypeFlags, TypeHandle};

use crate::classify::{InterfaceMode, TargetKind};
use crate::references::{RefTable, ReferencedKind};

/// One implemented-type slot of a class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ImplEntry {
    pub href: HRef,
    pub flags: ImplTypeFlags,
}

/// Resolved implemented types of a class.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClassImpls {
    /// In library order.
    pub entries: SmallVec<[ImplEntry; 4]>,
    /// The entry marked `DEFAULT` (non-source).
    pub default: HRef,
}

/// Base of an interface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BaseInterface {
    /// An exported local interface of the same mode.
    Local { id: tlx_meta::TypeId, handle: TypeHandle },
    /// The standard base contract.
    Standard(HRef),
}

impl BaseInterface {
    pub fn href(self) -> HRef {
        match self {
            BaseInterface::Local { handle, .. } => HRef::Local(handle),
            BaseInterface::Standard(href) => href,
        }
    }
}

/// Resolves inheritance against the reference table.
pub(crate) struct InheritanceResolver<'a> {
    provider: &'a dyn ReflectionProvider,
    refs: &'a RefTable,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(provider: &'a dyn ReflectionProvider, refs: &'a RefTable) -> Self {
        InheritanceResolver { provider, refs }
    }

    /// The implemented-type list of `class`.
    ///
    /// Order: class interface, implemented interfaces, explicit default (if
    /// not already listed), event sources. Returns `None` only when no
    /// default can be found at all, which needs the standard import.
    pub fn class_impls(
        &self,
        class: &SourceType,
        class_interface: Option<TypeHandle>,
        diagnostics: &mut DiagnosticQueue,
    ) -> Option<ClassImpls> {
        let subject = class.qualified_name();
        let mut entries: SmallVec<[ImplEntry; 4]> = SmallVec::new();
        let mut push = |entries: &mut SmallVec<[ImplEntry; 4]>, href: HRef| {
            if !entries.iter().any(|e| e.href == href) {
                entries.push(ImplEntry {
                    href,
                    flags: ImplTypeFlags::empty(),
                });
            }
        };

        if let Some(ci) = class_interface {
            push(&mut entries, HRef::Local(ci));
        }
        for iface in &class.interfaces {
            match self.interface_ref(iface) {
                Resolved::Found(href) => push(&mut entries, href),
                Resolved::Silent => {}
                Resolved::Missing(name) => skipped(&subject, &name, diagnostics),
            }
        }

        let (explicit, sources) = match &class.kind {
            SourceKind::Class {
                default_interface,
                source_interfaces,
                ..
            } => (default_interface.as_ref(), source_interfaces.as_slice()),
            _ => (None, &[][..]),
        };

        let explicit = explicit.and_then(|ty| match self.interface_ref(ty) {
            Resolved::Found(href) => {
                push(&mut entries, href);
                Some(href)
            }
            Resolved::Silent | Resolved::Missing(_) => {
                tracing::warn!(class = %subject, default = %ty, "explicit default interface unresolvable");
                diagnostics.add(
                    Diagnostic::warning(ErrorCode::W3003)
                        .with_subject(subject.clone())
                        .with_message(format!("default interface `{ty}` cannot be resolved"))
                        .with_note("the next candidate is used instead"),
                );
                None
            }
        });

        let default = match explicit
            .or(class_interface.map(HRef::Local))
            .or(entries.first().map(|e| e.href))
        {
            Some(href) => href,
            None => {
                let unknown = self.refs.stdole(stdole::IUNKNOWN)?;
                push(&mut entries, unknown);
                unknown
            }
        };
        for entry in &mut entries {
            if entry.href == default {
                entry.flags |= ImplTypeFlags::DEFAULT;
            }
        }

        let mut first_source = true;
        for source in sources {
            match self.interface_ref(source) {
                Resolved::Found(href) => {
                    let mut flags = ImplTypeFlags::SOURCE;
                    if first_source {
                        flags |= ImplTypeFlags::DEFAULT;
                        first_source = false;
                    }
                    entries.push(ImplEntry { href, flags });
                }
                Resolved::Silent => {}
                Resolved::Missing(name) => skipped(&subject, &name, diagnostics),
            }
        }

        tracing::debug!(class = %subject, count = entries.len(), "class interfaces resolved");
        Some(ClassImpls { entries, default })
    }

    /// Base of an interface: the first declared base when it is exported
    /// locally with the same mode, otherwise the standard contract.
    pub fn interface_base(&self, iface: &SourceType, mode: InterfaceMode) -> Option<BaseInterface> {
        let local = iface.interfaces.first().and_then(|base| match base {
            SourceTy::Named(id) => self.refs.local(*id).and_then(|l| match l.kind {
                TargetKind::Interface(m) if m == mode => Some(BaseInterface::Local {
                    id: *id,
                    handle: l.handle,
                }),
                _ => None,
            }),
            _ => None,
        });
        local.or_else(|| {
            self.refs
                .stdole(mode.stdole_base())
                .map(BaseInterface::Standard)
        })
    }

    fn interface_ref(&self, ty: &SourceTy) -> Resolved {
        match ty {
            SourceTy::Named(id) => match self.refs.local(*id) {
                Some(local) if matches!(local.kind, TargetKind::Interface(_)) => {
                    Resolved::Found(HRef::Local(local.handle))
                }
                _ => match self.provider.source_type(*id) {
                    // Invisible and generic interfaces are never exported.
                    Some(t) if !t.is_visible() || t.is_generic => Resolved::Silent,
                    Some(t) => Resolved::Missing(t.qualified_name()),
                    None => Resolved::Missing(ty.to_string()),
                },
            },
            SourceTy::External(ext) => match self.refs.external(ext) {
                Some(r) if r.kind == ReferencedKind::Interface => Resolved::Found(r.href),
                _ => Resolved::Missing(ext.qualified_name()),
            },
            SourceTy::Generic(_) => Resolved::Silent,
            other => Resolved::Missing(other.to_string()),
        }
    }
}

enum Resolved {
    Found(HRef),
    /// Not exported, and not worth a diagnostic.
    Silent,
    Missing(String),
}

fn skipped(subject: &str, name: &str, diagnostics: &mut DiagnosticQueue) {
    tracing::warn!(class = subject, interface = name, "interface skipped");
    diagnostics.add(
        Diagnostic::warning(ErrorCode::W3002)
            .with_subject(subject)
            .with_message(format!("interface `{name}` has no descriptor and is skipped")),
    );
}
