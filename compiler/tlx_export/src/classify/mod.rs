//! Type classification.
//!
//! Decides the target kind of every source type once, before any
//! descriptor exists. Later passes dispatch on [`TargetKind`] and never
//! re-inspect the source declaration's kind.

use tlx_meta::{ClassInterfaceMode, InterfaceCapability, Markers, SourceKind, SourceType};
use tlx_typelib::{stdole, FuncKind, TypeFlags, TypeKind};

use crate::settings::ExportSettings;

/// How an interface is synthesized.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InterfaceMode {
    /// Dynamic and direct binding.
    Dual,
    /// Dynamic binding only.
    DispatchOnly,
    /// Direct binding on the identity contract only.
    UnknownOnly,
}

impl InterfaceMode {
    pub fn from_capability(cap: Option<InterfaceCapability>) -> Self {
        match cap {
            None | Some(InterfaceCapability::Dual) => InterfaceMode::Dual,
            Some(InterfaceCapability::DispatchOnly) => InterfaceMode::DispatchOnly,
            Some(InterfaceCapability::UnknownOnly) => InterfaceMode::UnknownOnly,
        }
    }

    pub const fn type_kind(self) -> TypeKind {
        match self {
            InterfaceMode::Dual | InterfaceMode::UnknownOnly => TypeKind::Interface,
            InterfaceMode::DispatchOnly => TypeKind::Dispatch,
        }
    }

    pub const fn func_kind(self) -> FuncKind {
        match self {
            InterfaceMode::Dual | InterfaceMode::UnknownOnly => FuncKind::PureVirtual,
            InterfaceMode::DispatchOnly => FuncKind::Dispatch,
        }
    }

    /// Flags implied by the mode.
    pub fn flags(self) -> TypeFlags {
        match self {
            InterfaceMode::Dual => TypeFlags::DUAL | TypeFlags::OLEAUTOMATION | TypeFlags::DISPATCHABLE,
            InterfaceMode::DispatchOnly => TypeFlags::DISPATCHABLE,
            InterfaceMode::UnknownOnly => TypeFlags::empty(),
        }
    }

    pub const fn is_dispatch_capable(self) -> bool {
        !matches!(self, InterfaceMode::UnknownOnly)
    }

    /// Whether members of this mode return raw status codes.
    pub fn raw_status_codes(self, settings: &ExportSettings) -> bool {
        match self {
            InterfaceMode::UnknownOnly => true,
            InterfaceMode::Dual => settings.dual_status_codes,
            InterfaceMode::DispatchOnly => false,
        }
    }

    /// Index of the standard base interface in the stdole import.
    pub const fn stdole_base(self) -> u32 {
        if self.is_dispatch_capable() {
            stdole::IDISPATCH
        } else {
            stdole::IUNKNOWN
        }
    }
}

/// Target kind of an exported type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TargetKind {
    Enum,
    Record,
    Interface(InterfaceMode),
    CoClass {
        creatable: bool,
        /// Mode of the synthesized class interface, if one is generated.
        class_interface: Option<InterfaceMode>,
    },
}

impl TargetKind {
    pub const fn type_kind(self) -> TypeKind {
        match self {
            TargetKind::Enum => TypeKind::Enum,
            TargetKind::Record => TypeKind::Record,
            TargetKind::Interface(mode) => mode.type_kind(),
            TargetKind::CoClass { .. } => TypeKind::CoClass,
        }
    }

    pub const fn interface_mode(self) -> Option<InterfaceMode> {
        match self {
            TargetKind::Interface(mode) => Some(mode),
            _ => None,
        }
    }
}

/// Classifies source types.
#[derive(Copy, Clone, Debug, Default)]
pub struct TypeClassifier;

impl TypeClassifier {
    /// Target kind of `ty`, or `None` when it is not exported at all.
    ///
    /// Generic and non-visible types are excluded without a diagnostic.
    pub fn classify(self, ty: &SourceType) -> Option<TargetKind> {
        if ty.is_generic || !ty.is_visible() {
            return None;
        }
        let kind = match &ty.kind {
            SourceKind::Enum { .. } => TargetKind::Enum,
            SourceKind::Record { .. } => TargetKind::Record,
            SourceKind::Interface { capability } => {
                TargetKind::Interface(InterfaceMode::from_capability(*capability))
            }
            SourceKind::Class {
                class_interface, ..
            } => TargetKind::CoClass {
                creatable: ty.has_default_constructor(),
                class_interface: match class_interface {
                    ClassInterfaceMode::None => None,
                    ClassInterfaceMode::AutoDispatch => Some(InterfaceMode::DispatchOnly),
                    ClassInterfaceMode::AutoDual => Some(InterfaceMode::Dual),
                },
            },
        };
        Some(kind)
    }
}

/// Type flags for a placeholder of `ty` classified as `kind`.
pub fn type_flags(ty: &SourceType, kind: TargetKind) -> TypeFlags {
    let mut flags = marker_flags(ty.markers);
    match kind {
        TargetKind::Interface(mode) => flags |= mode.flags(),
        TargetKind::CoClass { creatable: true, .. } => flags |= TypeFlags::CANCREATE,
        TargetKind::CoClass { creatable: false, .. } | TargetKind::Enum | TargetKind::Record => {}
    }
    flags
}

/// Flags for a synthesized class interface.
pub fn class_interface_flags(class: &SourceType, mode: InterfaceMode) -> TypeFlags {
    marker_flags(class.markers) | mode.flags()
}

fn marker_flags(markers: Markers) -> TypeFlags {
    let mut flags = TypeFlags::empty();
    if markers.contains(Markers::HIDDEN) {
        flags |= TypeFlags::HIDDEN;
    }
    if markers.contains(Markers::RESTRICTED) {
        flags |= TypeFlags::RESTRICTED;
    }
    flags
}
