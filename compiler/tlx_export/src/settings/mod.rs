//! Export settings.
//!
//! Everything an upstream caller can tune about a run. Defaults reproduce
//! the conventional exporter output for a 64-bit target.

use tlx_diagnostic::DiagnosticConfig;
use tlx_meta::{Guid, Version};
use tlx_typelib::PointerWidth;

use crate::references::ReferencedLibrary;

/// First dispatch id handed to members without an explicit one.
pub const DEFAULT_FIRST_AUTO_DISPID: i32 = 0x6002_0000;

/// Settings for one export run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportSettings {
    /// Library name; the unit name when absent.
    pub name: Option<String>,
    /// Library guid; the unit's declared or derived guid when absent.
    pub guid: Option<Guid>,
    /// Library version; the unit version when absent.
    pub version: Option<Version>,
    /// Locale id; the unit's when absent.
    pub lcid: Option<u32>,
    /// Library help string; the unit's when absent.
    pub doc: Option<String>,
    /// Target pointer width (vtable slot size and pointer-sized integers).
    pub pointer_width: PointerWidth,
    /// Dispatch id of the first auto-numbered member of an interface.
    pub first_auto_dispid: i32,
    /// Whether dual interfaces return raw status codes.
    pub dual_status_codes: bool,
    /// Already-exported libraries external types resolve against.
    pub references: Vec<ReferencedLibrary>,
    /// Export dependency units that no reference covers.
    pub auto_generate_references: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub diagnostics: DiagnosticConfig,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            name: None,
            guid: None,
            version: None,
            lcid: None,
            doc: None,
            pointer_width: PointerWidth::Bits64,
            first_auto_dispid: DEFAULT_FIRST_AUTO_DISPID,
            dual_status_codes: true,
            references: Vec::new(),
            auto_generate_references: false,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl ExportSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_guid(mut self, guid: Guid) -> Self {
        self.guid = Some(guid);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn with_lcid(mut self, lcid: u32) -> Self {
        self.lcid = Some(lcid);
        self
    }

    #[must_use]
    pub fn with_pointer_width(mut self, width: PointerWidth) -> Self {
        self.pointer_width = width;
        self
    }

    #[must_use]
    pub fn with_first_auto_dispid(mut self, id: i32) -> Self {
        self.first_auto_dispid = id;
        self
    }

    #[must_use]
    pub fn with_dual_status_codes(mut self, raw: bool) -> Self {
        self.dual_status_codes = raw;
        self
    }

    #[must_use]
    pub fn with_reference(mut self, lib: ReferencedLibrary) -> Self {
        self.references.push(lib);
        self
    }

    #[must_use]
    pub fn with_auto_generated_references(mut self) -> Self {
        self.auto_generate_references = true;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, config: DiagnosticConfig) -> Self {
        self.diagnostics = config;
        self
    }

    /// Settings for a dependency exported on demand: same target and
    /// numbering, no identity overrides.
    pub(crate) fn for_dependency(&self) -> Self {
        ExportSettings {
            name: None,
            guid: None,
            version: None,
            lcid: None,
            doc: None,
            references: self.references.clone(),
            diagnostics: self.diagnostics.clone(),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests;
