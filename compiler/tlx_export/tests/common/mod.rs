//! Fixtures shared by the export integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use tlx_export::{ExportOutput, ExportSettings, Exporter};
use tlx_meta::{Primitive, SourceTy, SourceType, Unit, UnitBuilder, UnitIdentity, Version};
use tlx_typelib::TypeLib;

/// A unit named `App` holding `types` in order.
pub fn unit(types: impl IntoIterator<Item = SourceType>) -> Unit {
    named_unit("App", types)
}

pub fn named_unit(name: &str, types: impl IntoIterator<Item = SourceType>) -> Unit {
    let mut builder = UnitBuilder::new(UnitIdentity::new(name, Version::new(1, 0)));
    for ty in types {
        builder.add(ty);
    }
    builder.build().expect("fixture unit is valid")
}

pub fn export(unit: &Unit) -> ExportOutput<TypeLib> {
    export_with(unit, ExportSettings::default())
}

pub fn export_with(unit: &Unit, settings: ExportSettings) -> ExportOutput<TypeLib> {
    Exporter::new(unit, settings)
        .export_to_memory()
        .unwrap_or_else(|failure| panic!("export failed: {failure}"))
}

pub fn int() -> SourceTy {
    SourceTy::Primitive(Primitive::I32)
}

pub fn named(raw: u32) -> SourceTy {
    SourceTy::Named(tlx_meta::TypeId::new(raw))
}
