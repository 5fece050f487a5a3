//! Fixtures shared by unit tests.

use tlx_meta::{Primitive, SourceTy, SourceType, Unit, UnitBuilder, UnitIdentity, Version};

/// A unit named `App` holding `types` in order.
pub(crate) fn unit(types: impl IntoIterator<Item = SourceType>) -> Unit {
    let mut builder = UnitBuilder::new(UnitIdentity::new("App", Version::new(1, 0)));
    for ty in types {
        builder.add(ty);
    }
    builder.build().unwrap()
}

pub(crate) fn int() -> SourceTy {
    SourceTy::Primitive(Primitive::I32)
}
