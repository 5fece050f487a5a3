//! The standard OLE automation library every exported library may import.
//!
//! Only the types the exporter references are listed; their positions in
//! [`library`]'s type table are the indices below.

use tlx_meta::{Guid, Version};

use crate::builder::ImportedLibrary;

pub const NAME: &str = "stdole";

/// `{00020430-0000-0000-C000-000000000046}`
pub const GUID: Guid = Guid::from_fields(
    0x0002_0430,
    0x0000,
    0x0000,
    [0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46],
);

pub const VERSION: Version = Version::new(2, 0);

pub const IUNKNOWN: u32 = 0;
pub const IDISPATCH: u32 = 1;
pub const GUID_TYPE: u32 = 2;
pub const OLE_COLOR: u32 = 3;

/// The import-table entry for the standard library.
pub fn library() -> ImportedLibrary {
    ImportedLibrary {
        name: NAME.to_owned(),
        guid: GUID,
        version: VERSION,
        lcid: 0,
        type_names: ["IUnknown", "IDispatch", "GUID", "OLE_COLOR"]
            .into_iter()
            .map(str::to_owned)
            .collect(),
    }
}
