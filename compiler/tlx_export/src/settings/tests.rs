use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults_target_64_bit_with_raw_dual_returns() {
    let s = ExportSettings::default();
    assert_eq!(s.pointer_width, PointerWidth::Bits64);
    assert_eq!(s.first_auto_dispid, 0x6002_0000);
    assert!(s.dual_status_codes);
    assert!(!s.auto_generate_references);
    assert!(s.references.is_empty());
}

#[test]
fn dependency_settings_drop_identity_overrides() {
    let s = ExportSettings::new()
        .with_name("Primary")
        .with_guid(Guid::NIL)
        .with_version(Version::new(3, 1))
        .with_pointer_width(PointerWidth::Bits32)
        .with_first_auto_dispid(100)
        .with_dual_status_codes(false);
    let dep = s.for_dependency();
    assert_eq!(dep.name, None);
    assert_eq!(dep.guid, None);
    assert_eq!(dep.version, None);
    assert_eq!(dep.pointer_width, PointerWidth::Bits32);
    assert_eq!(dep.first_auto_dispid, 100);
    assert!(!dep.dual_status_codes);
}
