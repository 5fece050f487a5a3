use pretty_assertions::assert_eq;

use super::*;

#[test]
fn local_refs_walk_through_arrays_and_pointers() {
    let a = TypeId::new(3);
    let ty = SourceTy::array_of(SourceTy::pointer_to(SourceTy::Named(a)));
    assert_eq!(ty.local_refs(), vec![a]);
    assert!(SourceTy::String.local_refs().is_empty());
}

#[test]
fn generic_detection_is_recursive() {
    assert!(SourceTy::array_of(SourceTy::Generic("List`1".into())).is_generic());
    assert!(!SourceTy::array_of(SourceTy::Object).is_generic());
}

#[test]
fn external_ref_is_found_under_array() {
    let ext = ExternalTypeRef::new("Other", "Other.Ns", "IThing", ExternalKind::Interface);
    let ty = SourceTy::array_of(SourceTy::External(ext.clone()));
    assert_eq!(ty.external_ref(), Some(&ext));
    assert_eq!(ext.qualified_name(), "Other.Ns.IThing");
}

#[test]
fn display_is_readable() {
    let ty = SourceTy::array_of(SourceTy::Primitive(Primitive::I32));
    assert_eq!(ty.to_string(), "i32[]");
    assert_eq!(SourceTy::Named(TypeId::new(2)).to_string(), "type#2");
}

#[test]
fn pointer_sized_integers_have_no_fixed_width() {
    assert_eq!(Primitive::ISize.bit_width(), None);
    assert_eq!(Primitive::Char.bit_width(), Some(16));
    assert!(!Primitive::Bool.is_integer());
    assert!(Primitive::U64.is_integer());
}
