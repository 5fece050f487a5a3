use pretty_assertions::assert_eq;

use super::*;
use crate::marshal::NativeType;

// ── Members ──────────────────────────────────────────────────

#[test]
fn setter_keeps_value_parameter_last() {
    let setter = SourceMember::setter("Item", SourceTy::String)
        .param(Parameter::new("index", SourceTy::Primitive(Primitive::I32)));
    let names: Vec<&str> = setter.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["index", "value"]);
    assert_eq!(setter.property(), Some("Item"));
    assert_eq!(setter.name, "set_Item");
}

#[test]
fn getter_names_accessor_after_property() {
    let getter = SourceMember::getter("Count", SourceTy::Primitive(Primitive::I32));
    assert_eq!(getter.name, "get_Count");
    assert!(getter.params.is_empty());
    assert_eq!(getter.ret, SourceTy::Primitive(Primitive::I32));
}

#[test]
fn member_visibility_honors_markers() {
    let m = SourceMember::method("Run", SourceTy::Void);
    assert!(m.is_visible());
    assert!(!m.clone().non_public().is_visible());
    assert!(!m.markers(Markers::NOT_VISIBLE).is_visible());
}

#[test]
fn description_wins_over_doc() {
    let m = SourceMember::method("Run", SourceTy::Void).doc("docs");
    assert_eq!(m.help_string(), Some("docs"));
    let m = m.description("described");
    assert_eq!(m.help_string(), Some("described"));
}

#[test]
fn parameter_builders() {
    let p = Parameter::new("x", SourceTy::Primitive(Primitive::Bool))
        .out()
        .marshal_as(NativeType::I2);
    assert!(p.by_ref);
    assert_eq!(p.direction, Direction::Out);
    assert_eq!(p.marshal, Some(MarshalAs::new(NativeType::I2)));

    let p = Parameter::new("y", SourceTy::String).optional(Some(ConstValue::Str("a".into())));
    assert!(p.optional);
    assert_eq!(p.default, Some(ConstValue::Str("a".into())));
}

// ── Types ────────────────────────────────────────────────────

#[test]
fn creatable_requires_public_parameterless_constructor() {
    let bare = SourceType::class("N", "C");
    assert!(!bare.has_default_constructor());

    let with_args = SourceType::class("N", "C").with_member(
        SourceMember::constructor().param(Parameter::new("x", SourceTy::String)),
    );
    assert!(!with_args.has_default_constructor());

    let hidden = SourceType::class("N", "C").with_member(SourceMember::constructor().non_public());
    assert!(!hidden.has_default_constructor());

    let ok = SourceType::class("N", "C").with_member(SourceMember::constructor());
    assert!(ok.has_default_constructor());
}

#[test]
fn kind_specific_builders_ignore_other_kinds() {
    let iface = SourceType::interface("N", "I").class_interface(ClassInterfaceMode::AutoDual);
    assert_eq!(iface.kind, SourceKind::Interface { capability: None });

    let class = SourceType::class("N", "C").capability(InterfaceCapability::UnknownOnly);
    assert!(matches!(
        class.kind,
        SourceKind::Class {
            class_interface: ClassInterfaceMode::AutoDispatch,
            ..
        }
    ));
}

#[test]
fn enum_constants_keep_declaration_order() {
    let e = SourceType::enumeration("N", "Color", Primitive::I32)
        .with_constant("Red", 0)
        .with_aliased_constant("Green", 1, "clrGreen");
    let SourceKind::Enum { fields, underlying } = &e.kind else {
        panic!("expected enum");
    };
    assert_eq!(*underlying, Primitive::I32);
    assert_eq!(fields[0].name, "Red");
    assert_eq!(fields[1].alias.as_deref(), Some("clrGreen"));
}

#[test]
fn qualified_name_skips_empty_namespace() {
    assert_eq!(SourceType::record("", "Point").qualified_name(), "Point");
    assert_eq!(SourceType::record("Geo", "Point").qualified_name(), "Geo.Point");
}
