use pretty_assertions::assert_eq;

use tlx_meta::{
    ClassInterfaceMode, ExternalKind, Guid, Parameter, Primitive, RecordField, SourceMember,
    SourceTy, SourceType, Unit, UnitBuilder, UnitIdentity, Version,
};
use tlx_typelib::{
    stdole, ElemDesc, FuncKind, HRef, ImportId, InvokeKind, ParamFlags, TypeDesc, VarKind,
    VarType, VariantValue, MEMBERID_NIL,
};

use crate::test_helpers::{int, unit};

use super::*;

fn greeter_unit() -> Unit {
    unit([
        SourceType::interface("App", "IGreeter").with_member(
            SourceMember::method("Greet", SourceTy::String)
                .param(Parameter::new("name", SourceTy::String)),
        ),
        SourceType::class("App", "Greeter")
            .implements(SourceTy::Named(TypeId::new(0)))
            .with_member(SourceMember::constructor())
            .with_member(SourceMember::method("Wave", SourceTy::Void)),
        SourceType::enumeration("App", "Fruit", Primitive::I32)
            .with_constant("Apple", 0)
            .with_constant("Pear", 1),
        SourceType::record("App", "Point")
            .with_field(RecordField::new("X", int()))
            .with_field(RecordField::new("Y", int())),
    ])
}

fn export(provider: &dyn ReflectionProvider, settings: ExportSettings) -> ExportOutput<TypeLib> {
    Exporter::new(provider, settings)
        .export_to_memory()
        .unwrap_or_else(|failure| panic!("export failed: {failure}"))
}

fn fail(provider: &dyn ReflectionProvider, settings: ExportSettings) -> ExportFailure {
    match Exporter::new(provider, settings).export_to_memory() {
        Ok(_) => panic!("export should have failed"),
        Err(failure) => failure,
    }
}

fn library_unit(name: &str, types: impl IntoIterator<Item = SourceType>) -> Unit {
    let mut builder = UnitBuilder::new(UnitIdentity::new(name, Version::new(1, 0)));
    for ty in types {
        builder.add(ty);
    }
    builder.build().unwrap()
}

fn shape_ref(unit: &str) -> SourceTy {
    SourceTy::External(ExternalTypeRef::new(unit, unit, "IShape", ExternalKind::Interface))
}

// ── Pipeline ────────────────────────────────────────────────

#[test]
fn every_kind_lands_in_unit_order() {
    let unit = greeter_unit();
    let out = export(&unit, ExportSettings::default());

    assert_eq!(
        out.library.type_names(),
        vec!["IGreeter", "_Greeter", "Greeter", "Fruit", "Point"]
    );
    assert_eq!(out.library.name(), "App");
    assert_eq!(out.library.imports.len(), 1);
    assert_eq!(out.library.imports[0].name, stdole::NAME);
    assert_eq!(out.diagnostics, Vec::new());
}

#[test]
fn dual_interface_returns_status_codes() {
    let unit = greeter_unit();
    let out = export(&unit, ExportSettings::default());
    let iface = out.library.get("IGreeter").unwrap();

    assert_eq!(
        iface.base(),
        Some(HRef::Imported {
            lib: ImportId::new(0),
            index: stdole::IDISPATCH,
        })
    );
    let greet = iface.func("Greet").unwrap();
    assert_eq!(greet.names, vec!["Greet", "name", "pRetVal"]);
    assert_eq!(greet.desc.ret.desc, TypeDesc::Base(VarType::VT_HRESULT));
    assert_eq!(
        greet.desc.params[1],
        ElemDesc::new(TypeDesc::ptr(TypeDesc::Base(VarType::VT_BSTR)))
            .with_flags(ParamFlags::OUT | ParamFlags::RETVAL)
    );
    assert_eq!(greet.desc.memid, 0x6002_0000);
    assert_eq!(greet.desc.vtable_offset, 7 * 8);
}

#[test]
fn class_interface_is_the_default() {
    let unit = greeter_unit();
    let out = export(&unit, ExportSettings::default());
    let class = out.library.get("Greeter").unwrap();

    let default = class.default_interface().unwrap();
    assert_eq!(out.library.href_name(default).as_deref(), Some("_Greeter"));
    assert_eq!(class.impl_types.len(), 2);

    let ci = out.library.get("_Greeter").unwrap();
    assert_eq!(ci.kind, TypeKind::Dispatch);
    assert_eq!(ci.func_names(), vec!["Wave"]);
    assert_eq!(ci.funcs[0].desc.funckind, FuncKind::Dispatch);
    assert_eq!(ci.funcs[0].desc.ret.desc, TypeDesc::Base(VarType::VT_VOID));
}

#[test]
fn enum_constants_and_record_fields() {
    let unit = greeter_unit();
    let out = export(&unit, ExportSettings::default());

    let fruit = out.library.get("Fruit").unwrap();
    assert_eq!(fruit.var_names(), vec!["Fruit_Apple", "Fruit_Pear"]);
    assert_eq!(fruit.vars[1].desc.memid, MEMBERID_NIL);
    assert_eq!(fruit.vars[1].desc.kind, VarKind::Const(VariantValue::I4(1)));

    let point = out.library.get("Point").unwrap();
    assert_eq!(point.var_names(), vec!["X", "Y"]);
    assert_eq!(
        point.vars.iter().map(|v| v.desc.memid).collect::<Vec<_>>(),
        vec![0x4000_0000, 0x4000_0001]
    );
}

#[test]
fn rerun_is_identical() {
    let unit = greeter_unit();
    let first = export(&unit, ExportSettings::default());
    let second = export(&unit, ExportSettings::default());

    assert_eq!(first.library, second.library);
    assert_eq!(first.exported, second.exported);
}

#[test]
fn settings_override_identity() {
    let unit = greeter_unit();
    let guid: Guid = "6B29FC40-CA47-1067-B31D-00DD010662DA".parse().unwrap();
    let out = export(
        &unit,
        ExportSettings::new()
            .with_name("AppLib")
            .with_guid(guid)
            .with_version(Version::new(3, 1)),
    );

    assert_eq!(out.library.name(), "AppLib");
    assert_eq!(out.library.guid(), guid);
    assert_eq!(out.library.get("Point").unwrap().version, Version::new(3, 1));
    assert_eq!(out.unit, "App");
}

// ── Fatal errors ────────────────────────────────────────────

#[test]
fn library_guid_of_a_reference_is_fatal() {
    let unit = greeter_unit();
    let guid = unit.identity().guid_or_derived();
    let other = ReferencedLibrary::new("Other", "OtherLib", guid, Version::new(1, 0));

    let failure = fail(&unit, ExportSettings::new().with_reference(other));
    assert_eq!(failure.code(), ErrorCode::E1001);
    assert!(failure.diagnostics.iter().any(|d| d.is_error() && d.code == ErrorCode::E1001));
}

#[test]
fn library_guid_of_the_standard_library_is_fatal() {
    let unit = greeter_unit();
    let failure = fail(&unit, ExportSettings::new().with_guid(stdole::GUID));
    assert_eq!(
        failure.error,
        ExportError::DuplicateLibrary {
            guid: stdole::GUID,
            other: stdole::NAME.to_owned(),
        }
    );
}

#[test]
fn shared_type_guid_is_fatal() {
    let guid: Guid = "00000000-0000-0000-0000-0000000000AB".parse().unwrap();
    let unit = unit([
        SourceType::interface("App", "IFirst").with_guid(guid),
        SourceType::interface("App", "ISecond").with_guid(guid),
    ]);

    let failure = fail(&unit, ExportSettings::default());
    assert_eq!(
        failure.error,
        ExportError::DuplicateType {
            guid,
            first: "IFirst".to_owned(),
            second: "ISecond".to_owned(),
        }
    );
}

// ── Reference description ───────────────────────────────────

#[test]
fn reference_describes_defaults_by_index() {
    let unit = unit([
        SourceType::interface("App", "IGreeter"),
        SourceType::class("App", "Greeter")
            .class_interface(ClassInterfaceMode::None)
            .implements(SourceTy::Named(TypeId::new(0))),
    ]);
    let out = export(&unit, ExportSettings::default());
    let lib = out.reference();

    assert_eq!(lib.unit, "App");
    assert_eq!(lib.guid, out.library.guid());
    assert_eq!(
        lib.types,
        vec![
            ReferencedType::new("App.IGreeter", "IGreeter", ReferencedKind::Interface),
            ReferencedType::new("App.Greeter", "Greeter", ReferencedKind::CoClass)
                .with_default_interface(0),
        ]
    );
}

#[test]
fn class_interfaces_are_described_without_source() {
    let unit = greeter_unit();
    let out = export(&unit, ExportSettings::default());
    let lib = out.reference();

    assert_eq!(
        lib.types[1],
        ReferencedType::synthesized("_Greeter", ReferencedKind::Interface)
    );
    assert_eq!(lib.types[2].default_interface, Some(1));
}

// ── Dependencies ────────────────────────────────────────────

fn drawing_unit() -> Unit {
    unit([SourceType::interface("App", "ICanvas").with_member(
        SourceMember::method("Draw", SourceTy::Void).param(Parameter::new("shape", shape_ref("Shapes"))),
    )])
}

#[test]
fn missing_dependency_degrades_to_object() {
    let unit = drawing_unit();
    let out = export(&unit, ExportSettings::new().with_auto_generated_references());

    let draw = out.library.get("ICanvas").unwrap().func("Draw").unwrap();
    assert_eq!(draw.desc.params[0].desc, TypeDesc::Base(VarType::VT_UNKNOWN));
    assert!(out.has_diagnostic(ErrorCode::W3001));
    assert_eq!(out.dependencies.len(), 0);
}

#[test]
fn dependency_is_exported_and_imported() {
    let unit = drawing_unit();
    let shapes = library_unit("Shapes", [SourceType::interface("Shapes", "IShape")]);
    let out = Exporter::new(&unit, ExportSettings::new().with_auto_generated_references())
        .with_dependency(&shapes)
        .export_to_memory()
        .unwrap();

    assert_eq!(out.dependencies.len(), 1);
    assert_eq!(out.dependencies[0].unit, "Shapes");
    assert_eq!(out.dependencies[0].library.type_names(), vec!["IShape"]);
    assert!(out.has_diagnostic(ErrorCode::W3005));
    assert!(!out.has_diagnostic(ErrorCode::W3001));

    let draw = out.library.get("ICanvas").unwrap().func("Draw").unwrap();
    let href = draw.desc.params[0].desc.href().unwrap();
    assert_eq!(out.library.href_name(href).as_deref(), Some("Shapes.IShape"));
}

#[test]
fn dependencies_are_not_generated_unless_asked() {
    let unit = drawing_unit();
    let shapes = library_unit("Shapes", [SourceType::interface("Shapes", "IShape")]);
    let out = Exporter::new(&unit, ExportSettings::default())
        .with_dependency(&shapes)
        .export_to_memory()
        .unwrap();

    assert_eq!(out.dependencies.len(), 0);
    assert!(out.has_diagnostic(ErrorCode::W3001));
}

#[test]
fn dependency_cycle_degrades_inside_the_cycle() {
    let unit = drawing_unit();
    // Shapes refers back to App, which is still being exported.
    let back = SourceTy::External(ExternalTypeRef::new("App", "App", "ICanvas", ExternalKind::Interface));
    let shapes = library_unit(
        "Shapes",
        [SourceType::interface("Shapes", "IShape")
            .with_member(SourceMember::method("Paint", SourceTy::Void).param(Parameter::new("on", back)))],
    );
    let out = Exporter::new(&unit, ExportSettings::new().with_auto_generated_references())
        .with_dependency(&shapes)
        .export_to_memory()
        .unwrap();

    assert_eq!(out.dependencies.len(), 1);
    assert!(out.dependencies[0].has_diagnostic(ErrorCode::W3001));
    assert!(!out.has_diagnostic(ErrorCode::W3001));
}

#[test]
fn failing_dependency_fails_the_run() {
    let unit = drawing_unit();
    let guid: Guid = "00000000-0000-0000-0000-0000000000CD".parse().unwrap();
    let shapes = library_unit(
        "Shapes",
        [
            SourceType::interface("Shapes", "IShape").with_guid(guid),
            SourceType::interface("Shapes", "IOther").with_guid(guid),
        ],
    );
    let failure = Exporter::new(&unit, ExportSettings::new().with_auto_generated_references())
        .with_dependency(&shapes)
        .export_to_memory()
        .unwrap_err();

    assert_eq!(failure.code(), ErrorCode::E1002);
    assert!(matches!(failure.error, ExportError::Dependency { ref unit, .. } if unit == "Shapes"));
}

#[test]
fn property_accessors_share_an_id() {
    let unit = unit([SourceType::interface("App", "IShape")
        .with_member(SourceMember::getter("Name", SourceTy::String))
        .with_member(SourceMember::setter("Name", SourceTy::String))]);
    let out = export(&unit, ExportSettings::default());
    let iface = out.library.get("IShape").unwrap();

    assert_eq!(iface.func_names(), vec!["Name", "Name"]);
    assert_eq!(iface.funcs[0].desc.invkind, InvokeKind::PropertyGet);
    assert_eq!(iface.funcs[1].desc.invkind, InvokeKind::PropertyPut);
    assert_eq!(iface.funcs[0].desc.memid, iface.funcs[1].desc.memid);
}

// ── Writer ──────────────────────────────────────────────────

fn paging_func() -> crate::members::SynthesizedFunc {
    crate::members::SynthesizedFunc {
        desc: tlx_typelib::FuncDesc {
            memid: 1,
            invkind: InvokeKind::Func,
            funckind: FuncKind::PureVirtual,
            callconv: tlx_typelib::CallConv::StdCall,
            params: vec![ElemDesc::new(TypeDesc::Base(VarType::VT_I4)).with_flags(ParamFlags::IN | ParamFlags::OPT)],
            ret: ElemDesc::new(TypeDesc::Base(VarType::VT_HRESULT)),
            vtable_offset: 24,
            flags: tlx_typelib::FuncFlags::empty(),
        },
        names: vec!["Page".to_owned(), "size".to_owned()],
        doc: None,
        property: None,
        requested: None,
        defaults: smallvec::smallvec![(0, VariantValue::I4(25))],
    }
}

fn paging_builder() -> (MemoryTypeLib, TypeHandle) {
    let mut builder = MemoryTypeLib::new();
    builder
        .set_library_attrs(LibAttrs {
            name: "Paging".to_owned(),
            guid: Guid::NIL,
            version: Version::new(1, 0),
            lcid: 0,
            doc: None,
            pointer_width: tlx_typelib::PointerWidth::Bits64,
        })
        .unwrap();
    let handle = builder.create_type("IPager", TypeKind::Interface).unwrap();
    (builder, handle)
}

#[test]
fn writer_hands_the_encoded_default_to_the_builder() {
    let (mut builder, handle) = paging_builder();
    writer::TypeInfoWriter::new(&mut builder, handle, "IPager")
        .func(paging_func())
        .unwrap();
    builder.layout(handle).unwrap();
    let lib = builder.commit().unwrap();

    let size = &lib.get("IPager").unwrap().func("Page").unwrap().desc.params[0];
    assert!(size.flags.contains(ParamFlags::HASDEFAULT));
    assert_eq!(size.default.as_ref().and_then(|b| b.decode()), Some(VariantValue::I4(25)));
}

#[test]
fn writer_reports_a_rejected_function() {
    let (mut builder, handle) = paging_builder();
    builder.layout(handle).unwrap();
    let err = writer::TypeInfoWriter::new(&mut builder, handle, "IPager")
        .func(paging_func())
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E1003);
    assert!(matches!(err, ExportError::Build { ref context, .. } if context.contains("IPager.Page")));
}
