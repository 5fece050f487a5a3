#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Function synthesis as seen in committed interfaces: invoke kinds,
//! status-code returns, parameter flags and defaults, vtable offsets.

mod common;

use pretty_assertions::assert_eq;

use common::{export, export_with, int, named, unit};
use tlx_export::ExportSettings;
use tlx_meta::{ConstValue, InterfaceCapability, Parameter, SourceMember, SourceTy, SourceType};
use tlx_typelib::{
    FuncKind, InvokeKind, ParamFlags, PointerWidth, TypeDesc, VarType, VariantValue,
};

fn offsets(out: &tlx_export::ExportOutput<tlx_typelib::TypeLib>, name: &str) -> Vec<u32> {
    let ty = out.library.get(name).unwrap();
    ty.funcs.iter().map(|f| f.desc.vtable_offset).collect()
}

// ── Shapes ──────────────────────────────────────────────────

#[test]
fn object_setter_is_put_by_reference() {
    let unit = unit([
        SourceType::interface("App", "INode"),
        SourceType::interface("App", "ITree")
            .with_member(SourceMember::setter("Root", named(0)))
            .with_member(SourceMember::setter("Label", SourceTy::String))
            .with_member(SourceMember::setter("Tags", SourceTy::array_of(SourceTy::String))),
    ]);
    let out = export(&unit);
    let tree = out.library.get("ITree").unwrap();

    let kinds: Vec<InvokeKind> = tree.funcs.iter().map(|f| f.desc.invkind).collect();
    assert_eq!(
        kinds,
        vec![
            InvokeKind::PropertyPutRef,
            InvokeKind::PropertyPut,
            InvokeKind::PropertyPut,
        ]
    );
    assert_eq!(tree.funcs[0].names, vec!["Root"]);
}

#[test]
fn getter_returns_through_retval() {
    let unit = unit([SourceType::interface("App", "ICounter")
        .with_member(SourceMember::getter("Count", int()))]);
    let out = export(&unit);
    let count = out.library.get("ICounter").unwrap().func("Count").unwrap();

    assert_eq!(count.desc.invkind, InvokeKind::PropertyGet);
    assert_eq!(count.names, vec!["Count", "pRetVal"]);
    assert_eq!(count.desc.ret.desc, TypeDesc::Base(VarType::VT_HRESULT));
    assert_eq!(
        count.desc.params[0].desc,
        TypeDesc::ptr(TypeDesc::Base(VarType::VT_I4))
    );
}

#[test]
fn overloads_are_numbered() {
    let unit = unit([SourceType::interface("App", "IPrinter")
        .with_member(SourceMember::method("Print", SourceTy::Void))
        .with_member(SourceMember::method("Print", SourceTy::Void).param(Parameter::new("copies", int())))
        .with_member(SourceMember::method("Print", SourceTy::Void).param(Parameter::new("text", SourceTy::String)))]);
    let out = export(&unit);

    assert_eq!(
        out.library.get("IPrinter").unwrap().func_names(),
        vec!["Print", "Print_2", "Print_3"]
    );
}

#[test]
fn overloaded_indexer_exports_with_distinct_ids() {
    let unit = unit([SourceType::interface("App", "IList")
        .with_member(SourceMember::getter("Item", int()).param(Parameter::new("index", int())))
        .with_member(SourceMember::getter("Item", int()).param(Parameter::new("key", SourceTy::String)))
        .with_member(SourceMember::method("Count", int()))]);
    let out = export(&unit);
    let list = out.library.get("IList").unwrap();

    assert_eq!(list.func_names(), vec!["Item", "Item_2", "Count"]);
    let mut ids: Vec<i32> = list.funcs.iter().map(|f| f.desc.memid).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(list
        .funcs
        .iter()
        .take(2)
        .all(|f| f.desc.invkind == InvokeKind::PropertyGet));
    assert_eq!(out.diagnostics, Vec::new());
}

#[test]
fn static_and_hidden_members_are_left_out_silently() {
    let unit = unit([SourceType::interface("App", "IThing")
        .with_member(SourceMember::method("Make", SourceTy::Void).static_member())
        .with_member(SourceMember::method("Secret", SourceTy::Void).non_public())
        .with_member(SourceMember::method("Run", SourceTy::Void))]);
    let out = export(&unit);

    assert_eq!(out.library.get("IThing").unwrap().func_names(), vec!["Run"]);
    assert_eq!(out.diagnostics, Vec::new());
}

// ── Status codes ────────────────────────────────────────────

#[test]
fn dual_status_codes_can_be_turned_off() {
    let unit = unit([SourceType::interface("App", "ICounter")
        .with_member(SourceMember::method("Next", int()))]);
    let out = export_with(&unit, ExportSettings::new().with_dual_status_codes(false));
    let next = out.library.get("ICounter").unwrap().func("Next").unwrap();

    assert_eq!(next.desc.ret.desc, TypeDesc::Base(VarType::VT_I4));
    assert_eq!(next.desc.params.len(), 0);
}

#[test]
fn preserved_signature_keeps_the_natural_return() {
    let unit = unit([SourceType::interface("App", "ICounter")
        .capability(InterfaceCapability::UnknownOnly)
        .with_member(SourceMember::method("Next", int()).preserve_sig())
        .with_member(SourceMember::method("Peek", int()))]);
    let out = export(&unit);
    let counter = out.library.get("ICounter").unwrap();

    assert_eq!(
        counter.func("Next").unwrap().desc.ret.desc,
        TypeDesc::Base(VarType::VT_I4)
    );
    assert_eq!(
        counter.func("Peek").unwrap().desc.ret.desc,
        TypeDesc::Base(VarType::VT_HRESULT)
    );
}

#[test]
fn dispatch_only_members_return_naturally() {
    let unit = unit([SourceType::interface("App", "IEvents")
        .capability(InterfaceCapability::DispatchOnly)
        .with_member(SourceMember::method("Fired", SourceTy::String))]);
    let out = export(&unit);
    let fired = out.library.get("IEvents").unwrap().func("Fired").unwrap();

    assert_eq!(fired.desc.funckind, FuncKind::Dispatch);
    assert_eq!(fired.desc.ret.desc, TypeDesc::Base(VarType::VT_BSTR));
}

// ── Parameters ──────────────────────────────────────────────

#[test]
fn optional_default_is_encoded() {
    let unit = unit([SourceType::interface("App", "IPager").with_member(
        SourceMember::method("Page", SourceTy::Void)
            .param(Parameter::new("size", int()).optional(Some(ConstValue::I64(25))))
            .param(Parameter::new("name", SourceTy::String).optional(None)),
    )]);
    let out = export(&unit);
    let page = out.library.get("IPager").unwrap().func("Page").unwrap();

    let size = &page.desc.params[0];
    assert!(size.flags.contains(ParamFlags::IN | ParamFlags::OPT | ParamFlags::HASDEFAULT));
    assert_eq!(size.default.as_ref().and_then(|b| b.decode()), Some(VariantValue::I4(25)));

    let name = &page.desc.params[1];
    assert!(name.flags.contains(ParamFlags::OPT));
    assert!(!name.flags.contains(ParamFlags::HASDEFAULT));
    assert_eq!(page.desc.optional_count(), 2);
}

#[test]
fn by_ref_and_out_parameters_are_pointers() {
    let unit = unit([SourceType::interface("App", "ISwap").with_member(
        SourceMember::method("Swap", SourceTy::Void)
            .param(Parameter::new("a", int()).by_ref())
            .param(Parameter::new("b", int()).out()),
    )]);
    let out = export(&unit);
    let swap = out.library.get("ISwap").unwrap().func("Swap").unwrap();

    let i4_ptr = TypeDesc::ptr(TypeDesc::Base(VarType::VT_I4));
    assert_eq!(swap.desc.params[0].desc, i4_ptr);
    assert_eq!(swap.desc.params[0].flags, ParamFlags::IN | ParamFlags::OUT);
    assert_eq!(swap.desc.params[1].desc, i4_ptr);
    assert_eq!(swap.desc.params[1].flags, ParamFlags::OUT);
}

// ── Vtable offsets ──────────────────────────────────────────

#[test]
fn dual_slots_start_after_the_dispatch_contract() {
    let unit = unit([SourceType::interface("App", "IPair")
        .with_member(SourceMember::method("Left", SourceTy::Void))
        .with_member(SourceMember::method("Right", SourceTy::Void))]);

    assert_eq!(offsets(&export(&unit), "IPair"), vec![56, 64]);
    let narrow = export_with(
        &unit,
        ExportSettings::new().with_pointer_width(PointerWidth::Bits32),
    );
    assert_eq!(offsets(&narrow, "IPair"), vec![28, 32]);
}

#[test]
fn derived_slots_follow_the_local_base() {
    let unit = unit([
        SourceType::interface("App", "IBase")
            .capability(InterfaceCapability::UnknownOnly)
            .with_member(SourceMember::method("A", SourceTy::Void))
            .with_member(SourceMember::method("B", SourceTy::Void)),
        SourceType::interface("App", "IDerived")
            .capability(InterfaceCapability::UnknownOnly)
            .implements(named(0))
            .with_member(SourceMember::method("C", SourceTy::Void)),
    ]);
    let out = export(&unit);

    assert_eq!(offsets(&out, "IBase"), vec![24, 32]);
    assert_eq!(offsets(&out, "IDerived"), vec![40]);
    let derived = out.library.get("IDerived").unwrap();
    assert_eq!(out.library.href_name(derived.base().unwrap()).as_deref(), Some("IBase"));
}

#[test]
fn derived_interface_ids_do_not_collide_with_the_base() {
    let unit = unit([
        SourceType::interface("App", "IBase").with_member(SourceMember::method("A", SourceTy::Void)),
        SourceType::interface("App", "IDerived")
            .implements(named(0))
            .with_member(SourceMember::method("B", SourceTy::Void)),
    ]);
    let out = export(&unit);

    assert_eq!(out.library.get("IBase").unwrap().funcs[0].desc.memid, 0x6002_0000);
    assert_eq!(out.library.get("IDerived").unwrap().funcs[0].desc.memid, 0x6002_0001);
    assert_eq!(out.diagnostics, Vec::new());
}

#[test]
fn base_declared_after_its_derived_interface() {
    let unit = unit([
        SourceType::interface("App", "IDerived")
            .implements(named(1))
            .with_member(SourceMember::method("C", SourceTy::Void)),
        SourceType::interface("App", "IBase")
            .with_member(SourceMember::method("A", SourceTy::Void)),
    ]);
    let out = export(&unit);

    assert_eq!(offsets(&out, "IDerived"), vec![64]);
    let base_id = out.library.get("IBase").unwrap().funcs[0].desc.memid;
    let own_id = out.library.get("IDerived").unwrap().funcs[0].desc.memid;
    assert!(base_id != own_id);
}
