use pretty_assertions::assert_eq;

use tlx_diagnostic::Diagnostic;
use tlx_meta::{SourceTy, TypeId};
use tlx_typelib::PointerWidth;

use crate::names::IdentityResolver;
use crate::references::RefTable;
use crate::test_helpers::{int, unit};

use super::*;

struct Run {
    funcs: Vec<SynthesizedFunc>,
    diagnostics: Vec<Diagnostic>,
}

fn run_with(
    owner: &SourceType,
    mode: InterfaceMode,
    settings: &ExportSettings,
    inherited_ids: &[i32],
    inherited_slots: u32,
) -> Run {
    let base = BaseChain {
        ids: inherited_ids.to_vec(),
        slots: inherited_slots,
        auto_numbered: 0,
    };
    run_on(owner, mode, settings, &base).0
}

fn run_on(
    owner: &SourceType,
    mode: InterfaceMode,
    settings: &ExportSettings,
    base: &BaseChain,
) -> (Run, BaseChain) {
    let unit = unit([owner.clone()]);
    let refs = RefTable::default();
    let mapper = TypeMapper::new(&unit, &refs, settings.pointer_width);
    let synth = MemberSynthesizer::new(&mapper, NameMapper::new(&IdentityResolver), settings, mode);
    let mut diagnostics = DiagnosticQueue::new();
    let InterfaceFuncs { funcs, chain } = synth.interface_funcs(owner, base, &mut diagnostics);
    let run = Run {
        funcs,
        diagnostics: diagnostics.flush(),
    };
    (run, chain)
}

fn run(owner: &SourceType, mode: InterfaceMode) -> Run {
    run_with(owner, mode, &ExportSettings::default(), &[], 0)
}

impl Run {
    fn func(&self, name: &str) -> &SynthesizedFunc {
        self.funcs.iter().find(|f| f.names[0] == name).unwrap()
    }

    fn names(&self) -> Vec<&str> {
        self.funcs.iter().map(|f| f.names[0].as_str()).collect()
    }
}

// ── Status-code shape ────────────────────────────────────────

#[test]
fn dual_members_return_status_codes() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::method("Area", SourceTy::Primitive(tlx_meta::Primitive::F64)));
    let r = run(&owner, InterfaceMode::Dual);
    let area = r.func("Area");
    assert_eq!(area.desc.ret.desc, TypeDesc::Base(VarType::VT_HRESULT));
    assert_eq!(area.desc.params.len(), 1);
    assert_eq!(area.desc.params[0].desc, TypeDesc::ptr(TypeDesc::Base(VarType::VT_R8)));
    assert_eq!(area.desc.params[0].flags, ParamFlags::OUT | ParamFlags::RETVAL);
    assert_eq!(area.names, vec!["Area", "pRetVal"]);
}

#[test]
fn void_members_just_return_status() {
    let owner =
        SourceType::interface("App", "IWidget").with_member(SourceMember::method("Reset", SourceTy::Void));
    let r = run(&owner, InterfaceMode::UnknownOnly);
    let reset = r.func("Reset");
    assert_eq!(reset.desc.ret.desc, TypeDesc::Base(VarType::VT_HRESULT));
    assert!(reset.desc.params.is_empty());
}

#[test]
fn dispatch_only_and_preserved_members_keep_natural_returns() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::method("Count", int()))
        .with_member(SourceMember::method("Raw", int()).preserve_sig());

    let r = run(&owner, InterfaceMode::DispatchOnly);
    assert_eq!(r.func("Count").desc.ret.desc, TypeDesc::Base(VarType::VT_I4));
    assert_eq!(r.func("Count").desc.funckind, tlx_typelib::FuncKind::Dispatch);

    let r = run(&owner, InterfaceMode::Dual);
    assert_eq!(r.func("Raw").desc.ret.desc, TypeDesc::Base(VarType::VT_I4));
    assert!(r.func("Raw").desc.params.is_empty());
}

#[test]
fn dual_status_codes_can_be_turned_off() {
    let owner = SourceType::interface("App", "IWidget").with_member(SourceMember::method("Count", int()));
    let settings = ExportSettings::default().with_dual_status_codes(false);
    let r = run_with(&owner, InterfaceMode::Dual, &settings, &[], 0);
    assert_eq!(r.func("Count").desc.ret.desc, TypeDesc::Base(VarType::VT_I4));
}

// ── Parameters ───────────────────────────────────────────────

#[test]
fn parameter_flags_and_defaults() {
    let owner = SourceType::interface("App", "IWidget").with_member(
        SourceMember::method("Move", SourceTy::Void)
            .param(Parameter::new("dx", int()))
            .param(Parameter::new("dy", int()).by_ref())
            .param(Parameter::new("moved", SourceTy::Primitive(tlx_meta::Primitive::Bool)).out())
            .param(Parameter::new("speed", int()).optional(Some(ConstValue::I64(3)))),
    );
    let r = run(&owner, InterfaceMode::DispatchOnly);
    let params = &r.func("Move").desc.params;
    assert_eq!(params[0].flags, ParamFlags::IN);
    assert_eq!(params[1].flags, ParamFlags::IN | ParamFlags::OUT);
    assert_eq!(params[1].desc, TypeDesc::ptr(TypeDesc::Base(VarType::VT_I4)));
    assert_eq!(params[2].flags, ParamFlags::OUT);
    assert_eq!(params[3].flags, ParamFlags::IN | ParamFlags::OPT);
    assert_eq!(
        r.func("Move").defaults.as_slice(),
        &[(3, VariantValue::I4(3))]
    );
    assert_eq!(r.func("Move").names, vec!["Move", "dx", "dy", "moved", "speed"]);
}

#[test]
fn unmappable_parameter_excludes_the_member() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::method("Keep", SourceTy::Void))
        .with_member(
            SourceMember::method("Sort", SourceTy::Void)
                .param(Parameter::new("items", SourceTy::Generic("List<T>".into()))),
        )
        .with_member(SourceMember::method("Also", SourceTy::Void));
    let r = run(&owner, InterfaceMode::Dual);
    assert_eq!(r.names(), vec!["Keep", "Also"]);
    assert_eq!(r.diagnostics.len(), 1);
    assert_eq!(r.diagnostics[0].code, ErrorCode::W2001);
    assert_eq!(r.diagnostics[0].subject.as_deref(), Some("App.IWidget.Sort"));

    // Excluded members do not consume slots.
    assert_eq!(r.func("Also").desc.vtable_offset, 8 * 8);
}

#[test]
fn silently_excluded_members() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::method("Hidden", SourceTy::Void).non_public())
        .with_member(SourceMember::method("Shared", SourceTy::Void).static_member())
        .with_member(SourceMember::method("Map", SourceTy::Void).generic())
        .with_member(SourceMember::constructor());
    let r = run(&owner, InterfaceMode::Dual);
    assert!(r.funcs.is_empty());
    assert!(r.diagnostics.is_empty());
}

// ── Properties ───────────────────────────────────────────────

#[test]
fn accessors_share_a_dispatch_id() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::getter("Name", SourceTy::String))
        .with_member(SourceMember::setter("Name", SourceTy::String))
        .with_member(SourceMember::method("Draw", SourceTy::Void));
    let r = run(&owner, InterfaceMode::Dual);
    assert_eq!(r.names(), vec!["Name", "Name", "Draw"]);
    let ids: Vec<i32> = r.funcs.iter().map(|f| f.desc.memid).collect();
    assert_eq!(ids, vec![0x6002_0000, 0x6002_0000, 0x6002_0001]);
    assert_eq!(r.funcs[1].desc.invkind, InvokeKind::PropertyPut);
    // The value parameter is not named.
    assert_eq!(r.funcs[1].names, vec!["Name"]);
    assert_eq!(r.funcs[1].desc.params.len(), 1);
}

#[test]
fn overloaded_accessors_get_their_own_identity() {
    let owner = SourceType::interface("App", "IList")
        .with_member(SourceMember::getter("Item", int()).param(Parameter::new("index", int())))
        .with_member(SourceMember::getter("Item", int()).param(Parameter::new("key", SourceTy::String)))
        .with_member(SourceMember::setter("Item", int()))
        .with_member(SourceMember::method("Count", int()));
    let r = run(&owner, InterfaceMode::Dual);
    assert_eq!(r.names(), vec!["Item", "Item_2", "Item", "Count"]);
    let ids: Vec<i32> = r.funcs.iter().map(|f| f.desc.memid).collect();
    assert_eq!(ids, vec![0x6002_0000, 0x6002_0001, 0x6002_0000, 0x6002_0002]);
    assert_eq!(r.diagnostics, Vec::new());
}

#[test]
fn explicit_id_on_either_accessor_applies_to_both() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::getter("Item", int()))
        .with_member(SourceMember::setter("Item", int()).dispid(0));
    let r = run(&owner, InterfaceMode::DispatchOnly);
    assert!(r.funcs.iter().all(|f| f.desc.memid == 0));
}

#[test]
fn object_setters_are_put_by_ref() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::setter("Tag", SourceTy::Object))
        .with_member(SourceMember::setter("Label", SourceTy::String))
        .with_member(SourceMember::setter("Owner", SourceTy::Named(TypeId::new(0))));
    let r = run(&owner, InterfaceMode::DispatchOnly);
    assert_eq!(r.func("Tag").desc.invkind, InvokeKind::PropertyPutRef);
    assert_eq!(r.func("Label").desc.invkind, InvokeKind::PropertyPut);
    assert_eq!(r.func("Owner").desc.invkind, InvokeKind::PropertyPutRef);
}

// ── Ids and slots ────────────────────────────────────────────

#[test]
fn inherited_collision_is_reassigned_with_a_warning() {
    let owner = SourceType::interface("App", "IDerived").with_member(SourceMember::method("Extra", SourceTy::Void));
    let settings = ExportSettings::default().with_first_auto_dispid(2);
    let r = run_with(&owner, InterfaceMode::Dual, &settings, &[0, 1, 2], 3);
    let extra = r.func("Extra");
    assert_eq!(extra.desc.memid, 3);
    assert_eq!(extra.desc.vtable_offset, (7 + 3) * 8);
    assert_eq!(r.diagnostics.len(), 1);
    assert_eq!(r.diagnostics[0].code, ErrorCode::W4001);
    assert_eq!(r.diagnostics[0].subject.as_deref(), Some("App.IDerived.Extra"));
}

#[test]
fn derived_auto_ids_continue_after_the_base() {
    let base = SourceType::interface("App", "IBase")
        .with_member(SourceMember::method("A", SourceTy::Void))
        .with_member(SourceMember::method("B", SourceTy::Void).dispid(7));
    let derived = SourceType::interface("App", "IDerived")
        .with_member(SourceMember::method("C", SourceTy::Void));
    let settings = ExportSettings::default();

    let (_, chain) = run_on(&base, InterfaceMode::Dual, &settings, &BaseChain::default());
    assert_eq!(
        chain,
        BaseChain {
            ids: vec![0x6002_0000, 7],
            slots: 2,
            auto_numbered: 1,
        }
    );

    let (r, _) = run_on(&derived, InterfaceMode::Dual, &settings, &chain);
    let c = r.func("C");
    assert_eq!(c.desc.memid, 0x6002_0001);
    assert_eq!(c.desc.vtable_offset, (7 + 2) * 8);
    assert_eq!(r.diagnostics, Vec::new());
}

#[test]
fn offsets_use_the_target_slot_size() {
    let owner = SourceType::interface("App", "IRaw")
        .with_member(SourceMember::method("A", SourceTy::Void))
        .with_member(SourceMember::method("B", SourceTy::Void));
    let settings = ExportSettings::default().with_pointer_width(PointerWidth::Bits32);
    let r = run_with(&owner, InterfaceMode::UnknownOnly, &settings, &[], 0);
    let offsets: Vec<u32> = r.funcs.iter().map(|f| f.desc.vtable_offset).collect();
    assert_eq!(offsets, vec![12, 16]);
}

#[test]
fn overloads_get_numbered_names() {
    let owner = SourceType::interface("App", "IWidget")
        .with_member(SourceMember::method("Draw", SourceTy::Void))
        .with_member(SourceMember::method("Draw", SourceTy::Void).param(Parameter::new("n", int())))
        .with_member(SourceMember::method("draw", SourceTy::Void));
    let r = run(&owner, InterfaceMode::Dual);
    assert_eq!(r.names(), vec!["Draw", "Draw_2", "draw_3"]);
}

#[test]
fn markers_and_docs() {
    let owner = SourceType::interface("App", "IWidget").with_member(
        SourceMember::method("Poke", SourceTy::Void)
            .markers(Markers::HIDDEN | Markers::RESTRICTED)
            .doc("Pokes the widget."),
    );
    let r = run(&owner, InterfaceMode::Dual);
    let poke = r.func("Poke");
    assert_eq!(poke.desc.flags, FuncFlags::HIDDEN | FuncFlags::RESTRICTED);
    assert_eq!(poke.doc.as_deref(), Some("Pokes the widget."));
}
