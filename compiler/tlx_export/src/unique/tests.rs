use pretty_assertions::assert_eq;

use super::*;

fn candidate(id: u32, namespace: &str, name: &str) -> TypeCandidate {
    TypeCandidate {
        id: TypeId::new(id),
        namespace: namespace.to_owned(),
        qualified: format!("{namespace}.{name}"),
        name: name.to_owned(),
    }
}

fn names(registry: &NameRegistry, count: u32) -> Vec<&str> {
    (0..count)
        .map(|i| registry.type_name(TypeId::new(i)).unwrap())
        .collect()
}

// ── Types ────────────────────────────────────────────────────

#[test]
fn distinct_names_are_untouched() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    reg.add_type(candidate(0, "A", "Widget"), &mut diags);
    reg.add_type(candidate(1, "A", "Gadget"), &mut diags);
    assert_eq!(names(&reg, 2), vec!["Widget", "Gadget"]);
    assert!(diags.is_empty());
}

#[test]
fn first_collision_renames_both() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    reg.add_type(candidate(0, "A.B", "Widget"), &mut diags);
    reg.add_type(candidate(1, "C", "Widget"), &mut diags);
    assert_eq!(names(&reg, 2), vec!["A_B_Widget", "C_Widget"]);

    let flushed = diags.flush();
    assert_eq!(flushed.len(), 2);
    assert!(flushed.iter().all(|d| d.code == ErrorCode::W5001));
    assert_eq!(flushed[0].subject.as_deref(), Some("A.B.Widget"));
}

#[test]
fn later_colliders_are_prefixed_on_arrival() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    reg.add_type(candidate(0, "A", "Widget"), &mut diags);
    reg.add_type(candidate(1, "B", "Widget"), &mut diags);
    reg.add_type(candidate(2, "C", "widget"), &mut diags);
    assert_eq!(names(&reg, 3), vec!["A_Widget", "B_Widget", "C_widget"]);
}

#[test]
fn prefixed_name_that_still_collides_gets_a_suffix() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    reg.add_type(candidate(0, "X", "A_Widget"), &mut diags);
    reg.add_type(candidate(1, "A", "Widget"), &mut diags);
    reg.add_type(candidate(2, "B", "Widget"), &mut diags);
    assert_eq!(names(&reg, 3), vec!["A_Widget", "A_Widget_2", "B_Widget"]);
}

#[test]
fn plain_name_stays_blocked_after_a_collision() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    reg.add_type(candidate(0, "A", "Widget"), &mut diags);
    reg.add_type(candidate(1, "B", "Widget"), &mut diags);
    let reserved = reg.reserve("C.Widget", "Widget", ErrorCode::W5002, &mut diags);
    assert_eq!(reserved, "Widget_2");
}

// ── Reservations ─────────────────────────────────────────────

#[test]
fn reservations_share_the_registry() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    reg.add_type(candidate(0, "A", "Fruit"), &mut diags);

    let first = reg.reserve("A.Fruit.Apple", "Fruit_Apple", ErrorCode::W5002, &mut diags);
    let again = reg.reserve("A.Fruit.APPLE", "FRUIT_APPLE", ErrorCode::W5002, &mut diags);
    assert_eq!(first, "Fruit_Apple");
    assert_eq!(again, "FRUIT_APPLE_2");

    let flushed = diags.flush();
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].code, ErrorCode::W5002);
    assert_eq!(flushed[0].message, "exported as `FRUIT_APPLE_2`");
}

#[test]
fn reserved_names_push_later_types_aside() {
    let mut diags = DiagnosticQueue::new();
    let mut reg = NameRegistry::new();
    let ci = reg.reserve("A.Widget", "_Widget", ErrorCode::W5001, &mut diags);
    assert_eq!(ci, "_Widget");
    reg.add_type(candidate(0, "B", "_Widget"), &mut diags);
    assert_eq!(reg.type_name(TypeId::new(0)), Some("B__Widget"));
}
