use super::*;
use crate::record::FieldValue;
use crate::validity::StrictnessLevel;

#[test]
fn out_of_range_literal_leaves_the_record_untouched() {
    let mut g = graph();
    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let before = g.record(l).unwrap().fields.clone();
    assert!(!g.set_literal(l, 2, "-1"));
    assert_eq!(g.record(l).unwrap().fields, before);
    assert!(g.set_literal(l, 2, "250.5"));
    assert_eq!(g.record(l).unwrap().value(2), Some(&FieldValue::number(250.5)));
}

#[test]
fn literal_writes_refuse_pointer_fields() {
    let mut g = graph();
    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    assert!(!g.set_literal(l, 1, "Core"));
    assert!(!g.set_literal(Handle::mint(), 0, "x"));
}

#[test]
fn minimal_accepts_what_draft_refuses() {
    let mut g = graph();
    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    assert!(g.set_strictness_level(StrictnessLevel::Minimal));
    assert!(g.set_literal(l, 2, "-1"));
    assert!(!g.is_valid(StrictnessLevel::Draft));
    assert!(!g.set_strictness_level(StrictnessLevel::Draft));
    assert_eq!(g.strictness(), StrictnessLevel::Minimal);
    assert!(g.set_literal(l, 2, "1"));
    assert!(g.set_strictness_level(StrictnessLevel::Draft));
}

#[test]
fn required_pointer_cannot_be_cleared_above_minimal() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let p = g
        .admit(
            Blueprint::new("People").with_fields(["Crowd", "Core"]),
            PointerPolicy::Strict,
        )
        .unwrap();
    assert!(!g.set_pointer(p, 1, None));
    assert_eq!(g.target(p, 1), Some(z));
    assert_eq!(g.sources(z), vec![p]);

    g.set_strictness_level(StrictnessLevel::Minimal);
    assert!(g.set_pointer(p, 1, None));
    assert!(g.sources(z).is_empty());
}

#[test]
fn target_outside_the_reference_lists_is_refused_at_final() {
    let mut g = graph();
    zone(&mut g, "Core");
    let s = g
        .admit(Blueprint::new("Space").with_fields(["Atrium"]), PointerPolicy::Strict)
        .unwrap();
    let l = lights(&mut g, "Desk", "Core");
    assert!(g.set_strictness_level(StrictnessLevel::Final));
    assert!(!g.set_pointer(l, 1, Some(s)));

    g.set_strictness_level(StrictnessLevel::Draft);
    assert!(g.set_pointer(l, 1, Some(s)));
    assert_eq!(g.get_string(l, 1), "Atrium");
    assert!(!g.set_strictness_level(StrictnessLevel::Final));
}

#[test]
fn pointer_to_non_member_is_refused() {
    let mut g = graph();
    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    assert!(!g.set_pointer(l, 1, Some(Handle::mint())));
    assert!(!g.set_pointer(l, 2, None));
}

#[test]
fn set_text_resolves_pointer_text() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = g
        .admit(Blueprint::new("Lights").with_fields(["Desk"]), PointerPolicy::Nullify)
        .unwrap();
    assert!(g.set_text(l, 1, "CORE"));
    assert_eq!(g.target(l, 1), Some(z));
    assert!(!g.set_text(l, 1, "Nowhere"));
    assert_eq!(g.target(l, 1), Some(z));
    assert!(g.set_text(l, 1, &z.to_string()));
    assert!(g.set_text(l, 1, ""));
    assert_eq!(g.target(l, 1), None);
    assert!(!g.set_text(l, 2, "bright"));
}

#[test]
fn rename_into_a_taken_name_takes_the_next_in_series() {
    let mut g = graph();
    zone(&mut g, "Core");
    let p = zone(&mut g, "Perimeter");
    assert!(g.set_name(p, "CORE"));
    assert_eq!(g.record(p).unwrap().name(), Some("CORE 1"));
    assert!(g.name_conflicts(g.record(p).unwrap()).is_empty());
}

#[test]
fn required_name_cannot_be_cleared_above_minimal() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    assert!(!g.set_name(z, ""));
    assert_eq!(g.record(z).unwrap().name(), Some("Core"));
    g.set_strictness_level(StrictnessLevel::Minimal);
    assert!(g.set_name(z, ""));
    assert!(g.lookup_by_name("Core", true).is_empty());
}

#[test]
fn set_literal_on_the_name_field_renames() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    assert!(g.set_literal(z, 0, "East"));
    assert_eq!(g.lookup_by_name("east", true), vec![z]);
    assert!(g.lookup_by_name("Core", true).is_empty());
}

#[test]
fn create_name_fills_in_the_type_series() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    assert!(g.create_name(z, false));
    assert_eq!(g.record(z).unwrap().name(), Some("Core"));
    assert!(g.create_name(z, true));
    assert_eq!(g.record(z).unwrap().name(), Some("Zone 1"));

    let v = g
        .admit(Blueprint::new("Vertices").with_fields(["0", "0", "0"]), PointerPolicy::Strict)
        .unwrap();
    assert!(!g.create_name(v, true));
}

#[test]
fn push_past_the_end_pads_to_a_whole_group() {
    let mut g = graph();
    let v = g
        .admit(Blueprint::new("Vertices").with_fields(["1", "2", "3"]), PointerPolicy::Strict)
        .unwrap();
    assert!(g.push_literal(v, "4"));
    assert_eq!(g.record(v).unwrap().num_fields(), 6);
    assert_eq!(g.num_extensible_groups(v), 2);
    assert!(!g.set_literal(v, 7, "north"));
    assert_eq!(g.record(v).unwrap().num_fields(), 6);
    assert!(!g.set_literal(v, 10, "north"));
    assert_eq!(g.record(v).unwrap().num_fields(), 6);

    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    assert!(!g.push_literal(l, "extra"));
}

fn schedule_graph() -> Graph {
    let schema = InMemorySchema::new().with_type(
        TypeDescriptor::new("Schedule")
            .with_field(FieldDescriptor::name("Name"))
            .with_extensible_group(vec![
                FieldDescriptor::alpha("Label").required(),
                FieldDescriptor::real("Value"),
            ]),
    );
    Graph::new(schema.into_shared())
}

#[test]
fn padding_into_a_group_audits_the_blank_slots() {
    let mut g = schedule_graph();
    let s = g
        .admit(Blueprint::new("Schedule").with_fields(["Sched"]), PointerPolicy::Strict)
        .unwrap();
    assert!(!g.set_literal(s, 2, "5"));
    assert_eq!(g.record(s).unwrap().num_fields(), 1);
    assert!(g.is_valid(StrictnessLevel::Draft));

    assert!(g.push_extensible_group(s, &["Morning", "5"]));
    assert!(g.set_literal(s, 2, "6"));
    assert_eq!(g.get_string(s, 2), "6");

    assert!(g.set_strictness_level(StrictnessLevel::Minimal));
    assert!(g.set_literal(s, 4, "7"));
    assert_eq!(g.record(s).unwrap().num_fields(), 5);
    assert!(!g.is_valid(StrictnessLevel::Draft));
}

#[test]
fn comments_are_kept() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    assert!(g.set_comment(z, "ground floor"));
    assert_eq!(g.record(z).unwrap().comment(), "ground floor");
}
