use super::*;
use crate::graph_error::GraphError;
use crate::order::RecordOrder;
use crate::validity::{DataErrorKind, StrictnessLevel};

#[test]
fn clone_with_kept_handles_is_independent() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let mut copy = g.clone_graph(true);
    assert_eq!(copy.handles(false), g.handles(false));
    assert_eq!(copy.target(l, 1), Some(z));

    assert!(copy.set_name(z, "Renamed"));
    assert_eq!(g.get_string(l, 1), "Core");
    assert_eq!(copy.get_string(l, 1), "Renamed");
}

#[test]
fn clone_with_fresh_handles_rewrites_pointers() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    g.order_mut().set_direct(vec![l, z]);

    let copy = g.clone_graph(false);
    assert!(!copy.is_member(z));
    let cz = copy.lookup_by_type_and_name(&"Zone".into(), "Core").unwrap();
    let cl = copy.lookup_by_type_and_name(&"Lights".into(), "Desk").unwrap();
    assert_eq!(copy.target(cl, 1), Some(cz));
    assert_eq!(copy.sources(cz), vec![cl]);
    assert_eq!(copy.order(), &RecordOrder::Direct(vec![cl, cz]));
}

#[test]
fn subset_nulls_pointers_that_leave_it() {
    let mut g = graph();
    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let copy = g.clone_subset(&[l], true, StrictnessLevel::Draft).unwrap();
    assert_eq!(copy.len(), 1);
    assert_eq!(copy.target(l, 1), None);
    assert_eq!(copy.strictness(), StrictnessLevel::Draft);
}

#[test]
fn subset_must_be_valid_at_the_requested_level() {
    let mut g = graph();
    zone(&mut g, "Core");
    let p = g
        .admit(
            Blueprint::new("People").with_fields(["Crowd", "Core"]),
            PointerPolicy::Strict,
        )
        .unwrap();
    let Err(GraphError::Rejected(report)) = g.clone_subset(&[p], true, StrictnessLevel::Draft) else {
        panic!("expected a rejection");
    };
    assert!(report.has(DataErrorKind::NullAndRequired));

    let copy = g.clone_subset(&[p], false, StrictnessLevel::Minimal).unwrap();
    assert_eq!(copy.strictness(), StrictnessLevel::Minimal);

    let stray = Handle::mint();
    assert_eq!(
        g.clone_subset(&[p, stray], true, StrictnessLevel::Minimal).unwrap_err(),
        GraphError::UnknownHandle(stray)
    );
}

#[test]
fn export_writes_target_names() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    assert!(g.set_comment(l, "task lighting"));
    let bp = g.export_blueprint(l).unwrap();
    assert_eq!(bp.handle, Some(l));
    assert_eq!(bp.comment, "task lighting");
    assert_eq!(bp.fields, vec!["Desk", "Core", "100"]);
    assert!(g.export_blueprint(Handle::mint()).is_none());

    g.set_strictness_level(StrictnessLevel::Minimal);
    assert!(g.set_name(z, ""));
    let bp = g.export_blueprint(l).unwrap();
    assert_eq!(bp.field(1), "Zone 1");
    assert_eq!(g.record(z).unwrap().name(), Some("Zone 1"));
}

#[test]
fn numeric_text_survives_clone_and_export_verbatim() {
    let mut g = graph();
    zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    assert!(g.set_literal(l, 2, "1.50E2"));
    assert_eq!(g.get_string(l, 2), "1.50E2");

    let mut copy = g.clone_graph(true);
    assert_eq!(copy.export_blueprint(l).unwrap().fields, vec!["Desk", "Core", "1.50E2"]);
    assert_eq!(
        g.record(l).unwrap().value(2).and_then(|v| v.as_number()),
        Some(150.0)
    );
}

#[test]
fn export_writes_identities_under_by_identity() {
    let mut g = Graph::new(fixture().by_identity().into_shared());
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let bp = g.export_blueprint(l).unwrap();
    assert_eq!(bp.field(1), z.to_string());
}

#[test]
fn exported_blueprints_readmit_with_the_same_shape() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let bps = g.export_blueprints(false);

    let mut other = graph();
    let hs = other.admit_batch(&bps, PointerPolicy::Strict).unwrap();
    assert_eq!(hs, vec![z, l]);
    assert_eq!(other.target(l, 1), Some(z));
    assert_eq!(other.get_string(l, 2), "100");
}
