use super::*;
use crate::graph_error::GraphError;

#[test]
fn equivalent_member_is_reused() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let hs = g
        .merge_batch(&[Blueprint::new("Zone").with_fields(["core"])], PointerPolicy::Strict)
        .unwrap();
    assert_eq!(hs, vec![z]);
    assert_eq!(g.len(), 1);
    assert_eq!(g.record(z).unwrap().name(), Some("Core"));
}

#[test]
fn differing_data_admits_a_new_record() {
    let mut g = graph();
    let z = g
        .admit(Blueprint::new("Zone").with_fields(["Core", "2"]), PointerPolicy::Strict)
        .unwrap();
    let hs = g
        .merge_batch(
            &[Blueprint::new("Zone").with_fields(["Core", "3"])],
            PointerPolicy::Strict,
        )
        .unwrap();
    assert_ne!(hs[0], z);
    assert_eq!(g.len(), 2);
    assert_eq!(g.record(hs[0]).unwrap().name(), Some("Core 1"));
}

#[test]
fn reused_member_gains_unset_pointers() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = g
        .admit(Blueprint::new("Lights").with_fields(["Desk"]), PointerPolicy::Strict)
        .unwrap();
    let hs = g
        .merge_batch(
            &[Blueprint::new("Lights").with_fields(["Desk", "Core"])],
            PointerPolicy::Strict,
        )
        .unwrap();
    assert_eq!(hs, vec![l]);
    assert_eq!(g.target(l, 1), Some(z));
    assert_eq!(g.sources(z), vec![l]);
}

#[test]
fn conflicting_pointer_admits_a_new_record() {
    let mut g = graph();
    let core = zone(&mut g, "Core");
    let perimeter = zone(&mut g, "Perimeter");
    let l = lights(&mut g, "Desk", "Core");
    let hs = g
        .merge_batch(
            &[Blueprint::new("Lights").with_fields(["Desk", "Perimeter", "100"])],
            PointerPolicy::Strict,
        )
        .unwrap();
    assert_ne!(hs[0], l);
    assert_eq!(g.target(l, 1), Some(core));
    assert_eq!(g.target(hs[0], 1), Some(perimeter));
    assert_eq!(g.record(hs[0]).unwrap().name(), Some("Desk 1"));
}

#[test]
fn pointer_to_a_later_sibling_still_finds_its_equivalent() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let reversed = [
        Blueprint::new("Lights").with_fields(["Desk", "Core", "100"]),
        Blueprint::new("Zone").with_fields(["Core"]),
    ];
    let hs = g.merge_batch(&reversed, PointerPolicy::Strict).unwrap();
    assert_eq!(hs, vec![l, z]);
    assert_eq!(g.len(), 2);
    assert_eq!(g.lookup_by_name("Desk", false), vec![l]);
}

fn zone_and_lamp() -> [Blueprint; 2] {
    [
        Blueprint::new("Zone").with_fields(["Core"]),
        Blueprint::new("Lights").with_fields(["Lamp", "Core"]),
    ]
}

#[test]
fn ungrouped_blueprints_merge_independently() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let hs = g.merge_batch(&zone_and_lamp(), PointerPolicy::Strict).unwrap();
    assert_eq!(hs[0], z);
    assert_eq!(g.target(hs[1], 1), Some(z));
    assert_eq!(g.len(), 2);
}

#[test]
fn a_group_with_an_unmatched_member_is_admitted_whole() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let hs = g
        .merge_groups(&zone_and_lamp(), &[vec![0, 1]], PointerPolicy::Strict)
        .unwrap();
    assert_ne!(hs[0], z);
    assert_eq!(g.record(hs[0]).unwrap().name(), Some("Core 1"));
    assert_eq!(g.target(hs[1], 1), Some(hs[0]));
    assert_eq!(g.len(), 3);
}

#[test]
fn malformed_groups_are_refused() {
    let mut g = graph();
    let bps = zone_and_lamp();
    assert_eq!(
        g.merge_groups(&bps, &[vec![0, 0]], PointerPolicy::Strict),
        Err(GraphError::InvalidGroup(0))
    );
    assert_eq!(
        g.merge_groups(&bps, &[vec![0], vec![5]], PointerPolicy::Strict),
        Err(GraphError::InvalidGroup(5))
    );
    assert!(g.is_empty());
}
