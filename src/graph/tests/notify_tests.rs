use super::*;
use crate::notify::{GraphEvent, RecordChange, RelationshipChange};
use std::cell::RefCell;
use std::rc::Rc;

fn listen(g: &mut Graph) -> Rc<RefCell<Vec<GraphEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    g.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    seen
}

#[test]
fn admission_reports_additions_only() {
    let mut g = graph();
    let seen = listen(&mut g);
    let hs = g
        .admit_batch(
            &[
                Blueprint::new("Zone").with_fields(["Core"]),
                Blueprint::new("Lights").with_fields(["Desk", "Core"]),
            ],
            PointerPolicy::Strict,
        )
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![GraphEvent::Added(hs[0]), GraphEvent::Added(hs[1])]
    );
}

#[test]
fn rename_is_a_name_change_on_the_renamed_record_only() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    lights(&mut g, "Desk", "Core");
    let seen = listen(&mut g);
    assert!(g.set_name(z, "Main Zone"));
    assert_eq!(
        *seen.borrow(),
        vec![GraphEvent::Changed(RecordChange {
            handle: z,
            name_changed: true,
            data_changed: false,
            relationships: vec![],
        })]
    );
}

#[test]
fn retargeting_carries_old_and_new_targets() {
    let mut g = graph();
    let core = zone(&mut g, "Core");
    let perimeter = zone(&mut g, "Perimeter");
    let l = lights(&mut g, "Desk", "Core");
    let seen = listen(&mut g);
    assert!(g.set_pointer(l, 1, Some(perimeter)));
    assert_eq!(
        *seen.borrow(),
        vec![GraphEvent::Changed(RecordChange {
            handle: l,
            name_changed: false,
            data_changed: false,
            relationships: vec![RelationshipChange {
                index: 1,
                old_target: Some(core),
                new_target: Some(perimeter),
            }],
        })]
    );
}

#[test]
fn removal_reports_the_nulled_referrer_then_the_removal() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let seen = listen(&mut g);
    assert!(g.remove(z));
    let events = seen.borrow();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        GraphEvent::Changed(c) if c.handle == l && c.relationships[0].new_target.is_none()
    ));
    assert!(matches!(
        &events[1],
        GraphEvent::Removed { handle, type_id } if *handle == z && type_id.as_str() == "Zone"
    ));
}

#[test]
fn rejected_and_unsubscribed_calls_are_silent() {
    let mut g = graph();
    let z = zone(&mut g, "Core");
    let l = lights(&mut g, "Desk", "Core");
    let seen = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&seen);
    let id = g.subscribe(move |_| *sink.borrow_mut() += 1);

    assert!(!g.set_literal(l, 2, "-3"));
    assert!(!g.set_name(z, ""));
    assert_eq!(*seen.borrow(), 0);

    assert!(g.set_literal(l, 2, "3"));
    assert_eq!(*seen.borrow(), 1);

    assert!(g.unsubscribe(id));
    assert!(g.set_literal(l, 2, "4"));
    assert_eq!(*seen.borrow(), 1);
}
