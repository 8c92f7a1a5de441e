#![allow(dead_code)]
use bem_graph::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A small building schema: zones, lights pointing at zones, a zone list,
/// a vertex list with a three-field group, and a unique, required building.
pub fn building_schema() -> InMemorySchema {
    InMemorySchema::new()
        .with_type(
            TypeDescriptor::new("Building")
                .with_field(FieldDescriptor::name("Name").with_default("Building"))
                .with_field(FieldDescriptor::real("North Axis").with_default("0"))
                .unique()
                .required(),
        )
        .with_type(
            TypeDescriptor::new("Zone")
                .with_field(FieldDescriptor::name("Name").required())
                .with_field(
                    FieldDescriptor::integer("Multiplier")
                        .with_minimum(Bound::Inclusive(1.0))
                        .with_default("1"),
                )
                .in_reference_list("ZoneNames"),
        )
        .with_type(
            TypeDescriptor::new("Lights")
                .with_field(FieldDescriptor::name("Name"))
                .with_field(FieldDescriptor::pointer("Zone Name", ["ZoneNames"]))
                .with_field(FieldDescriptor::real("Watts").with_minimum(Bound::Inclusive(0.0)))
                .in_reference_list("LightsNames"),
        )
        .with_type(
            TypeDescriptor::new("ZoneList")
                .with_field(FieldDescriptor::name("Name"))
                .with_extensible_group(vec![FieldDescriptor::pointer("Zone", ["ZoneNames"])])
                .in_reference_list("ZoneListNames"),
        )
        .with_type(
            TypeDescriptor::new("Vertices")
                .with_extensible_group(vec![
                    FieldDescriptor::real("X"),
                    FieldDescriptor::real("Y"),
                    FieldDescriptor::real("Z"),
                ])
                .with_min_fields(1),
        )
}

pub fn shared_schema() -> Arc<dyn SchemaProvider> {
    building_schema().into_shared()
}

pub fn new_graph() -> Graph {
    Graph::new(shared_schema())
}

pub fn admit(g: &mut Graph, type_id: &str, fields: &[&str]) -> Handle {
    g.admit(
        Blueprint::new(type_id).with_fields(fields.iter().copied()),
        PointerPolicy::Strict,
    )
    .unwrap()
}

/// Observable state of one record: slots, forward and reverse pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub values: Vec<Option<FieldValue>>,
    pub forward: Vec<(usize, Handle)>,
    pub reverse: Vec<(Handle, usize)>,
}

pub fn snapshot(g: &Graph, h: Handle) -> Option<Snapshot> {
    let r = g.record(h)?;
    Some(Snapshot {
        values: (0..r.num_fields()).map(|i| r.value(i).cloned()).collect(),
        forward: r.forward_pointers().collect(),
        reverse: r.reverse_pointers().collect(),
    })
}

/// Every record's reverse set is exactly the set of member fields pointing at it.
pub fn assert_referential_integrity(g: &Graph) {
    for b in g.records(false) {
        let reverse: BTreeSet<(Handle, usize)> = b.reverse_pointers().collect();
        let expected: BTreeSet<(Handle, usize)> = g
            .records(false)
            .into_iter()
            .flat_map(|a| {
                a.forward_pointers()
                    .filter(|&(_, t)| t == b.handle())
                    .map(move |(i, _)| (a.handle(), i))
            })
            .collect();
        assert_eq!(reverse, expected, "reverse set of {}", b.handle());
        for (_, t) in b.forward_pointers() {
            assert!(g.is_member(t), "{} points at non-member {t}", b.handle());
        }
    }
}
