use super::{Graph, PointerPolicy};
use crate::record::{Blueprint, Handle};
use crate::schema::{Bound, FieldDescriptor, InMemorySchema, SchemaProvider, TypeDescriptor};
use std::sync::Arc;

mod clone_export_tests;
mod merge_tests;
mod mutation_tests;
mod notify_tests;

/// Zones, spaces, loads that point at zones, a zone list, a bare vertex
/// list and a forwarding thermostat.
pub(super) fn fixture() -> InMemorySchema {
    InMemorySchema::new()
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
            TypeDescriptor::new("Space")
                .with_field(FieldDescriptor::name("Name").required())
                .in_reference_list("SpaceNames"),
        )
        .with_type(
            TypeDescriptor::new("Lights")
                .with_field(FieldDescriptor::name("Name"))
                .with_field(FieldDescriptor::pointer("Zone Name", ["ZoneNames"]))
                .with_field(FieldDescriptor::real("Watts").with_minimum(Bound::Inclusive(0.0)))
                .in_reference_list("LightsNames"),
        )
        .with_type(
            TypeDescriptor::new("People")
                .with_field(FieldDescriptor::name("Name"))
                .with_field(FieldDescriptor::pointer("Zone Name", ["ZoneNames"]).required()),
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
        .with_type(
            TypeDescriptor::new("Thermostat")
                .with_field(FieldDescriptor::name("Name"))
                .with_field(
                    FieldDescriptor::pointer("Zone", ["ZoneNames"]).forwarding(["ControlledZones"]),
                ),
        )
        .with_type(
            TypeDescriptor::new("Controller")
                .with_field(FieldDescriptor::name("Name"))
                .with_field(FieldDescriptor::pointer("Controlled Zone", ["ControlledZones"])),
        )
}

pub(super) fn schema() -> Arc<dyn SchemaProvider> {
    fixture().into_shared()
}

pub(super) fn graph() -> Graph {
    Graph::new(schema())
}

pub(super) fn zone(g: &mut Graph, name: &str) -> Handle {
    g.admit(Blueprint::new("Zone").with_fields([name]), PointerPolicy::Strict)
        .unwrap()
}

pub(super) fn lights(g: &mut Graph, name: &str, zone: &str) -> Handle {
    g.admit(
        Blueprint::new("Lights").with_fields([name, zone, "100"]),
        PointerPolicy::Strict,
    )
    .unwrap()
}
