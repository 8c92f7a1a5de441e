//! Schema descriptors: the read-only description of record types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a schema type, e.g. `Zone` or `OS:Lights`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        TypeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base used when synthesizing names: `OS:Zone:List` becomes `OS Zone List`.
    pub fn default_name_base(&self) -> String {
        self.0.replace(':', " ").trim().to_string()
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        TypeId::new(s)
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        TypeId(s)
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeId").field(&self.0).finish()
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric limit on an `Integer` or `Real` field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    /// `true` if `value` lies on the permitted side of this lower bound.
    pub fn admits_from_below(self, value: f64) -> bool {
        match self {
            Bound::Inclusive(b) => value >= b,
            Bound::Exclusive(b) => value > b,
        }
    }

    /// `true` if `value` lies on the permitted side of this upper bound.
    pub fn admits_from_above(self, value: f64) -> bool {
        match self {
            Bound::Inclusive(b) => value <= b,
            Bound::Exclusive(b) => value < b,
        }
    }
}

/// What a field slot holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text.
    Alpha,
    /// One of a fixed set of keys, compared case-insensitively.
    Choice(Vec<String>),
    Integer,
    Real,
    /// Reference to another record that belongs to one of `reference_lists`.
    Pointer { reference_lists: Vec<String> },
}

/// Descriptor of one field slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<String>,
    /// The record's name lives in this field.
    pub is_name: bool,
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    /// Numeric field accepts the literal `autosize`.
    pub autosizable: bool,
    /// Numeric field accepts the literal `autocalculate`.
    pub autocalculatable: bool,
    /// Reference lists a pointer's target joins while this field points at it.
    pub forwards: Vec<String>,
}

impl FieldDescriptor {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            is_name: false,
            minimum: None,
            maximum: None,
            autosizable: false,
            autocalculatable: false,
            forwards: Vec::new(),
        }
    }

    pub fn alpha(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Alpha)
    }

    /// An `Alpha` field flagged as the record's name.
    pub fn name(name: impl Into<String>) -> Self {
        let mut f = Self::alpha(name);
        f.is_name = true;
        f
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Real)
    }

    pub fn choice<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(name, FieldKind::Choice(keys.into_iter().map(Into::into).collect()))
    }

    pub fn pointer<I, S>(name: impl Into<String>, reference_lists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            FieldKind::Pointer {
                reference_lists: reference_lists.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_minimum(mut self, bound: Bound) -> Self {
        self.minimum = Some(bound);
        self
    }

    pub fn with_maximum(mut self, bound: Bound) -> Self {
        self.maximum = Some(bound);
        self
    }

    pub fn autosizable(mut self) -> Self {
        self.autosizable = true;
        self
    }

    pub fn autocalculatable(mut self) -> Self {
        self.autocalculatable = true;
        self
    }

    pub fn forwarding<I, S>(mut self, lists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forwards = lists.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, FieldKind::Pointer { .. })
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::Integer | FieldKind::Real)
    }

    /// Reference lists a pointer field may match; empty for literals.
    pub fn reference_lists(&self) -> &[String] {
        match &self.kind {
            FieldKind::Pointer { reference_lists } => reference_lists,
            _ => &[],
        }
    }
}

/// Descriptor of one record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub id: TypeId,
    /// Fixed prefix of fields.
    pub fields: Vec<FieldDescriptor>,
    /// Repeating block appended after the fixed prefix, if any.
    pub extensible_group: Vec<FieldDescriptor>,
    pub min_fields: usize,
    pub max_fields: Option<usize>,
    /// Reference lists (name scopes) records of this type belong to.
    pub references: Vec<String>,
    /// At most one record of this type may exist at Final.
    pub unique: bool,
    /// At least one record of this type must exist at Final.
    pub required: bool,
}

impl TypeDescriptor {
    pub fn new(id: impl Into<TypeId>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            extensible_group: Vec::new(),
            min_fields: 0,
            max_fields: None,
            references: Vec::new(),
            unique: false,
            required: false,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_extensible_group(mut self, group: Vec<FieldDescriptor>) -> Self {
        self.extensible_group = group;
        self
    }

    pub fn with_min_fields(mut self, n: usize) -> Self {
        self.min_fields = n;
        self
    }

    pub fn with_max_fields(mut self, n: usize) -> Self {
        self.max_fields = Some(n);
        self
    }

    pub fn in_reference_list(mut self, list: impl Into<String>) -> Self {
        self.references.push(list.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[inline]
    pub fn num_fixed(&self) -> usize {
        self.fields.len()
    }

    /// Size of the extensible group; `0` when the type has none.
    #[inline]
    pub fn group_size(&self) -> usize {
        self.extensible_group.len()
    }

    #[inline]
    pub fn is_extensible(&self) -> bool {
        !self.extensible_group.is_empty()
    }

    /// Descriptor for field `index`, mapping extensible indices onto the group.
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        if index < self.fields.len() {
            return self.fields.get(index);
        }
        let g = self.group_size();
        if g == 0 {
            return None;
        }
        if let Some(max) = self.max_fields {
            if index >= max {
                return None;
            }
        }
        self.extensible_group.get((index - self.fields.len()) % g)
    }

    /// Index of the name field, if the type has one.
    pub fn name_index(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.is_name)
    }

    /// Largest field count a record of this type may hold.
    pub fn max_field_count(&self) -> Option<usize> {
        match (self.max_fields, self.is_extensible()) {
            (Some(m), _) => Some(m),
            (None, true) => None,
            (None, false) => Some(self.fields.len()),
        }
    }

    /// `true` if `count` fields form the fixed prefix plus whole groups.
    pub fn is_whole_group_count(&self, count: usize) -> bool {
        let fixed = self.fields.len();
        if count <= fixed {
            return true;
        }
        let g = self.group_size();
        g > 0 && (count - fixed) % g == 0
    }

    /// Extensible group index holding field `index`.
    pub fn group_of(&self, index: usize) -> Option<usize> {
        let g = self.group_size();
        if g == 0 || index < self.fields.len() {
            None
        } else {
            Some((index - self.fields.len()) / g)
        }
    }

    /// First field index of extensible group `group`.
    pub fn group_start(&self, group: usize) -> usize {
        self.fields.len() + group * self.group_size()
    }

    /// `true` if a record of this type belongs to `list`. `AllObjects` matches every type.
    pub fn belongs_to(&self, list: &str) -> bool {
        list == ALL_OBJECTS || self.references.iter().any(|r| r == list)
    }
}

/// Reference list that every record belongs to.
pub const ALL_OBJECTS: &str = "AllObjects";

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> TypeDescriptor {
        TypeDescriptor::new("Schedule:Compact")
            .with_field(FieldDescriptor::name("Name").required())
            .with_field(FieldDescriptor::alpha("Type Limits"))
            .with_extensible_group(vec![
                FieldDescriptor::alpha("Field"),
                FieldDescriptor::real("Value"),
            ])
            .with_min_fields(2)
    }

    #[test]
    fn field_maps_into_group() {
        let t = schedule();
        assert_eq!(t.field(0).unwrap().name, "Name");
        assert_eq!(t.field(2).unwrap().name, "Field");
        assert_eq!(t.field(5).unwrap().name, "Value");
        assert_eq!(t.group_of(5), Some(1));
        assert_eq!(t.group_of(1), None);
        assert_eq!(t.group_start(2), 6);
    }

    #[test]
    fn whole_group_counts() {
        let t = schedule();
        assert!(t.is_whole_group_count(0));
        assert!(t.is_whole_group_count(2));
        assert!(!t.is_whole_group_count(3));
        assert!(t.is_whole_group_count(6));
        assert_eq!(t.max_field_count(), None);
    }

    #[test]
    fn non_extensible_caps_at_prefix() {
        let t = TypeDescriptor::new("Zone").with_field(FieldDescriptor::name("Name"));
        assert_eq!(t.max_field_count(), Some(1));
        assert!(t.field(1).is_none());
        assert!(!t.is_whole_group_count(2));
    }

    #[test]
    fn default_name_base_replaces_colons() {
        assert_eq!(TypeId::from("OS:Zone").default_name_base(), "OS Zone");
        assert_eq!(TypeId::from("Zone").default_name_base(), "Zone");
    }

    #[test]
    fn all_objects_matches_everything() {
        let t = TypeDescriptor::new("Zone").in_reference_list("ZoneNames");
        assert!(t.belongs_to("ZoneNames"));
        assert!(t.belongs_to(ALL_OBJECTS));
        assert!(!t.belongs_to("ScheduleNames"));
    }

    #[test]
    fn bounds() {
        assert!(Bound::Inclusive(0.0).admits_from_below(0.0));
        assert!(!Bound::Exclusive(0.0).admits_from_below(0.0));
        assert!(Bound::Exclusive(1.0).admits_from_above(0.5));
        assert!(!Bound::Inclusive(1.0).admits_from_above(1.5));
    }
}
