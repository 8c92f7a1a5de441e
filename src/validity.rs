//! Validity auditor.
//!
//! Classifies violations in a record or a whole graph into [`DataErrorKind`]s.
//! Each kind belongs to a [`StrictnessLevel`]; a report for level `L` lists
//! only kinds whose level is `<= L`. Nothing here mutates the graph.
//!
//! | Level   | Kinds |
//! |---------|-------|
//! | Minimal | `NotInitialized` |
//! | Draft   | `DataType`, `NumericBound`, `NullAndRequired`, `NameConflict` |
//! | Final   | `PointerType`, `NumberOfFields`, `DuplicateUnique`, `MissingRequired` |

use crate::graph::Graph;
use crate::record::names::eq_ignore_case;
use crate::record::{FieldValue, Handle, Record};
use crate::schema::{FieldDescriptor, FieldKind, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Graph-wide gate on which mutations may commit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum StrictnessLevel {
    Minimal,
    #[default]
    Draft,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataErrorKind {
    /// The record has been disconnected from its graph.
    NotInitialized,
    /// Literal does not parse as the field's type or is not a choice key.
    DataType,
    /// Number lies outside the field's bounds.
    NumericBound,
    /// A required field is empty or a required pointer has no target.
    NullAndRequired,
    /// Another record sharing a reference list has the same name.
    NameConflict,
    /// Pointer target does not belong to any of the field's reference lists.
    PointerType,
    /// Field count is below the minimum, above the maximum, or splits a group.
    NumberOfFields,
    /// More than one record of a unique type.
    DuplicateUnique,
    /// No record of a required type.
    MissingRequired,
}

impl DataErrorKind {
    /// Lowest strictness level at which this kind is reported.
    pub fn level(self) -> StrictnessLevel {
        use DataErrorKind::*;
        match self {
            NotInitialized => StrictnessLevel::Minimal,
            DataType | NumericBound | NullAndRequired | NameConflict => StrictnessLevel::Draft,
            PointerType | NumberOfFields | DuplicateUnique | MissingRequired => {
                StrictnessLevel::Final
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataError {
    pub kind: DataErrorKind,
    /// Offending record; `None` for type-level errors.
    pub handle: Option<Handle>,
    pub type_id: TypeId,
    pub field: Option<usize>,
    pub detail: String,
}

impl DataError {
    fn at(record: &Record, kind: DataErrorKind, field: Option<usize>, detail: String) -> Self {
        Self {
            kind,
            handle: Some(record.handle()),
            type_id: record.type_id().clone(),
            field,
            detail,
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in `{}`", self.kind, self.type_id)?;
        if let Some(h) = self.handle {
            write!(f, " {h}")?;
        }
        if let Some(i) = self.field {
            write!(f, " field {i}")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Structured result of auditing at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityReport {
    pub level: StrictnessLevel,
    pub errors: Vec<DataError>,
}

impl ValidityReport {
    pub fn new(level: StrictnessLevel, errors: Vec<DataError>) -> Self {
        Self { level, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataError> {
        self.errors.iter()
    }

    /// Number of errors of `kind`.
    pub fn count(&self, kind: DataErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    pub fn has(&self, kind: DataErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

impl fmt::Display for ValidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) at {:?}", self.errors.len(), self.level)?;
        for e in &self.errors {
            write!(f, "; {e}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Classification
// -----------------------------------------------------------------------------

/// Errors in field `index` of `record` at `level`.
///
/// `record` need not be the graph's own copy: mutators audit a scratch copy
/// carrying the member's handle before committing it.
pub fn classify_field(
    graph: &Graph,
    record: &Record,
    index: usize,
    level: StrictnessLevel,
) -> Vec<DataError> {
    let mut out = Vec::new();
    if level < StrictnessLevel::Draft {
        return out;
    }
    let Some(desc) = record.field_descriptor(index) else {
        return out;
    };

    if let Some(value) = record.value(index) {
        if let Some(detail) = data_type_problem(desc, value) {
            out.push(DataError::at(record, DataErrorKind::DataType, Some(index), detail));
        }
        if let Some(v) = value.as_number() {
            let low = desc.minimum.is_some_and(|b| !b.admits_from_below(v));
            let high = desc.maximum.is_some_and(|b| !b.admits_from_above(v));
            if low || high {
                out.push(DataError::at(
                    record,
                    DataErrorKind::NumericBound,
                    Some(index),
                    format!("{v} outside {:?}..{:?}", desc.minimum, desc.maximum),
                ));
            }
        }
    }

    if desc.required && desc.default.is_none() && record.is_null(index) {
        out.push(DataError::at(
            record,
            DataErrorKind::NullAndRequired,
            Some(index),
            format!("`{}` is required", desc.name),
        ));
    }

    if record.descriptor().name_index() == Some(index) {
        let clashes = graph.name_conflicts(record);
        if !clashes.is_empty() {
            out.push(DataError::at(
                record,
                DataErrorKind::NameConflict,
                Some(index),
                format!(
                    "name `{}` also used by {} record(s)",
                    record.name().unwrap_or_default(),
                    clashes.len()
                ),
            ));
        }
    }

    if level >= StrictnessLevel::Final {
        if let Some(target) = record.target(index) {
            if !graph.can_be_target(target, desc.reference_lists()) {
                out.push(DataError::at(
                    record,
                    DataErrorKind::PointerType,
                    Some(index),
                    format!("{target} is not in {:?}", desc.reference_lists()),
                ));
            }
        }
    }
    out
}

/// Errors in `record` at `level`.
pub fn classify_record(graph: &Graph, record: &Record, level: StrictnessLevel) -> Vec<DataError> {
    if !record.is_initialized() {
        return vec![DataError::at(
            record,
            DataErrorKind::NotInitialized,
            None,
            String::new(),
        )];
    }
    let mut out = Vec::new();
    for index in 0..record.num_fields() {
        out.extend(classify_field(graph, record, index, level));
    }
    if level >= StrictnessLevel::Final {
        if let Some(detail) = field_count_problem(record) {
            out.push(DataError::at(record, DataErrorKind::NumberOfFields, None, detail));
        }
    }
    out
}

/// Errors anywhere in `graph` at `level`, including type-level checks.
pub fn classify_graph(graph: &Graph, level: StrictnessLevel) -> Vec<DataError> {
    let mut out: Vec<DataError> = graph
        .records(false)
        .into_iter()
        .flat_map(|r| classify_record(graph, r, level))
        .collect();

    if level >= StrictnessLevel::Final {
        let schema = graph.schema();
        for type_id in schema.type_ids() {
            let Some(desc) = schema.type_descriptor(&type_id) else {
                continue;
            };
            let count = graph.count_by_type(&type_id);
            if desc.unique && count > 1 {
                out.push(DataError {
                    kind: DataErrorKind::DuplicateUnique,
                    handle: None,
                    type_id: type_id.clone(),
                    field: None,
                    detail: format!("{count} records of a unique type"),
                });
            }
            if desc.required && count == 0 {
                out.push(DataError {
                    kind: DataErrorKind::MissingRequired,
                    handle: None,
                    type_id,
                    field: None,
                    detail: String::new(),
                });
            }
        }
    }
    out
}

fn data_type_problem(desc: &FieldDescriptor, value: &FieldValue) -> Option<String> {
    match (&desc.kind, value) {
        (_, FieldValue::Empty | FieldValue::Pointer) => None,
        (FieldKind::Integer, FieldValue::Number { value: v, .. }) if v.fract() != 0.0 => {
            Some(format!("{v} is not an integer"))
        }
        (FieldKind::Integer | FieldKind::Real, FieldValue::Text(t)) => {
            let auto = (desc.autosizable && eq_ignore_case(t, "autosize"))
                || (desc.autocalculatable && eq_ignore_case(t, "autocalculate"));
            (!auto).then(|| format!("`{t}` is not a number"))
        }
        (FieldKind::Choice(keys), FieldValue::Text(t)) => {
            (!keys.iter().any(|k| eq_ignore_case(k, t))).then(|| format!("`{t}` is not a key"))
        }
        (FieldKind::Choice(keys), FieldValue::Number { text: t, .. }) => {
            (!keys.iter().any(|k| eq_ignore_case(k, t))).then(|| format!("`{t}` is not a key"))
        }
        _ => None,
    }
}

fn field_count_problem(record: &Record) -> Option<String> {
    let desc = record.descriptor();
    let n = record.num_fields();
    if n < desc.min_fields {
        return Some(format!("{n} fields, minimum {}", desc.min_fields));
    }
    if let Some(max) = desc.max_field_count() {
        if n > max {
            return Some(format!("{n} fields, maximum {max}"));
        }
    }
    if !desc.is_whole_group_count(n) {
        return Some(format!("{n} fields split an extensible group"));
    }
    None
}
