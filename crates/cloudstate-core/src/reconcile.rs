//! Projection between nested API objects and flat state records
//!
//! [`flatten`] turns a remote object into a [`FlatRecord`] according to a
//! [`Schema`]. Every field is visited even after a failure so the caller
//! receives the complete list of problems in one [`ReconcileError`].
//! [`expand`] goes the other way and builds request bodies.
//!
//! All functions here are pure: the same input always produces the same
//! output, which hosts rely on when they re-run reads speculatively.

use crate::record::{FlatRecord, FlatValue};
use crate::schema::{FieldKind, FieldMode, FieldPath, FieldSpec, Schema};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required field was absent or null
    Missing,
    /// The remote value has the wrong JSON type
    TypeMismatch {
        expected: &'static str,
        observed: Value,
    },
}

/// One field that could not be reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiagnostic {
    /// Full location, e.g. `validations[1].status`
    pub field: String,
    pub problem: Problem,
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            Problem::Missing => write!(f, "{}: required field is missing", self.field),
            Problem::TypeMismatch { expected, observed } => {
                write!(f, "{}: expected {}, got {}", self.field, expected, observed)
            }
        }
    }
}

/// Aggregate of every field failure from one flatten call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ReconcileError {
    pub diagnostics: Vec<FieldDiagnostic>,
}

impl ReconcileError {
    pub fn fields(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.field.as_str()).collect()
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field(s) could not be reconciled", self.diagnostics.len())?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  - {}", diagnostic)?;
        }
        Ok(())
    }
}

/// Partial record together with the diagnostics collected while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub record: FlatRecord,
    pub diagnostics: Vec<FieldDiagnostic>,
}

impl Flattened {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_result(self) -> Result<FlatRecord, ReconcileError> {
        if self.diagnostics.is_empty() {
            Ok(self.record)
        } else {
            Err(ReconcileError {
                diagnostics: self.diagnostics,
            })
        }
    }
}

/// Where field values are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// API response: response paths, defaults for absent fields
    Remote,
    /// User configuration: keyed by field name, absent fields are skipped
    Config,
}

/// Flatten a remote object, failing if any field could not be coerced
pub fn flatten(remote: &Value, schema: &Schema) -> Result<FlatRecord, ReconcileError> {
    flatten_partial(remote, schema).into_result()
}

/// Flatten a remote object, keeping whatever could be coerced
pub fn flatten_partial(remote: &Value, schema: &Schema) -> Flattened {
    let mut diagnostics = Vec::new();
    let record = flatten_object(remote, schema, Source::Remote, "", &mut diagnostics);
    Flattened {
        record,
        diagnostics,
    }
}

/// Flatten a list of remote objects, preserving their order
pub fn flatten_list(remotes: &[Value], schema: &Schema) -> Result<Vec<FlatRecord>, ReconcileError> {
    let mut diagnostics = Vec::new();
    let records = remotes
        .iter()
        .enumerate()
        .map(|(i, remote)| {
            flatten_element(remote, schema, Source::Remote, &format!("[{}]", i), &mut diagnostics)
        })
        .collect();

    if diagnostics.is_empty() {
        Ok(records)
    } else {
        Err(ReconcileError { diagnostics })
    }
}

/// Coerce desired configuration keyed by field names.
///
/// Computed fields are ignored and absent fields stay absent, so the result
/// only holds what the user actually set.
pub fn flatten_config(config: &Value, schema: &Schema) -> Result<FlatRecord, ReconcileError> {
    let mut diagnostics = Vec::new();
    let record = flatten_object(config, schema, Source::Config, "", &mut diagnostics);
    if diagnostics.is_empty() {
        Ok(record)
    } else {
        Err(ReconcileError { diagnostics })
    }
}

/// Build a nested request body from the fields selected by `include`.
///
/// Fields absent from the record are left out rather than sent as null.
pub fn expand<F>(record: &FlatRecord, schema: &Schema, include: F) -> Value
where
    F: Fn(&FieldSpec) -> bool,
{
    let mut body = Map::new();
    for spec in schema.iter().filter(|s| include(s)) {
        let Some(value) = record.get(&spec.name) else {
            continue;
        };
        let json = expand_value(value, &spec.kind);
        insert_at(&mut body, spec.request_path(), json);
    }
    Value::Object(body)
}

fn expand_value(value: &FlatValue, kind: &FieldKind) -> Value {
    match (value, kind) {
        (FlatValue::Record(r), FieldKind::Object(nested)) => expand(r, nested, |_| true),
        (FlatValue::List(items), FieldKind::List(nested)) => Value::Array(
            items
                .iter()
                .map(|item| expand(item, nested, |_| true))
                .collect(),
        ),
        (other, _) => other.to_json(),
    }
}

fn insert_at(body: &mut Map<String, Value>, path: &FieldPath, value: Value) {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = body;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        current = map;
    }
    current.insert(last.clone(), value);
}

fn flatten_element(
    remote: &Value,
    schema: &Schema,
    source: Source,
    location: &str,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> FlatRecord {
    if !remote.is_object() {
        diagnostics.push(FieldDiagnostic {
            field: location.to_string(),
            problem: Problem::TypeMismatch {
                expected: "object",
                observed: remote.clone(),
            },
        });
        return FlatRecord::new();
    }
    flatten_object(remote, schema, source, location, diagnostics)
}

fn flatten_object(
    remote: &Value,
    schema: &Schema,
    source: Source,
    location: &str,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> FlatRecord {
    let mut record = FlatRecord::new();

    for spec in schema.iter() {
        let found = match source {
            Source::Remote if spec.mode == FieldMode::WriteOnly => continue,
            Source::Remote => lookup(remote, &spec.path),
            Source::Config if !spec.mode.is_input() => continue,
            Source::Config => remote.get(&spec.name).filter(|v| !v.is_null()),
        };
        let field = join(location, &spec.name);

        match found {
            Some(value) => {
                if let Some(flat) = coerce(value, &spec.kind, source, &field, diagnostics) {
                    record.insert(spec.name.clone(), flat);
                }
            }
            None if source == Source::Config => {}
            None if spec.required => diagnostics.push(FieldDiagnostic {
                field,
                problem: Problem::Missing,
            }),
            None => record.insert(spec.name.clone(), spec.absent_value()),
        }
    }

    record
}

fn lookup<'a>(remote: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = remote;
    for segment in path.segments() {
        current = current.get(segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}

fn coerce(
    value: &Value,
    kind: &FieldKind,
    source: Source,
    field: &str,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> Option<FlatValue> {
    let mismatch = |diagnostics: &mut Vec<FieldDiagnostic>| {
        diagnostics.push(FieldDiagnostic {
            field: field.to_string(),
            problem: Problem::TypeMismatch {
                expected: kind.label(),
                observed: value.clone(),
            },
        });
        None
    };

    match kind {
        FieldKind::String => match value {
            Value::String(s) => Some(FlatValue::String(s.clone())),
            _ => mismatch(diagnostics),
        },
        FieldKind::Int => match as_integer(value) {
            Some(i) => Some(FlatValue::Int(i)),
            None => mismatch(diagnostics),
        },
        FieldKind::Bool => match value {
            Value::Bool(b) => Some(FlatValue::Bool(*b)),
            _ => mismatch(diagnostics),
        },
        FieldKind::StringList => {
            let Value::Array(items) = value else {
                return mismatch(diagnostics);
            };
            let mut out = Vec::with_capacity(items.len());
            let mut ok = true;
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => {
                        ok = false;
                        diagnostics.push(FieldDiagnostic {
                            field: format!("{}[{}]", field, i),
                            problem: Problem::TypeMismatch {
                                expected: "string",
                                observed: other.clone(),
                            },
                        });
                    }
                }
            }
            ok.then_some(FlatValue::StringList(out))
        }
        FieldKind::StringMap => {
            let Value::Object(map) = value else {
                return mismatch(diagnostics);
            };
            let mut out = BTreeMap::new();
            let mut ok = true;
            for (key, item) in map {
                match item {
                    Value::String(s) => {
                        out.insert(key.clone(), s.clone());
                    }
                    other => {
                        ok = false;
                        diagnostics.push(FieldDiagnostic {
                            field: format!("{}.{}", field, key),
                            problem: Problem::TypeMismatch {
                                expected: "string",
                                observed: other.clone(),
                            },
                        });
                    }
                }
            }
            ok.then_some(FlatValue::StringMap(out))
        }
        FieldKind::Object(nested) => {
            if !value.is_object() {
                return mismatch(diagnostics);
            }
            Some(FlatValue::Record(flatten_object(
                value,
                nested,
                source,
                field,
                diagnostics,
            )))
        }
        FieldKind::List(nested) => {
            let Value::Array(items) = value else {
                return mismatch(diagnostics);
            };
            let records = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    flatten_element(item, nested, source, &format!("{}[{}]", field, i), diagnostics)
                })
                .collect();
            Some(FlatValue::List(records))
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.is_u64() {
        return None;
    }
    // Some endpoints serialize whole numbers as floats (636.0).
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

fn join(location: &str, name: &str) -> String {
    if location.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", location, name)
    }
}
