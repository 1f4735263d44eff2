//! The recursive record validator.
//!
//! For every record level, [`validate`] walks the fields in declaration order and
//! 1. rejects fields carrying both `default` and an active `required`,
//! 2. collects `requires` declarations (after checking each name is a valid identifier),
//! 3. recurses into nested records,
//! 4. applies `default` literals to zero-valued primitives and enforces `required`,
//!
//! and once all fields were visited, checks that every `requires` target of every
//! *set* field is set as well. Since defaults are applied first, a defaulted field
//! satisfies dependencies on it. A field that ends up unset drops its own `requires`
//! declaration instead of enforcing it.
//!
//! The first failure aborts the whole validation. Defaults applied up to that
//! point are not rolled back.

use std::collections::{BTreeMap, HashSet};

use miette::Diagnostic;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::coerce::{coerce, CoercionError};
use crate::metadata::{FieldDescriptor, FieldKind, FieldSlot, Primitive, Record};


static DEPENDENCY_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    // PANIC SAFETY: This is safe because the pattern is a constant, valid regular expression.
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]+$").unwrap()
});


/// Reasons a record can fail validation.
///
/// Field names are dotted paths starting at the validated root record (e.g. `server.tls.key`).
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("field `{field}` has both a default value and is marked as required")]
    #[diagnostic(
        code(confcheck::schema_conflict),
        help("a field with a default value can never be missing, remove one of the two annotations")
    )]
    SchemaConflict { field: String },

    #[error("field name `{name}` required by `{field}` is not a valid field name")]
    #[diagnostic(
        code(confcheck::invalid_dependency_name),
        help("field names must start with a letter and contain only letters, digits, `_` or `-`")
    )]
    InvalidDependencyName { name: String, field: String },

    #[error("failed to apply the default value of field `{field}`")]
    #[diagnostic(code(confcheck::value_coercion))]
    ValueCoercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error("{kind} field `{field}` is marked as required, but has a zero value")]
    #[diagnostic(code(confcheck::required_missing))]
    RequiredMissing { field: String, kind: FieldKind },

    #[error("field `{dependency}` is required by field `{field}`, but is not set")]
    #[diagnostic(code(confcheck::dependency_unmet))]
    DependencyUnmet { field: String, dependency: String },

    #[error("field `{field}` has a default value, but its kind {kind} has no coercion rule")]
    #[diagnostic(code(confcheck::unsupported_type))]
    UnsupportedType { field: String, kind: FieldKind },
}


/// Apply defaults to and validate `record` in place, including all nested records.
///
/// Returns the first problem encountered. On success, every zero-valued field that
/// has a `default` annotation now holds its default value.
pub fn validate(record: &mut dyn Record) -> Result<(), ValidationError> {
    validate_record(record, "")
}

fn validate_record(record: &mut dyn Record, path: &str) -> Result<(), ValidationError> {
    trace!(record = record.record_name(), path, "Validating record.");

    let mut requires_map: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    let mut set_fields: HashSet<&'static str> = HashSet::new();

    for FieldDescriptor {
        name,
        annotations,
        slot,
    } in record.fields()
    {
        let field_path = qualified_name(path, name);

        let required = annotations.is_required();
        let default_literal = annotations.default_literal();

        if required && default_literal.is_some() {
            return Err(ValidationError::SchemaConflict { field: field_path });
        }

        if let Some(requires_list) = annotations.requires_list() {
            let dependencies = parse_requires_list(requires_list, &field_path)?;
            requires_map.entry(name).or_default().extend(dependencies);
        }

        match slot {
            FieldSlot::Record(nested) => {
                if let Some(literal) = default_literal {
                    // Records have no literal form, so this always fails.
                    coerce(FieldKind::Record, literal)
                        .map_err(|error| coercion_failure(&field_path, error))?;
                }

                validate_record(nested, &field_path)?;

                let nested_is_zero = is_zero_record(nested);
                if required && nested_is_zero {
                    return Err(ValidationError::RequiredMissing {
                        field: field_path,
                        kind: FieldKind::Record,
                    });
                }

                if nested_is_zero {
                    requires_map.remove(name);
                } else {
                    set_fields.insert(name);
                }
            }
            FieldSlot::Primitive(value) => {
                if !value.is_zero() {
                    set_fields.insert(name);
                    continue;
                }

                match default_literal {
                    Some(literal) => {
                        apply_default(value, literal, &field_path)?;
                        set_fields.insert(name);
                    }
                    None => {
                        requires_map.remove(name);
                    }
                }

                if required {
                    return Err(ValidationError::RequiredMissing {
                        field: field_path,
                        kind: value.kind(),
                    });
                }
            }
            FieldSlot::Inaccessible { kind, is_zero } => {
                if annotations.has_value_rules() {
                    warn!(
                        field = %field_path,
                        %kind,
                        "Field carries a default or required annotation, but is not writable; skipping it."
                    );
                }

                if is_zero {
                    requires_map.remove(name);
                } else {
                    set_fields.insert(name);
                }
            }
        }
    }

    for (field, dependencies) in &requires_map {
        if let Some(missing) = dependencies
            .iter()
            .find(|dependency| !set_fields.contains(dependency.as_str()))
        {
            return Err(ValidationError::DependencyUnmet {
                field: qualified_name(path, field),
                dependency: qualified_name(path, missing),
            });
        }
    }

    Ok(())
}

fn apply_default(
    value: &mut dyn Primitive,
    literal: &str,
    field_path: &str,
) -> Result<(), ValidationError> {
    let coerced = coerce(value.kind(), literal)
        .and_then(|coerced| value.assign(coerced))
        .map_err(|error| coercion_failure(field_path, error));

    if coerced.is_ok() {
        debug!(field = field_path, literal, "Applied default value.");
    }

    coerced
}

fn coercion_failure(field_path: &str, error: CoercionError) -> ValidationError {
    match error {
        CoercionError::UnsupportedType { kind } => ValidationError::UnsupportedType {
            field: field_path.to_string(),
            kind,
        },
        source => ValidationError::ValueCoercion {
            field: field_path.to_string(),
            source,
        },
    }
}


/// Split a `requires` list on commas, trim every name and check it is a valid identifier.
fn parse_requires_list(
    requires_list: &str,
    field_path: &str,
) -> Result<Vec<String>, ValidationError> {
    requires_list
        .split(',')
        .map(str::trim)
        .map(|name| {
            if is_valid_dependency_name(name) {
                Ok(name.to_string())
            } else {
                Err(ValidationError::InvalidDependencyName {
                    name: name.to_string(),
                    field: field_path.to_string(),
                })
            }
        })
        .collect()
}

/// Returns `true` if `name` can appear in a `requires` list: a letter followed
/// by at least one letter, digit, `_` or `-`.
pub fn is_valid_dependency_name(name: &str) -> bool {
    DEPENDENCY_NAME_REGEX.is_match(name)
}

/// Returns `true` if every field of `record` (recursively) holds its zero value.
///
pub fn is_zero_record(record: &mut dyn Record) -> bool {
    record
        .fields()
        .into_iter()
        .all(|descriptor| match descriptor.slot {
            FieldSlot::Primitive(value) => value.is_zero(),
            FieldSlot::Record(nested) => is_zero_record(nested),
            FieldSlot::Inaccessible { is_zero, .. } => is_zero,
        })
}

fn qualified_name(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_record;

    #[test]
    fn dependency_names() {
        for name in ["Val2", "ab", "a-b_c", "Z9"] {
            assert!(is_valid_dependency_name(name), "{name} should be valid");
        }

        for name in ["", "a", "2val", "_val", "Val**", "val 2", "-x"] {
            assert!(!is_valid_dependency_name(name), "{name} should be invalid");
        }
    }

    #[test]
    fn requires_list_is_trimmed() {
        assert_eq!(
            parse_requires_list(" Val2 ,Val3 ", "Val1").unwrap(),
            vec!["Val2".to_string(), "Val3".to_string()]
        );

        assert!(matches!(
            parse_requires_list("Val2,,Val3", "Val1"),
            Err(ValidationError::InvalidDependencyName { name, field })
                if name.is_empty() && field == "Val1"
        ));
    }

    #[test]
    fn qualified_names() {
        assert_eq!(qualified_name("", "port"), "port");
        assert_eq!(qualified_name("server.tls", "key"), "server.tls.key");
    }

    #[derive(Default)]
    struct Inner {
        count: i32,
        labels: Vec<String>,
    }

    impl_record!(Inner {
        count: value(),
        labels: value(),
    });

    #[derive(Default)]
    struct Outer {
        name: String,
        inner: Inner,
    }

    impl_record!(Outer {
        name: value(),
        inner: record(),
    });

    #[test]
    fn zero_records_are_detected_recursively() {
        let mut outer = Outer::default();
        assert!(is_zero_record(&mut outer));

        outer.inner.labels.push("x".into());
        assert!(!is_zero_record(&mut outer));
    }

    #[derive(Default)]
    struct Hidden {
        visible: i32,
        secret: i32,
        other: String,
    }

    impl_record!(Hidden {
        visible: value(default = "1"),
        secret: hidden(default = "7", requires = "other"),
        other: value(),
    });

    #[test]
    fn inaccessible_fields_are_skipped() {
        let mut hidden = Hidden::default();
        validate(&mut hidden).unwrap();

        assert_eq!(hidden.visible, 1);
        assert_eq!(hidden.secret, 0);
    }

    #[test]
    fn nested_errors_carry_the_full_path() {
        #[derive(Default)]
        struct Leaf {
            port: i8,
        }

        impl_record!(Leaf {
            port: value(default = "555"),
        });

        #[derive(Default)]
        struct Root {
            leaf: Leaf,
        }

        impl_record!(Root { leaf: record() });

        let error = validate(&mut Root::default()).unwrap_err();
        assert!(matches!(
            error,
            ValidationError::ValueCoercion { ref field, source: CoercionError::IntegerOutOfRange { .. } }
                if field == "leaf.port"
        ));
    }
}
