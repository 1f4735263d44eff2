//! Annotation-driven defaulting and validation of nested configuration records.
//!
//! A configuration record describes its fields through the [`Record`] trait
//! (usually implemented with [`impl_record!`]). Each field may carry annotations:
//!
//! - `default = "<literal>"`: a zero-valued field is set to the parsed literal,
//! - `required = "true"`: the field must not be zero-valued after defaults were applied,
//! - `requires = "a, b"`: if this field is set, its siblings `a` and `b` must be set too.
//!
//! [`validate`] walks the record recursively, applies the defaults in place and reports
//! the first violated rule as a [`ValidationError`].
//!
//! The [`configuration`] module builds on top of this to load a TOML file into such a
//! record at application startup.

pub mod coerce;
pub mod configuration;
pub mod metadata;
pub mod validator;

pub use coerce::{coerce, CoercionError, Value};
pub use metadata::{
    Annotations,
    FieldDescriptor,
    FieldKind,
    FieldSlot,
    Primitive,
    Record,
    Scalar,
    ScalarKind,
};
pub use validator::{is_zero_record, validate, ValidationError};
