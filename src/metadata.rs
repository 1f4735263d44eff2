//! Field metadata: how a record describes its fields to the validator.
//!
//! A [`Record`] hands out one [`FieldDescriptor`] per field, in declaration order.
//! Each descriptor carries the field name, its [`Annotations`] and a [`FieldSlot`]
//! through which the validator can read (and, for primitives, overwrite) the value.
//!
//! Implementing [`Record`] by hand is possible, but the usual way is the
//! [`impl_record!`][crate::impl_record] macro, which builds the descriptor table
//! from a short field list.

use std::fmt::{self, Display, Formatter};

use crate::coerce::{CoercionError, Value};


/// Kind of a single scalar value (either a whole field or a sequence element).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Signed integer. A `bits` value of `0` means the platform's native width.
    Integer { bits: u32 },

    /// Floating point number. A `bits` value of `0` is treated as 64.
    Float { bits: u32 },

    String,

    /// Booleans can be validated for zero-ness, but have no default-value coercion rule.
    Bool,
}

/// Kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Sequence(ScalarKind),
    Record,
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Integer { bits: 0 } => f.write_str("isize"),
            ScalarKind::Integer { bits } => write!(f, "i{bits}"),
            ScalarKind::Float { bits: 0 } => f.write_str("f64"),
            ScalarKind::Float { bits } => write!(f, "f{bits}"),
            ScalarKind::String => f.write_str("String"),
            ScalarKind::Bool => f.write_str("bool"),
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(scalar) => write!(f, "{scalar}"),
            FieldKind::Sequence(element) => write!(f, "Vec<{element}>"),
            FieldKind::Record => f.write_str("record"),
        }
    }
}



/// Raw annotation values attached to a field.
///
/// Values are stored verbatim; interpretation happens in the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    default: Option<String>,
    required: Option<String>,
    requires: Option<String>,
}

impl Annotations {
    /// Annotations with nothing set.
    pub fn new() -> Self {
        Self {
            default: None,
            required: None,
            requires: None,
        }
    }

    /// Attach a `default` literal.
    #[must_use]
    pub fn default<S: Into<String>>(mut self, literal: S) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Attach a `required` value. Only a case-insensitive `"true"` activates it.
    #[must_use]
    pub fn required<S: Into<String>>(mut self, value: S) -> Self {
        self.required = Some(value.into());
        self
    }

    /// Attach a comma-separated `requires` list of sibling field names.
    #[must_use]
    pub fn requires<S: Into<String>>(mut self, names: S) -> Self {
        self.requires = Some(names.into());
        self
    }

    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn requires_list(&self) -> Option<&str> {
        self.requires.as_deref()
    }

    /// Returns `true` if the field carries a `default` or an active `required`,
    /// i.e. a rule that needs access to the field value.
    pub fn has_value_rules(&self) -> bool {
        self.default.is_some() || self.is_required()
    }
}



/// A primitive field value the validator can inspect and overwrite.
pub trait Primitive {
    fn kind(&self) -> FieldKind;

    /// Returns `true` if the value is the zero value of its kind
    /// (`0`, `0.0`, `""`, `false` or an empty sequence).
    fn is_zero(&self) -> bool;

    /// Overwrite the value with an already-coerced `value`.
    fn assign(&mut self, value: Value) -> Result<(), CoercionError>;
}

/// A scalar type usable as a field or as a sequence element.
pub trait Scalar: Sized {
    const KIND: ScalarKind;

    fn is_zero_scalar(&self) -> bool;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! integer_scalars {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::Integer { bits: $bits };

            fn is_zero_scalar(&self) -> bool {
                *self == 0
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Integer(integer) => <$ty>::try_from(integer).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

integer_scalars!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, isize => 0);

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Float { bits: 32 };

    fn is_zero_scalar(&self) -> bool {
        *self == 0.0
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            // Range was already checked against 32 bits during coercion.
            Value::Float(float) => Some(float as f32),
            _ => None,
        }
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float { bits: 64 };

    fn is_zero_scalar(&self) -> bool {
        *self == 0.0
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(float) => Some(float),
            _ => None,
        }
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn is_zero_scalar(&self) -> bool {
        self.is_empty()
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(string) => Some(string),
            _ => None,
        }
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn is_zero_scalar(&self) -> bool {
        !*self
    }

    fn from_value(_value: Value) -> Option<Self> {
        None
    }
}

macro_rules! primitive_fields {
    ($($ty:ty),* $(,)?) => {$(
        impl Primitive for $ty {
            fn kind(&self) -> FieldKind {
                FieldKind::Scalar(<$ty as Scalar>::KIND)
            }

            fn is_zero(&self) -> bool {
                self.is_zero_scalar()
            }

            fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
                *self = assign_scalar::<$ty>(value, self.kind())?;
                Ok(())
            }
        }

        impl Primitive for Vec<$ty> {
            fn kind(&self) -> FieldKind {
                FieldKind::Sequence(<$ty as Scalar>::KIND)
            }

            fn is_zero(&self) -> bool {
                self.is_empty()
            }

            fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
                let kind = self.kind();

                let elements = match value {
                    Value::Sequence(elements) => elements,
                    value => return Err(CoercionError::KindMismatch { kind, value }),
                };

                *self = elements
                    .into_iter()
                    .map(|element| assign_scalar::<$ty>(element, kind))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(())
            }
        }
    )*};
}

primitive_fields!(i8, i16, i32, i64, isize, f32, f64, String, bool);

fn assign_scalar<T: Scalar>(value: Value, kind: FieldKind) -> Result<T, CoercionError> {
    // `from_value` consumes the value, so keep a copy for the error path.
    T::from_value(value.clone()).ok_or(CoercionError::KindMismatch { kind, value })
}



/// Accessor through which the validator reaches a field's value.
pub enum FieldSlot<'a> {
    Primitive(&'a mut dyn Primitive),

    Record(&'a mut dyn Record),

    /// The field exists, but its record does not let it be written. Its zero-ness is
    /// still known, so it takes part in `requires` checks, but `default` and `required`
    /// cannot be honoured and only produce a warning.
    Inaccessible { kind: FieldKind, is_zero: bool },
}

impl<'a> FieldSlot<'a> {
    pub fn value(field: &'a mut dyn Primitive) -> Self {
        FieldSlot::Primitive(field)
    }

    pub fn record(field: &'a mut dyn Record) -> Self {
        FieldSlot::Record(field)
    }

    pub fn hidden(field: &dyn Primitive) -> Self {
        FieldSlot::Inaccessible {
            kind: field.kind(),
            is_zero: field.is_zero(),
        }
    }
}


/// Everything the validator needs to know about one field.
pub struct FieldDescriptor<'a> {
    pub name: &'static str,
    pub annotations: Annotations,
    pub slot: FieldSlot<'a>,
}

impl<'a> FieldDescriptor<'a> {
    pub fn new(name: &'static str, slot: FieldSlot<'a>, annotations: Annotations) -> Self {
        Self {
            name,
            annotations,
            slot,
        }
    }
}


/// A composite configuration value with an ordered list of named fields.
pub trait Record {
    /// Type name, used in log output.
    fn record_name(&self) -> &'static str;

    /// Describe every field of this record, in declaration order.
    fn fields(&mut self) -> Vec<FieldDescriptor<'_>>;
}


/// Implements [`Record`] for a struct from a list of its fields.
///
/// Every listed field names its slot (`value` for primitives, `record` for nested
/// records, `hidden` for primitives the validator may read but must not write) followed by its
/// annotations. Fields that are not listed are invisible to validation.
///
/// ```
/// use confcheck::impl_record;
///
/// #[derive(Default)]
/// struct Tls {
///     certificate: String,
///     key: String,
/// }
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: i32,
///     tls: Tls,
/// }
///
/// impl_record!(Tls {
///     certificate: value(requires = "key"),
///     key: value(),
/// });
///
/// impl_record!(Server {
///     host: value(required = "true"),
///     port: value(default = "8080"),
///     tls: record(),
/// });
///
/// let mut server = Server { host: "localhost".into(), ..Default::default() };
/// confcheck::validate(&mut server).unwrap();
/// assert_eq!(server.port, 8080);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($record:ty {
        $( $field:ident : $slot:ident ( $( $annotation:ident = $literal:expr ),* $(,)? ) ),* $(,)?
    }) => {
        impl $crate::Record for $record {
            fn record_name(&self) -> &'static str {
                stringify!($record)
            }

            fn fields(&mut self) -> ::std::vec::Vec<$crate::FieldDescriptor<'_>> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor::new(
                            stringify!($field),
                            $crate::FieldSlot::$slot(&mut self.$field),
                            $crate::Annotations::new() $( .$annotation($literal) )*,
                        ),
                    )*
                ]
            }
        }
    };
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_is_case_insensitive_true_only() {
        assert!(Annotations::new().required("true").is_required());
        assert!(Annotations::new().required("TRUE").is_required());
        assert!(Annotations::new().required("True").is_required());
        assert!(!Annotations::new().required("false").is_required());
        assert!(!Annotations::new().required("yes").is_required());
        assert!(!Annotations::new().is_required());
    }

    #[test]
    fn value_rules_ignore_inactive_required() {
        assert!(!Annotations::new().required("false").has_value_rules());
        assert!(!Annotations::new().requires("other").has_value_rules());
        assert!(Annotations::new().default("1").has_value_rules());
    }

    #[test]
    fn kinds_are_reported_with_bit_widths() {
        assert_eq!(0i8.kind(), FieldKind::Scalar(ScalarKind::Integer { bits: 8 }));
        assert_eq!(0isize.kind(), FieldKind::Scalar(ScalarKind::Integer { bits: 0 }));
        assert_eq!(0f32.kind(), FieldKind::Scalar(ScalarKind::Float { bits: 32 }));
        assert_eq!(
            Vec::<i64>::new().kind(),
            FieldKind::Sequence(ScalarKind::Integer { bits: 64 })
        );

        assert_eq!(0isize.kind().to_string(), "isize");
        assert_eq!(Vec::<String>::new().kind().to_string(), "Vec<String>");
    }

    #[test]
    fn zero_values() {
        assert!(0i32.is_zero());
        assert!(!(-3i32).is_zero());
        assert!(0.0f64.is_zero());
        assert!(String::new().is_zero());
        assert!(false.is_zero());
        assert!(!true.is_zero());
        assert!(Vec::<f32>::new().is_zero());
        assert!(!vec![0i16].is_zero());
    }

    #[test]
    fn assign_rejects_mismatched_values() {
        let mut field = 0i8;
        assert!(field.assign(Value::Integer(300)).is_err());
        assert!(field.assign(Value::String("1".into())).is_err());

        field.assign(Value::Integer(-12)).unwrap();
        assert_eq!(field, -12);

        let mut sequence: Vec<String> = Vec::new();
        sequence
            .assign(Value::Sequence(vec![
                Value::String("a".into()),
                Value::String("b".into()),
            ]))
            .unwrap();
        assert_eq!(sequence, vec!["a".to_string(), "b".to_string()]);
    }
}
