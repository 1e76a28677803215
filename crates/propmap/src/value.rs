//! Dynamic value representation for property access
//!
//! `Value` is the tagged value that travels between a `PropertyMap` and the
//! accessors of a wrapped instance. It covers the scalar types a property
//! can declare plus strings and opaque object payloads.
//!
//! Conversion in both directions is trait-based: `From<T> for Value` lifts a
//! typed field into a `Value`, and [`FromValue`] extracts it back, failing
//! with an accessor fault when the tag does not match.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::AccessorFault;

/// Shared handle for an opaque object payload.
///
/// Object-typed properties compare by pointer identity, not by content.
pub type ObjectHandle = Arc<dyn Any + Send + Sync>;

/// Declared type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `i8`
    Byte,
    /// `i16`
    Short,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// Owned string
    Str,
    /// Opaque shared payload
    Object,
}

impl ValueType {
    /// True for the eight scalar types that have a textual transformer.
    pub const fn is_primitive(self) -> bool {
        !matches!(self, ValueType::Str | ValueType::Object)
    }

    /// True for the six numeric types.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueType::Byte
                | ValueType::Short
                | ValueType::Int
                | ValueType::Long
                | ValueType::Float
                | ValueType::Double
        )
    }

    /// Static lowercase name of this type.
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Char => "char",
            ValueType::Byte => "byte",
            ValueType::Short => "short",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Str => "string",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tagged dynamic value held by a property.
#[derive(Clone)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Single character
    Char(char),
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Owned string
    Str(String),
    /// Opaque shared payload (identity semantics)
    Object(ObjectHandle),
}

impl Value {
    /// Wrap an arbitrary payload as an object value.
    pub fn object<T: Any + Send + Sync>(payload: T) -> Self {
        Value::Object(Arc::new(payload))
    }

    /// Check if the value is null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Declared type of this value, `None` for null.
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Char(_) => Some(ValueType::Char),
            Value::Byte(_) => Some(ValueType::Byte),
            Value::Short(_) => Some(ValueType::Short),
            Value::Int(_) => Some(ValueType::Int),
            Value::Long(_) => Some(ValueType::Long),
            Value::Float(_) => Some(ValueType::Float),
            Value::Double(_) => Some(ValueType::Double),
            Value::Str(_) => Some(ValueType::Str),
            Value::Object(_) => Some(ValueType::Object),
        }
    }

    /// Static name of this value's type, including `"null"`.
    pub const fn type_name(&self) -> &'static str {
        match self.value_type() {
            None => "null",
            Some(ty) => ty.name(),
        }
    }

    /// Extract boolean value
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract char value
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract i8 value
    pub const fn as_byte(&self) -> Option<i8> {
        match self {
            Value::Byte(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract i16 value
    pub const fn as_short(&self) -> Option<i16> {
        match self {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract i32 value
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract i64 value
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract f32 value
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract f64 value
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Extract object handle
    pub const fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // identity semantics for opaque payloads
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(v) => write!(f, "Value::Bool({v})"),
            Value::Char(v) => write!(f, "Value::Char({v:?})"),
            Value::Byte(v) => write!(f, "Value::Byte({v})"),
            Value::Short(v) => write!(f, "Value::Short({v})"),
            Value::Int(v) => write!(f, "Value::Int({v})"),
            Value::Long(v) => write!(f, "Value::Long({v})"),
            Value::Float(v) => write!(f, "Value::Float({v})"),
            Value::Double(v) => write!(f, "Value::Double({v})"),
            Value::Str(v) => write!(f, "Value::Str({v:?})"),
            Value::Object(v) => write!(f, "Value::Object({:p})", Arc::as_ptr(v)),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

macro_rules! value_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

value_from!(bool, Bool);
value_from!(char, Char);
value_from!(i8, Byte);
value_from!(i16, Short);
value_from!(i32, Int);
value_from!(i64, Long);
value_from!(f32, Float);
value_from!(f64, Double);
value_from!(String, Str);
value_from!(ObjectHandle, Object);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => Value::from(inner),
            None => Value::Null,
        }
    }
}

/// Fault raised when a typed field receives a value with the wrong tag.
#[derive(Debug, thiserror::Error)]
#[error("expected {expected}, got {found}")]
pub struct TypeMismatch {
    /// Tag the field requires.
    pub expected: ValueType,
    /// Tag actually supplied.
    pub found: &'static str,
}

impl TypeMismatch {
    fn fault(expected: ValueType, found: &Value) -> AccessorFault {
        Box::new(TypeMismatch {
            expected,
            found: found.type_name(),
        })
    }
}

/// Convert a `Value` back into a typed field.
///
/// The inverse of the `From<T> for Value` impls; a mismatched tag is an
/// accessor fault carrying a [`TypeMismatch`].
pub trait FromValue: Sized {
    /// Extract `Self` from a `Value`.
    fn from_value(value: Value) -> Result<Self, AccessorFault>;
}

macro_rules! from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, AccessorFault> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(TypeMismatch::fault(ValueType::$variant, &other)),
                }
            }
        }
    };
}

from_value!(bool, Bool);
from_value!(char, Char);
from_value!(i8, Byte);
from_value!(i16, Short);
from_value!(i32, Int);
from_value!(i64, Long);
from_value!(f32, Float);
from_value!(f64, Double);
from_value!(String, Str);
from_value!(ObjectHandle, Object);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, AccessorFault> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_tags() {
        assert_eq!(Value::Int(1).value_type(), Some(ValueType::Int));
        assert_eq!(Value::Null.value_type(), None);
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Double(1.0).type_name(), "double");
    }

    #[test]
    fn test_extractors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Char('a').as_char(), Some('a'));
        assert_eq!(Value::Byte(10).as_byte(), Some(10));
        assert_eq!(Value::Short(134).as_short(), Some(134));
        assert_eq!(Value::Int(1234).as_int(), Some(1234));
        assert_eq!(Value::Long(1_298_341_928_234).as_long(), Some(1_298_341_928_234));
        assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::Double(2.5).as_double(), Some(2.5));
        assert_eq!(Value::Str("s".to_string()).as_str(), Some("s"));
        assert_eq!(Value::Int(1).as_long(), None);
    }

    #[test]
    fn test_object_identity_equality() {
        let a = Value::object(42u32);
        let b = a.clone();
        let c = Value::object(42u32);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cross_variant_inequality() {
        assert_ne!(Value::Int(1), Value::Long(1));
        assert_ne!(Value::Null, Value::Int(0));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(5i32)), Value::Int(5));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_from_value_roundtrip() {
        assert_eq!(i32::from_value(Value::Int(7)).unwrap(), 7);
        assert_eq!(String::from_value(Value::from("x")).unwrap(), "x");
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int(3)).unwrap(), Some(3));
    }

    #[test]
    fn test_from_value_mismatch() {
        let fault = i32::from_value(Value::Bool(true)).unwrap_err();
        let mismatch = fault.downcast_ref::<TypeMismatch>().unwrap();
        assert_eq!(mismatch.expected, ValueType::Int);
        assert_eq!(mismatch.found, "bool");
    }

    #[test]
    fn test_is_primitive() {
        assert!(ValueType::Bool.is_primitive());
        assert!(ValueType::Double.is_primitive());
        assert!(!ValueType::Str.is_primitive());
        assert!(!ValueType::Object.is_primitive());
    }
}
