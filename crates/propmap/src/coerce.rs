//! Best-effort value coercion for property writes
//!
//! A writer declares the exact type it expects; when a supplied value's tag
//! differs, the map converts it here before invoking the writer. Textual
//! conversion is table-driven: each primitive type has one transformer,
//! registered once in a static table.
//!
//! Reference targets (`Str`, `Object`) have no transformer; values headed
//! for them pass through unchanged and the writer decides whether the tag
//! is acceptable. The one exception is a char headed for a `Str` target,
//! which widens to its one-character string.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::error::CoercionError;
use crate::value::{Value, ValueType};

/// Pure textual conversion into one primitive type.
pub type Transformer = fn(&str) -> Result<Value, CoercionError>;

static TRANSFORMERS: Lazy<FxHashMap<ValueType, Transformer>> = Lazy::new(|| {
    let mut table: FxHashMap<ValueType, Transformer> = FxHashMap::default();
    table.insert(ValueType::Bool, parse_bool);
    table.insert(ValueType::Char, parse_char);
    table.insert(ValueType::Byte, parse_byte);
    table.insert(ValueType::Short, parse_short);
    table.insert(ValueType::Int, parse_int);
    table.insert(ValueType::Long, parse_long);
    table.insert(ValueType::Float, parse_float);
    table.insert(ValueType::Double, parse_double);
    table
});

/// Look up the textual transformer for a target type.
///
/// Only the eight primitive types have one; `None` for `Str` and `Object`.
pub fn type_transformer(target: ValueType) -> Option<Transformer> {
    TRANSFORMERS.get(&target).copied()
}

/// Convert `value` to the writer's declared type, best effort.
///
/// - Reference targets take any value unchanged (the writer decides),
///   except that a char widens to a string for a `Str` target.
/// - Null passes through untouched; null-acceptance is the writer's concern.
/// - A matching tag is identity.
/// - Numeric tags convert between each other.
/// - String and char sources go through the target's textual transformer.
pub fn coerce(value: Value, target: ValueType) -> Result<Value, CoercionError> {
    if let (Value::Char(c), ValueType::Str) = (&value, target) {
        return Ok(Value::Str(c.to_string()));
    }
    if !target.is_primitive() {
        return Ok(value);
    }
    match value.value_type() {
        None => Ok(value),
        Some(tag) if tag == target => Ok(value),
        Some(_) => convert(value, target),
    }
}

fn convert(value: Value, target: ValueType) -> Result<Value, CoercionError> {
    if let Some(converted) = numeric_cast(&value, target) {
        return Ok(converted);
    }
    if let Some(transform) = type_transformer(target) {
        match &value {
            Value::Str(text) => return transform(text),
            Value::Char(c) => return transform(&c.to_string()),
            _ => {}
        }
    }
    Err(CoercionError::new(value.type_name(), target))
}

/// Cast between numeric tags, integral carrier when both sides are integral.
fn numeric_cast(value: &Value, target: ValueType) -> Option<Value> {
    if !target.is_numeric() {
        return None;
    }
    let (int, float) = match *value {
        Value::Byte(v) => (Some(v as i64), v as f64),
        Value::Short(v) => (Some(v as i64), v as f64),
        Value::Int(v) => (Some(v as i64), v as f64),
        Value::Long(v) => (Some(v), v as f64),
        Value::Float(v) => (None, v as f64),
        Value::Double(v) => (None, v),
        _ => return None,
    };
    let wide = int.unwrap_or(float as i64);
    Some(match target {
        ValueType::Byte => Value::Byte(wide as i8),
        ValueType::Short => Value::Short(wide as i16),
        ValueType::Int => Value::Int(wide as i32),
        ValueType::Long => Value::Long(wide),
        ValueType::Float => Value::Float(float as f32),
        ValueType::Double => Value::Double(float),
        _ => return None,
    })
}

fn parse_bool(text: &str) -> Result<Value, CoercionError> {
    text.parse::<bool>()
        .map(Value::Bool)
        .map_err(|err| CoercionError::with_source("string", ValueType::Bool, err))
}

fn parse_char(text: &str) -> Result<Value, CoercionError> {
    text.chars()
        .next()
        .map(Value::Char)
        .ok_or_else(|| CoercionError::new("string", ValueType::Char))
}

macro_rules! numeric_transformer {
    ($name:ident, $ty:ty, $variant:ident) => {
        fn $name(text: &str) -> Result<Value, CoercionError> {
            text.trim()
                .parse::<$ty>()
                .map(Value::$variant)
                .map_err(|err| CoercionError::with_source("string", ValueType::$variant, err))
        }
    };
}

numeric_transformer!(parse_byte, i8, Byte);
numeric_transformer!(parse_short, i16, Short);
numeric_transformer!(parse_int, i32, Int);
numeric_transformer!(parse_long, i64, Long);
numeric_transformer!(parse_float, f32, Float);
numeric_transformer!(parse_double, f64, Double);
