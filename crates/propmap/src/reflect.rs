//! Static property introspection
//!
//! The statically-typed replacement for runtime accessor lookup: each
//! wrapped type publishes a fixed table of [`Accessor`] entries, built once
//! per type and consulted on every map operation. Introspect once, invoke
//! many times.
//!
//! Accessor bodies receive the wrapped instance as `&dyn Reflect` and
//! recover the concrete type through [`receiver`] / [`receiver_mut`]. The
//! [`property!`](crate::property) macro expands the common field-backed case
//! to one table entry.
//!
//! # Example
//!
//! ```ignore
//! use once_cell::sync::Lazy;
//! use propmap::{property, Accessor, Reflect, ValueType};
//!
//! struct Point { x: f64, y: f64 }
//!
//! static POINT_ACCESSORS: Lazy<Vec<Accessor>> = Lazy::new(|| {
//!     vec![
//!         property!(Point, "x", Double, x),
//!         property!(Point, "y", Double, y),
//!     ]
//! });
//!
//! impl Reflect for Point {
//!     fn type_name(&self) -> &'static str { "Point" }
//!     fn accessors(&self) -> &'static [Accessor] { &POINT_ACCESSORS }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//! ```

use std::any::Any;

use crate::error::{AccessorFault, ConstructError};
use crate::value::{Value, ValueType};

/// Zero-argument reader bound to a property name.
pub type ReadFn = fn(&dyn Reflect) -> Result<Value, AccessorFault>;

/// Single-argument mutator bound to a property name.
pub type WriteFn = fn(&mut dyn Reflect, Value) -> Result<(), AccessorFault>;

/// Descriptor for one named property of a wrapped type.
///
/// A property is writable only when it carries both a reader and a writer;
/// a reader-only entry is present in the map but rejects writes.
#[derive(Debug, Clone, Copy)]
pub struct Accessor {
    name: &'static str,
    value_type: ValueType,
    read: Option<ReadFn>,
    write: Option<WriteFn>,
}

impl Accessor {
    /// Descriptor with both a reader and a writer.
    pub const fn read_write(
        name: &'static str,
        value_type: ValueType,
        read: ReadFn,
        write: WriteFn,
    ) -> Self {
        Self {
            name,
            value_type,
            read: Some(read),
            write: Some(write),
        }
    }

    /// Descriptor with a reader only; the property rejects writes.
    pub const fn read_only(name: &'static str, value_type: ValueType, read: ReadFn) -> Self {
        Self {
            name,
            value_type,
            read: Some(read),
            write: None,
        }
    }

    /// Property name, used as the map key.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the property value.
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// True when the property can be read.
    pub const fn is_readable(&self) -> bool {
        self.read.is_some()
    }

    /// True when the property can be written.
    pub const fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// The reader, when one exists.
    pub const fn reader(&self) -> Option<ReadFn> {
        self.read
    }

    /// The writer, when one exists.
    pub const fn writer(&self) -> Option<WriteFn> {
        self.write
    }
}

/// A type whose properties can be exposed through a `PropertyMap`.
pub trait Reflect: Any {
    /// Runtime type name, surfaced through the synthetic `"class"` entry.
    fn type_name(&self) -> &'static str;

    /// The fixed accessor table for this type.
    fn accessors(&self) -> &'static [Accessor];

    /// Construct a fresh default instance of this type.
    ///
    /// Powers `try_clone` and the reset-on-clear policy. The default
    /// refuses, which makes the wrapped type non-cloneable.
    fn default_instance(&self) -> Result<Box<dyn Reflect>, ConstructError> {
        Err(ConstructError {
            type_name: self.type_name(),
        })
    }

    /// Upcast for receiver downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for receiver downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Receiver downcast failure inside an accessor body.
#[derive(Debug, thiserror::Error)]
#[error("accessor expected receiver `{expected}`, got `{found}`")]
pub struct ReceiverError {
    /// Concrete type the accessor was declared for.
    pub expected: &'static str,
    /// Type name of the instance actually supplied.
    pub found: &'static str,
}

/// Downcast the receiver for a typed accessor body.
pub fn receiver<T: Reflect>(instance: &dyn Reflect) -> Result<&T, AccessorFault> {
    let found = instance.type_name();
    instance.as_any().downcast_ref::<T>().ok_or_else(|| {
        Box::new(ReceiverError {
            expected: std::any::type_name::<T>(),
            found,
        }) as AccessorFault
    })
}

/// Mutable variant of [`receiver`].
pub fn receiver_mut<T: Reflect>(instance: &mut dyn Reflect) -> Result<&mut T, AccessorFault> {
    let found = instance.type_name();
    instance.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
        Box::new(ReceiverError {
            expected: std::any::type_name::<T>(),
            found,
        }) as AccessorFault
    })
}

/// Declare a field-backed read/write accessor for a [`Reflect`] type.
///
/// `property!(Owner, "name", Int, field)` expands to an [`Accessor`] whose
/// reader clones the field into a `Value` and whose writer converts the
/// incoming `Value` back through `FromValue`.
#[macro_export]
macro_rules! property {
    ($owner:ty, $name:literal, $value_type:ident, $field:ident) => {
        $crate::Accessor::read_write(
            $name,
            $crate::ValueType::$value_type,
            |instance| {
                let recv = $crate::reflect::receiver::<$owner>(instance)?;
                Ok($crate::Value::from(recv.$field.clone()))
            },
            |instance, value| {
                let recv = $crate::reflect::receiver_mut::<$owner>(instance)?;
                recv.$field = $crate::FromValue::from_value(value)?;
                Ok(())
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    #[derive(Debug, Default)]
    struct Point {
        x: f64,
        y: f64,
    }

    static POINT_ACCESSORS: Lazy<Vec<Accessor>> = Lazy::new(|| {
        vec![
            property!(Point, "x", Double, x),
            property!(Point, "y", Double, y),
        ]
    });

    impl Reflect for Point {
        fn type_name(&self) -> &'static str {
            "Point"
        }

        fn accessors(&self) -> &'static [Accessor] {
            &POINT_ACCESSORS
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Other;

    impl Reflect for Other {
        fn type_name(&self) -> &'static str {
            "Other"
        }

        fn accessors(&self) -> &'static [Accessor] {
            &[]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_property_macro_roundtrip() {
        let mut point = Point { x: 1.0, y: 2.0 };
        let table = point.accessors();
        assert_eq!(table.len(), 2);

        let x = &table[0];
        assert_eq!(x.name(), "x");
        assert_eq!(x.value_type(), ValueType::Double);
        assert!(x.is_readable());
        assert!(x.is_writable());

        let read = x.reader().unwrap();
        assert_eq!(read(&point).unwrap(), Value::Double(1.0));

        let write = x.writer().unwrap();
        write(&mut point, Value::Double(9.5)).unwrap();
        assert_eq!(point.x, 9.5);
    }

    #[test]
    fn test_read_only_accessor() {
        let acc = Accessor::read_only("x", ValueType::Double, |_| Ok(Value::Double(0.0)));
        assert!(acc.is_readable());
        assert!(!acc.is_writable());
        assert!(acc.writer().is_none());
    }

    #[test]
    fn test_receiver_mismatch_is_a_fault() {
        let other = Other;
        let fault = receiver::<Point>(&other).unwrap_err();
        let err = fault.downcast_ref::<ReceiverError>().unwrap();
        assert_eq!(err.found, "Other");
    }

    #[test]
    fn test_default_instance_refuses_by_default() {
        let point = Point::default();
        let err = point.default_instance().err().unwrap();
        assert_eq!(err.type_name, "Point");
    }

    #[test]
    fn test_writer_rejects_wrong_tag() {
        let mut point = Point::default();
        let write = point.accessors()[0].writer().unwrap();
        let fault = write(&mut point, Value::Bool(true)).unwrap_err();
        assert!(fault
            .downcast_ref::<crate::value::TypeMismatch>()
            .is_some());
    }
}
