//! propmap - expose an object's typed properties as a string-keyed map
//!
//! A [`PropertyMap`] wraps any type implementing [`Reflect`] and presents
//! its properties as mapping entries: `get`/`put` by name, key and value
//! views, bulk merge of the writable subset, and duplication onto a fresh
//! instance. There is no independent storage; every operation invokes the
//! accessors of the wrapped instance.
//!
//! Property discovery is static: each type publishes a fixed accessor table
//! once, and the map indexes it at bind time. Writes coerce the supplied
//! value to the writer's declared type best-effort (numeric casts, textual
//! parsing for the primitive types). A synthetic read-only `"class"` entry
//! always exposes the wrapped type's name.
//!
//! # Example
//!
//! ```ignore
//! use once_cell::sync::Lazy;
//! use propmap::{property, Accessor, PropertyMap, Reflect, Value, ValueType};
//!
//! #[derive(Default)]
//! struct Sensor {
//!     id: i32,
//!     reading: f64,
//! }
//!
//! static SENSOR_ACCESSORS: Lazy<Vec<Accessor>> = Lazy::new(|| {
//!     vec![
//!         property!(Sensor, "id", Int, id),
//!         property!(Sensor, "reading", Double, reading),
//!     ]
//! });
//!
//! impl Reflect for Sensor {
//!     fn type_name(&self) -> &'static str { "Sensor" }
//!     fn accessors(&self) -> &'static [Accessor] { &SENSOR_ACCESSORS }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//!
//! let mut map = PropertyMap::wrap(Sensor::default());
//! map.put("id", Value::Int(7))?;
//! map.put("reading", Value::from("21.5"))?; // coerced to f64
//! assert_eq!(map.get("id")?, Some(Value::Int(7)));
//! assert_eq!(map.get("class")?, Some(Value::from("Sensor")));
//! ```

#![warn(missing_docs)]

pub mod coerce;
pub mod error;
pub mod map;
pub mod reflect;
pub mod value;

pub use coerce::{type_transformer, Transformer};
pub use error::{
    AccessorFault, AccessorKind, CloneError, CoercionError, ConstructError, InvocationError,
    MapError,
};
pub use map::{ClearPolicy, PropertyMap, CLASS_KEY};
pub use reflect::{receiver, receiver_mut, Accessor, ReadFn, ReceiverError, Reflect, WriteFn};
pub use value::{FromValue, ObjectHandle, TypeMismatch, Value, ValueType};
