//! Property-backed map adapter
//!
//! [`PropertyMap`] wraps a [`Reflect`] instance and presents its properties
//! as a string-keyed mapping. There is no independent value storage: every
//! read and write goes through the accessor table of the wrapped type.
//!
//! The two name indexes are rebuilt in full on every bind and never updated
//! partially. A synthetic read-only `"class"` entry exposing the wrapped
//! type's name is always present while an instance is bound.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::coerce;
use crate::error::{AccessorFault, AccessorKind, CloneError, InvocationError, MapError};
use crate::reflect::{Accessor, Reflect};
use crate::value::{Value, ValueType};

/// Key of the synthetic read-only entry exposing the wrapped type's name.
pub const CLASS_KEY: &str = "class";

fn read_class(instance: &dyn Reflect) -> Result<Value, AccessorFault> {
    Ok(Value::Str(instance.type_name().to_string()))
}

static CLASS_ACCESSOR: Accessor = Accessor::read_only(CLASS_KEY, ValueType::Str, read_class);

/// Policy governing [`PropertyMap::clear`].
///
/// The default refuses: a fixed-shape property set cannot drop its entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearPolicy {
    /// `clear` always fails with an unsupported-operation error.
    #[default]
    Fail,
    /// `clear` rebinds to a freshly default-constructed instance.
    ResetDefaults,
}

/// Mapping view over the properties of a wrapped instance.
pub struct PropertyMap {
    instance: Option<Box<dyn Reflect>>,
    readers: FxHashMap<&'static str, &'static Accessor>,
    writers: FxHashMap<&'static str, &'static Accessor>,
    key_order: Vec<&'static str>,
    clear_policy: ClearPolicy,
}

impl PropertyMap {
    /// Empty adapter with no wrapped instance and no entries.
    pub fn new() -> Self {
        Self {
            instance: None,
            readers: FxHashMap::default(),
            writers: FxHashMap::default(),
            key_order: Vec::new(),
            clear_policy: ClearPolicy::default(),
        }
    }

    /// Adapter bound to `instance`.
    pub fn wrap<T: Reflect>(instance: T) -> Self {
        let mut map = Self::new();
        map.bind(instance);
        map
    }

    /// Bind to a new instance, rebuilding both indexes in full.
    ///
    /// Nothing is retained from a previously bound instance.
    pub fn bind<T: Reflect>(&mut self, instance: T) {
        self.bind_boxed(Box::new(instance));
    }

    fn bind_boxed(&mut self, instance: Box<dyn Reflect>) {
        self.readers.clear();
        self.writers.clear();
        self.key_order.clear();

        for accessor in instance.accessors() {
            if !accessor.is_readable() {
                continue;
            }
            if self.readers.insert(accessor.name(), accessor).is_none() {
                self.key_order.push(accessor.name());
            }
            // writable entries require both halves of the pair
            if accessor.is_writable() {
                self.writers.insert(accessor.name(), accessor);
            }
        }

        self.readers.insert(CLASS_KEY, &CLASS_ACCESSOR);
        self.key_order.push(CLASS_KEY);
        self.instance = Some(instance);
    }

    /// Drop the wrapped instance; the map becomes empty.
    pub fn unbind(&mut self) {
        self.instance = None;
        self.readers.clear();
        self.writers.clear();
        self.key_order.clear();
    }

    /// The wrapped instance, when one is bound.
    pub fn wrapped(&self) -> Option<&dyn Reflect> {
        self.instance.as_deref()
    }

    /// Mutable access to the wrapped instance.
    pub fn wrapped_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.instance.as_deref_mut()
    }

    /// Type name of the wrapped instance.
    pub fn type_name(&self) -> Option<&'static str> {
        self.instance.as_deref().map(|i| i.type_name())
    }

    /// Current clear policy.
    pub fn clear_policy(&self) -> ClearPolicy {
        self.clear_policy
    }

    /// Replace the clear policy.
    pub fn set_clear_policy(&mut self, policy: ClearPolicy) {
        self.clear_policy = policy;
    }

    /// Number of readable entries, synthetic `"class"` included.
    pub fn len(&self) -> usize {
        self.key_order.len()
    }

    /// True when no instance is bound.
    pub fn is_empty(&self) -> bool {
        self.key_order.is_empty()
    }

    /// True when `key` names a readable entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.readers.contains_key(key)
    }

    /// Keys of all readable entries, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.key_order.iter().copied()
    }

    /// Declared type of a readable entry.
    pub fn value_type_of(&self, key: &str) -> Option<ValueType> {
        self.readers.get(key).map(|a| a.value_type())
    }

    /// Reader-side descriptor for a key, for diagnostics and tests.
    pub fn read_accessor(&self, key: &str) -> Option<&'static Accessor> {
        self.readers.get(key).copied()
    }

    /// Writer-side descriptor for a key, for diagnostics and tests.
    pub fn write_accessor(&self, key: &str) -> Option<&'static Accessor> {
        self.writers.get(key).copied()
    }

    /// Read a property value.
    ///
    /// An unknown key (or unbound map) is `Ok(None)`, never an error. A
    /// faulting reader surfaces as [`MapError::Retrieval`] with the original
    /// fault on the cause chain.
    pub fn get(&self, key: &str) -> Result<Option<Value>, MapError> {
        let Some(instance) = self.instance.as_deref() else {
            return Ok(None);
        };
        let Some(read) = self.readers.get(key).and_then(|a| a.reader()) else {
            return Ok(None);
        };
        match read(instance) {
            Ok(value) => Ok(Some(value)),
            Err(fault) => Err(MapError::Retrieval {
                key: key.to_string(),
                source: InvocationError::Faulted {
                    property: key.to_string(),
                    kind: AccessorKind::Reader,
                    source: fault,
                },
            }),
        }
    }

    /// Write a property value, returning the previous value.
    ///
    /// Fails with [`MapError::UnsupportedKey`] when the key is absent or
    /// read-only. The value is coerced to the writer's declared type first;
    /// coercion failures and writer faults are both
    /// [`MapError::InvalidArgument`] with the cause chain intact. The
    /// previous value is read before writing; a faulting reader degrades to
    /// `None` rather than blocking the write.
    pub fn put(&mut self, key: &str, value: Value) -> Result<Option<Value>, MapError> {
        let Some(accessor) = self.writers.get(key).copied() else {
            return Err(MapError::UnsupportedKey {
                key: key.to_string(),
            });
        };
        let Some(write) = accessor.writer() else {
            return Err(MapError::UnsupportedKey {
                key: key.to_string(),
            });
        };

        let previous = self.read_quiet(key);

        let coerced =
            coerce::coerce(value, accessor.value_type()).map_err(|err| MapError::InvalidArgument {
                key: key.to_string(),
                source: InvocationError::Coercion {
                    property: key.to_string(),
                    source: err,
                },
            })?;

        let Some(instance) = self.instance.as_deref_mut() else {
            return Err(MapError::UnsupportedKey {
                key: key.to_string(),
            });
        };
        write(instance, coerced).map_err(|fault| MapError::InvalidArgument {
            key: key.to_string(),
            source: InvocationError::Faulted {
                property: key.to_string(),
                kind: AccessorKind::Writer,
                source: fault,
            },
        })?;
        Ok(previous)
    }

    /// Previous-value read for `put`: faults degrade to the absent sentinel.
    fn read_quiet(&self, key: &str) -> Option<Value> {
        let instance = self.instance.as_deref()?;
        let read = self.readers.get(key)?.reader()?;
        read(instance).ok()
    }

    /// Copy every entry of `source` that is writable on this map.
    ///
    /// Keys present only on `source` are skipped silently; this merges the
    /// mutable subset of two differently-shaped property sets. Read faults
    /// on `source` propagate.
    pub fn put_all_writeable(&mut self, source: &PropertyMap) -> Result<(), MapError> {
        let keys: Vec<&'static str> = source
            .keys()
            .filter(|key| self.writers.contains_key(*key))
            .collect();
        for key in keys {
            if let Some(value) = source.get(key)? {
                self.put(key, value)?;
            }
        }
        Ok(())
    }

    /// Materialize all values from the current instance.
    ///
    /// Not a snapshot: every call re-invokes the readers, so mutations made
    /// after a previous materialization are reflected.
    pub fn values(&self) -> Result<Vec<Value>, MapError> {
        let mut out = Vec::with_capacity(self.key_order.len());
        for key in &self.key_order {
            if let Some(value) = self.get(key)? {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// Materialize all entries as `(key, value)` pairs.
    pub fn entries(&self) -> Result<Vec<(&'static str, Value)>, MapError> {
        let mut out = Vec::with_capacity(self.key_order.len());
        for key in self.key_order.iter().copied() {
            if let Some(value) = self.get(key)? {
                out.push((key, value));
            }
        }
        Ok(out)
    }

    /// True when any readable entry currently equals `value`.
    pub fn contains_value(&self, value: &Value) -> Result<bool, MapError> {
        Ok(self.values()?.iter().any(|v| v == value))
    }

    /// Key removal is a structural mutation and always fails.
    pub fn remove(&mut self, _key: &str) -> Result<Option<Value>, MapError> {
        Err(MapError::Unsupported {
            operation: "remove",
            source: None,
        })
    }

    /// Clear the map according to the configured [`ClearPolicy`].
    ///
    /// Under `Fail` this always reports an unsupported operation. Under
    /// `ResetDefaults` the map rebinds to a freshly default-constructed
    /// instance; a type without an accessible default constructor fails
    /// with the construction error attached. Clearing an unbound map is a
    /// no-op.
    pub fn clear(&mut self) -> Result<(), MapError> {
        match self.clear_policy {
            ClearPolicy::Fail => Err(MapError::Unsupported {
                operation: "clear",
                source: None,
            }),
            ClearPolicy::ResetDefaults => {
                let Some(instance) = self.instance.as_deref() else {
                    return Ok(());
                };
                let fresh = instance
                    .default_instance()
                    .map_err(|err| MapError::Unsupported {
                        operation: "clear",
                        source: Some(err),
                    })?;
                self.bind_boxed(fresh);
                Ok(())
            }
        }
    }

    /// Duplicate the map onto a fresh instance of the wrapped type.
    ///
    /// Default-constructs a new instance, then copies every writable
    /// property's current value. The clone's instance is independent of the
    /// original's. Fails with [`MapError::CloneNotSupported`] when the type
    /// cannot be reconstructed or a property copy faults; the cause chain
    /// retains the original fault.
    pub fn try_clone(&self) -> Result<Self, MapError> {
        let Some(instance) = self.instance.as_deref() else {
            let mut clone = Self::new();
            clone.clear_policy = self.clear_policy;
            return Ok(clone);
        };

        let fresh = instance
            .default_instance()
            .map_err(|err| MapError::CloneNotSupported {
                source: CloneError::Construct(err),
            })?;
        let mut clone = Self::new();
        clone.clear_policy = self.clear_policy;
        clone.bind_boxed(fresh);

        let writable: Vec<&'static str> = self
            .key_order
            .iter()
            .copied()
            .filter(|key| self.writers.contains_key(*key))
            .collect();
        for key in writable {
            let value = self.get(key).map_err(|err| match err {
                MapError::Retrieval { key, source } => MapError::CloneNotSupported {
                    source: CloneError::Copy { key, source },
                },
                other => other,
            })?;
            let Some(value) = value else { continue };
            // same declared type on both sides, no coercion needed
            let Some(write) = clone.writers.get(key).and_then(|a| a.writer()) else {
                continue;
            };
            let Some(target) = clone.instance.as_deref_mut() else {
                continue;
            };
            write(target, value).map_err(|fault| MapError::CloneNotSupported {
                source: CloneError::Copy {
                    key: key.to_string(),
                    source: InvocationError::Faulted {
                        property: key.to_string(),
                        kind: AccessorKind::Writer,
                        source: fault,
                    },
                },
            })?;
        }
        Ok(clone)
    }
}

impl Default for PropertyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMap")
            .field("type", &self.type_name())
            .field("keys", &self.key_order)
            .field("clear_policy", &self.clear_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property;
    use once_cell::sync::Lazy;
    use std::any::Any;

    #[derive(Default)]
    struct Point {
        x: f64,
        y: f64,
        label: String,
    }

    static POINT_ACCESSORS: Lazy<Vec<Accessor>> = Lazy::new(|| {
        vec![
            property!(Point, "x", Double, x),
            property!(Point, "y", Double, y),
            property!(Point, "label", Str, label),
        ]
    });

    impl Reflect for Point {
        fn type_name(&self) -> &'static str {
            "Point"
        }

        fn accessors(&self) -> &'static [Accessor] {
            &POINT_ACCESSORS
        }

        fn default_instance(&self) -> Result<Box<dyn Reflect>, crate::error::ConstructError> {
            Ok(Box::new(Point::default()))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn sample_map() -> PropertyMap {
        PropertyMap::wrap(Point {
            x: 1.5,
            y: -2.0,
            label: "origin-ish".to_string(),
        })
    }

    #[test]
    fn test_empty_map() {
        let map = PropertyMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert!(!map.contains_key(CLASS_KEY));
        assert_eq!(map.get("x").unwrap(), None);
        assert!(map.wrapped().is_none());
    }

    #[test]
    fn test_bind_builds_indexes() {
        let map = sample_map();
        assert_eq!(map.len(), 4);
        assert!(map.contains_key("x"));
        assert!(map.contains_key("label"));
        assert!(map.contains_key(CLASS_KEY));
        assert_eq!(map.type_name(), Some("Point"));
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec!["x", "y", "label", CLASS_KEY]
        );
    }

    #[test]
    fn test_synthetic_class_entry() {
        let mut map = sample_map();
        assert_eq!(map.get(CLASS_KEY).unwrap(), Some(Value::from("Point")));
        assert_eq!(map.value_type_of(CLASS_KEY), Some(ValueType::Str));
        let err = map.put(CLASS_KEY, Value::from("Nope")).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedKey { key } if key == CLASS_KEY));
    }

    #[test]
    fn test_get_and_put_roundtrip() {
        let mut map = sample_map();
        assert_eq!(map.get("x").unwrap(), Some(Value::Double(1.5)));
        let previous = map.put("x", Value::Double(10.0)).unwrap();
        assert_eq!(previous, Some(Value::Double(1.5)));
        assert_eq!(map.get("x").unwrap(), Some(Value::Double(10.0)));
    }

    #[test]
    fn test_put_coerces_text() {
        let mut map = sample_map();
        map.put("y", Value::from("4.25")).unwrap();
        assert_eq!(map.get("y").unwrap(), Some(Value::Double(4.25)));
    }

    #[test]
    fn test_put_unknown_key() {
        let mut map = sample_map();
        let err = map.put("z", Value::Double(0.0)).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedKey { key } if key == "z"));
    }

    #[test]
    fn test_rebind_replaces_indexes() {
        let mut map = sample_map();
        map.put("x", Value::Double(3.0)).unwrap();
        map.bind(Point::default());
        assert_eq!(map.get("x").unwrap(), Some(Value::Double(0.0)));
        map.unbind();
        assert!(map.is_empty());
        assert_eq!(map.get("x").unwrap(), None);
    }

    #[test]
    fn test_values_reflect_mutation() {
        let mut map = sample_map();
        let before = map.values().unwrap();
        map.put("x", Value::Double(99.0)).unwrap();
        let after = map.values().unwrap();
        assert_ne!(before, after);
        assert!(after.contains(&Value::Double(99.0)));
    }

    #[test]
    fn test_entries_and_contains_value() {
        let map = sample_map();
        let entries = map.entries().unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.contains(&("x", Value::Double(1.5))));
        assert!(map.contains_value(&Value::Double(-2.0)).unwrap());
        assert!(!map.contains_value(&Value::Double(123.0)).unwrap());
    }

    #[test]
    fn test_remove_is_unsupported() {
        let mut map = sample_map();
        let err = map.remove("x").unwrap_err();
        assert!(matches!(
            err,
            MapError::Unsupported {
                operation: "remove",
                ..
            }
        ));
        assert!(map.contains_key("x"));
    }

    #[test]
    fn test_clear_fails_by_default() {
        let mut map = sample_map();
        assert_eq!(map.clear_policy(), ClearPolicy::Fail);
        let err = map.clear().unwrap_err();
        assert!(matches!(
            err,
            MapError::Unsupported {
                operation: "clear",
                source: None,
            }
        ));
        // nothing was touched
        assert_eq!(map.get("x").unwrap(), Some(Value::Double(1.5)));
    }

    #[test]
    fn test_clear_reset_defaults() {
        let mut map = sample_map();
        map.set_clear_policy(ClearPolicy::ResetDefaults);
        map.clear().unwrap();
        assert_eq!(map.get("x").unwrap(), Some(Value::Double(0.0)));
        assert_eq!(map.get("label").unwrap(), Some(Value::from("")));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_clear_unbound_is_noop() {
        let mut map = PropertyMap::new();
        map.set_clear_policy(ClearPolicy::ResetDefaults);
        map.clear().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_try_clone_copies_and_detaches() {
        let map = sample_map();
        let mut clone = map.try_clone().unwrap();
        assert_eq!(
            clone.keys().collect::<Vec<_>>(),
            map.keys().collect::<Vec<_>>()
        );
        assert_eq!(clone.get("x").unwrap(), Some(Value::Double(1.5)));

        clone.put("x", Value::Double(-1.0)).unwrap();
        assert_eq!(clone.get("x").unwrap(), Some(Value::Double(-1.0)));
        assert_eq!(map.get("x").unwrap(), Some(Value::Double(1.5)));
    }

    #[test]
    fn test_try_clone_unbound() {
        let map = PropertyMap::new();
        let clone = map.try_clone().unwrap();
        assert!(clone.is_empty());
    }

    #[test]
    fn test_debug_output() {
        let map = sample_map();
        let text = format!("{map:?}");
        assert!(text.contains("Point"));
        assert!(text.contains("class"));
    }
}
