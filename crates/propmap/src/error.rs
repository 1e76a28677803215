//! Error taxonomy for property map operations
//!
//! Every failure keeps its originating fault reachable through
//! `std::error::Error::source()`. Diagnosing which accessor failed, and why,
//! is the primary operational need, so causes are never discarded.

use std::fmt;

use crate::value::ValueType;

/// Fault raised by an accessor body, or by a conversion on its behalf.
pub type AccessorFault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which half of an accessor pair was being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// Zero-argument reader
    Reader,
    /// Single-argument writer
    Writer,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessorKind::Reader => "reader",
            AccessorKind::Writer => "writer",
        })
    }
}

/// A value could not be converted to a writer's declared type.
#[derive(Debug, thiserror::Error)]
#[error("cannot coerce {found} into {target}")]
pub struct CoercionError {
    /// Tag name of the rejected value.
    pub found: &'static str,
    /// Type the writer expects.
    pub target: ValueType,
    /// Underlying parse error for textual conversions, when one exists.
    #[source]
    pub source: Option<AccessorFault>,
}

impl CoercionError {
    /// Coercion rejected outright, with no underlying fault.
    pub fn new(found: &'static str, target: ValueType) -> Self {
        Self {
            found,
            target,
            source: None,
        }
    }

    /// Coercion failed in an underlying conversion.
    pub fn with_source(
        found: &'static str,
        target: ValueType,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            found,
            target,
            source: Some(Box::new(source)),
        }
    }
}

/// Wrapper recorded when invoking a property accessor fails.
///
/// This is the middle link of the cause chain: a `MapError` wraps an
/// `InvocationError`, which wraps whatever fault the accessor itself raised.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The accessor body itself raised a fault.
    #[error("{kind} for property `{property}` raised a fault")]
    Faulted {
        /// Property whose accessor was invoked.
        property: String,
        /// Reader or writer.
        kind: AccessorKind,
        /// The fault the accessor body raised.
        #[source]
        source: AccessorFault,
    },
    /// The supplied value could not be converted to the writer's type.
    #[error("value for property `{property}` could not be coerced")]
    Coercion {
        /// Property whose writer rejected the value.
        property: String,
        /// The failed conversion.
        #[source]
        source: CoercionError,
    },
}

/// The wrapped type has no accessible default constructor.
///
/// Raised by `Reflect::default_instance` when a type does not opt in to
/// reconstruction; surfaces as the cause of clone and reset failures.
#[derive(Debug, thiserror::Error)]
#[error("type `{type_name}` has no accessible default constructor")]
pub struct ConstructError {
    /// Runtime type that refused construction.
    pub type_name: &'static str,
}

/// Why a property map could not be duplicated.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// A fresh instance of the wrapped type could not be allocated.
    #[error("wrapped instance cannot be reconstructed")]
    Construct(#[from] ConstructError),
    /// Copying one writable property onto the fresh instance failed.
    #[error("copying property `{key}` failed")]
    Copy {
        /// Property being copied when the fault occurred.
        key: String,
        /// The failed invocation, original fault attached.
        #[source]
        source: InvocationError,
    },
}

/// Errors reported by `PropertyMap` operations.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Write to a key with no writable property behind it.
    #[error("no writable property `{key}`")]
    UnsupportedKey {
        /// The rejected key.
        key: String,
    },
    /// A value was rejected while writing a property.
    #[error("invalid value for property `{key}`")]
    InvalidArgument {
        /// Property being written.
        key: String,
        /// The failed invocation or coercion.
        #[source]
        source: InvocationError,
    },
    /// A reader failed while materializing a value.
    #[error("failed to read property `{key}`")]
    Retrieval {
        /// Property being read.
        key: String,
        /// The failed invocation.
        #[source]
        source: InvocationError,
    },
    /// Structural mutation that a fixed-shape property set cannot support.
    #[error("`{operation}` is not supported by this property map")]
    Unsupported {
        /// Name of the refused operation.
        operation: &'static str,
        /// Construction failure behind a refused reset, when one exists.
        #[source]
        source: Option<ConstructError>,
    },
    /// The map could not be duplicated.
    #[error("property map cannot be cloned")]
    CloneNotSupported {
        /// What went wrong during duplication.
        #[source]
        source: CloneError,
    },
}
