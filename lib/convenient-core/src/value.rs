//! Dynamic values passed through method chains.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

/// An opaque shared handle to a host object (for example a class instance).
///
/// Two objects are equal when they point to the same allocation.
#[derive(Clone)]
pub struct Object(Arc<dyn Any + Send + Sync>);

impl Object {
    /// Wrap a host value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if the wrapped value has type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:p})", Arc::as_ptr(&self.0))
    }
}

/// A dynamic value: JSON data or a host object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain data.
    Data(Json),
    /// A host object.
    Object(Object),
}

impl Value {
    /// The `null` value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Data(Json::Null)
    }

    /// Wrap any JSON-convertible data.
    pub fn data(value: impl Into<Json>) -> Self {
        Self::Data(value.into())
    }

    /// Wrap a host object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Object::new(value))
    }

    /// Returns `true` if this is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Data(Json::Null))
    }

    /// Returns the JSON data, if this is data.
    #[must_use]
    pub const fn as_data(&self) -> Option<&Json> {
        match self {
            Self::Data(data) => Some(data),
            Self::Object(_) => None,
        }
    }

    /// Returns the host object, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            Self::Data(_) => None,
        }
    }

    /// Returns the boolean, if this is a JSON boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(Json::as_bool)
    }

    /// Returns the integer, if this is a JSON integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(Json::as_i64)
    }

    /// Returns the string, if this is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(Json::as_str)
    }

    /// Borrow the wrapped host object if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(Object::downcast_ref)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => write!(f, "{data}"),
            Self::Object(object) => write!(f, "{object:?}"),
        }
    }
}

impl From<Json> for Value {
    fn from(value: Json) -> Self {
        Self::Data(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

macro_rules! impl_from_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Data(Json::from(value))
                }
            }
        )*
    };
}

impl_from_data!(bool, i32, i64, u32, u64, f64, String, &str);

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::null()
    }
}
