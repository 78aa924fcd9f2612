//! Encoding traits implemented by generated types.
//!
//! Encoding only goes one way. There is no decode counterpart, and
//! generated types never derive `Deserialize`.

use crate::{JsonObject, JsonValue};

/// A value that encodes to JSON.
pub trait Encode {
    /// Encode this value.
    fn encode(&self) -> JsonValue;
}

/// A value that encodes to a JSON object.
///
/// Records and discriminated variants implement this; their keys come out
/// in schema declaration order.
pub trait EncodeObject {
    /// Encode this value as an object.
    fn encode_object(&self) -> JsonObject;
}

impl Encode for bool {
    fn encode(&self) -> JsonValue {
        JsonValue::Bool(*self)
    }
}

impl Encode for i64 {
    fn encode(&self) -> JsonValue {
        JsonValue::from(*self)
    }
}

/// Non-finite numbers have no JSON form and encode as `null`.
impl Encode for f64 {
    fn encode(&self) -> JsonValue {
        JsonValue::from(*self)
    }
}

impl Encode for String {
    fn encode(&self) -> JsonValue {
        JsonValue::String(self.clone())
    }
}

impl Encode for str {
    fn encode(&self) -> JsonValue {
        JsonValue::String(self.to_string())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> JsonValue {
        (**self).encode()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self) -> JsonValue {
        (**self).encode()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> JsonValue {
        JsonValue::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self) -> JsonValue {
        JsonValue::Array(self.iter().map(Encode::encode).collect())
    }
}

impl Encode for JsonValue {
    fn encode(&self) -> JsonValue {
        self.clone()
    }
}

impl Encode for JsonObject {
    fn encode(&self) -> JsonValue {
        JsonValue::Object(self.clone())
    }
}

impl EncodeObject for JsonObject {
    fn encode_object(&self) -> JsonObject {
        self.clone()
    }
}

impl<T: EncodeObject + ?Sized> EncodeObject for &T {
    fn encode_object(&self) -> JsonObject {
        (**self).encode_object()
    }
}
