//! Type-erased member access used by the codec.
//!
//! A schema holds its members as `Box<dyn MemberAccess<S>>`, so one settings
//! type can mix members of any value type. Every mutation reports whether the
//! value actually changed; equal values are never written.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::codec;
use crate::error::{ConverterError, Result, SettingsError};
use crate::inventory::{Schema, Settings};
use crate::member::{Converter, Field};

pub(crate) trait MemberAccess<S>: Send + Sync {
    /// Encode the member's current value. `member` is the serialized name used in errors.
    fn encode(&self, member: &str, settings: &S) -> Result<Value>;

    /// Decode `value` and apply it.
    ///
    /// A section can fail after some of its fields are already applied, so the
    /// outcome carries both the error and whether anything changed.
    fn decode_into(&self, member: &str, settings: &mut S, value: &Value) -> Decoded;

    /// Copy the member's value from `source`. Returns whether the member changed.
    fn assign_from(&self, target: &mut S, source: &S) -> bool;

    /// Compare the member's value in two instances.
    fn value_eq(&self, a: &S, b: &S) -> bool;
}

/// Outcome of applying one document field to a member.
#[must_use]
pub(crate) struct Decoded {
    /// The member's value differs from before, whether or not decoding finished.
    pub(crate) changed: bool,
    pub(crate) result: Result<()>,
}

impl Decoded {
    fn applied(changed: bool) -> Self {
        Self {
            changed,
            result: Ok(()),
        }
    }

    fn failed(error: SettingsError) -> Self {
        Self {
            changed: false,
            result: Err(error),
        }
    }
}

const NO_CONVERTER: &str = "member has no converter";

/// How a plain value member is encoded.
pub(crate) enum ValueCodec<T> {
    Serde {
        encode: fn(&T) -> std::result::Result<Value, ConverterError>,
        decode: fn(&Value) -> std::result::Result<T, ConverterError>,
    },
    Custom(Arc<dyn Converter<T>>),
    /// Ignored member whose type has no encoding; never reached by the codec.
    Unavailable,
}

impl<T> ValueCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn serde() -> Self {
        Self::Serde {
            encode: serde_encode::<T>,
            decode: serde_decode::<T>,
        }
    }
}

fn serde_encode<T: Serialize>(value: &T) -> std::result::Result<Value, ConverterError> {
    serde_json::to_value(value).map_err(Into::into)
}

fn serde_decode<T: DeserializeOwned>(value: &Value) -> std::result::Result<T, ConverterError> {
    T::deserialize(value).map_err(Into::into)
}

pub(crate) struct ValueMember<S, T> {
    pub(crate) field: Field<S, T>,
    pub(crate) codec: ValueCodec<T>,
}

impl<S, T> MemberAccess<S> for ValueMember<S, T>
where
    S: 'static,
    T: Clone + PartialEq + 'static,
{
    fn encode(&self, member: &str, settings: &S) -> Result<Value> {
        let value = self.field.get(settings);
        let encoded = match &self.codec {
            ValueCodec::Serde { encode, .. } => encode(value),
            ValueCodec::Custom(converter) => converter.encode(value),
            ValueCodec::Unavailable => Err(NO_CONVERTER.into()),
        };
        encoded.map_err(|source| SettingsError::Encode {
            member: member.to_string(),
            source,
        })
    }

    fn decode_into(&self, member: &str, settings: &mut S, value: &Value) -> Decoded {
        let decoded = match &self.codec {
            ValueCodec::Serde { decode, .. } => decode(value),
            ValueCodec::Custom(converter) => converter.decode(value),
            ValueCodec::Unavailable => Err(NO_CONVERTER.into()),
        };
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(source) => {
                return Decoded::failed(SettingsError::Decode {
                    member: member.to_string(),
                    source,
                });
            }
        };

        let slot = self.field.get_mut(settings);
        if *slot == decoded {
            return Decoded::applied(false);
        }
        *slot = decoded;
        Decoded::applied(true)
    }

    fn assign_from(&self, target: &mut S, source: &S) -> bool {
        let value = self.field.get(source);
        let slot = self.field.get_mut(target);
        if *slot == *value {
            return false;
        }
        slot.clone_from(value);
        true
    }

    fn value_eq(&self, a: &S, b: &S) -> bool {
        self.field.get(a) == self.field.get(b)
    }
}

/// A nested settings type, walked member by member with its own schema.
pub(crate) struct SectionMember<S, T: Settings> {
    pub(crate) field: Field<S, T>,
    pub(crate) schema: &'static Schema<T>,
}

impl<S, T> MemberAccess<S> for SectionMember<S, T>
where
    S: 'static,
    T: Settings,
{
    fn encode(&self, member: &str, settings: &S) -> Result<Value> {
        codec::encode_members(self.schema, self.field.get(settings))
            .map(Value::Object)
            .map_err(|e| e.within(member))
    }

    fn decode_into(&self, member: &str, settings: &mut S, value: &Value) -> Decoded {
        let Value::Object(fields) = value else {
            return Decoded::failed(SettingsError::Decode {
                member: member.to_string(),
                source: format!("expected an object, found {}", value_kind(value)).into(),
            });
        };

        let section = self.field.get_mut(settings);
        let mut changed = false;
        let result =
            codec::populate_members(self.schema, section, iter_fields(fields), &mut |_| {
                changed = true;
            });

        // Fields applied before a failure still count as a change
        Decoded {
            changed,
            result: result.map(drop).map_err(|e| e.within(member)),
        }
    }

    fn assign_from(&self, target: &mut S, source: &S) -> bool {
        let source = self.field.get(source);
        let target = self.field.get_mut(target);
        let mut changed = false;
        for member in self.schema.included() {
            changed |= member.access.assign_from(target, source);
        }
        changed
    }

    fn value_eq(&self, a: &S, b: &S) -> bool {
        let (a, b) = (self.field.get(a), self.field.get(b));
        self.schema.included().all(|m| m.access.value_eq(a, b))
    }
}

fn iter_fields(map: &Map<String, Value>) -> impl Iterator<Item = (&str, &Value)> {
    map.iter().map(|(k, v)| (k.as_str(), v))
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
