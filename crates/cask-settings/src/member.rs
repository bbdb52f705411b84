//! Member handles, converters and descriptors.

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::error::ConverterError;

/// Typed handle to one member of a settings type.
///
/// A field is a pair of accessor functions plus the member's name. It carries
/// no data, so it is `Copy` and can be declared as an associated constant:
///
/// ```
/// use cask_settings::{Field, field};
///
/// #[derive(Clone)]
/// struct Editor {
///     font_size: u32,
/// }
///
/// impl Editor {
///     const FONT_SIZE: Field<Editor, u32> = field!(Editor, font_size);
/// }
///
/// let editor = Editor { font_size: 13 };
/// assert_eq!(*Editor::FONT_SIZE.get(&editor), 13);
/// assert_eq!(Editor::FONT_SIZE.name(), "font_size");
/// ```
pub struct Field<S, T> {
    name: &'static str,
    get: fn(&S) -> &T,
    get_mut: fn(&mut S) -> &mut T,
}

impl<S, T> Field<S, T> {
    /// Create a field from its name and accessors. Prefer the [`field!`](crate::field) macro.
    pub const fn new(name: &'static str, get: fn(&S) -> &T, get_mut: fn(&mut S) -> &mut T) -> Self {
        Self { name, get, get_mut }
    }

    /// Member name as declared on the settings type.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Borrow the member's value.
    #[inline]
    pub fn get<'a>(&self, settings: &'a S) -> &'a T {
        (self.get)(settings)
    }

    /// Mutably borrow the member's value.
    #[inline]
    pub fn get_mut<'a>(&self, settings: &'a mut S) -> &'a mut T {
        (self.get_mut)(settings)
    }
}

impl<S, T> Clone for Field<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for Field<S, T> {}

impl<S, T> fmt::Debug for Field<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Custom encode/decode for one value type.
///
/// Converters operate on [`serde_json::Value`], the document's value model. An
/// error from either direction aborts the surrounding save or load.
pub trait Converter<T>: Send + Sync {
    /// Encode a value into its document representation.
    fn encode(&self, value: &T) -> Result<Value, ConverterError>;

    /// Decode a document value.
    fn decode(&self, value: &Value) -> Result<T, ConverterError>;
}

type EncodeFn<T> = Box<dyn Fn(&T) -> Result<Value, ConverterError> + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&Value) -> Result<T, ConverterError> + Send + Sync>;

/// A [`Converter`] built from a pair of closures.
pub struct FnConverter<T> {
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FnConverter<T> {
    pub fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&T) -> Result<Value, ConverterError> + Send + Sync + 'static,
        D: Fn(&Value) -> Result<T, ConverterError> + Send + Sync + 'static,
    {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
            _marker: PhantomData,
        }
    }
}

impl<T> Converter<T> for FnConverter<T> {
    fn encode(&self, value: &T) -> Result<Value, ConverterError> {
        (self.encode)(value)
    }

    fn decode(&self, value: &Value) -> Result<T, ConverterError> {
        (self.decode)(value)
    }
}

/// Semantic shape of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A single value, encoded by a converter or by serde.
    Value,
    /// A nested settings type, encoded as an object of its own members.
    Section,
}

/// Where a member's converter comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterSource {
    /// Default serde encoding for the member's type.
    Default,
    /// A converter registered for every member of the type.
    Type,
    /// A converter bound to this member only.
    Member,
    /// Structural encoding of a nested section.
    Structural,
}

/// Resolved metadata of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub(crate) name: &'static str,
    pub(crate) serialized_name: String,
    pub(crate) type_name: &'static str,
    pub(crate) kind: MemberKind,
    pub(crate) included: bool,
    pub(crate) converter: ConverterSource,
}

impl MemberDescriptor {
    /// Member name as declared on the settings type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field name used in documents.
    pub fn serialized_name(&self) -> &str {
        &self.serialized_name
    }

    /// Rust type name of the member's value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Whether the member takes part in save/load/reset.
    pub fn is_included(&self) -> bool {
        self.included
    }

    pub fn converter(&self) -> ConverterSource {
        self.converter
    }
}
