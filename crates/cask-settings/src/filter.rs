//! Member attributes and their resolution.
//!
//! A settings type declares its members with [`Member`] and [`Section`], each
//! carrying optional attributes:
//!
//! - `ignore` - keep the member out of documents, loads and resets
//! - `rename` - use a different field name in documents
//! - `converter` - a custom encode/decode bound to this member only
//!
//! Resolution turns a declaration into a [`MemberDescriptor`] plus the access
//! object the codec drives. Converter precedence is member converter, then a
//! converter registered for the member's type, then serde.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::access::{MemberAccess, SectionMember, ValueCodec, ValueMember};
use crate::error::{Result, SettingsError};
use crate::inventory::{Settings, inventory};
use crate::member::{ConverterSource, Converter, Field, MemberDescriptor, MemberKind};

/// Per-member serialization attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberAttributes {
    pub rename: Option<String>,
    pub ignore: bool,
}

impl MemberAttributes {
    /// Field name used in documents.
    pub fn serialized_name(&self, name: &'static str) -> String {
        self.rename.clone().unwrap_or_else(|| name.to_string())
    }
}

/// Declaration of a value member.
pub struct Member<S, T> {
    field: Field<S, T>,
    attributes: MemberAttributes,
    converter: Option<Arc<dyn Converter<T>>>,
    fallback: Option<ValueCodec<T>>,
}

impl<S, T> Member<S, T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    /// Declare a member encoded with serde unless a converter applies.
    pub fn new(field: Field<S, T>) -> Self {
        Self {
            field,
            attributes: MemberAttributes::default(),
            converter: None,
            fallback: Some(ValueCodec::serde()),
        }
    }
}

impl<S, T> Member<S, T>
where
    T: Clone + PartialEq + 'static,
{
    /// Declare a member whose type has no serde encoding.
    ///
    /// It needs a member converter or a type converter, unless it is ignored.
    pub fn custom(field: Field<S, T>) -> Self {
        Self {
            field,
            attributes: MemberAttributes::default(),
            converter: None,
            fallback: None,
        }
    }

    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.attributes.rename = Some(name.into());
        self
    }

    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.attributes.ignore = true;
        self
    }

    /// Bind a converter to this member only.
    #[must_use]
    pub fn converter(mut self, converter: impl Converter<T> + 'static) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    pub fn attributes(&self) -> &MemberAttributes {
        &self.attributes
    }
}

/// Declaration of a nested settings section.
pub struct Section<S, T> {
    field: Field<S, T>,
    attributes: MemberAttributes,
}

impl<S, T: Settings> Section<S, T> {
    pub fn new(field: Field<S, T>) -> Self {
        Self {
            field,
            attributes: MemberAttributes::default(),
        }
    }

    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.attributes.rename = Some(name.into());
        self
    }

    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.attributes.ignore = true;
        self
    }
}

/// Converters registered for every member of a given type.
#[derive(Default)]
pub(crate) struct TypeConverters {
    by_type: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl TypeConverters {
    pub(crate) fn insert<T: 'static>(&mut self, converter: Arc<dyn Converter<T>>) {
        self.by_type.insert(TypeId::of::<T>(), Box::new(converter));
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<Arc<dyn Converter<T>>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn Converter<T>>>())
            .cloned()
    }
}

/// A declared member whose converter has not been resolved yet.
pub(crate) trait PendingMember<S> {
    fn name(&self) -> &'static str;

    fn resolve(
        self: Box<Self>,
        owner: &'static str,
        converters: &TypeConverters,
    ) -> Result<(MemberDescriptor, Box<dyn MemberAccess<S>>)>;
}

impl<S, T> PendingMember<S> for Member<S, T>
where
    S: 'static,
    T: Clone + PartialEq + 'static,
{
    fn name(&self) -> &'static str {
        self.field.name()
    }

    fn resolve(
        self: Box<Self>,
        owner: &'static str,
        converters: &TypeConverters,
    ) -> Result<(MemberDescriptor, Box<dyn MemberAccess<S>>)> {
        let name = self.field.name();
        let included = !self.attributes.ignore;

        let (codec, source) = if let Some(converter) = self.converter {
            (ValueCodec::Custom(converter), ConverterSource::Member)
        } else if let Some(converter) = converters.get::<T>() {
            (ValueCodec::Custom(converter), ConverterSource::Type)
        } else if let Some(fallback) = self.fallback {
            (fallback, ConverterSource::Default)
        } else if !included {
            (ValueCodec::Unavailable, ConverterSource::Default)
        } else {
            return Err(SettingsError::construction(
                owner,
                format!(
                    "member '{name}' of type {} has no converter",
                    std::any::type_name::<T>()
                ),
            ));
        };

        let descriptor = MemberDescriptor {
            name,
            serialized_name: self.attributes.serialized_name(name),
            type_name: std::any::type_name::<T>(),
            kind: MemberKind::Value,
            included,
            converter: source,
        };
        let access = ValueMember {
            field: self.field,
            codec,
        };
        Ok((descriptor, Box::new(access)))
    }
}

impl<S, T> PendingMember<S> for Section<S, T>
where
    S: 'static,
    T: Settings,
{
    fn name(&self) -> &'static str {
        self.field.name()
    }

    fn resolve(
        self: Box<Self>,
        owner: &'static str,
        _converters: &TypeConverters,
    ) -> Result<(MemberDescriptor, Box<dyn MemberAccess<S>>)> {
        let name = self.field.name();
        let schema = inventory::<T>().map_err(|e| {
            SettingsError::construction(owner, format!("section '{name}' is invalid: {e}"))
        })?;

        let descriptor = MemberDescriptor {
            name,
            serialized_name: self.attributes.serialized_name(name),
            type_name: std::any::type_name::<T>(),
            kind: MemberKind::Section,
            included: !self.attributes.ignore,
            converter: ConverterSource::Structural,
        };
        let access = SectionMember {
            field: self.field,
            schema,
        };
        Ok((descriptor, Box::new(access)))
    }
}
