//! Property inventory: the persistable members of a settings type.
//!
//! Member lists come from explicit registration. Each settings type implements
//! [`Settings::declare`], and [`inventory`] turns that declaration into a
//! validated [`Schema`] once per type. Schemas are derived from the type alone,
//! never from an instance, so they are cached for the life of the process.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::access::MemberAccess;
use crate::error::{Result, SettingsError};
use crate::filter::{Member, PendingMember, Section, TypeConverters};
use crate::member::{Converter, Field, MemberDescriptor};

/// A plain data type whose members can be persisted.
///
/// ```
/// use cask_settings::{Field, Member, SchemaBuilder, Settings, field};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Window {
///     width: u32,
///     title: String,
///     cache: Vec<u8>,
/// }
///
/// impl Window {
///     const WIDTH: Field<Window, u32> = field!(Window, width);
///     const TITLE: Field<Window, String> = field!(Window, title);
///     const CACHE: Field<Window, Vec<u8>> = field!(Window, cache);
/// }
///
/// impl Settings for Window {
///     fn declare(schema: &mut SchemaBuilder<Self>) {
///         schema
///             .field(Self::WIDTH)
///             .member(Member::new(Self::TITLE).rename("Title"))
///             .member(Member::new(Self::CACHE).ignore());
///     }
/// }
///
/// let schema = cask_settings::inventory::<Window>().unwrap();
/// let names: Vec<_> = schema.included_descriptors().map(|d| d.serialized_name()).collect();
/// assert_eq!(names, ["width", "Title"]);
/// ```
pub trait Settings: Clone + 'static {
    /// Register the type's members, in the order they are written.
    fn declare(schema: &mut SchemaBuilder<Self>);
}

pub(crate) struct ResolvedMember<S> {
    pub(crate) descriptor: MemberDescriptor,
    pub(crate) access: Box<dyn MemberAccess<S>>,
}

/// Collects member declarations for one settings type.
pub struct SchemaBuilder<S> {
    pending: Vec<Box<dyn PendingMember<S>>>,
    converters: TypeConverters,
}

impl<S: Settings> SchemaBuilder<S> {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
            converters: TypeConverters::default(),
        }
    }

    /// Add a serde-encoded member with default attributes.
    pub fn field<T>(&mut self, field: Field<S, T>) -> &mut Self
    where
        T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
    {
        self.member(Member::new(field))
    }

    /// Add a member declaration.
    pub fn member<T>(&mut self, member: Member<S, T>) -> &mut Self
    where
        T: Clone + PartialEq + 'static,
    {
        self.pending.push(Box::new(member));
        self
    }

    /// Add a nested settings section.
    pub fn section<T: Settings>(&mut self, section: Section<S, T>) -> &mut Self {
        self.pending.push(Box::new(section));
        self
    }

    /// Use `converter` for every member of type `T` that has no converter of its own.
    pub fn converter<T: 'static>(&mut self, converter: impl Converter<T> + 'static) -> &mut Self {
        self.converters.insert::<T>(Arc::new(converter));
        self
    }

    fn build(self) -> Result<Schema<S>> {
        let type_name = std::any::type_name::<S>();
        let mut names = HashSet::new();
        let mut members = Vec::with_capacity(self.pending.len());
        let mut lookup = HashMap::new();

        for pending in self.pending {
            if !names.insert(pending.name()) {
                return Err(SettingsError::construction(
                    type_name,
                    format!("member '{}' is declared twice", pending.name()),
                ));
            }

            let (descriptor, access) = pending.resolve(type_name, &self.converters)?;

            if descriptor.included {
                if lookup.contains_key(&descriptor.serialized_name) {
                    return Err(SettingsError::construction(
                        type_name,
                        format!(
                            "serialized name '{}' is used by more than one member",
                            descriptor.serialized_name
                        ),
                    ));
                }
                lookup.insert(descriptor.serialized_name.clone(), members.len());
            }

            members.push(ResolvedMember { descriptor, access });
        }

        Ok(Schema {
            type_name,
            members,
            lookup,
        })
    }
}

/// The resolved, ordered member list of a settings type.
pub struct Schema<S> {
    type_name: &'static str,
    members: Vec<ResolvedMember<S>>,
    lookup: HashMap<String, usize>,
}

impl<S: Settings> Schema<S> {
    /// The cached schema of `S`.
    pub fn of() -> Result<&'static Self> {
        inventory::<S>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Every declared member, ignored ones included, in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().map(|m| &m.descriptor)
    }

    /// Members that take part in save/load/reset, in declaration order.
    pub fn included_descriptors(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.included().map(|m| &m.descriptor)
    }

    /// Look up a member by its declared name.
    pub fn descriptor(&self, name: &str) -> Option<&MemberDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }

    /// Whether `name` is a declared, non-ignored member.
    pub fn is_persisted(&self, name: &str) -> bool {
        self.descriptor(name).is_some_and(|d| d.included)
    }

    /// Included members whose values differ between `a` and `b`.
    pub fn diff<'a>(&'a self, a: &S, b: &S) -> Vec<&'a MemberDescriptor> {
        self.included()
            .filter(|m| !m.access.value_eq(a, b))
            .map(|m| &m.descriptor)
            .collect()
    }

    pub(crate) fn included(&self) -> impl Iterator<Item = &ResolvedMember<S>> {
        self.members.iter().filter(|m| m.descriptor.included)
    }

    /// Exact, case-sensitive match on the serialized name.
    pub(crate) fn find_serialized(&self, serialized_name: &str) -> Option<&ResolvedMember<S>> {
        self.lookup.get(serialized_name).map(|&index| &self.members[index])
    }
}

impl<S> std::fmt::Debug for Schema<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field(
                "members",
                &self.members.iter().map(|m| &m.descriptor).collect::<Vec<_>>(),
            )
            .finish()
    }
}

type Registry = RwLock<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::default);

/// Get the schema of `S`, building and caching it on first use.
///
/// Fails with [`SettingsError::Construction`] when the declaration is invalid:
/// a member declared twice, two included members sharing a serialized name, or
/// a custom member without any converter.
pub fn inventory<S: Settings>() -> Result<&'static Schema<S>> {
    let id = TypeId::of::<S>();

    let cached = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    if let Some(entry) = cached {
        return downcast::<S>(entry);
    }

    // Built without holding the lock: sections resolve their own schemas.
    let mut builder = SchemaBuilder::new();
    S::declare(&mut builder);
    let schema = builder.build()?;
    tracing::debug!(
        "Built settings schema for {} ({} members)",
        schema.type_name,
        schema.members.len()
    );

    let entry = *REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(id)
        .or_insert_with(|| {
            let leaked: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(schema));
            leaked
        });
    downcast::<S>(entry)
}

fn downcast<S: Settings>(entry: &'static (dyn Any + Send + Sync)) -> Result<&'static Schema<S>> {
    entry.downcast_ref::<Schema<S>>().ok_or_else(|| {
        SettingsError::construction(std::any::type_name::<S>(), "schema cache holds another type")
    })
}
