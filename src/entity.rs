//! The `Entity` capability and the attribute descriptor table.
//!
//! An entity is a value type with a fixed, statically known set of named
//! attributes. Each attribute is described by an [`AttributeDescriptor`]
//! carrying its name, its declared type and the [`WriteChannel`] through which
//! the copier initializes it on a freshly constructed instance.
//!
//! Descriptor tables are normally generated by `#[derive(Entity)]`, but they
//! can be written by hand:
//!
//! ```
//! use std::any::Any;
//! use immutable_entity::{AttributeDescriptor, AttributeType, Entity, Slot, WriteChannel};
//!
//! #[derive(Default)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Entity for Point {
//!     const ATTRIBUTES: &'static [AttributeDescriptor<Self>] = &[
//!         AttributeDescriptor::new(
//!             "x",
//!             "i32",
//!             AttributeType::of::<i32>(),
//!             WriteChannel::BackingSlot(Slot::new(
//!                 |source: &Self, target: &mut Self| target.x = source.x,
//!                 |target: &mut Self, value: Box<dyn Any>| {
//!                     value.downcast::<i32>().map(|value| target.x = *value)
//!                 },
//!             )),
//!         ),
//!         AttributeDescriptor::new(
//!             "y",
//!             "i32",
//!             AttributeType::of::<i32>(),
//!             WriteChannel::BackingSlot(Slot::new(
//!                 |source: &Self, target: &mut Self| target.y = source.y,
//!                 |target: &mut Self, value: Box<dyn Any>| {
//!                     value.downcast::<i32>().map(|value| target.y = *value)
//!                 },
//!             )),
//!         ),
//!     ];
//! }
//!
//! assert_eq!(Point::attribute_names(), vec!["x", "y"]);
//! ```

use std::any::{Any, TypeId};

/// Copies one attribute from a source instance into a target instance.
pub type CopyFn<T> = fn(&T, &mut T);

/// Writes a type-erased value into one attribute of a target instance.
///
/// Returns the value back when its runtime type does not match the attribute.
pub type AssignFn<T> = fn(&mut T, Box<dyn Any>) -> Result<(), Box<dyn Any>>;

/// A value type whose attributes can be enumerated and initialized by the copier.
///
/// # Requirements
///
/// - `Default`: the copier starts every copy from a default-constructed instance.
/// - `'static`: descriptor tables are `'static` and values are type-checked
///   through [`TypeId`] (see [`AttributeType`]).
pub trait Entity: Default + 'static {
    /// The attribute set, in declaration order.
    const ATTRIBUTES: &'static [AttributeDescriptor<Self>];

    /// Returns the attribute set.
    #[must_use]
    fn attributes() -> &'static [AttributeDescriptor<Self>] {
        Self::ATTRIBUTES
    }

    /// Returns every descriptor named `name`.
    #[must_use]
    fn attributes_named(name: &str) -> impl Iterator<Item = &'static AttributeDescriptor<Self>> {
        Self::ATTRIBUTES
            .iter()
            .filter(move |descriptor| descriptor.name == name)
    }

    /// Returns the attribute names, in declaration order.
    #[must_use]
    fn attribute_names() -> Vec<&'static str> {
        Self::ATTRIBUTES
            .iter()
            .map(AttributeDescriptor::name)
            .collect()
    }

    /// Returns serializable metadata about the attribute set.
    #[must_use]
    fn describe() -> Vec<AttributeInfo> {
        Self::ATTRIBUTES
            .iter()
            .map(AttributeDescriptor::info)
            .collect()
    }
}

/// Runtime identity of an attribute's type: its [`TypeId`] and its
/// fully resolved name.
///
/// Both are produced lazily through function pointers so descriptor tables
/// stay `const`, including on generic entities.
#[derive(Clone, Copy)]
pub struct AttributeType {
    id: fn() -> TypeId,
    name: fn() -> &'static str,
}

impl AttributeType {
    /// Returns the identity of `A`.
    #[must_use]
    pub const fn of<A: 'static>() -> Self {
        Self {
            id: TypeId::of::<A>,
            name: std::any::type_name::<A>,
        }
    }

    /// Returns the [`TypeId`].
    #[must_use]
    pub fn id(&self) -> TypeId {
        (self.id)()
    }

    /// Returns the resolved type name, with generic parameters substituted.
    #[must_use]
    pub fn name(&self) -> &'static str {
        (self.name)()
    }
}

impl std::fmt::Debug for AttributeType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

/// The pair of function pointers through which an attribute is written.
pub struct Slot<T> {
    copy: CopyFn<T>,
    assign: AssignFn<T>,
}

impl<T> Slot<T> {
    /// Creates a slot from a copy function and a type-erased assign function.
    #[must_use]
    pub const fn new(copy: CopyFn<T>, assign: AssignFn<T>) -> Self {
        Self { copy, assign }
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Slot").finish_non_exhaustive()
    }
}

/// How an attribute is initialized on a target instance.
pub enum WriteChannel<T> {
    /// The attribute is publicly writable.
    Mutator(Slot<T>),
    /// The attribute is read-only from outside; it is written through the
    /// slot generated alongside the type.
    BackingSlot(Slot<T>),
    /// The attribute is readable but nothing can write it.
    Unavailable,
}

impl<T> WriteChannel<T> {
    /// Returns the slot, if the attribute can be written at all.
    #[must_use]
    pub const fn slot(&self) -> Option<&Slot<T>> {
        match self {
            Self::Mutator(slot) | Self::BackingSlot(slot) => Some(slot),
            Self::Unavailable => None,
        }
    }

    /// Returns the kind of channel.
    #[must_use]
    pub const fn kind(&self) -> WriteChannelKind {
        match self {
            Self::Mutator(_) => WriteChannelKind::Mutator,
            Self::BackingSlot(_) => WriteChannelKind::BackingSlot,
            Self::Unavailable => WriteChannelKind::Unavailable,
        }
    }
}

impl<T> Clone for WriteChannel<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WriteChannel<T> {}

impl<T> std::fmt::Debug for WriteChannel<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.kind())
    }
}

/// The kind of a [`WriteChannel`], without its function pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WriteChannelKind {
    /// Publicly writable attribute.
    Mutator,
    /// Read-only attribute written through its backing slot.
    BackingSlot,
    /// Attribute with no write channel.
    Unavailable,
}

impl std::fmt::Display for WriteChannelKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mutator => formatter.write_str("Mutator"),
            Self::BackingSlot => formatter.write_str("BackingSlot"),
            Self::Unavailable => formatter.write_str("Unavailable"),
        }
    }
}

/// Describes one attribute of an entity type `T`.
pub struct AttributeDescriptor<T> {
    name: &'static str,
    type_name: &'static str,
    value_type: AttributeType,
    channel: WriteChannel<T>,
}

impl<T> AttributeDescriptor<T> {
    /// Creates a descriptor.
    ///
    /// # Arguments
    ///
    /// * `name` - The attribute name, as accessors refer to it
    /// * `type_name` - The type as declared in the source
    /// * `value_type` - Runtime identity of the attribute's type
    /// * `channel` - How the attribute is written on a target
    #[must_use]
    pub const fn new(
        name: &'static str,
        type_name: &'static str,
        value_type: AttributeType,
        channel: WriteChannel<T>,
    ) -> Self {
        Self {
            name,
            type_name,
            value_type,
            channel,
        }
    }

    /// Creates a descriptor for an attribute that cannot be written.
    #[must_use]
    pub const fn unavailable(
        name: &'static str,
        type_name: &'static str,
        value_type: AttributeType,
    ) -> Self {
        Self::new(name, type_name, value_type, WriteChannel::Unavailable)
    }

    /// Returns the attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name as declared in the source.
    ///
    /// For a field of generic type this is the parameter name (`T`); see
    /// [`concrete_type_name`](Self::concrete_type_name) for the substituted one.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the resolved type name of the attribute.
    #[must_use]
    pub fn concrete_type_name(&self) -> &'static str {
        self.value_type.name()
    }

    /// Returns the [`TypeId`] of the attribute's type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.value_type.id()
    }

    /// Returns the write channel.
    #[must_use]
    pub const fn channel(&self) -> &WriteChannel<T> {
        &self.channel
    }

    /// Returns `true` if the attribute is not publicly writable.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        !matches!(self.channel, WriteChannel::Mutator(_))
    }

    /// Returns serializable metadata about this attribute.
    #[must_use]
    pub fn info(&self) -> AttributeInfo {
        AttributeInfo {
            name: self.name,
            type_name: self.type_name,
            concrete_type_name: self.concrete_type_name(),
            channel: self.channel.kind(),
        }
    }

    /// Copies this attribute from `source` into `target`.
    ///
    /// Returns `false` without touching `target` if there is no write channel.
    pub(crate) fn copy_between(&self, source: &T, target: &mut T) -> bool {
        let Some(slot) = self.channel.slot() else {
            return false;
        };
        (slot.copy)(source, target);
        true
    }

    /// Writes a type-erased value into this attribute of `target`.
    ///
    /// Returns `None` if there is no write channel, and the value back if its
    /// type does not match.
    pub(crate) fn assign(
        &self,
        target: &mut T,
        value: Box<dyn Any>,
    ) -> Option<Result<(), Box<dyn Any>>> {
        self.channel.slot().map(|slot| (slot.assign)(target, value))
    }
}

impl<T> Clone for AttributeDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttributeDescriptor<T> {}

impl<T> std::fmt::Debug for AttributeDescriptor<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("value_type", &self.value_type)
            .field("channel", &self.channel)
            .finish()
    }
}

/// Attribute metadata detached from the entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttributeInfo {
    /// The attribute name.
    pub name: &'static str,
    /// The type name as declared in the source.
    pub type_name: &'static str,
    /// The resolved type name, with generic parameters substituted.
    pub concrete_type_name: &'static str,
    /// How the attribute is written.
    pub channel: WriteChannelKind,
}

static_assertions::assert_impl_all!(AttributeDescriptor<String>: Send, Sync, Copy);
static_assertions::assert_impl_all!(WriteChannel<Vec<u8>>: Send, Sync, Copy);
static_assertions::assert_impl_all!(AttributeType: Send, Sync, Copy);
