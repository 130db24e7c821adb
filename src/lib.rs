//! # immutable-entity
//!
//! Copy-with-override for immutable value types.
//!
//! ## Overview
//!
//! Given an existing value and a "set this attribute to this value"
//! instruction, the copier returns a new value identical to the original
//! except for the named attribute. The original is never mutated.
//!
//! - **Entities**: value types with a static attribute table ([`Entity`]),
//!   usually generated with `#[derive(Entity)]`
//! - **Accessors**: typed [`Attribute`]s and textual [`AccessorExpression`]s
//!   naming exactly one attribute
//! - **Copier**: [`EntityCopier`] (composition mode) and the blanket
//!   [`ImmutableEntity`] trait (direct mode)
//! - **Setters**: [`immutable_setters!`] for fluent `set_*` methods
//!
//! ## Feature Flags
//!
//! - `derive` (default): `#[derive(Entity)]`
//! - `serde`: serialization of attribute metadata ([`AttributeInfo`])
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use immutable_entity::prelude::*;
//!
//! #[derive(Debug, Default, PartialEq, Entity)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let original = Person::default();
//! let older = original.set_field(&Person::age_attribute(), 26).unwrap();
//!
//! assert_eq!(older.age, 26);
//! assert_eq!(original.age, 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Lets generated `::immutable_entity::...` paths resolve inside this crate.
extern crate self as immutable_entity;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use immutable_entity::prelude::*;
/// ```
pub mod prelude {
    pub use crate::accessor::{AccessorExpression, Attribute};
    pub use crate::copier::{CopyMode, EntityCopier, ImmutableEntity};
    pub use crate::entity::Entity;
    pub use crate::error::{EntityError, EntityResult};

    #[cfg(feature = "derive")]
    pub use immutable_entity_derive::Entity;
}

pub mod accessor;
pub mod copier;
pub mod entity;
pub mod error;
mod setters;

pub use accessor::{AccessorExpression, Attribute};
pub use copier::{CopyMode, EntityCopier, ImmutableEntity};
pub use entity::{
    AssignFn, AttributeDescriptor, AttributeInfo, AttributeType, CopyFn, Entity, Slot,
    WriteChannel, WriteChannelKind,
};
pub use error::{EntityError, EntityResult, ResolutionFailure};

#[cfg(feature = "derive")]
pub use immutable_entity_derive::Entity;

#[doc(hidden)]
pub use paste;
