//! Derive macro for immutable-entity.
//!
//! This crate provides `#[derive(Entity)]`, which generates the attribute
//! descriptor table the entity copier enumerates, and one typed accessor per
//! field.
//!
//! # Example
//!
//! ```rust,ignore
//! use immutable_entity::{Entity, ImmutableEntity};
//!
//! #[derive(Debug, Default, Entity)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! // Generated:
//! // - impl Entity for Person { const ATTRIBUTES: ... }
//! // - Person::name_attribute() -> Attribute<Person, String>
//! // - Person::age_attribute() -> Attribute<Person, u32>
//!
//! let person = Person::default();
//! let older = person.set_field(&Person::age_attribute(), 26).unwrap();
//! assert_eq!(older.age, 26);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod entity;

use proc_macro::TokenStream;

/// Derive macro generating the `Entity` implementation for a struct.
///
/// # Requirements
///
/// - The struct must have named fields (unit structs yield an empty attribute set)
/// - The struct must implement `Default`
/// - Every attribute type must implement `Clone` and be `'static`
/// - Lifetime parameters are not supported
///
/// # Generated Code
///
/// For each field `foo` of type `T`, generates a descriptor in
/// `Entity::ATTRIBUTES` and:
///
/// ```rust,ignore
/// impl StructName {
///     pub fn foo_attribute() -> ::immutable_entity::Attribute<StructName, T> { ... }
/// }
/// ```
///
/// Public fields are described with a `Mutator` write channel, every other
/// field with a `BackingSlot` channel.
///
/// # Field Attributes
///
/// - `#[entity(skip)]`: leave the field out of the attribute set. Copies get
///   the field's default value.
///
/// # Example
///
/// ```rust,ignore
/// use immutable_entity::Entity;
///
/// #[derive(Default, Entity)]
/// struct Session {
///     user: String,
///     #[entity(skip)]
///     cache: Vec<u8>,
/// }
///
/// assert_eq!(Session::attribute_names(), vec!["user"]);
/// ```
///
/// # Generics
///
/// Generic structs are supported; type parameters must be `'static`:
///
/// ```rust,ignore
/// #[derive(Default, Entity)]
/// struct Container<T> {
///     value: T,
/// }
///
/// let attribute = Container::<i32>::value_attribute();
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity_impl(input)
}
