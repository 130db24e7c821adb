//! The entity copier: copy every attribute, override one.
//!
//! [`EntityCopier`] borrows a source entity and produces new instances that
//! are identical to it except for one attribute. It never writes the source.
//!
//! # Usage shapes
//!
//! - **Direct mode**: the value type itself is the source. Every [`Entity`]
//!   gets this through the blanket [`ImmutableEntity`] trait.
//! - **Composition mode**: a wrapper holds the value and decorates it with
//!   [`EntityCopier::composing`], re-wrapping each produced value.
//!
//! # Algorithm
//!
//! 1. Resolve the accessor to exactly one attribute (no allocation yet).
//! 2. Allocate `T::default()`.
//! 3. Copy every attribute from the source, in declaration order, through its
//!    write channel.
//! 4. Write the new value into the resolved attribute, through that
//!    attribute's own write channel.
//! 5. Return the target.
//!
//! A failure in step 3 drops the partially built target.
//!
//! # Example
//!
//! ```
//! use immutable_entity::{Entity, EntityCopier};
//!
//! #[derive(Debug, Default, PartialEq, Entity)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let original = Person::default();
//! let renamed = EntityCopier::composing(&original)
//!     .set_field(&Person::name_attribute(), "Joseph".to_string())
//!     .unwrap();
//!
//! assert_eq!(renamed.name, "Joseph");
//! assert_eq!(renamed.age, 0);
//! assert_eq!(original.name, "");
//! ```

use std::any::{Any, TypeId, type_name};

use crate::accessor::{AccessorExpression, Attribute};
use crate::entity::{AttributeDescriptor, Entity};
use crate::error::{EntityError, EntityResult, ResolutionFailure};

/// How the copier obtained its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyMode {
    /// The value type is its own source.
    Direct,
    /// The source is a value held by a wrapper.
    Composition,
}

/// Produces modified copies of a borrowed source entity.
pub struct EntityCopier<'a, T: Entity> {
    source: &'a T,
    mode: CopyMode,
}

impl<'a, T: Entity> EntityCopier<'a, T> {
    /// Decorates `source` for composition mode.
    #[must_use]
    pub const fn composing(source: &'a T) -> Self {
        Self {
            source,
            mode: CopyMode::Composition,
        }
    }

    /// Uses `entity` as its own source (direct mode).
    #[must_use]
    pub const fn direct(entity: &'a T) -> Self {
        Self {
            source: entity,
            mode: CopyMode::Direct,
        }
    }

    /// Uses a type-erased receiver as its own source (direct mode).
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::Configuration`] if `receiver` is not a `T`.
    pub fn try_direct(receiver: &'a dyn Any) -> EntityResult<Self> {
        let Some(entity) = receiver.downcast_ref::<T>() else {
            tracing::debug!(
                entity = type_name::<T>(),
                "direct-mode receiver is not the entity type"
            );
            return Err(EntityError::Configuration {
                expected: type_name::<T>(),
            });
        };
        Ok(Self::direct(entity))
    }

    /// Returns the source entity.
    #[must_use]
    pub const fn source(&self) -> &'a T {
        self.source
    }

    /// Returns the construction mode.
    #[must_use]
    pub const fn mode(&self) -> CopyMode {
        self.mode
    }

    /// Returns a copy of the source with `attribute` set to `value`.
    ///
    /// # Errors
    ///
    /// - [`EntityError::AccessorResolution`] if `attribute` does not name exactly
    ///   one attribute of `T`.
    /// - [`EntityError::TypeMismatch`] if that attribute is not declared as `A`.
    /// - [`EntityError::AttributeWrite`] if any attribute of `T` cannot be written.
    pub fn set_field<A: 'static>(&self, attribute: &Attribute<T, A>, value: A) -> EntityResult<T> {
        self.override_with(attribute.expression(), value)
    }

    /// Returns a copy of the source with the attribute named by `expression`
    /// set to `value`.
    ///
    /// # Errors
    ///
    /// - [`EntityError::AccessorResolution`] if `expression` is not a single
    ///   simple attribute reference.
    /// - [`EntityError::TypeMismatch`] if `value` is not of the attribute's type.
    /// - [`EntityError::AttributeWrite`] if any attribute of `T` cannot be written.
    pub fn set_field_by_expression<A: Any>(
        &self,
        expression: &AccessorExpression<'_>,
        value: A,
    ) -> EntityResult<T> {
        self.override_with(*expression, value)
    }

    /// Returns a copy of the source with `attribute` replaced by the result of
    /// applying `function` to its current value.
    ///
    /// # Errors
    ///
    /// Same as [`set_field`](Self::set_field).
    pub fn update_field<A, F>(&self, attribute: &Attribute<T, A>, function: F) -> EntityResult<T>
    where
        A: 'static,
        F: FnOnce(&A) -> A,
    {
        let value = function(attribute.get(self.source));
        self.set_field(attribute, value)
    }

    /// Returns an attribute-wise copy of the source with nothing overridden.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::AttributeWrite`] if any attribute cannot be written.
    pub fn duplicate(&self) -> EntityResult<T> {
        self.copy_attributes(None)
    }

    fn override_with<A: Any>(
        &self,
        expression: AccessorExpression<'_>,
        value: A,
    ) -> EntityResult<T> {
        let descriptor = Self::resolve(expression)?;
        Self::check_type::<A>(descriptor)?;

        let mut target = self.copy_attributes(Some(descriptor.name()))?;
        match descriptor.assign(&mut target, Box::new(value)) {
            Some(Ok(())) => Ok(target),
            Some(Err(_)) => Err(Self::type_mismatch::<A>(descriptor)),
            None => Err(Self::write_failure(descriptor)),
        }
    }

    fn resolve(
        expression: AccessorExpression<'_>,
    ) -> EntityResult<&'static AttributeDescriptor<T>> {
        let failure = |reason: ResolutionFailure| {
            tracing::debug!(
                entity = type_name::<T>(),
                expression = expression.text(),
                %reason,
                "accessor did not resolve"
            );
            EntityError::AccessorResolution {
                entity: type_name::<T>(),
                expression: expression.text().to_string(),
                reason,
            }
        };

        let name = expression.resolve().map_err(failure)?;
        let mut matches = T::attributes_named(name);
        match (matches.next(), matches.next()) {
            (Some(descriptor), None) => Ok(descriptor),
            (None, _) => Err(failure(ResolutionFailure::UnknownAttribute)),
            (Some(_), Some(_)) => Err(failure(ResolutionFailure::Ambiguous)),
        }
    }

    fn check_type<A: 'static>(descriptor: &AttributeDescriptor<T>) -> EntityResult<()> {
        if descriptor.type_id() == TypeId::of::<A>() {
            Ok(())
        } else {
            Err(Self::type_mismatch::<A>(descriptor))
        }
    }

    fn copy_attributes(&self, overridden: Option<&str>) -> EntityResult<T> {
        let attributes = T::attributes();
        tracing::trace!(
            entity = type_name::<T>(),
            mode = ?self.mode,
            attributes = attributes.len(),
            overridden = ?overridden,
            "copying entity"
        );

        let mut target = T::default();
        for descriptor in attributes {
            if !descriptor.copy_between(self.source, &mut target) {
                return Err(Self::write_failure(descriptor));
            }
        }
        Ok(target)
    }

    fn type_mismatch<A>(descriptor: &AttributeDescriptor<T>) -> EntityError {
        tracing::debug!(
            entity = type_name::<T>(),
            attribute = descriptor.name(),
            expected = descriptor.concrete_type_name(),
            found = type_name::<A>(),
            "value type does not match attribute"
        );
        EntityError::TypeMismatch {
            entity: type_name::<T>(),
            attribute: descriptor.name(),
            expected: descriptor.concrete_type_name(),
            found: type_name::<A>(),
        }
    }

    fn write_failure(descriptor: &AttributeDescriptor<T>) -> EntityError {
        tracing::debug!(
            entity = type_name::<T>(),
            attribute = descriptor.name(),
            "attribute has no write channel; discarding target"
        );
        EntityError::AttributeWrite {
            entity: type_name::<T>(),
            attribute: descriptor.name(),
        }
    }
}

impl<T: Entity> Clone for EntityCopier<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Entity> Copy for EntityCopier<'_, T> {}

impl<T: Entity> std::fmt::Debug for EntityCopier<'_, T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("EntityCopier")
            .field("entity", &type_name::<T>())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Direct-mode copy-with-override, available on every [`Entity`].
///
/// # Example
///
/// ```
/// use immutable_entity::{Entity, ImmutableEntity};
///
/// #[derive(Debug, Default, Entity)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let person = Person::default()
///     .set_field(&Person::name_attribute(), "Joseph".to_string())
///     .and_then(|person| person.set_field(&Person::age_attribute(), 26))
///     .unwrap();
///
/// assert_eq!(person.name, "Joseph");
/// assert_eq!(person.age, 26);
/// ```
pub trait ImmutableEntity: Entity {
    /// Returns a copy of `self` with `attribute` set to `value`.
    ///
    /// # Errors
    ///
    /// See [`EntityCopier::set_field`].
    fn set_field<A: 'static>(
        &self,
        attribute: &Attribute<Self, A>,
        value: A,
    ) -> EntityResult<Self> {
        EntityCopier::direct(self).set_field(attribute, value)
    }

    /// Returns a copy of `self` with the attribute named by `expression` set to `value`.
    ///
    /// # Errors
    ///
    /// See [`EntityCopier::set_field_by_expression`].
    fn set_field_by_expression<A: Any>(
        &self,
        expression: &AccessorExpression<'_>,
        value: A,
    ) -> EntityResult<Self> {
        EntityCopier::direct(self).set_field_by_expression(expression, value)
    }

    /// Returns a copy of `self` with `attribute` replaced by `function` of its value.
    ///
    /// # Errors
    ///
    /// See [`EntityCopier::update_field`].
    fn update_field<A, F>(&self, attribute: &Attribute<Self, A>, function: F) -> EntityResult<Self>
    where
        A: 'static,
        F: FnOnce(&A) -> A,
    {
        EntityCopier::direct(self).update_field(attribute, function)
    }

    /// Returns an attribute-wise copy of `self`.
    ///
    /// # Errors
    ///
    /// See [`EntityCopier::duplicate`].
    fn duplicate(&self) -> EntityResult<Self> {
        EntityCopier::direct(self).duplicate()
    }
}

impl<T: Entity> ImmutableEntity for T {}
