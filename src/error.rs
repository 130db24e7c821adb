//! Error types for the entity copier.
//!
//! Every failure is fatal for the call that raised it: the copier is a pure
//! function of its inputs, so retrying with the same arguments reproduces the
//! same error. Callers are expected to fix the call site instead.

use thiserror::Error;

/// Result type returned by every fallible copier operation.
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors raised while producing a modified copy of an entity.
///
/// # Examples
///
/// ```rust
/// use immutable_entity::{EntityError, ResolutionFailure};
///
/// let error = EntityError::AccessorResolution {
///     entity: "Person",
///     expression: "person.age + 1".to_string(),
///     reason: ResolutionFailure::ComputedExpression,
/// };
/// assert_eq!(
///     format!("{error}"),
///     "accessor `person.age + 1` does not name a single attribute of Person: \
///      expression is computed, not a member access"
/// );
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// A type-erased receiver was used in direct mode but is not the entity type.
    #[error("receiver cannot stand in for {expected} in direct mode")]
    Configuration {
        /// Type name of the entity the copier was asked to produce.
        expected: &'static str,
    },

    /// The accessor does not resolve to exactly one simple attribute.
    #[error("accessor `{expression}` does not name a single attribute of {entity}: {reason}")]
    AccessorResolution {
        /// Type name of the entity.
        entity: &'static str,
        /// The accessor as the caller wrote it.
        expression: String,
        /// Why resolution failed.
        reason: ResolutionFailure,
    },

    /// An enumerated attribute has no channel through which it can be written.
    #[error("attribute `{attribute}` of {entity} cannot be written by any mechanism")]
    AttributeWrite {
        /// Type name of the entity.
        entity: &'static str,
        /// Name of the attribute that could not be written.
        attribute: &'static str,
    },

    /// A value of the wrong type was supplied for an attribute.
    #[error("attribute `{attribute}` of {entity} holds `{expected}`, got `{found}`")]
    TypeMismatch {
        /// Type name of the entity.
        entity: &'static str,
        /// Name of the targeted attribute.
        attribute: &'static str,
        /// Resolved type of the attribute.
        expected: &'static str,
        /// Type of the supplied value.
        found: &'static str,
    },
}

impl EntityError {
    /// Returns `true` if the error was raised before any instance was allocated.
    #[must_use]
    pub const fn is_pre_allocation(&self) -> bool {
        !matches!(self, Self::AttributeWrite { .. })
    }
}

/// The reason an accessor failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionFailure {
    /// The accessor text is empty.
    Empty,
    /// The accessor is a literal value.
    Literal,
    /// The accessor names a path deeper than one member.
    NestedPath,
    /// The accessor indexes a tuple field instead of naming an attribute.
    TupleIndex,
    /// The accessor calls a method instead of naming an attribute.
    MethodCall,
    /// The accessor is an expression built from operators or several terms.
    ComputedExpression,
    /// The closure body does not start from the closure parameter.
    ForeignReceiver,
    /// No attribute of the entity has this name.
    UnknownAttribute,
    /// More than one attribute of the entity has this name.
    Ambiguous,
}

impl std::fmt::Display for ResolutionFailure {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::Empty => "expression is empty",
            Self::Literal => "expression is a literal",
            Self::NestedPath => "expression is a nested path",
            Self::TupleIndex => "expression is a tuple index",
            Self::MethodCall => "expression is a method call",
            Self::ComputedExpression => "expression is computed, not a member access",
            Self::ForeignReceiver => "member is not accessed on the closure parameter",
            Self::UnknownAttribute => "no attribute with this name",
            Self::Ambiguous => "several attributes share this name",
        };
        formatter.write_str(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_write_display() {
        let error = EntityError::AttributeWrite {
            entity: "Person",
            attribute: "age",
        };
        assert_eq!(
            format!("{error}"),
            "attribute `age` of Person cannot be written by any mechanism"
        );
    }

    #[test]
    fn test_type_mismatch_display() {
        let error = EntityError::TypeMismatch {
            entity: "Person",
            attribute: "age",
            expected: "u32",
            found: "&str",
        };
        assert_eq!(
            format!("{error}"),
            "attribute `age` of Person holds `u32`, got `&str`"
        );
    }

    #[test]
    fn test_configuration_display() {
        let error = EntityError::Configuration { expected: "Person" };
        assert_eq!(
            format!("{error}"),
            "receiver cannot stand in for Person in direct mode"
        );
    }

    #[test]
    fn test_pre_allocation_classification() {
        assert!(EntityError::Configuration { expected: "Person" }.is_pre_allocation());
        assert!(
            EntityError::AccessorResolution {
                entity: "Person",
                expression: "1".to_string(),
                reason: ResolutionFailure::Literal,
            }
            .is_pre_allocation()
        );
        assert!(
            !EntityError::AttributeWrite {
                entity: "Person",
                attribute: "age",
            }
            .is_pre_allocation()
        );
    }

    #[test]
    fn test_resolution_failure_display() {
        assert_eq!(
            ResolutionFailure::NestedPath.to_string(),
            "expression is a nested path"
        );
        assert_eq!(
            ResolutionFailure::MethodCall.to_string(),
            "expression is a method call"
        );
        assert_eq!(
            ResolutionFailure::TupleIndex.to_string(),
            "expression is a tuple index"
        );
    }
}
