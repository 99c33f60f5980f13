// Copyright 2025 Cowboy AI, LLC.

//! Error types for composition registry operations

use crate::component::ComponentKind;
use crate::identifiers::ComponentName;
use thiserror::Error;

/// Errors that can occur while building or mutating the parts catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Attaching a part would make a product contain itself
    #[error("Cyclic structure: product {product} would contain itself through {through}")]
    CyclicStructure {
        /// Product whose composition was rejected
        product: ComponentName,
        /// Part that closes the cycle
        through: ComponentName,
    },

    /// A part names a component that is not in the catalog
    #[error("Unresolved component reference: {0}")]
    UnresolvedComponent(ComponentName),

    /// A part was requested with a quantity below one
    #[error("Invalid amount {amount} for component {component}")]
    InvalidAmount {
        /// Component the amount was given for
        component: ComponentName,
        /// Rejected amount
        amount: u32,
    },

    /// A component name was empty or blank
    #[error("Invalid component name: {0:?}")]
    InvalidName(String),

    /// The name is already held by a component of the other kind
    #[error("Name conflict: {name} is already registered as a {existing}")]
    NameConflict {
        /// Contested name
        name: ComponentName,
        /// Kind of the component holding the name
        existing: ComponentKind,
    },

    /// Strict creation of a component whose name is taken
    #[error("Already exists: {0}")]
    AlreadyExists(ComponentName),

    /// Component not found
    #[error("Not found: {0}")]
    NotFound(ComponentName),

    /// Removal blocked because products still reference the component
    #[error("Component {name} is still referenced by {}", .referenced_by.join(", "))]
    ComponentInUse {
        /// Component that was asked to be removed
        name: ComponentName,
        /// Names of the products holding a part on it
        referenced_by: Vec<String>,
    },

    /// An aggregate price or quantity does not fit in a u64
    #[error("Arithmetic overflow while aggregating {0}")]
    AggregateOverflow(ComponentName),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A thread panicked while holding the registry lock
    #[error("Registry lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for composition operations
pub type CompositionResult<T> = Result<T, CompositionError>;

impl From<serde_json::Error> for CompositionError {
    fn from(err: serde_json::Error) -> Self {
        CompositionError::SerializationError(err.to_string())
    }
}

impl CompositionError {
    /// Check if this is a cyclic structure error
    pub fn is_cyclic_structure(&self) -> bool {
        matches!(self, CompositionError::CyclicStructure { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CompositionError::NotFound(_) | CompositionError::UnresolvedComponent(_)
        )
    }

    /// Check if this error reports a clash on an existing name
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CompositionError::NameConflict { .. }
                | CompositionError::AlreadyExists(_)
                | CompositionError::ComponentInUse { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CompositionError::InvalidAmount { .. } | CompositionError::InvalidName(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ComponentName {
        ComponentName::new(s).unwrap()
    }

    /// Test error creation and display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[CompositionError] -->|Display| B[Error Message]
    ///     A -->|Clone| C[Cloned Error]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = CompositionError::CyclicStructure {
            product: name("bracket"),
            through: name("assembly"),
        };
        assert_eq!(
            err.to_string(),
            "Cyclic structure: product bracket would contain itself through assembly"
        );

        let err = CompositionError::UnresolvedComponent(name("washer"));
        assert_eq!(err.to_string(), "Unresolved component reference: washer");

        let err = CompositionError::InvalidAmount {
            component: name("bolt"),
            amount: 0,
        };
        assert_eq!(err.to_string(), "Invalid amount 0 for component bolt");

        let err = CompositionError::InvalidName("  ".to_string());
        assert_eq!(err.to_string(), "Invalid component name: \"  \"");

        let err = CompositionError::NameConflict {
            name: name("bolt"),
            existing: ComponentKind::Material,
        };
        assert_eq!(
            err.to_string(),
            "Name conflict: bolt is already registered as a material"
        );

        let err = CompositionError::ComponentInUse {
            name: name("bolt"),
            referenced_by: vec!["bracket".to_string(), "hinge".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Component bolt is still referenced by bracket, hinge"
        );

        let err = CompositionError::AggregateOverflow(name("rocket"));
        assert_eq!(err.to_string(), "Arithmetic overflow while aggregating rocket");
    }

    #[test]
    fn test_helper_method_exclusivity() {
        let cyclic = CompositionError::CyclicStructure {
            product: name("a"),
            through: name("b"),
        };
        assert!(cyclic.is_cyclic_structure());
        assert!(!cyclic.is_not_found());
        assert!(!cyclic.is_conflict());
        assert!(!cyclic.is_validation_error());

        let unresolved = CompositionError::UnresolvedComponent(name("a"));
        assert!(unresolved.is_not_found());
        assert!(!unresolved.is_cyclic_structure());

        let exists = CompositionError::AlreadyExists(name("a"));
        assert!(exists.is_conflict());
        assert!(!exists.is_validation_error());

        let amount = CompositionError::InvalidAmount {
            component: name("a"),
            amount: 0,
        };
        assert!(amount.is_validation_error());
        assert!(!amount.is_conflict());
    }

    /// Test serde_json error conversion
    #[test]
    fn test_serde_json_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let err: CompositionError = serde_err.into();

        match err {
            CompositionError::SerializationError(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected SerializationError, got {other:?}"),
        }
    }

    #[test]
    fn test_error_clone() {
        let original = CompositionError::NotFound(name("nut"));
        let cloned = original.clone();
        assert_eq!(original, cloned);
    }
}
