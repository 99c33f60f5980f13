// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for catalog components

use crate::errors::{CompositionError, CompositionResult};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a material or product
///
/// Names are the stable keys of the catalog namespace. Parts refer to the
/// components they use by name, so replacing a component under the same name
/// is visible to every product that references it.
///
/// # Examples
///
/// ```rust
/// use cim_partslist::ComponentName;
///
/// let name = ComponentName::new("bolt M8").unwrap();
/// assert_eq!(name.as_str(), "bolt M8");
///
/// assert!(ComponentName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentName(String);

impl ComponentName {
    /// Create a name, kept exactly as given
    ///
    /// Lookups take the raw `&str`, so the stored key must not differ from
    /// the name the caller passed in.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::InvalidName`] if the name is empty or only
    /// whitespace
    pub fn new(name: impl AsRef<str>) -> CompositionResult<Self> {
        let raw = name.as_ref();
        if raw.trim().is_empty() {
            return Err(CompositionError::InvalidName(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ComponentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ComponentName {
    type Error = CompositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ComponentName {
    type Error = CompositionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ComponentName> for String {
    fn from(name: ComponentName) -> Self {
        name.0
    }
}

impl PartialEq<str> for ComponentName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ComponentName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl JsonSchema for ComponentName {
    fn schema_name() -> String {
        "ComponentName".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}
