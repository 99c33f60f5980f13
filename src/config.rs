// Copyright 2025 Cowboy AI, LLC.

//! Registry configuration
//!
//! Policies for the situations where a parts catalog has more than one
//! reasonable answer: parts naming unknown components, and removal of
//! components that products still use.

use crate::errors::CompositionResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What to do with a part that names a component not in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPartPolicy {
    /// Abort the whole product creation
    #[default]
    Reject,
    /// Drop the part and keep going
    Skip,
}

/// How removal treats components that products still reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Remove anyway; referencing parts keep the name and dangle
    AllowDangling,
    /// Refuse while any product references the component
    BlockWhileReferenced,
}

/// Configuration for a [`crate::CompositionRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RegistryConfig {
    /// Handling of parts naming unknown components
    pub unresolved_parts: UnresolvedPartPolicy,
    /// Removal of materials still used as parts
    pub material_removal: RemovalPolicy,
    /// Removal of products still used as parts
    pub product_removal: RemovalPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            unresolved_parts: UnresolvedPartPolicy::Reject,
            material_removal: RemovalPolicy::AllowDangling,
            product_removal: RemovalPolicy::BlockWhileReferenced,
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> CompositionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configuration that refuses every removal that would leave a dangling part
    pub fn strict() -> Self {
        Self {
            material_removal: RemovalPolicy::BlockWhileReferenced,
            ..Self::default()
        }
    }
}
