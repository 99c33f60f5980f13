// Copyright 2025 Cowboy AI, LLC.

//! Serializable catalog snapshots
//!
//! A snapshot is a plain listing of materials and products. Loading one
//! never trusts it: names, amounts and acyclicity are checked again while the
//! registry is rebuilt, and products are inserted only after everything they
//! reference.

use crate::component::{ComponentKind, Material, Part, Product};
use crate::composition::{check_acyclic, CompositionGraph};
use crate::config::{RegistryConfig, RemovalPolicy};
use crate::errors::{CompositionError, CompositionResult};
use crate::registry::CompositionRegistry;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Point-in-time export of a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Materials in insertion order
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Products in insertion order
    #[serde(default)]
    pub products: Vec<Product>,
}

impl CatalogSnapshot {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> CompositionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON without validating the catalog
    pub fn from_json(json: &str) -> CompositionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild a registry, checking every catalog invariant
    ///
    /// Parts naming components absent from the snapshot are accepted only
    /// when `config` allows dangling material references.
    pub fn into_registry(self, config: RegistryConfig) -> CompositionResult<CompositionRegistry> {
        let mut registry = CompositionRegistry::with_config(config);
        let allow_dangling = config.material_removal == RemovalPolicy::AllowDangling;

        for material in self.materials {
            if registry.contains_material(material.name.as_str()) {
                return Err(CompositionError::AlreadyExists(material.name));
            }
            registry.insert_validated_material(material);
        }

        let mut pending_names: HashSet<String> = HashSet::new();
        for product in &self.products {
            if registry.contains_material(product.name.as_str()) {
                return Err(CompositionError::NameConflict {
                    name: product.name.clone(),
                    existing: ComponentKind::Material,
                });
            }
            if !pending_names.insert(product.name.to_string()) {
                return Err(CompositionError::AlreadyExists(product.name.clone()));
            }
        }

        let mut pending = self.products;
        while !pending.is_empty() {
            let (ready, blocked): (Vec<Product>, Vec<Product>) = pending.into_iter().partition(|p| {
                p.parts()
                    .iter()
                    .all(|part| !pending_names.contains(part.component.as_str()))
            });

            if ready.is_empty() {
                return Err(cycle_in(&blocked, &pending_names));
            }

            for product in ready {
                validate_restored_parts(&registry, &product, allow_dangling)?;
                pending_names.remove(product.name.as_str());
                registry.insert_validated_product(product);
            }
            pending = blocked;
        }

        info!(components = registry.len(), "catalog restored from snapshot");
        Ok(registry)
    }
}

fn validate_restored_parts(
    registry: &CompositionRegistry,
    product: &Product,
    allow_dangling: bool,
) -> CompositionResult<()> {
    for Part { component, amount } in product.parts() {
        if *amount == 0 {
            return Err(CompositionError::InvalidAmount {
                component: component.clone(),
                amount: *amount,
            });
        }
        if !registry.contains(component.as_str()) {
            if allow_dangling {
                debug!(product = %product.name, part = %component, "restoring dangling part");
                continue;
            }
            return Err(CompositionError::UnresolvedComponent(component.clone()));
        }
        check_acyclic(registry, &product.name, component)?;
    }
    Ok(())
}

/// Every blocked product waits on another blocked product, so they form at
/// least one cycle; report the first blocked product and its blocking part.
fn cycle_in(blocked: &[Product], pending_names: &HashSet<String>) -> CompositionError {
    let product = &blocked[0];
    let through = product
        .parts()
        .iter()
        .find(|part| pending_names.contains(part.component.as_str()))
        .map(|part| part.component.clone())
        .unwrap_or_else(|| product.name.clone());
    CompositionError::CyclicStructure {
        product: product.name.clone(),
        through,
    }
}

impl CompositionRegistry {
    /// Export every component
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            taken_at: Utc::now(),
            materials: self.get_materials(),
            products: self.get_products(),
        }
    }

    /// Replace the contents with a validated snapshot
    ///
    /// The current contents stay untouched if the snapshot is rejected.
    pub fn restore(&mut self, snapshot: CatalogSnapshot) -> CompositionResult<()> {
        *self = snapshot.into_registry(*self.config())?;
        Ok(())
    }
}
