// Copyright 2025 Cowboy AI, LLC.

//! Catalog service
//!
//! The operations a request-handling layer calls. Each call takes the
//! registry lock once, so checks such as "does this name exist" and the
//! mutation depending on them cannot interleave with another writer.

use crate::component::{Component, Material, Product};
use crate::errors::{CompositionError, CompositionResult};
use crate::identifiers::ComponentName;
use crate::pricing::BillOfMaterials;
use crate::registry::SharedRegistry;
use crate::snapshot::CatalogSnapshot;

/// Outcome of a create-or-replace call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
    /// Whether an existing component was replaced
    pub replaced: bool,
    /// Stored component
    pub value: T,
}

/// Entry point for catalog operations
#[derive(Debug, Clone, Default)]
pub struct CatalogService {
    registry: SharedRegistry,
}

impl CatalogService {
    /// Create a service over a shared registry
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Registry handle
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Create a material whose name must not be in use
    ///
    /// # Errors
    ///
    /// [`CompositionError::AlreadyExists`] if any component holds the name.
    pub fn create_material(&self, name: &str, price: u64) -> CompositionResult<Material> {
        let name = ComponentName::new(name)?;
        self.registry.write(|r| {
            if r.get_component(name.as_str()).is_some() {
                return Err(CompositionError::AlreadyExists(name.clone()));
            }
            r.create_material(&name, price)
        })?
    }

    /// Fetch a material
    pub fn fetch_material(&self, name: &str) -> CompositionResult<Option<Material>> {
        self.registry.read(|r| r.get_material(name).cloned())
    }

    /// All materials in insertion order
    pub fn list_materials(&self) -> CompositionResult<Vec<Material>> {
        self.registry.read(|r| r.get_materials())
    }

    /// Create a material or replace the one of the same name
    pub fn create_or_replace_material(
        &self,
        name: &str,
        price: u64,
    ) -> CompositionResult<Upserted<Material>> {
        self.registry.write(|r| {
            let replaced = r.contains_material(name);
            let value = r.create_material(name, price)?;
            Ok(Upserted { replaced, value })
        })?
    }

    /// Remove a material, returning it if it existed
    pub fn remove_material(&self, name: &str) -> CompositionResult<Option<Material>> {
        self.registry.write(|r| r.remove_material(name))?
    }

    /// Create a product, replacing any product of the same name
    pub fn create_product<S: AsRef<str>>(
        &self,
        name: &str,
        price: u64,
        parts: &[(S, u32)],
    ) -> CompositionResult<Product> {
        self.registry.write(|r| r.create_product(name, price, parts))?
    }

    /// Create a product whose name must not be in use
    pub fn create_new_product<S: AsRef<str>>(
        &self,
        name: &str,
        price: u64,
        parts: &[(S, u32)],
    ) -> CompositionResult<Product> {
        let name = ComponentName::new(name)?;
        self.registry.write(|r| {
            if r.get_component(name.as_str()).is_some() {
                return Err(CompositionError::AlreadyExists(name.clone()));
            }
            r.create_product(&name, price, parts)
        })?
    }

    /// Fetch a product
    pub fn fetch_product(&self, name: &str) -> CompositionResult<Option<Product>> {
        self.registry.read(|r| r.get_product(name).cloned())
    }

    /// Remove a product, returning it if it existed
    pub fn remove_product(&self, name: &str) -> CompositionResult<Option<Product>> {
        self.registry.write(|r| r.remove_product(name))?
    }

    /// Look up any component; products win on a name collision
    pub fn lookup_component(&self, name: &str) -> CompositionResult<Option<Component>> {
        self.registry.read(|r| r.get_component(name))
    }

    /// Names of all components, sorted
    pub fn list_component_names(&self) -> CompositionResult<Vec<ComponentName>> {
        self.registry.read(|r| r.get_component_names())
    }

    /// Names of all products, sorted
    pub fn list_product_names(&self) -> CompositionResult<Vec<ComponentName>> {
        self.registry.read(|r| r.get_product_names())
    }

    /// Aggregate price of a component
    pub fn aggregate_price(&self, name: &str) -> CompositionResult<u64> {
        self.registry.read(|r| r.aggregate_price(name))?
    }

    /// Materials needed for one unit of a component
    pub fn bill_of_materials(&self, name: &str) -> CompositionResult<BillOfMaterials> {
        self.registry.read(|r| r.bill_of_materials(name))?
    }

    /// Export the catalog
    pub fn snapshot(&self) -> CompositionResult<CatalogSnapshot> {
        self.registry.read(|r| r.snapshot())
    }

    /// Replace the catalog with a validated snapshot
    pub fn restore(&self, snapshot: CatalogSnapshot) -> CompositionResult<()> {
        self.registry.write(|r| r.restore(snapshot))?
    }

    /// Remove every component
    pub fn clear(&self) -> CompositionResult<()> {
        self.registry.write(|r| r.clear())
    }
}
