// Copyright 2025 Cowboy AI, LLC.

//! The composition registry
//!
//! [`CompositionRegistry`] owns every material and product of a catalog and
//! keeps them in one namespace: a name denotes at most one component, either
//! a material or a product. Products are only ever committed after their
//! whole part list has been validated against the current graph.
//!
//! [`SharedRegistry`] is the handle to hand to request handlers and tests. It
//! serializes every mutation, including the cycle check it runs, behind a
//! single lock.

use crate::component::{Component, ComponentKind, Material, Part, Product};
use crate::composition::{CompositionGraph, PartListDraft};
use crate::config::{RegistryConfig, RemovalPolicy, UnresolvedPartPolicy};
use crate::errors::{CompositionError, CompositionResult};
use crate::identifiers::ComponentName;
use crate::pricing::{self, BillOfMaterials, PricedGraph};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// In-memory catalog of materials and products
///
/// # Examples
///
/// ```rust
/// use cim_partslist::CompositionRegistry;
///
/// let mut registry = CompositionRegistry::new();
/// registry.create_material("bolt", 1).unwrap();
/// registry.create_material("nut", 2).unwrap();
/// registry
///     .create_product("bracket", 10, &[("bolt", 4), ("nut", 2)])
///     .unwrap();
/// registry.create_product("assembly", 20, &[("bracket", 1)]).unwrap();
///
/// // bracket may not be redefined to contain assembly, which contains bracket
/// let err = registry
///     .create_product("bracket", 10, &[("assembly", 1)])
///     .unwrap_err();
/// assert!(err.is_cyclic_structure());
/// assert_eq!(registry.aggregate_price("bracket").unwrap(), 18);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompositionRegistry {
    materials: IndexMap<ComponentName, Material>,
    products: IndexMap<ComponentName, Product>,
    config: RegistryConfig,
}

impl CompositionRegistry {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a material, overwriting any material of the same name
    ///
    /// An overwritten material keeps its position in [`Self::get_materials`].
    ///
    /// # Errors
    ///
    /// [`CompositionError::NameConflict`] if a product holds the name.
    pub fn create_material(&mut self, name: impl AsRef<str>, price: u64) -> CompositionResult<Material> {
        let name = ComponentName::new(name)?;
        self.ensure_free_of(&name, ComponentKind::Product)?;

        let material = Material::new(name.clone(), price);
        let replaced = self.materials.insert(name.clone(), material.clone()).is_some();
        info!(material = %name, price, replaced, "material stored");
        Ok(material)
    }

    /// Create a product from `(component name, amount)` pairs
    ///
    /// All parts are validated before anything is stored. If any part is
    /// rejected the registry is left exactly as it was, including any earlier
    /// product of the same name. On success the product is inserted, or
    /// replaces the earlier product in place.
    ///
    /// # Errors
    ///
    /// * [`CompositionError::NameConflict`] if a material holds the name
    /// * [`CompositionError::InvalidAmount`] for an amount of zero
    /// * [`CompositionError::UnresolvedComponent`] for an unknown part name,
    ///   unless the configuration skips those
    /// * [`CompositionError::CyclicStructure`] if a part contains the product
    pub fn create_product<S: AsRef<str>>(
        &mut self,
        name: impl AsRef<str>,
        price: u64,
        parts: &[(S, u32)],
    ) -> CompositionResult<Product> {
        let name = ComponentName::new(name)?;
        self.ensure_free_of(&name, ComponentKind::Material)?;

        let parts = self
            .stage_parts(&name, parts)
            .inspect_err(|err| warn!(product = %name, error = %err, "product rejected"))?;

        let product = Product::with_parts(name.clone(), price, parts);
        let replaced = self.products.insert(name.clone(), product.clone()).is_some();
        info!(
            product = %name,
            price,
            parts = product.parts().len(),
            replaced,
            "product stored"
        );
        Ok(product)
    }

    fn stage_parts<S: AsRef<str>>(
        &self,
        product: &ComponentName,
        parts: &[(S, u32)],
    ) -> CompositionResult<Vec<Part>> {
        let mut draft = PartListDraft::new(product.clone());
        for (component, amount) in parts {
            let component = ComponentName::new(component)?;
            if self.config.unresolved_parts == UnresolvedPartPolicy::Skip
                && &component != product
                && !self.contains(component.as_str())
            {
                warn!(product = %product, part = %component, "skipping unresolved part");
                continue;
            }
            draft.attach(self, component, *amount)?;
        }
        Ok(draft.into_parts())
    }

    fn ensure_free_of(&self, name: &ComponentName, kind: ComponentKind) -> CompositionResult<()> {
        let taken = match kind {
            ComponentKind::Material => self.materials.contains_key(name.as_str()),
            ComponentKind::Product => self.products.contains_key(name.as_str()),
        };
        if taken {
            warn!(name = %name, existing = %kind, "name already used by other component kind");
            return Err(CompositionError::NameConflict {
                name: name.clone(),
                existing: kind,
            });
        }
        Ok(())
    }

    /// Look up a component; products take precedence over materials
    pub fn get_component(&self, name: &str) -> Option<Component> {
        self.products
            .get(name)
            .cloned()
            .map(Component::Product)
            .or_else(|| self.materials.get(name).cloned().map(Component::Material))
    }

    /// Look up a material
    pub fn get_material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// All materials in insertion order
    pub fn get_materials(&self) -> Vec<Material> {
        self.materials.values().cloned().collect()
    }

    /// Whether a material of that name exists
    pub fn contains_material(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// Remove a material, returning it if it existed
    ///
    /// With [`RemovalPolicy::AllowDangling`] products that use the material
    /// keep their parts, which then no longer resolve.
    pub fn remove_material(&mut self, name: &str) -> CompositionResult<Option<Material>> {
        if !self.materials.contains_key(name) {
            debug!(material = name, "nothing to remove");
            return Ok(None);
        }
        self.check_removal(name, self.config.material_removal)?;
        let removed = self.materials.shift_remove(name);
        info!(material = name, "material removed");
        Ok(removed)
    }

    /// Look up a product
    pub fn get_product(&self, name: &str) -> Option<&Product> {
        self.products.get(name)
    }

    /// All products in insertion order
    pub fn get_products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    /// Whether a product of that name exists
    pub fn contains_product(&self, name: &str) -> bool {
        self.products.contains_key(name)
    }

    /// Remove a product, returning it if it existed
    pub fn remove_product(&mut self, name: &str) -> CompositionResult<Option<Product>> {
        if !self.products.contains_key(name) {
            debug!(product = name, "nothing to remove");
            return Ok(None);
        }
        self.check_removal(name, self.config.product_removal)?;
        let removed = self.products.shift_remove(name);
        info!(product = name, "product removed");
        Ok(removed)
    }

    fn check_removal(&self, name: &str, policy: RemovalPolicy) -> CompositionResult<()> {
        let referenced_by = self.referencing_products(name);
        if referenced_by.is_empty() {
            return Ok(());
        }
        match policy {
            RemovalPolicy::AllowDangling => {
                warn!(component = name, referenced_by = ?referenced_by, "removing component still in use");
                Ok(())
            }
            RemovalPolicy::BlockWhileReferenced => Err(CompositionError::ComponentInUse {
                name: ComponentName::new(name)?,
                referenced_by: referenced_by.into_iter().map(String::from).collect(),
            }),
        }
    }

    /// Names of the products with a part on `name`, sorted
    pub fn referencing_products(&self, name: &str) -> Vec<ComponentName> {
        let mut names: Vec<ComponentName> = self
            .products
            .values()
            .filter(|p| p.references(name))
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    }

    /// All components sorted by name
    pub fn get_components(&self) -> Vec<Component> {
        let mut components: Vec<Component> = self
            .materials
            .values()
            .cloned()
            .map(Component::Material)
            .chain(self.products.values().cloned().map(Component::Product))
            .collect();
        components.sort_by(|a, b| a.name().cmp(b.name()));
        components
    }

    /// Names of all components, sorted
    pub fn get_component_names(&self) -> Vec<ComponentName> {
        let mut names: Vec<ComponentName> = self
            .materials
            .keys()
            .chain(self.products.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Names of all products, sorted
    pub fn get_product_names(&self) -> Vec<ComponentName> {
        let mut names: Vec<ComponentName> = self.products.keys().cloned().collect();
        names.sort();
        names
    }

    /// Own price plus the weighted aggregate prices of all parts
    pub fn aggregate_price(&self, name: &str) -> CompositionResult<u64> {
        pricing::aggregate_price(self, &ComponentName::new(name)?)
    }

    /// Quantity of every material needed for one unit of `name`
    pub fn bill_of_materials(&self, name: &str) -> CompositionResult<BillOfMaterials> {
        pricing::bill_of_materials(self, &ComponentName::new(name)?)
    }

    /// Remove every component
    pub fn clear(&mut self) {
        self.materials.clear();
        self.products.clear();
        info!("registry cleared");
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.materials.len() + self.products.len()
    }

    /// Whether the registry holds no components
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.products.is_empty()
    }

    pub(crate) fn insert_validated_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub(crate) fn insert_validated_product(&mut self, product: Product) {
        self.products.insert(product.name.clone(), product);
    }
}

impl CompositionGraph for CompositionRegistry {
    fn contains(&self, name: &str) -> bool {
        self.products.contains_key(name) || self.materials.contains_key(name)
    }

    fn parts_of(&self, name: &str) -> Option<&[Part]> {
        self.products.get(name).map(Product::parts)
    }
}

impl PricedGraph for CompositionRegistry {
    fn own_price(&self, name: &str) -> Option<u64> {
        self.products
            .get(name)
            .map(|p| p.price)
            .or_else(|| self.materials.get(name).map(|m| m.price))
    }
}

/// Shared, lock-guarded handle to a [`CompositionRegistry`]
///
/// Cloning the handle shares the registry. Reads run concurrently; a write
/// holds the lock for the whole mutation, so a cycle check and the insert it
/// guards are atomic.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<CompositionRegistry>>,
}

impl SharedRegistry {
    /// Wrap a registry
    pub fn new(registry: CompositionRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Create an empty shared registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::new(CompositionRegistry::with_config(config))
    }

    /// Run `f` under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&CompositionRegistry) -> R) -> CompositionResult<R> {
        let guard = self
            .inner
            .read()
            .map_err(|e| CompositionError::LockPoisoned(e.to_string()))?;
        Ok(f(&guard))
    }

    /// Run `f` under the write lock
    pub fn write<R>(&self, f: impl FnOnce(&mut CompositionRegistry) -> R) -> CompositionResult<R> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| CompositionError::LockPoisoned(e.to_string()))?;
        Ok(f(&mut guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> ComponentName {
        ComponentName::new(s).unwrap()
    }

    fn names(list: &[ComponentName]) -> Vec<&str> {
        list.iter().map(ComponentName::as_str).collect()
    }

    fn bracket_catalog() -> CompositionRegistry {
        let mut registry = CompositionRegistry::new();
        registry.create_material("bolt", 1).unwrap();
        registry.create_material("nut", 2).unwrap();
        registry
            .create_product("bracket", 10, &[("bolt", 4), ("nut", 2)])
            .unwrap();
        registry
            .create_product("assembly", 20, &[("bracket", 1)])
            .unwrap();
        registry
    }

    #[test]
    fn test_create_and_fetch_material() {
        let mut registry = CompositionRegistry::new();
        let created = registry.create_material("m", 5).unwrap();
        assert_eq!(registry.get_material("m"), Some(&created));
        assert!(registry.contains_material("m"));
        assert!(!registry.contains_product("m"));
    }

    #[test]
    fn test_material_overwrite_keeps_position() {
        let mut registry = CompositionRegistry::new();
        registry.create_material("m", 5).unwrap();
        registry.create_material("k", 1).unwrap();
        registry.create_material("m", 9).unwrap();

        assert_eq!(registry.get_material("m").unwrap().price, 9);
        let order: Vec<String> = registry
            .get_materials()
            .into_iter()
            .map(|m| m.name.into())
            .collect();
        assert_eq!(order, vec!["m", "k"]);
    }

    #[test]
    fn test_bracket_scenario() {
        let mut registry = bracket_catalog();

        let Some(Component::Product(bracket)) = registry.get_component("bracket") else {
            panic!("bracket should be a product");
        };
        assert_eq!(
            bracket.parts(),
            &[Part::new(name("bolt"), 4), Part::new(name("nut"), 2)]
        );

        let before = registry.get_components();
        let err = registry
            .create_product("bracket", 10, &[("assembly", 1)])
            .unwrap_err();
        assert_eq!(
            err,
            CompositionError::CyclicStructure {
                product: name("bracket"),
                through: name("assembly"),
            }
        );
        assert_eq!(registry.get_components(), before);
    }

    #[test]
    fn test_failure_on_later_part_leaves_existing_product() {
        let mut registry = bracket_catalog();
        let err = registry
            .create_product("bracket", 99, &[("nut", 1), ("bolt", 1), ("assembly", 2)])
            .unwrap_err();
        assert!(err.is_cyclic_structure());

        let bracket = registry.get_product("bracket").unwrap();
        assert_eq!(bracket.price, 10);
        assert_eq!(bracket.parts().len(), 2);
    }

    #[test]
    fn test_unresolved_part_aborts_creation() {
        let mut registry = bracket_catalog();
        let err = registry
            .create_product("hinge", 3, &[("bolt", 1), ("pin", 1)])
            .unwrap_err();
        assert_eq!(err, CompositionError::UnresolvedComponent(name("pin")));
        assert!(registry.get_component("hinge").is_none());
    }

    #[test]
    fn test_unresolved_part_skipped_when_configured() {
        let config = RegistryConfig {
            unresolved_parts: UnresolvedPartPolicy::Skip,
            ..RegistryConfig::default()
        };
        let mut registry = CompositionRegistry::with_config(config);
        registry.create_material("bolt", 1).unwrap();

        let hinge = registry
            .create_product("hinge", 3, &[("pin", 1), ("bolt", 2)])
            .unwrap();
        assert_eq!(hinge.parts(), &[Part::new(name("bolt"), 2)]);

        // a self reference is still a cycle, not an unresolved part
        let err = registry
            .create_product("latch", 1, &[("latch", 1)])
            .unwrap_err();
        assert!(err.is_cyclic_structure());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut registry = bracket_catalog();
        let err = registry
            .create_product("hinge", 3, &[("bolt", 0)])
            .unwrap_err();
        assert!(err.is_validation_error());
        assert!(registry.get_product("hinge").is_none());
    }

    #[test]
    fn test_names_are_shared_across_kinds() {
        let mut registry = bracket_catalog();

        let err = registry.create_material("bracket", 1).unwrap_err();
        assert_eq!(
            err,
            CompositionError::NameConflict {
                name: name("bracket"),
                existing: ComponentKind::Product,
            }
        );
        assert_eq!(registry.get_component("bracket").unwrap().kind(), ComponentKind::Product);

        let err = registry.create_product("bolt", 1, &[("nut", 1)]).unwrap_err();
        assert!(matches!(
            err,
            CompositionError::NameConflict { existing: ComponentKind::Material, .. }
        ));
        assert!(registry.get_product("bolt").is_none());
    }

    #[test]
    fn test_sorted_listings() {
        let mut registry = CompositionRegistry::new();
        registry.create_material("zinc", 1).unwrap();
        registry.create_material("axle", 1).unwrap();
        registry.create_product("wheel", 4, &[("axle", 1)]).unwrap();
        registry.create_product("cart", 9, &[("wheel", 4)]).unwrap();

        assert_eq!(
            names(&registry.get_component_names()),
            vec!["axle", "cart", "wheel", "zinc"]
        );
        assert_eq!(names(&registry.get_product_names()), vec!["cart", "wheel"]);
        let components: Vec<String> = registry
            .get_components()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(components, vec!["axle", "cart", "wheel", "zinc"]);
    }

    #[test]
    fn test_remove_material_dangles_by_default() {
        let mut registry = bracket_catalog();
        assert_eq!(registry.remove_material("nonexistent").unwrap(), None);

        let removed = registry.remove_material("nut").unwrap().unwrap();
        assert_eq!(removed.price, 2);
        assert!(registry.get_product("bracket").unwrap().references("nut"));

        let err = registry.aggregate_price("bracket").unwrap_err();
        assert_eq!(err, CompositionError::UnresolvedComponent(name("nut")));

        // the dangling part resolves again once the material is back
        registry.create_material("nut", 3).unwrap();
        assert_eq!(registry.aggregate_price("bracket").unwrap(), 20);
    }

    #[test]
    fn test_remove_material_blocked_when_strict() {
        let mut registry = CompositionRegistry::with_config(RegistryConfig::strict());
        registry.create_material("bolt", 1).unwrap();
        registry.create_product("bracket", 10, &[("bolt", 4)]).unwrap();

        let err = registry.remove_material("bolt").unwrap_err();
        assert_eq!(
            err,
            CompositionError::ComponentInUse {
                name: name("bolt"),
                referenced_by: vec!["bracket".to_string()],
            }
        );
        assert!(registry.contains_material("bolt"));
    }

    #[test]
    fn test_remove_product() {
        let mut registry = bracket_catalog();
        let err = registry.remove_product("bracket").unwrap_err();
        assert!(err.is_conflict());

        let assembly = registry.remove_product("assembly").unwrap().unwrap();
        assert_eq!(assembly.price, 20);
        assert!(registry.remove_product("bracket").unwrap().is_some());
        assert!(registry.get_product_names().is_empty());
    }

    #[test]
    fn test_dangling_name_cannot_become_cycle() {
        let mut registry = bracket_catalog();
        registry.remove_material("nut").unwrap();

        // bracket still references "nut"; a product named nut containing
        // bracket would contain itself
        let err = registry
            .create_product("nut", 1, &[("bracket", 1)])
            .unwrap_err();
        assert!(err.is_cyclic_structure());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut registry = bracket_catalog();
        registry.clear();
        assert!(registry.is_empty());
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_referencing_products() {
        let registry = bracket_catalog();
        assert_eq!(names(&registry.referencing_products("bolt")), vec!["bracket"]);
        assert_eq!(names(&registry.referencing_products("bracket")), vec!["assembly"]);
        assert!(registry.referencing_products("assembly").is_empty());
    }

    #[test]
    fn test_shared_registry_read_write() {
        let shared = SharedRegistry::default();
        let other = shared.clone();

        shared
            .write(|r| r.create_material("bolt", 1))
            .unwrap()
            .unwrap();
        let price = other
            .read(|r| r.get_material("bolt").map(|m| m.price))
            .unwrap();
        assert_eq!(price, Some(1));
    }
}
