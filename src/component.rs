// Copyright 2025 Cowboy AI, LLC.

//! Catalog components: materials, products and their parts
//!
//! A [`Component`] is either a [`Material`], a priced leaf, or a [`Product`],
//! a priced composite holding an ordered list of [`Part`]s. Parts refer to
//! other components by name; the registry resolves them on use.

use crate::composition::{self, CompositionGraph};
use crate::errors::CompositionResult;
use crate::identifiers::ComponentName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates the two kinds of catalog components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Indivisible leaf
    Material,
    /// Composite built from parts
    Product,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Material => write!(f, "material"),
            ComponentKind::Product => write!(f, "product"),
        }
    }
}

/// An indivisible material with a unit price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Material {
    /// Catalog name
    pub name: ComponentName,
    /// Unit price
    pub price: u64,
}

impl Material {
    /// Create a new material
    pub fn new(name: ComponentName, price: u64) -> Self {
        Self { name, price }
    }
}

/// A reference to a component together with the quantity required
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Part {
    /// Name of the referenced component
    pub component: ComponentName,
    /// Required quantity, at least one
    pub amount: u32,
}

impl Part {
    /// Create a new part
    pub fn new(component: ComponentName, amount: u32) -> Self {
        Self { component, amount }
    }
}

/// A product assembled from parts
///
/// The product's `price` is its own stated unit price and is independent of
/// the prices of its parts. See [`crate::pricing`] for the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    /// Catalog name
    pub name: ComponentName,
    /// Own unit price
    pub price: u64,
    /// Parts in insertion order
    #[serde(default)]
    parts: Vec<Part>,
}

impl Product {
    /// Create a product without parts
    pub fn new(name: ComponentName, price: u64) -> Self {
        Self {
            name,
            price,
            parts: Vec::new(),
        }
    }

    /// Create a product from parts that have already been validated
    pub(crate) fn with_parts(name: ComponentName, price: u64, parts: Vec<Part>) -> Self {
        Self { name, price, parts }
    }

    /// Attach a part after checking it against `graph`
    ///
    /// # Errors
    ///
    /// Fails without modifying the product if the amount is zero, the
    /// component is unknown to `graph`, or the part would make this product
    /// contain itself.
    pub fn add_part<G: CompositionGraph + ?Sized>(
        &mut self,
        graph: &G,
        component: ComponentName,
        amount: u32,
    ) -> CompositionResult<()> {
        composition::validate_part(graph, &self.name, &component, amount)?;
        self.parts.push(Part::new(component, amount));
        Ok(())
    }

    /// Parts in insertion order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Whether any part references `name`
    pub fn references(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.component.as_str() == name)
    }
}

/// A catalog entry, either a material or a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    /// Leaf component
    Material(Material),
    /// Composite component
    Product(Product),
}

impl Component {
    /// Catalog name
    pub fn name(&self) -> &ComponentName {
        match self {
            Component::Material(m) => &m.name,
            Component::Product(p) => &p.name,
        }
    }

    /// Own unit price
    pub fn price(&self) -> u64 {
        match self {
            Component::Material(m) => m.price,
            Component::Product(p) => p.price,
        }
    }

    /// Parts of a product; empty for materials
    pub fn parts(&self) -> &[Part] {
        match self {
            Component::Material(_) => &[],
            Component::Product(p) => p.parts(),
        }
    }

    /// Kind of this component
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Material(_) => ComponentKind::Material,
            Component::Product(_) => ComponentKind::Product,
        }
    }

    /// Whether this is a product
    pub fn is_product(&self) -> bool {
        matches!(self, Component::Product(_))
    }
}

impl From<Material> for Component {
    fn from(material: Material) -> Self {
        Component::Material(material)
    }
}

impl From<Product> for Component {
    fn from(product: Product) -> Self {
        Component::Product(product)
    }
}
