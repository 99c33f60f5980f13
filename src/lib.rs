// Copyright 2025 Cowboy AI, LLC.

//! # CIM Parts List
//!
//! Composition registry for parts lists in the Composable Information Machine.
//!
//! A catalog holds two kinds of components in one namespace:
//! - **Material**: an indivisible leaf with a unit price
//! - **Product**: a priced composite with an ordered list of parts, each a
//!   component reference and a required amount
//!
//! The registry keeps the composition graph acyclic. Every part is checked
//! before a product is committed, and a product's whole part list is accepted
//! or rejected as a unit.
//!
//! ## Design Principles
//!
//! 1. **Explicit ownership**: registries are constructed and passed around, never global
//! 2. **Names as references**: parts point at components by name, resolved on use
//! 3. **All-or-nothing**: a rejected product leaves the catalog unchanged
//! 4. **Bounded traversal**: cycle checks and price aggregation use explicit stacks
//!
//! ## Example
//!
//! ```rust
//! use cim_partslist::{CatalogService, CompositionError};
//!
//! let catalog = CatalogService::default();
//! catalog.create_material("bolt", 1).unwrap();
//! catalog.create_material("nut", 2).unwrap();
//! catalog.create_product("bracket", 10, &[("bolt", 4), ("nut", 2)]).unwrap();
//! catalog.create_product("assembly", 20, &[("bracket", 1)]).unwrap();
//!
//! let err = catalog.create_product("bracket", 10, &[("assembly", 1)]).unwrap_err();
//! assert!(matches!(err, CompositionError::CyclicStructure { .. }));
//! assert_eq!(catalog.aggregate_price("assembly").unwrap(), 38);
//! ```

#![warn(missing_docs)]

mod component;
pub mod composition;
mod config;
mod errors;
mod identifiers;
pub mod pricing;
mod registry;
mod service;
mod snapshot;

// Re-export core types
pub use component::{Component, ComponentKind, Material, Part, Product};
pub use composition::{CompositionGraph, PartListDraft};
pub use config::{RegistryConfig, RemovalPolicy, UnresolvedPartPolicy};
pub use errors::{CompositionError, CompositionResult};
pub use identifiers::ComponentName;
pub use pricing::{BillOfMaterials, PricedGraph};
pub use registry::{CompositionRegistry, SharedRegistry};
pub use service::{CatalogService, Upserted};
pub use snapshot::CatalogSnapshot;
