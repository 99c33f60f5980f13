// Copyright 2025 Cowboy AI, LLC.

//! Acyclic composition of products
//!
//! Products and the components they reference through parts form a directed
//! graph. The graph must stay acyclic: no product may contain itself, directly
//! or through any chain of other products. Every part is checked here before
//! it is committed.
//!
//! ```mermaid
//! graph LR
//!     assembly -->|1x| bracket
//!     bracket -->|4x| bolt
//!     bracket -->|2x| nut
//!     bracket -. rejected .-> assembly
//! ```

use crate::component::Part;
use crate::errors::{CompositionError, CompositionResult};
use crate::identifiers::ComponentName;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Read access to the composition graph
///
/// Implemented by the registry; traversal looks components up by name so the
/// graph seen is always the one currently stored.
pub trait CompositionGraph {
    /// Whether a component of that name exists
    fn contains(&self, name: &str) -> bool;

    /// Parts of the product of that name; `None` for materials and unknown names
    fn parts_of(&self, name: &str) -> Option<&[Part]>;
}

/// Fail if `candidate` can reach `target` in `graph`
///
/// Depth-first traversal with an explicit stack and a visited set, so each
/// node is expanded at most once and depth is bounded only by memory.
/// `candidate == target` counts as a cycle.
pub fn check_acyclic<G: CompositionGraph + ?Sized>(
    graph: &G,
    target: &ComponentName,
    candidate: &ComponentName,
) -> CompositionResult<()> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![candidate.as_str()];

    while let Some(current) = stack.pop() {
        if current == target.as_str() {
            warn!(product = %target, through = %candidate, "part would close a cycle");
            return Err(CompositionError::CyclicStructure {
                product: target.clone(),
                through: candidate.clone(),
            });
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(parts) = graph.parts_of(current) {
            stack.extend(
                parts
                    .iter()
                    .map(|p| p.component.as_str())
                    .filter(|n| !visited.contains(n)),
            );
        }
    }

    debug!(product = %target, part = %candidate, visited = visited.len(), "part is acyclic");
    Ok(())
}

/// Validate a single part for `product` against the current graph
///
/// Checks, in order: the amount is positive, the part is not the product
/// itself, the component exists, and attaching it keeps the graph acyclic.
pub fn validate_part<G: CompositionGraph + ?Sized>(
    graph: &G,
    product: &ComponentName,
    component: &ComponentName,
    amount: u32,
) -> CompositionResult<()> {
    if amount == 0 {
        return Err(CompositionError::InvalidAmount {
            component: component.clone(),
            amount,
        });
    }
    if component == product {
        return Err(CompositionError::CyclicStructure {
            product: product.clone(),
            through: component.clone(),
        });
    }
    if !graph.contains(component.as_str()) {
        return Err(CompositionError::UnresolvedComponent(component.clone()));
    }
    check_acyclic(graph, product, component)
}

/// Staging area for a product's part list
///
/// Parts are validated one at a time against the registry graph and kept
/// here until the whole list has been accepted, so a failure on any part
/// leaves both the registry and any previous version of the product
/// untouched.
#[derive(Debug, Clone)]
pub struct PartListDraft {
    product: ComponentName,
    parts: Vec<Part>,
}

impl PartListDraft {
    /// Start an empty part list for `product`
    pub fn new(product: ComponentName) -> Self {
        Self {
            product,
            parts: Vec::new(),
        }
    }

    /// Product the parts are being assembled for
    pub fn product(&self) -> &ComponentName {
        &self.product
    }

    /// Validate and stage a part
    pub fn attach<G: CompositionGraph + ?Sized>(
        &mut self,
        graph: &G,
        component: ComponentName,
        amount: u32,
    ) -> CompositionResult<()> {
        validate_part(graph, &self.product, &component, amount)?;
        self.parts.push(Part::new(component, amount));
        Ok(())
    }

    /// Staged parts
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Take the accepted parts
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }
}
