// Copyright 2025 Cowboy AI, LLC.

//! Aggregate price and bill of materials
//!
//! The aggregate price of a component is its own price plus, for every part,
//! the part's aggregate price times its amount. Results are memoized for the
//! duration of one computation only, since own prices can change whenever a
//! component is overwritten.

use crate::composition::CompositionGraph;
use crate::errors::{CompositionError, CompositionResult};
use crate::identifiers::ComponentName;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// A composition graph that also knows each component's own price
pub trait PricedGraph: CompositionGraph {
    /// Own price of the component of that name; `None` if unknown
    fn own_price(&self, name: &str) -> Option<u64>;
}

/// Total quantity of each material needed for one unit of a component
pub type BillOfMaterials = BTreeMap<ComponentName, u64>;

/// Aggregate price of `root`
///
/// # Errors
///
/// * [`CompositionError::NotFound`] if `root` is unknown
/// * [`CompositionError::UnresolvedComponent`] if a part references a
///   component that no longer exists
/// * [`CompositionError::AggregateOverflow`] if the total exceeds `u64`
pub fn aggregate_price<G: PricedGraph + ?Sized>(
    graph: &G,
    root: &ComponentName,
) -> CompositionResult<u64> {
    let total = fold_composition::<_, u64, _>(graph, root, |name, own, children| {
        children.iter().try_fold(own, |acc, (amount, price)| {
            price
                .checked_mul(u64::from(*amount))
                .and_then(|weighted| acc.checked_add(weighted))
                .ok_or_else(|| CompositionError::AggregateOverflow(name.clone()))
        })
    })?;
    debug!(component = %root, total, "aggregated price");
    Ok(total)
}

/// Materials needed for one unit of `root`, by name
///
/// A material on its own yields itself with quantity one.
pub fn bill_of_materials<G: PricedGraph + ?Sized>(
    graph: &G,
    root: &ComponentName,
) -> CompositionResult<BillOfMaterials> {
    fold_composition::<_, BillOfMaterials, _>(graph, root, |name, _own, children| {
        if graph.parts_of(name.as_str()).is_none() {
            return Ok(BTreeMap::from([(name.clone(), 1)]));
        }
        let mut bill = BillOfMaterials::new();
        for (amount, child) in children {
            for (material, quantity) in child.iter() {
                let scaled = quantity
                    .checked_mul(u64::from(*amount))
                    .ok_or_else(|| CompositionError::AggregateOverflow(name.clone()))?;
                let entry = bill.entry(material.clone()).or_insert(0);
                *entry = entry
                    .checked_add(scaled)
                    .ok_or_else(|| CompositionError::AggregateOverflow(name.clone()))?;
            }
        }
        Ok(bill)
    })
}

/// Post-order fold over the part tree below `root`
///
/// `combine` receives a component, its own price and the folded values of
/// its parts with their amounts. Shared sub-assemblies are folded once.
/// The traversal keeps its own stack, and a set of components still in
/// progress turns any cycle into an error rather than a loop.
fn fold_composition<'a, G, T, F>(
    graph: &'a G,
    root: &'a ComponentName,
    mut combine: F,
) -> CompositionResult<T>
where
    G: PricedGraph + ?Sized,
    F: FnMut(&ComponentName, u64, &[(u32, &T)]) -> CompositionResult<T>,
{
    if !graph.contains(root.as_str()) {
        return Err(CompositionError::NotFound(root.clone()));
    }

    enum Visit<'n> {
        Enter(&'n ComponentName, Option<&'n ComponentName>),
        Exit(&'n ComponentName),
    }

    let mut memo: HashMap<&str, T> = HashMap::new();
    let mut in_progress: HashSet<&str> = HashSet::new();
    let mut stack = vec![Visit::Enter(root, None)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(name, parent) => {
                if memo.contains_key(name.as_str()) {
                    continue;
                }
                if !in_progress.insert(name.as_str()) {
                    return Err(CompositionError::CyclicStructure {
                        product: name.clone(),
                        through: parent.unwrap_or(name).clone(),
                    });
                }
                if !graph.contains(name.as_str()) {
                    return Err(CompositionError::UnresolvedComponent(name.clone()));
                }
                stack.push(Visit::Exit(name));
                for part in graph.parts_of(name.as_str()).unwrap_or_default() {
                    stack.push(Visit::Enter(&part.component, Some(name)));
                }
            }
            Visit::Exit(name) => {
                let own = graph
                    .own_price(name.as_str())
                    .ok_or_else(|| CompositionError::UnresolvedComponent(name.clone()))?;
                let parts = graph.parts_of(name.as_str()).unwrap_or_default();
                let mut children = Vec::with_capacity(parts.len());
                for part in parts {
                    let value = memo
                        .get(part.component.as_str())
                        .ok_or_else(|| CompositionError::UnresolvedComponent(part.component.clone()))?;
                    children.push((part.amount, value));
                }
                let value = combine(name, own, &children)?;
                drop(children);
                in_progress.remove(name.as_str());
                memo.insert(name.as_str(), value);
            }
        }
    }

    memo.remove(root.as_str())
        .ok_or_else(|| CompositionError::NotFound(root.clone()))
}
