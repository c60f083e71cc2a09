use super::error::CycleError;
use crate::store::PrecomputedLibrary;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// A dependency-ordered sequence of precomputed symbol names.
///
/// Each name has a weight: 0 when it depends on no other sorted name,
/// otherwise one more than the heaviest of its dependencies. The order lists
/// names by ascending weight, alphabetically within a weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedSymbols {
    order: Vec<String>,
    weights: BTreeMap<String, usize>,
}

impl SortedSymbols {
    pub fn order(&self) -> &[String] { &self.order }
    pub fn into_order(self) -> Vec<String> { self.order }
    pub fn len(&self) -> usize { self.order.len() }
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn weight(&self, name: &str) -> Option<usize> {
        self.weights.get(name).copied()
    }

    /// The order split into its weight levels.
    pub fn levels(&self) -> Vec<Vec<&str>> {
        let mut levels: Vec<Vec<&str>> = Vec::new();
        for name in &self.order {
            let w = self.weights[name];
            if levels.len() <= w {
                levels.resize_with(w + 1, Vec::new);
            }
            levels[w].push(name);
        }
        levels
    }
}

/// Orders a subset of the library so every name follows its dependencies.
///
/// A name's dependencies are the symbols of its code block that are also in
/// the subset, excluding itself. Names absent from the library are ignored.
/// Weights are resolved in repeated passes; a pass that resolves nothing
/// while names remain means a cycle, reported as a [`CycleError`].
pub fn sort_precomputed<'a, I>(library: &PrecomputedLibrary, names: I) -> Result<SortedSymbols, CycleError>
where
    I: IntoIterator<Item = &'a str>,
{
    let subset: BTreeSet<&str> = names.into_iter().filter(|n| library.contains(n)).collect();

    let mut depends: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &name in &subset {
        let deps = match library.get(name) {
            Some(block) => block
                .symbols()
                .iter()
                .map(String::as_str)
                .filter(|s| *s != name && subset.contains(s))
                .collect(),
            None => Vec::new(),
        };
        depends.insert(name, deps);
    }

    let mut weights: BTreeMap<String, usize> = BTreeMap::new();
    let mut levels: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    let mut pending: Vec<&str> = subset.iter().copied().collect();

    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|&name| {
            let mut level = 0;
            for dep in &depends[name] {
                match weights.get(*dep) {
                    Some(w) => level = level.max(w + 1),
                    None => return true,
                }
            }
            weights.insert(name.to_string(), level);
            levels.entry(level).or_default().push(name);
            false
        });

        if pending.len() == before {
            let err = cycle_error(&pending, &depends);
            warn!(cycle = ?err.cycle, blocked = ?err.blocked, "precomputed symbols form a cycle");
            return Err(err);
        }
    }

    let mut order = Vec::with_capacity(weights.len());
    for (_, mut names) in levels {
        names.sort_unstable();
        order.extend(names.into_iter().map(str::to_string));
    }
    debug!(?order, "precomputed symbols sorted");

    Ok(SortedSymbols { order, weights })
}

/// Splits the unresolvable names into those on a cycle and those waiting on one.
fn cycle_error(pending: &[&str], depends: &BTreeMap<&str, Vec<&str>>) -> CycleError {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for &name in pending {
        graph.add_node(name);
        for &dep in &depends[name] {
            if pending.contains(&dep) {
                graph.add_edge(dep, name, ());
            }
        }
    }

    let mut on_cycle: BTreeSet<&str> = BTreeSet::new();
    for component in tarjan_scc(&graph) {
        let self_loop = component.len() == 1 && graph.contains_edge(component[0], component[0]);
        if component.len() > 1 || self_loop {
            on_cycle.extend(component);
        }
    }

    let blocked = pending
        .iter()
        .filter(|n| !on_cycle.contains(*n))
        .map(|n| n.to_string())
        .collect::<BTreeSet<_>>();

    CycleError {
        cycle: on_cycle.into_iter().map(str::to_string).collect(),
        blocked: blocked.into_iter().collect(),
    }
}
