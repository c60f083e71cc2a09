use crate::store::PrecomputedLibrary;
use std::collections::BTreeSet;
use tracing::trace;

/// Computes the transitive set of library symbols needed by `seeds`.
///
/// Seeds that are not library names are ignored. Every included symbol's
/// code block is inspected for further library names until a pass adds
/// nothing new.
pub fn precomputed_closure<'a, I>(library: &PrecomputedLibrary, seeds: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut included: BTreeSet<String> = seeds
        .into_iter()
        .filter(|s| library.contains(s))
        .map(str::to_string)
        .collect();

    let mut frontier: Vec<String> = included.iter().cloned().collect();
    let mut pass = 0;
    while !frontier.is_empty() {
        pass += 1;
        let mut found = BTreeSet::new();
        for sym in &frontier {
            let Some(block) = library.get(sym) else { continue };
            for dep in block.symbols() {
                if library.contains(dep) && !included.contains(dep) {
                    found.insert(dep.clone());
                }
            }
        }
        trace!(pass, added = found.len(), "closure pass");
        included.extend(found.iter().cloned());
        frontier = found.into_iter().collect();
    }
    included
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closure_of(seeds: &[&str]) -> Vec<String> {
        precomputed_closure(PrecomputedLibrary::shared(), seeds.iter().copied())
            .into_iter()
            .collect()
    }

    #[test]
    fn test_transitive_dependencies_are_included() {
        assert_eq!(closure_of(&["RIJ"]), vec!["R2IJ", "RIJ", "XIJ"]);
        assert_eq!(closure_of(&["DWIJ"]), vec!["DWIJ", "HIJ", "R2IJ", "RIJ", "XIJ"]);
    }

    #[test]
    fn test_leaf_symbol_has_no_dependencies() {
        assert_eq!(closure_of(&["RHOIJ"]), vec!["RHOIJ"]);
    }

    #[test]
    fn test_unknown_and_array_names_are_ignored() {
        assert_eq!(closure_of(&["d_idx", "s_rho", "NOT_A_SYMBOL", "RHOIJ1"]), vec!["RHOIJ", "RHOIJ1"]);
        assert!(closure_of(&[]).is_empty());
    }

    #[test]
    fn test_closure_is_complete() {
        let lib = PrecomputedLibrary::shared();
        let all: Vec<&str> = lib.names().collect();
        for seed in &all {
            let closed = precomputed_closure(lib, [*seed]);
            for name in &closed {
                for dep in lib.get(name).unwrap().symbols() {
                    if lib.contains(dep) {
                        assert!(closed.contains(dep), "{} needs {} (seed {})", name, dep, seed);
                    }
                }
            }
        }
    }
}
