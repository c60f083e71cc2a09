//! A group of equations sharing one execution context.
//!
//! The group resolves the precomputed symbols its per-pair behaviors need,
//! closes them over their dependencies, orders them, and assembles the code
//! for each phase (see [`assembler`], [`declarations`] and [`wrappers`]).

pub mod assembler;
pub mod declarations;
pub mod error;
pub mod wrappers;

pub use assembler::KernelBinding;
pub use error::{GenerateError, GroupError};
pub use wrappers::EquationGenerator;

use crate::analysis::names;
use crate::analysis::{precomputed_closure, sort_precomputed};
use crate::config::AssemblerConfig;
use crate::equation::{Equation, Phase};
use crate::store::{CodeBlock, Context, PrecomputedLibrary};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Group<'lib> {
    equations: Vec<Equation>,
    library: &'lib PrecomputedLibrary,
    config: AssemblerConfig,
    context: Context,
    precomputed: IndexMap<String, &'lib CodeBlock>,
    source_arrays: BTreeSet<String>,
    dest_arrays: BTreeSet<String>,
}

impl<'lib> Group<'lib> {
    pub fn new(equations: Vec<Equation>, library: &'lib PrecomputedLibrary) -> Result<Self, GroupError> {
        Self::with_config(equations, library, AssemblerConfig::default())
    }

    pub fn with_config(
        equations: Vec<Equation>,
        library: &'lib PrecomputedLibrary,
        config: AssemblerConfig,
    ) -> Result<Self, GroupError> {
        let mut group = Self {
            equations,
            library,
            config,
            context: Context::new(),
            precomputed: IndexMap::new(),
            source_arrays: BTreeSet::new(),
            dest_arrays: BTreeSet::new(),
        };
        group.update()?;
        Ok(group)
    }

    /// Re-resolves the precomputed symbols after the equation list changed.
    ///
    /// Collects every per-pair parameter, closes the library names among them
    /// over their dependencies, orders the closure and refreshes the context
    /// with each resolved symbol's default value.
    pub fn update(&mut self) -> Result<(), GroupError> {
        let mut params: BTreeSet<&str> = BTreeSet::new();
        for eq in &self.equations {
            let Some(behavior) = eq.behavior(Phase::PerPair) else { continue };
            for p in behavior.arguments(&self.config.receiver) {
                if !self.is_known_symbol(p) {
                    if self.config.strict_symbols {
                        return Err(GroupError::UnknownSymbol {
                            equation: eq.display_name().to_string(),
                            symbol: p.to_string(),
                            phase: Phase::PerPair.to_string(),
                        });
                    }
                    debug!(equation = eq.display_name(), symbol = p, "dropping unknown per-pair symbol");
                }
                params.insert(p);
            }
        }

        let closure = precomputed_closure(self.library, params);
        let sorted = sort_precomputed(self.library, closure.iter().map(String::as_str))?;

        let library = self.library;
        self.precomputed = sorted
            .order()
            .iter()
            .filter_map(|name| library.get(name).map(|cb| (name.clone(), cb)))
            .collect();

        self.context = Context::new();
        for (name, cb) in &self.precomputed {
            if let Some(value) = cb.default_value() {
                self.context.insert(name.clone(), value.clone());
            }
        }

        self.refresh_array_names();
        self.assign_var_names();
        debug!(
            equations = self.equations.len(),
            precomputed = ?self.precomputed.keys().collect::<Vec<_>>(),
            "group resolved"
        );
        Ok(())
    }

    /// True if `name` belongs to the vocabulary an equation may use.
    fn is_known_symbol(&self, name: &str) -> bool {
        name.starts_with(names::SOURCE_PREFIX)
            || name.starts_with(names::DEST_PREFIX)
            || names::is_kernel_token(name)
            || self.library.contains(name)
    }

    fn refresh_array_names(&mut self) {
        let mut src = BTreeSet::new();
        let mut dest = BTreeSet::new();
        for eq in &self.equations {
            for (_, behavior) in eq.behaviors() {
                let (s, d) = names::get_array_names(behavior.params().iter().map(String::as_str));
                src.extend(s);
                dest.extend(d);
            }
        }
        for cb in self.precomputed.values() {
            src.extend(cb.source_arrays().iter().cloned());
            dest.extend(cb.dest_arrays().iter().cloned());
        }
        self.source_arrays = src;
        self.dest_arrays = dest;
    }

    // --- Accessors ---

    pub fn equations(&self) -> &[Equation] { &self.equations }

    /// Mutable access to the equation list. Call [`Group::update`] afterwards.
    pub fn equations_mut(&mut self) -> &mut Vec<Equation> { &mut self.equations }

    pub fn library(&self) -> &'lib PrecomputedLibrary { self.library }
    pub fn config(&self) -> &AssemblerConfig { &self.config }

    /// Default values of the resolved precomputed symbols.
    pub fn context(&self) -> &Context { &self.context }

    /// Resolved precomputed symbols in evaluation order.
    pub fn precomputed(&self) -> &IndexMap<String, &'lib CodeBlock> { &self.precomputed }

    /// (source array names, destination array names) used by any behavior of
    /// any equation or by any resolved precomputed symbol.
    pub fn get_array_names(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        (self.source_arrays.clone(), self.dest_arrays.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;

    fn lib() -> &'static PrecomputedLibrary {
        PrecomputedLibrary::shared()
    }

    fn density() -> Equation {
        Equation::new("SummationDensity", "fluid", ["fluid"])
            .with_setup(["self", "d_idx", "d_rho"])
            .with_per_pair(["self", "d_idx", "s_idx", "d_rho", "s_m", "WIJ"])
    }

    fn pressure_gradient() -> Equation {
        Equation::new("MomentumEquation", "fluid", ["fluid"])
            .with_per_pair(["self", "d_idx", "s_idx", "d_p", "s_p", "RHOIJ1", "DWIJ", "d_au"])
    }

    #[test]
    fn test_single_symbol_without_dependencies() {
        let eq = Equation::new("Foo", "fluid", ["fluid"])
            .with_per_pair(["d_idx", "s_idx", "d_rho", "s_rho", "RHOIJ"]);
        let group = Group::new(vec![eq], lib()).unwrap();
        let resolved: Vec<&str> = group.precomputed().keys().map(String::as_str).collect();
        assert_eq!(resolved, vec!["RHOIJ"]);
    }

    #[test]
    fn test_resolution_orders_closure() {
        let group = Group::new(vec![density(), pressure_gradient()], lib()).unwrap();
        let resolved: Vec<&str> = group.precomputed().keys().map(String::as_str).collect();
        assert_eq!(
            resolved,
            vec!["HIJ", "RHOIJ", "XIJ", "R2IJ", "RHOIJ1", "RIJ", "DWIJ", "WIJ"]
        );
    }

    #[test]
    fn test_topological_soundness_of_resolution() {
        let group = Group::new(vec![density(), pressure_gradient()], lib()).unwrap();
        let order: Vec<&String> = group.precomputed().keys().collect();
        for (i, (name, cb)) in group.precomputed().iter().enumerate() {
            for dep in cb.symbols() {
                if dep != name && group.precomputed().contains_key(dep) {
                    let j = order.iter().position(|n| *n == dep).unwrap();
                    assert!(j < i, "{} must precede {}", dep, name);
                }
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = Group::new(vec![density(), pressure_gradient()], lib()).unwrap();
        let b = Group::new(vec![pressure_gradient(), density()], lib()).unwrap();
        let keys = |g: &Group| g.precomputed().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&a), keys(&b));
    }

    #[test]
    fn test_context_holds_resolved_defaults() {
        let group = Group::new(vec![pressure_gradient()], lib()).unwrap();
        assert_eq!(group.context().get("DWIJ"), Some(&Value::Vector(vec![0.0; 3])));
        assert_eq!(group.context().get("RHOIJ1"), Some(&Value::Real(0.0)));
        assert!(!group.context().contains("WIJ"));
    }

    #[test]
    fn test_update_after_equation_change() {
        let mut group = Group::new(vec![pressure_gradient()], lib()).unwrap();
        assert!(!group.precomputed().contains_key("WIJ"));

        group.equations_mut().push(density());
        group.update().unwrap();
        assert!(group.precomputed().contains_key("WIJ"));

        group.equations_mut().clear();
        group.update().unwrap();
        assert!(group.precomputed().is_empty());
        assert!(group.context().is_empty());
    }

    #[test]
    fn test_unknown_symbol_dropped_by_default() {
        let eq = Equation::new("Foo", "fluid", ["fluid"]).with_per_pair(["d_idx", "MYSTERY"]);
        let group = Group::new(vec![eq], lib()).unwrap();
        assert!(group.precomputed().is_empty());
    }

    #[test]
    fn test_unknown_symbol_rejected_when_strict() {
        let eq = Equation::new("Foo", "fluid", ["fluid"]).with_per_pair(["self", "d_idx", "MYSTERY", "RIJ"]);
        let err = Group::with_config(vec![eq], lib(), AssemblerConfig::strict()).unwrap_err();
        assert_eq!(
            err,
            GroupError::UnknownSymbol {
                equation: "Foo".into(),
                symbol: "MYSTERY".into(),
                phase: "loop".into(),
            }
        );
    }

    #[test]
    fn test_cycle_in_custom_library_is_reported() {
        let custom = PrecomputedLibrary::from_blocks([
            CodeBlock::new("AIJ", "AIJ = BIJ", Context::new()).unwrap(),
            CodeBlock::new("BIJ", "BIJ = AIJ", Context::new()).unwrap(),
        ]);
        let eq = Equation::new("Foo", "fluid", ["fluid"]).with_per_pair(["d_idx", "AIJ"]);
        match Group::new(vec![eq], &custom).unwrap_err() {
            GroupError::Cycle(e) => assert_eq!(e.cycle, vec!["AIJ", "BIJ"]),
            e => panic!("Wrong error type: {:?}", e),
        }
    }

    #[test]
    fn test_array_names_span_all_phases_and_precomputed() {
        let group = Group::new(vec![density(), pressure_gradient()], lib()).unwrap();
        let (src, dest) = group.get_array_names();
        let src: Vec<&str> = src.iter().map(String::as_str).collect();
        let dest: Vec<&str> = dest.iter().map(String::as_str).collect();
        assert_eq!(src, vec!["s_h", "s_m", "s_p", "s_rho", "s_x", "s_y", "s_z"]);
        assert_eq!(dest, vec!["d_au", "d_h", "d_p", "d_rho", "d_x", "d_y", "d_z"]);
    }

    #[test]
    fn test_equations_without_per_pair_behavior() {
        let eq = Equation::new("TaitEOS", "fluid", Vec::<String>::new())
            .with_setup(["self", "d_idx", "d_rho", "d_p"]);
        let group = Group::new(vec![eq], lib()).unwrap();
        assert!(group.precomputed().is_empty());
        let (_, dest) = group.get_array_names();
        assert!(dest.contains("d_p"));
    }
}
