// Library facade: the entry point for a surrounding simulation compiler.
// Equations go in, per-phase code text comes out.

//! Assembles SPH equation terms into dependency-ordered, per-phase code.
//!
//! A [`Group`] collects the precomputed pairwise quantities its equations'
//! per-pair behaviors name, closes them over the [`PrecomputedLibrary`],
//! orders them so every quantity follows its dependencies, and emits one code
//! block per [`Phase`].
//!
//! ```
//! use sph_equation_core::{Equation, Group, PrecomputedLibrary};
//!
//! let eq = Equation::new("FooEquation", "fluid", ["fluid"])
//!     .with_per_pair(["self", "d_idx", "s_idx", "d_rho", "s_rho", "RHOIJ"]);
//! let group = Group::new(vec![eq], PrecomputedLibrary::shared()).unwrap();
//! assert!(group.get_per_pair_code(None).starts_with("RHOIJ = "));
//! ```

pub mod analysis;
pub mod config;
pub mod equation;
pub mod group;
pub mod store;

// Re-export key types for convenient access
pub use analysis::{CycleError, IdentifierScanner, ParseError, SymbolExtractor};
pub use config::{AssemblerConfig, ConfigError};
pub use equation::{Behavior, Equation, Phase};
pub use group::{EquationGenerator, GenerateError, Group, GroupError, KernelBinding};
pub use store::{CodeBlock, Context, EvalError, PrecomputedLibrary, Value};
