//! Static analysis over code fragments and precomputed symbols.
//!
//! This module finds which identifiers a fragment references, closes a set of
//! precomputed symbols over their dependencies and orders them so each one is
//! computed after everything it reads.

pub mod closure;
pub mod error;
pub mod names;
pub mod symbols;
pub mod topology;

pub use closure::precomputed_closure;
pub use error::{CycleError, ParseError};
pub use names::{camel_to_underscore, get_array_names};
pub use symbols::{IdentifierScanner, SymbolExtractor};
pub use topology::{sort_precomputed, SortedSymbols};
