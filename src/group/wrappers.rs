//! Boundary to the external generator of equation bodies.
//!
//! Each equation instance gets a unique variable name; the body of each
//! equation class is emitted once, however many instances the group holds.

use super::{GenerateError, Group, GroupError};
use crate::analysis::camel_to_underscore;
use crate::equation::Equation;
use indexmap::IndexMap;
use tracing::debug;

/// Emits the code body for one equation class, given a representative instance.
pub trait EquationGenerator {
    fn generate(&mut self, equation: &Equation) -> Result<String, GenerateError>;
}

impl<F> EquationGenerator for F
where
    F: FnMut(&Equation) -> Result<String, GenerateError>,
{
    fn generate(&mut self, equation: &Equation) -> Result<String, GenerateError> {
        self(equation)
    }
}

impl<'lib> Group<'lib> {
    /// Names every instance `<display_name in underscore case><n>`, where `n`
    /// counts instances of the same class from zero.
    pub(super) fn assign_var_names(&mut self) {
        let mut counters: IndexMap<String, usize> = IndexMap::new();
        for eq in &mut self.equations {
            let n = counters.entry(eq.class_name().to_string()).or_insert(0);
            let name = format!("{}{}", camel_to_underscore(eq.display_name()), n);
            *n += 1;
            eq.set_var_name(name);
        }
    }

    /// Generates one wrapper per distinct equation class, in order of first
    /// appearance, joined by newlines.
    pub fn get_equation_wrappers(&mut self, generator: &mut dyn EquationGenerator) -> Result<String, GroupError> {
        self.assign_var_names();

        // The last instance of each class stands in for the class.
        let mut representatives: IndexMap<&str, &Equation> = IndexMap::new();
        for eq in &self.equations {
            representatives.insert(eq.class_name(), eq);
        }

        let mut wrappers = Vec::with_capacity(representatives.len());
        for (class, eq) in representatives {
            debug!(class, "generating equation wrapper");
            wrappers.push(generator.generate(eq)?);
        }
        Ok(wrappers.join("\n"))
    }

    /// One `cdef public <Class> <var_name>` line per equation instance.
    pub fn get_equation_declarations(&self) -> String {
        self.equations
            .iter()
            .map(|eq| format!("cdef public {} {}", eq.display_name(), eq.var_name()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per instance binding its variable to the caller's `equations[i]`.
    pub fn get_equation_initializers(&self) -> String {
        self.equations
            .iter()
            .enumerate()
            .map(|(i, eq)| {
                format!("{}.{} = {}(equations[{}])", self.config.receiver, eq.var_name(), eq.display_name(), i)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
