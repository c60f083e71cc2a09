//! Variable discovery and declaration rendering.
use super::Group;
use crate::analysis::names;
use crate::store::{Context, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclarationMode {
    /// Typed declaration, e.g. `cdef double RIJ = 0.0`.
    Declare,
    /// Plain assignment of scalar values, e.g. `RIJ = 0.0`.
    Assign,
}

fn render_real(x: f64) -> String {
    // Debug keeps the trailing `.0` on whole numbers.
    format!("{:?}", x)
}

fn variable_lines(context: &Context, mode: DeclarationMode) -> String {
    let mut names: Vec<&str> = context.names().collect();
    names.sort_unstable();

    let mut decl = Vec::with_capacity(names.len());
    for var in names {
        let Some(value) = context.get(var) else { continue };
        let line = match (value, mode) {
            (Value::Int(i), DeclarationMode::Declare) => format!("cdef long {} = {}", var, i),
            (Value::Int(i), DeclarationMode::Assign) => format!("{} = {}", var, i),
            (Value::Real(x), DeclarationMode::Declare) => format!("cdef double {} = {}", var, render_real(*x)),
            (Value::Real(x), DeclarationMode::Assign) => format!("{} = {}", var, render_real(*x)),
            (Value::Vector(v), DeclarationMode::Declare) => format!("cdef double[{}] {}", v.len(), var),
            // Vectors are only declared; particle arrays are passed in, never declared here.
            (Value::Vector(_), DeclarationMode::Assign) | (Value::Array(_), _) => continue,
        };
        decl.push(line);
    }
    decl.join("\n")
}

/// Renders `cdef double* name` for each name, sorted.
pub fn array_declarations<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let sorted: BTreeSet<&str> = names.into_iter().collect();
    sorted.into_iter().map(|a| format!("cdef double* {}", a)).collect::<Vec<_>>().join("\n")
}

impl<'lib> Group<'lib> {
    /// Scalar and vector names the resolved precomputed code reads or writes.
    ///
    /// Array names, the two indices, the kernel tokens and math library
    /// functions are filtered out; `gamma` and `lgamma` are kept.
    pub fn get_variable_names(&self) -> Vec<String> {
        let mut all: BTreeSet<&str> = BTreeSet::new();
        for cb in self.precomputed.values() {
            all.extend(cb.symbols().iter().map(String::as_str));
        }
        all.into_iter()
            .filter(|x| !x.starts_with(names::SOURCE_PREFIX) && !x.starts_with(names::DEST_PREFIX))
            .filter(|x| !names::is_kernel_token(x) && !names::is_index(x))
            .filter(|x| !names::is_math_function(x))
            .map(str::to_string)
            .collect()
    }

    pub fn get_array_declarations<'a, I>(&self, names: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        array_declarations(names)
    }

    /// Typed declarations for every binding in `context`, sorted by name.
    pub fn get_variable_declarations(&self, context: &Context) -> String {
        variable_lines(context, DeclarationMode::Declare)
    }

    /// Assignments of the scalar bindings in `context`, sorted by name.
    pub fn get_variable_assignments(&self, context: &Context) -> String {
        variable_lines(context, DeclarationMode::Assign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::Equation;
    use crate::store::{CodeBlock, PrecomputedLibrary};

    fn group_with(params: &[&str], lib: &PrecomputedLibrary) -> Vec<String> {
        let eq = Equation::new("Foo", "fluid", ["fluid"]).with_per_pair(params.iter().copied());
        Group::new(vec![eq], lib).unwrap().get_variable_names()
    }

    #[test]
    fn test_variable_names_filter_arrays_tokens_and_math() {
        let names = group_with(&["self", "d_idx", "WIJ"], PrecomputedLibrary::shared());
        assert_eq!(names, vec!["HIJ", "R2IJ", "RIJ", "WIJ", "XIJ"]);
    }

    #[test]
    fn test_gamma_survives_filtering() {
        let lib = PrecomputedLibrary::from_blocks([CodeBlock::new(
            "GIJ",
            "GIJ = gamma*exp(lgamma) + sqrt(d_h[d_idx])",
            Context::new(),
        )
        .unwrap()]);
        assert_eq!(group_with(&["GIJ"], &lib), vec!["GIJ", "gamma", "lgamma"]);
    }

    #[test]
    fn test_variable_declarations_from_group_context() {
        let eq = Equation::new("Foo", "fluid", ["fluid"]).with_per_pair(["self", "d_idx", "RIJ"]);
        let group = Group::new(vec![eq], PrecomputedLibrary::shared()).unwrap();
        assert_eq!(
            group.get_variable_declarations(group.context()),
            "cdef double R2IJ = 0.0\ncdef double RIJ = 0.0\ncdef double[3] XIJ"
        );
        assert_eq!(group.get_variable_assignments(group.context()), "R2IJ = 0.0\nRIJ = 0.0");
    }

    #[test]
    fn test_variable_declarations_by_shape() {
        let ctx = Context::new()
            .with("n", Value::Int(3))
            .with("h", Value::Real(0.5))
            .with("v", Value::Vector(vec![0.0, 0.0]))
            .with("d_x", Value::Array(vec![1.0]));
        let group = Group::new(Vec::new(), PrecomputedLibrary::shared()).unwrap();
        assert_eq!(
            group.get_variable_declarations(&ctx),
            "cdef double h = 0.5\ncdef long n = 3\ncdef double[2] v"
        );
        assert_eq!(group.get_variable_assignments(&ctx), "h = 0.5\nn = 3");
    }

    #[test]
    fn test_array_declarations_sorted() {
        let group = Group::new(Vec::new(), PrecomputedLibrary::shared()).unwrap();
        assert_eq!(
            group.get_array_declarations(["s_m", "d_rho", "d_au"]),
            "cdef double* d_au\ncdef double* d_rho\ncdef double* s_m"
        );
        assert_eq!(group.get_array_declarations([]), "");
    }
}
