//! Naming conventions shared by equations, code blocks and the generator.
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const SOURCE_INDEX: &str = "s_idx";
pub const DEST_INDEX: &str = "d_idx";
pub const SOURCE_PREFIX: &str = "s_";
pub const DEST_PREFIX: &str = "d_";

/// Token standing for "evaluate the kernel value".
pub const KERNEL_TOKEN: &str = "KERNEL";
/// Token standing for "evaluate the kernel gradient".
pub const GRADIENT_TOKEN: &str = "GRADIENT";

/// Callable names of the host math library. These never count as variables.
pub const MATH_FUNCTIONS: &[&str] = &[
    "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "ceil", "copysign", "cos",
    "cosh", "degrees", "erf", "erfc", "exp", "expm1", "fabs", "factorial", "floor", "fmod",
    "frexp", "fsum", "gamma", "hypot", "isinf", "isnan", "ldexp", "lgamma", "log", "log10",
    "log1p", "modf", "pow", "radians", "sin", "sinh", "sqrt", "tan", "tanh", "trunc",
];

/// Math names that may double as variable names and are kept.
pub const RETAINED_MATH_NAMES: &[&str] = &["gamma", "lgamma"];

pub fn is_index(name: &str) -> bool {
    name == SOURCE_INDEX || name == DEST_INDEX
}

pub fn is_source_array(name: &str) -> bool {
    name.starts_with(SOURCE_PREFIX) && name != SOURCE_INDEX
}

pub fn is_dest_array(name: &str) -> bool {
    name.starts_with(DEST_PREFIX) && name != DEST_INDEX
}

pub fn is_kernel_token(name: &str) -> bool {
    name == KERNEL_TOKEN || name == GRADIENT_TOKEN
}

pub fn is_math_function(name: &str) -> bool {
    MATH_FUNCTIONS.contains(&name) && !RETAINED_MATH_NAMES.contains(&name)
}

/// Splits a symbol set into (source array names, destination array names).
pub fn get_array_names<'a, I>(symbols: I) -> (BTreeSet<String>, BTreeSet<String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut src = BTreeSet::new();
    let mut dest = BTreeSet::new();
    for s in symbols {
        if is_source_array(s) {
            src.insert(s.to_string());
        } else if is_dest_array(s) {
            dest.insert(s.to_string());
        }
    }
    (src, dest)
}

fn word_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("BUG: invalid word boundary pattern"))
}

fn lower_upper_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("BUG: invalid case boundary pattern"))
}

/// Converts a CamelCase name to lowercase words joined by underscores.
/// `SummationDensity` -> `summation_density`, `HTTPServer` -> `http_server`.
pub fn camel_to_underscore(name: &str) -> String {
    let s1 = word_boundary().replace_all(name, "${1}_${2}");
    lower_upper_boundary().replace_all(&s1, "${1}_${2}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("FooEquation", "foo_equation")]
    #[case("SummationDensity", "summation_density")]
    #[case("TaitEOS", "tait_eos")]
    #[case("HTTPServer", "http_server")]
    #[case("MomentumEquation2D", "momentum_equation2_d")]
    #[case("already_lower", "already_lower")]
    fn test_camel_to_underscore(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camel_to_underscore(input), expected);
    }

    #[test]
    fn test_array_names_exclude_indices() {
        let symbols = ["s_idx", "d_idx", "s_m", "d_rho", "s_rho", "RHOIJ", "sd_x"];
        let (src, dest) = get_array_names(symbols);
        assert_eq!(src.into_iter().collect::<Vec<_>>(), vec!["s_m", "s_rho"]);
        assert_eq!(dest.into_iter().collect::<Vec<_>>(), vec!["d_rho"]);
    }

    #[test]
    fn test_gamma_is_not_filtered_as_math() {
        assert!(is_math_function("sqrt"));
        assert!(!is_math_function("gamma"));
        assert!(!is_math_function("lgamma"));
        assert!(!is_math_function("RIJ"));
    }
}
