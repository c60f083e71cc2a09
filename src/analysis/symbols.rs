//! Free-symbol extraction for code fragments.
//!
//! Fragments are written in a small Python-like statement language
//! (`XIJ[0] = d_x[d_idx] - s_x[s_idx]`). The generator only needs the set of
//! identifiers a fragment references, so extraction sits behind the
//! [`SymbolExtractor`] trait and the default [`IdentifierScanner`] is a lexical
//! scanner rather than a full parser.

use super::error::ParseError;
use std::collections::BTreeSet;

/// Returns the set of identifier names a code fragment references.
pub trait SymbolExtractor {
    fn extract_symbols(&self, code: &str) -> Result<BTreeSet<String>, ParseError>;
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Lexical scanner for the fragment language.
///
/// Collects every bare identifier, skipping attribute names (anything after a
/// `.`), keyword-argument names in calls (`f(x=1)`), keywords, numeric
/// literals, string literals and `#` comments.
/// Unbalanced brackets and unterminated strings are reported as parse errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierScanner;

impl SymbolExtractor for IdentifierScanner {
    fn extract_symbols(&self, code: &str) -> Result<BTreeSet<String>, ParseError> {
        let chars: Vec<char> = code.chars().collect();
        let mut symbols = BTreeSet::new();
        let mut open: Vec<(char, usize)> = Vec::new();
        let mut line = 1;
        let mut last_significant: Option<char> = None;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\n' => {
                    line += 1;
                    i += 1;
                    continue;
                }
                '#' => {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
                '"' | '\'' => {
                    i += 1;
                    loop {
                        match chars.get(i) {
                            None | Some('\n') => {
                                return Err(ParseError::new(line, "unterminated string literal"))
                            }
                            Some('\\') => i += 2,
                            Some(&q) if q == c => break,
                            Some(_) => i += 1,
                        }
                    }
                    i += 1;
                }
                '(' | '[' | '{' => {
                    open.push((c, line));
                    i += 1;
                }
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match open.pop() {
                        Some((o, _)) if o == expected => {}
                        _ => return Err(ParseError::new(line, format!("unmatched '{}'", c))),
                    }
                    i += 1;
                }
                _ if c.is_ascii_digit() => {
                    // Numeric literal, including exponents like 1.5e-3.
                    while i < chars.len() {
                        let d = chars[i];
                        if d.is_alphanumeric() || d == '.' || d == '_' {
                            i += 1;
                        } else if (d == '+' || d == '-') && matches!(chars[i - 1], 'e' | 'E') {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                }
                _ if c.is_alphabetic() || c == '_' => {
                    let start = i;
                    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                        i += 1;
                    }
                    let ident: String = chars[start..i].iter().collect();
                    let is_attribute = last_significant == Some('.');
                    let is_keyword_arg = matches!(open.last(), Some(('(', _))) && {
                        let mut j = i;
                        while j < chars.len() && is_indent(chars[j]) {
                            j += 1;
                        }
                        chars.get(j) == Some(&'=') && chars.get(j + 1) != Some(&'=')
                    };
                    if !is_attribute && !is_keyword_arg && !KEYWORDS.contains(&ident.as_str()) {
                        symbols.insert(ident);
                    }
                }
                _ => i += 1,
            }
            if !c.is_whitespace() {
                last_significant = Some(c);
            }
        }

        if let Some((c, opened_on)) = open.pop() {
            return Err(ParseError::new(opened_on, format!("unclosed '{}'", c)));
        }
        Ok(symbols)
    }
}

fn is_indent(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Removes the run of spaces and tabs that every non-blank line starts with.
/// Lines holding only spaces and tabs become empty. Indentation that differs
/// in kind (a tab on one line, spaces on another) is left alone.
pub fn dedent(code: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in code.split('\n') {
        let rest = line.trim_start_matches(is_indent);
        if rest.is_empty() {
            continue;
        }
        // Spaces and tabs are single bytes, so this slice is on a char boundary.
        let indent = &line[..line.len() - rest.len()];
        margin = Some(match margin {
            Some(m) => {
                let shared = m.bytes().zip(indent.bytes()).take_while(|(a, b)| a == b).count();
                &m[..shared]
            }
            None => indent,
        });
    }
    let margin = margin.unwrap_or("");

    let mut out: Vec<&str> = Vec::new();
    for l in code.split('\n') {
        if l.trim_start_matches(is_indent).is_empty() {
            out.push("");
        } else {
            out.push(l.strip_prefix(margin).unwrap_or(l));
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scan(code: &str) -> Vec<String> {
        IdentifierScanner.extract_symbols(code).unwrap().into_iter().collect()
    }

    #[rstest]
    #[case("RIJ = sqrt(R2IJ)", &["R2IJ", "RIJ", "sqrt"])]
    #[case("XIJ[0] = d_x[d_idx] - s_x[s_idx]", &["XIJ", "d_idx", "d_x", "s_idx", "s_x"])]
    #[case("GRADIENT(XIJ, RIJ, HIJ, DWIJ)", &["DWIJ", "GRADIENT", "HIJ", "RIJ", "XIJ"])]
    #[case("RHOIJ1 = 1.0/RHOIJ", &["RHOIJ", "RHOIJ1"])]
    #[case("x = 1.5e-3 + y # trailing z", &["x", "y"])]
    #[case("a = self.kernel.kernel(b)", &["a", "b", "self"])]
    #[case("c = 'text' if d is not None else e", &["c", "d", "e"])]
    #[case("y = f(x, scale=2.0, z == w)", &["f", "w", "x", "y", "z"])]
    #[case("y = g(h(n = 1), m)", &["g", "h", "m", "y"])]
    #[case("v[k] = u", &["k", "u", "v"])]
    fn test_scanner_symbols(#[case] code: &str, #[case] expected: &[&str]) {
        assert_eq!(scan(code), expected);
    }

    #[test]
    fn test_scanner_reports_unbalanced_brackets() {
        let err = IdentifierScanner.extract_symbols("a = b[0\nc = d").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unclosed '['"), "Msg: {}", err.message);

        let err = IdentifierScanner.extract_symbols("a = b)\n").unwrap_err();
        assert!(err.message.contains("unmatched ')'"), "Msg: {}", err.message);
    }

    #[test]
    fn test_scanner_reports_unterminated_string() {
        let err = IdentifierScanner.extract_symbols("x = 1\ny = 'abc").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_dedent() {
        let code = "\n    a = 1\n      b = 2\n    \n    c = 3\n";
        assert_eq!(dedent(code), "\na = 1\n  b = 2\n\nc = 3\n");
    }

    #[test]
    fn test_dedent_keeps_mixed_indentation() {
        assert_eq!(dedent("\tA = 1\n    B = 2"), "\tA = 1\n    B = 2");
        assert_eq!(dedent("  \ta\n  \t  b\n  c"), "\ta\n\t  b\nc");
    }

    #[test]
    fn test_dedent_leaves_non_ascii_whitespace() {
        assert_eq!(dedent("\u{a0}A = 1\n B = 2"), "\u{a0}A = 1\n B = 2");
        assert_eq!(dedent("  \u{a0}A = 1\n  B = 2"), "\u{a0}A = 1\nB = 2");
    }
}
