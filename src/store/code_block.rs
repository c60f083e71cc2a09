//! A named code fragment together with the analysis the generator needs.
use super::error::EvalError;
use super::types::{Context, Value};
use crate::analysis::error::ParseError;
use crate::analysis::names::{self, DEST_INDEX, SOURCE_INDEX};
use crate::analysis::symbols::{dedent, IdentifierScanner, SymbolExtractor};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Direct evaluator for a code block, operating on typed bindings.
pub type Evaluator = Arc<dyn Fn(&mut Context) -> Result<(), EvalError> + Send + Sync>;

#[derive(Clone, Serialize)]
pub struct CodeBlock {
    name: String,
    code: String,
    symbols: BTreeSet<String>,
    source_arrays: BTreeSet<String>,
    dest_arrays: BTreeSet<String>,
    context: Context,
    #[serde(skip)]
    evaluator: Option<Evaluator>,
}

impl CodeBlock {
    /// Builds a block using the default [`IdentifierScanner`].
    pub fn new(name: impl Into<String>, code: &str, context: Context) -> Result<Self, ParseError> {
        Self::with_extractor(name, code, context, &IdentifierScanner)
    }

    pub fn with_extractor(
        name: impl Into<String>,
        code: &str,
        mut context: Context,
        extractor: &dyn SymbolExtractor,
    ) -> Result<Self, ParseError> {
        let code = dedent(code);
        let symbols = extractor.extract_symbols(&code)?;
        let (source_arrays, dest_arrays) = names::get_array_names(symbols.iter().map(String::as_str));

        // Seed defaults so the block can be evaluated on its own.
        for index in [SOURCE_INDEX, DEST_INDEX] {
            if symbols.contains(index) && !context.contains(index) {
                context.insert(index, Value::Int(0));
            }
        }
        for array in source_arrays.iter().chain(&dest_arrays) {
            if !context.contains(array) {
                context.insert(array.clone(), Value::placeholder_array());
            }
        }

        Ok(Self {
            name: name.into(),
            code,
            symbols,
            source_arrays,
            dest_arrays,
            context,
            evaluator: None,
        })
    }

    pub fn with_evaluator<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context) -> Result<(), EvalError> + Send + Sync + 'static,
    {
        self.evaluator = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn code(&self) -> &str { &self.code }
    pub fn symbols(&self) -> &BTreeSet<String> { &self.symbols }
    pub fn source_arrays(&self) -> &BTreeSet<String> { &self.source_arrays }
    pub fn dest_arrays(&self) -> &BTreeSet<String> { &self.dest_arrays }
    pub fn context(&self) -> &Context { &self.context }
    pub fn is_evaluable(&self) -> bool { self.evaluator.is_some() }

    /// The block's default value for its own symbol, if it declares one.
    pub fn default_value(&self) -> Option<&Value> {
        self.context.get(&self.name)
    }

    /// Runs the block against a deep copy of its default context overlaid
    /// with `extra`, returning the resulting bindings.
    ///
    /// Used for self-verification only; the stored context is never touched.
    pub fn evaluate(&self, extra: Context) -> Result<Context, EvalError> {
        let evaluator = self
            .evaluator
            .as_ref()
            .ok_or_else(|| EvalError::NotEvaluable(self.name.clone()))?;
        let mut context = self.context.clone();
        context.merge(extra);
        evaluator(&mut context)?;
        Ok(context)
    }
}

impl fmt::Debug for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeBlock")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("symbols", &self.symbols)
            .field("evaluable", &self.is_evaluable())
            .finish()
    }
}
