//! The registry of precomputed pairwise quantities.
//!
//! Entries may reference one another by name (`R2IJ` is defined in terms of
//! `XIJ`). Registration order carries no meaning; ordering is the job of
//! [`crate::analysis::topology::sort_precomputed`].

use super::code_block::CodeBlock;
use super::error::EvalError;
use super::types::{Context, Value};
use crate::analysis::error::{CycleError, ParseError};
use crate::analysis::topology::sort_precomputed;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Immutable map of precomputed symbol name to its code block.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedLibrary {
    blocks: IndexMap<String, CodeBlock>,
}

impl PrecomputedLibrary {
    /// Builds a library from blocks keyed by their own names.
    /// A later block with a duplicate name replaces the earlier one.
    pub fn from_blocks(blocks: impl IntoIterator<Item = CodeBlock>) -> Self {
        Self {
            blocks: blocks.into_iter().map(|cb| (cb.name().to_string(), cb)).collect(),
        }
    }

    /// The process-wide standard library, built on first use.
    pub fn shared() -> &'static PrecomputedLibrary {
        static SHARED: OnceLock<PrecomputedLibrary> = OnceLock::new();
        SHARED.get_or_init(|| {
            Self::standard().expect("BUG: standard precomputed library failed to parse")
        })
    }

    /// The standard SPH pairwise quantities.
    pub fn standard() -> Result<Self, ParseError> {
        let real = |name: &str| Context::new().with(name, Value::Real(0.0));
        let vec3 = |name: &str| Context::new().with(name, Value::Vector(vec![0.0; 3]));

        let blocks = vec![
            CodeBlock::new("HIJ", "HIJ = 0.5*(d_h[d_idx] + s_h[s_idx])", real("HIJ"))?
                .with_evaluator(|ctx| {
                    let v = 0.5 * (ctx.element("d_h", "d_idx")? + ctx.element("s_h", "s_idx")?);
                    ctx.set_real("HIJ", v);
                    Ok(())
                }),
            CodeBlock::new("RHOIJ", "RHOIJ = 0.5*(d_rho[d_idx] + s_rho[s_idx])", real("RHOIJ"))?
                .with_evaluator(|ctx| {
                    let v = 0.5 * (ctx.element("d_rho", "d_idx")? + ctx.element("s_rho", "s_idx")?);
                    ctx.set_real("RHOIJ", v);
                    Ok(())
                }),
            CodeBlock::new("RHOIJ1", "RHOIJ1 = 1.0/RHOIJ", real("RHOIJ1"))?.with_evaluator(|ctx| {
                let v = 1.0 / ctx.real("RHOIJ")?;
                ctx.set_real("RHOIJ1", v);
                Ok(())
            }),
            CodeBlock::new(
                "XIJ",
                "
                XIJ[0] = d_x[d_idx] - s_x[s_idx]
                XIJ[1] = d_y[d_idx] - s_y[s_idx]
                XIJ[2] = d_z[d_idx] - s_z[s_idx]
                ",
                vec3("XIJ"),
            )?
            .with_evaluator(|ctx| pairwise_difference(ctx, "XIJ", ["x", "y", "z"])),
            CodeBlock::new(
                "VIJ",
                "
                VIJ[0] = d_u[d_idx] - s_u[s_idx]
                VIJ[1] = d_v[d_idx] - s_v[s_idx]
                VIJ[2] = d_w[d_idx] - s_w[s_idx]
                ",
                vec3("VIJ"),
            )?
            .with_evaluator(|ctx| pairwise_difference(ctx, "VIJ", ["u", "v", "w"])),
            CodeBlock::new(
                "R2IJ",
                "
                R2IJ = XIJ[0]*XIJ[0] + XIJ[1]*XIJ[1] + XIJ[2]*XIJ[2]
                ",
                real("R2IJ"),
            )?
            .with_evaluator(|ctx| {
                let v: f64 = ctx.vector("XIJ")?.iter().map(|x| x * x).sum();
                ctx.set_real("R2IJ", v);
                Ok(())
            }),
            CodeBlock::new(
                "RIJ",
                "
                RIJ = sqrt(R2IJ)
                ",
                real("RIJ"),
            )?
            .with_evaluator(|ctx| {
                let v = ctx.real("R2IJ")?.sqrt();
                ctx.set_real("RIJ", v);
                Ok(())
            }),
            // Kernel quantities carry no evaluator: numeric kernels live outside this crate.
            CodeBlock::new("WIJ", "WIJ = KERNEL(XIJ, RIJ, HIJ)", real("WIJ"))?,
            CodeBlock::new("WI", "WI = KERNEL(XIJ, RIJ, d_h[d_idx])", real("WI"))?,
            CodeBlock::new("WJ", "WJ = KERNEL(XIJ, RIJ, s_h[s_idx])", real("WJ"))?,
            CodeBlock::new("DWIJ", "GRADIENT(XIJ, RIJ, HIJ, DWIJ)", vec3("DWIJ"))?,
            CodeBlock::new("DWI", "GRADIENT(XIJ, RIJ, d_h[d_idx], DWI)", vec3("DWI"))?,
            CodeBlock::new("DWJ", "GRADIENT(XIJ, RIJ, s_h[s_idx], DWJ)", vec3("DWJ"))?,
        ];

        Ok(Self::from_blocks(blocks))
    }

    pub fn get(&self, name: &str) -> Option<&CodeBlock> { self.blocks.get(name) }
    pub fn contains(&self, name: &str) -> bool { self.blocks.contains_key(name) }
    pub fn len(&self) -> usize { self.blocks.len() }
    pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeBlock)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Evaluates every evaluable block on default inputs. See [`Self::self_test_with`].
    pub fn self_test(&self) -> Result<Vec<(String, Result<Context, EvalError>)>, CycleError> {
        self.self_test_with(&Context::new())
    }

    /// Evaluates every evaluable block in dependency order.
    ///
    /// Each block runs on a private deep copy of its defaults, overlaid with
    /// `seed` and with the values its upstream library entries produced.
    /// Blocks of one dependency level run in parallel. Results come back in
    /// registry order.
    pub fn self_test_with(&self, seed: &Context) -> Result<Vec<(String, Result<Context, EvalError>)>, CycleError> {
        let sorted = sort_precomputed(self, self.names())?;
        let mut produced: HashMap<String, Value> = HashMap::new();
        let mut results: HashMap<String, Result<Context, EvalError>> = HashMap::new();

        for level in sorted.levels() {
            let level_results: Vec<(String, Result<Context, EvalError>)> = level
                .par_iter()
                .filter_map(|&name| {
                    let cb = self.get(name).filter(|cb| cb.is_evaluable())?;
                    let mut extra = seed.clone();
                    for dep in cb.symbols().iter().filter(|s| s.as_str() != name) {
                        if let Some(value) = produced.get(dep) {
                            extra.insert(dep.clone(), value.clone());
                        }
                    }
                    Some((name.to_string(), cb.evaluate(extra)))
                })
                .collect();

            for (name, result) in level_results {
                if let Some(value) = result.as_ref().ok().and_then(|ctx| ctx.get(&name)) {
                    produced.insert(name.clone(), value.clone());
                }
                results.insert(name, result);
            }
        }
        debug!(evaluated = results.len(), "library self-test finished");

        Ok(self
            .names()
            .filter_map(|name| results.remove(name).map(|r| (name.to_string(), r)))
            .collect())
    }
}

/// `target[k] = d_<c>[d_idx] - s_<c>[s_idx]` for each component `c`.
fn pairwise_difference(ctx: &mut Context, target: &str, components: [&str; 3]) -> Result<(), EvalError> {
    let mut out = Vec::with_capacity(3);
    for c in components {
        let d = ctx.element(&format!("d_{c}"), "d_idx")?;
        let s = ctx.element(&format!("s_{c}"), "s_idx")?;
        out.push(d - s);
    }
    ctx.set_vector(target, out);
    Ok(())
}
