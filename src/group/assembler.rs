//! Phase code generation for a group.
//!
//! Per-pair code is the resolved precomputed fragments in order, a blank
//! line, then one invocation stub per equation. Setup and finalize code
//! carry stubs only: pairwise quantities have no meaning outside a pair.

use super::Group;
use crate::analysis::names::{GRADIENT_TOKEN, KERNEL_TOKEN};
use crate::config::AssemblerConfig;
use crate::equation::Phase;

/// The concrete kernel object generated code should call into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelBinding {
    object: String,
}

impl KernelBinding {
    /// `object` is the expression naming the kernel, e.g. `self.kernel`.
    pub fn new(object: impl Into<String>) -> Self {
        Self { object: object.into() }
    }

    pub fn object(&self) -> &str { &self.object }
}

/// Replaces the kernel tokens with calls on `kernel`. Without a kernel the
/// text is returned untouched.
pub fn substitute_kernel(code: String, kernel: Option<&KernelBinding>, config: &AssemblerConfig) -> String {
    match kernel {
        Some(k) => {
            let gradient = format!("{}.{}", k.object(), config.gradient_method);
            let value = format!("{}.{}", k.object(), config.kernel_method);
            code.replace(GRADIENT_TOKEN, &gradient).replace(KERNEL_TOKEN, &value)
        }
        None => code,
    }
}

impl<'lib> Group<'lib> {
    /// True if any equation defines a behavior for `phase`.
    pub fn has_code(&self, phase: Phase) -> bool {
        self.equations.iter().any(|eq| eq.has_behavior(phase))
    }

    pub fn has_setup_code(&self) -> bool { self.has_code(Phase::Setup) }
    pub fn has_per_pair_code(&self) -> bool { self.has_code(Phase::PerPair) }
    pub fn has_finalize_code(&self) -> bool { self.has_code(Phase::Finalize) }

    /// Assembles the code text for `phase`.
    pub fn get_code(&self, phase: Phase, kernel: Option<&KernelBinding>) -> String {
        let mut lines: Vec<String> = Vec::new();

        if phase == Phase::PerPair && !self.precomputed.is_empty() {
            lines.extend(self.precomputed.values().map(|cb| cb.code().trim().to_string()));
            lines.push(String::new());
        }

        let receiver = &self.config.receiver;
        let mut stubs = 0;
        for eq in &self.equations {
            let Some(behavior) = eq.behavior(phase) else { continue };
            let args = behavior.arguments(receiver).collect::<Vec<_>>().join(", ");
            lines.push(format!("{}.{}.{}({})", receiver, eq.var_name(), phase.method_name(), args));
            stubs += 1;
        }
        if stubs > 0 {
            lines.push(String::new());
        }

        substitute_kernel(lines.join("\n"), kernel, &self.config)
    }

    pub fn get_setup_code(&self, kernel: Option<&KernelBinding>) -> String {
        self.get_code(Phase::Setup, kernel)
    }

    pub fn get_per_pair_code(&self, kernel: Option<&KernelBinding>) -> String {
        self.get_code(Phase::PerPair, kernel)
    }

    pub fn get_finalize_code(&self, kernel: Option<&KernelBinding>) -> String {
        self.get_code(Phase::Finalize, kernel)
    }
}
