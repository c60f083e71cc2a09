//! Defines the `Equation`, a single physical contribution bound to particle sets.
//!
//! An equation declares its data needs only through the formal parameter
//! names of its phase behaviors. Names are drawn from a fixed vocabulary:
//! `s_`/`d_` prefixed arrays, the `s_idx`/`d_idx` indices, precomputed symbol
//! names and the `KERNEL`/`GRADIENT` tokens.

use smallvec::SmallVec;
use std::fmt;

/// One of the three points in a timestep where equation code runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Once per destination particle, before any pair is visited.
    Setup,
    /// Once per destination/source particle pair.
    PerPair,
    /// Once per destination particle, after all pairs.
    Finalize,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Setup, Phase::PerPair, Phase::Finalize];

    /// Name of the method the generated code calls for this phase.
    pub fn method_name(&self) -> &'static str {
        match self {
            Phase::Setup => "initialize",
            Phase::PerPair => "loop",
            Phase::Finalize => "post_loop",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// The formal parameter list of one phase behavior.
///
/// The list may start with the implicit receiver (`self`); it is dropped
/// wherever arguments are rendered or collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Behavior {
    params: SmallVec<[String; 8]>,
}

impl Behavior {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { params: params.into_iter().map(Into::into).collect() }
    }

    pub fn params(&self) -> &[String] { &self.params }

    /// Parameters excluding the receiver.
    pub fn arguments<'a>(&'a self, receiver: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params.iter().map(String::as_str).filter(move |p| *p != receiver)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    class_name: String,
    display_name: String,
    destination: String,
    sources: Option<Vec<String>>,
    setup: Option<Behavior>,
    per_pair: Option<Behavior>,
    finalize: Option<Behavior>,
    var_name: String,
}

impl Equation {
    /// Creates an equation of class `class_name` acting on `destination`.
    /// An empty `sources` list means the equation needs no neighbors.
    pub fn new<I, S>(class_name: impl Into<String>, destination: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let class_name = class_name.into();
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        Self {
            display_name: class_name.clone(),
            class_name,
            destination: destination.into(),
            sources: if sources.is_empty() { None } else { Some(sources) },
            setup: None,
            per_pair: None,
            finalize: None,
            var_name: String::new(),
        }
    }

    /// Overrides the display name (defaults to the class name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_behavior<I, S>(mut self, phase: Phase, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let behavior = Some(Behavior::new(params));
        match phase {
            Phase::Setup => self.setup = behavior,
            Phase::PerPair => self.per_pair = behavior,
            Phase::Finalize => self.finalize = behavior,
        }
        self
    }

    pub fn with_setup<I: IntoIterator<Item = S>, S: Into<String>>(self, params: I) -> Self {
        self.with_behavior(Phase::Setup, params)
    }

    pub fn with_per_pair<I: IntoIterator<Item = S>, S: Into<String>>(self, params: I) -> Self {
        self.with_behavior(Phase::PerPair, params)
    }

    pub fn with_finalize<I: IntoIterator<Item = S>, S: Into<String>>(self, params: I) -> Self {
        self.with_behavior(Phase::Finalize, params)
    }

    pub fn behavior(&self, phase: Phase) -> Option<&Behavior> {
        match phase {
            Phase::Setup => self.setup.as_ref(),
            Phase::PerPair => self.per_pair.as_ref(),
            Phase::Finalize => self.finalize.as_ref(),
        }
    }

    pub fn has_behavior(&self, phase: Phase) -> bool {
        self.behavior(phase).is_some()
    }

    pub fn behaviors(&self) -> impl Iterator<Item = (Phase, &Behavior)> {
        Phase::ALL.into_iter().filter_map(move |p| self.behavior(p).map(|b| (p, b)))
    }

    pub fn class_name(&self) -> &str { &self.class_name }
    pub fn display_name(&self) -> &str { &self.display_name }
    pub fn destination(&self) -> &str { &self.destination }
    pub fn sources(&self) -> Option<&[String]> { self.sources.as_deref() }
    pub fn requires_neighbors(&self) -> bool { self.sources.is_some() }

    /// Instance name inside the generated code. Empty until the owning group
    /// generates its wrappers.
    pub fn var_name(&self) -> &str { &self.var_name }

    pub(crate) fn set_var_name(&mut self, name: String) {
        self.var_name = name;
    }
}
