use std::fmt;
use std::sync::Arc;

use crate::env::{EnvError, Scenario};
use crate::state::WorldObject;

/// Immutable per-phase configuration that knows how to build its scenario.
///
/// The template is never mutated: every construction goes through [`derive`],
/// which produces a fresh configuration with the carried object written into
/// the scenario's carry field. A value already present in the template is
/// overwritten.
///
/// [`derive`]: PhaseTemplate::derive
pub trait PhaseTemplate: fmt::Debug {
    fn scenario_name(&self) -> &'static str;

    fn derive(&self, carry: Option<WorldObject>) -> Self
    where
        Self: Sized;

    /// Validates the configuration and builds the scenario. Configuration
    /// errors surface here, never on a later step.
    fn build(&self, seed: u64) -> Result<Box<dyn Scenario>, EnvError>;
}

/// What a transition writes into a phase's configuration.
///
/// `None` means no transition targets the phase and its template is built
/// unchanged. `Some(None)` writes empty hands over whatever the template holds.
pub type CarryWrite = Option<Option<WorldObject>>;

type Constructor = dyn Fn(CarryWrite, u64) -> Result<Box<dyn Scenario>, EnvError>;

/// One slot in a phase sequence: a scenario constructor bound to its template.
#[derive(Clone)]
pub struct PhaseSpec {
    name: String,
    constructor: Arc<Constructor>,
}

impl PhaseSpec {
    pub fn new<T: PhaseTemplate + 'static>(template: T) -> Self {
        let name = template.scenario_name().to_string();
        Self {
            name,
            constructor: Arc::new(move |carry: CarryWrite, seed| match carry {
                Some(object) => template.derive(object).build(seed),
                None => template.build(seed),
            }),
        }
    }

    /// Phase built by an arbitrary constructor taking the carry write and a seed.
    pub fn from_fn<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(CarryWrite, u64) -> Result<Box<dyn Scenario>, EnvError> + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(
        &self,
        carry: CarryWrite,
        seed: u64,
    ) -> Result<Box<dyn Scenario>, EnvError> {
        (self.constructor)(carry, seed)
    }
}

impl fmt::Debug for PhaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
