//! Scenario interface - the gym-like contract shared by every phase and by the composer

mod action;
mod error;

use std::collections::BTreeMap;

use crate::infra::{Color, Position};
use crate::state::{Grid, WorldObject};

pub use action::Action;
pub use error::EnvError;

/// Observation returned by reset and step
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Full snapshot of the grid (agent not drawn)
    pub grid: Grid,
    /// Agent position
    pub agent_pos: Position,
    /// Object currently held by the agent
    pub carrying: Option<WorldObject>,
    /// Mission text of the scenario that produced this observation
    pub mission: String,
    /// Steps taken in the producing scenario
    pub step_count: usize,
}

/// Value stored in a step's info mapping
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Color(Color),
}

/// Additional information from a step, ordered so equal runs compare equal
pub type Info = BTreeMap<String, InfoValue>;

/// Step result from a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Next observation
    pub observation: Observation,
    /// Reward computed by the scenario for this step
    pub reward: f64,
    /// Terminal signal of the scenario
    pub done: bool,
    /// Additional info
    pub info: Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Print the frame to stdout
    Human,
    /// Return the frame as an ANSI-colored string
    Ansi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSpace {
    Discrete(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationSpace {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub render_modes: Vec<RenderMode>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            render_modes: vec![RenderMode::Human, RenderMode::Ansi],
        }
    }
}

/// Static descriptors a scenario exposes before and during episodes
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptors {
    pub action_space: ActionSpace,
    pub observation_space: ObservationSpace,
    pub reward_range: (f64, f64),
    pub metadata: Metadata,
}

impl Descriptors {
    pub fn for_grid(width: i32, height: i32) -> Self {
        Self {
            action_space: ActionSpace::Discrete(Action::COUNT),
            observation_space: ObservationSpace { width, height },
            reward_range: (f64::NEG_INFINITY, f64::INFINITY),
            metadata: Metadata::default(),
        }
    }
}

/// Value returned by a named attribute lookup
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    /// Seeds and other full-range unsigned values
    UInt(u64),
    Float(f64),
    Text(String),
    Color(Option<Color>),
    Position(Position),
    Object(Option<WorldObject>),
}

/// A single-phase simulation unit, or a composition of them.
///
/// Implementations own all of their mutable state; callers only interact
/// through these methods.
pub trait Scenario {
    /// Re-initialise internal state deterministically from the current seed.
    fn reset(&mut self) -> Result<Observation, EnvError>;

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError>;

    /// Reseed the scenario's generator, returning the seeds in use.
    fn seed(&mut self, seed: u64) -> Vec<u64>;

    fn render(&mut self, mode: RenderMode) -> Option<String>;

    /// Release held resources. Calling it twice is harmless.
    fn close(&mut self);

    fn descriptors(&self) -> &Descriptors;

    /// Object the agent currently holds.
    fn carrying(&self) -> Option<WorldObject>;

    /// Explicit forwarding point for named descriptors not covered above.
    fn attribute(&self, name: &str) -> Result<AttrValue, EnvError>;
}

impl<S: Scenario + ?Sized> Scenario for Box<S> {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        (**self).reset()
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        (**self).step(action)
    }

    fn seed(&mut self, seed: u64) -> Vec<u64> {
        (**self).seed(seed)
    }

    fn render(&mut self, mode: RenderMode) -> Option<String> {
        (**self).render(mode)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn descriptors(&self) -> &Descriptors {
        (**self).descriptors()
    }

    fn carrying(&self) -> Option<WorldObject> {
        (**self).carrying()
    }

    fn attribute(&self, name: &str) -> Result<AttrValue, EnvError> {
        (**self).attribute(name)
    }
}
