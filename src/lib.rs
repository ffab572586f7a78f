pub mod compose;
pub mod config;
pub mod env;
pub mod infra;
pub mod policy;
pub mod presets;
pub mod registry;
pub mod runner;
pub mod scenarios;
pub mod state;

// Re-export commonly used types for convenience
pub use compose::{PhaseSequencer, PhaseSpec, PhaseTemplate, SequencerPolicy};
pub use env::{Action, EnvError, Observation, Scenario, StepResult};
pub use infra::{Color, Direction, Position};
pub use registry::ScenarioRegistry;
