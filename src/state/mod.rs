mod grid;
mod world;

pub use grid::{Grid, ObjectKind, WorldObject};
pub use world::{Event, GridWorld, StepOutcome};
