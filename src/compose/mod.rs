//! Phase composition
//!
//! A [`PhaseSequencer`] stitches an ordered list of single-phase scenarios into
//! one episode behind the same [`Scenario`](crate::env::Scenario) interface.
//! Each phase is described by a [`PhaseSpec`], usually built from a
//! [`PhaseTemplate`] config. What crosses a phase boundary and how each phase
//! is seeded is decided by the [`SequencerPolicy`].

mod phase;
mod policy;
mod sequencer;

pub use phase::{CarryWrite, PhaseSpec, PhaseTemplate};
pub use policy::{CarryPayload, CarryPolicy, SeedPolicy, SequencerPolicy};
pub use sequencer::PhaseSequencer;
