use crate::env::{Info, InfoValue, Scenario};
use crate::state::{ObjectKind, WorldObject};

/// How state crosses a phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryPolicy {
    /// Forward whatever the outgoing phase holds to the next phase. With
    /// `only` set, objects of any other kind are forwarded as empty hands.
    Held { only: Option<ObjectKind> },
    /// Read `carrying_key_color` from the info of the step that ends phase 0
    /// and hand a key of that color straight to the final phase. Phases in
    /// between start empty-handed.
    KeyColorToFinal,
    Nothing,
}

impl Default for CarryPolicy {
    fn default() -> Self {
        CarryPolicy::Held { only: None }
    }
}

/// Extracted carry, waiting for the construction of its target phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarryPayload {
    pub target_phase: usize,
    pub object: Option<WorldObject>,
}

impl CarryPolicy {
    /// Payload produced when `from_phase` ends, if this policy forwards anything from it.
    pub fn extract(
        &self,
        from_phase: usize,
        num_phases: usize,
        outgoing: &dyn Scenario,
        info: &Info,
    ) -> Option<CarryPayload> {
        match self {
            CarryPolicy::Held { only } => Some(CarryPayload {
                target_phase: from_phase + 1,
                object: outgoing
                    .carrying()
                    .filter(|obj| only.is_none_or(|kind| obj.kind() == kind)),
            }),
            CarryPolicy::KeyColorToFinal => (from_phase == 0).then(|| CarryPayload {
                target_phase: num_phases - 1,
                object: match info.get("carrying_key_color") {
                    Some(InfoValue::Color(color)) => Some(WorldObject::Key(*color)),
                    _ => None,
                },
            }),
            CarryPolicy::Nothing => None,
        }
    }
}

/// Which seed each phase is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Every phase of an episode uses the running seed.
    #[default]
    PerEpisode,
    /// Phase `k` uses `running_seed + k`. The running seed itself still only
    /// moves on reset.
    PerPhase,
}

impl SeedPolicy {
    pub fn phase_seed(&self, running_seed: u64, phase: usize) -> u64 {
        match self {
            SeedPolicy::PerEpisode => running_seed,
            SeedPolicy::PerPhase => running_seed.wrapping_add(phase as u64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencerPolicy {
    pub carry: CarryPolicy,
    pub seed: SeedPolicy,
}
