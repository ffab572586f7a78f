//! Ready-made phase sequences
//!
//! Two shapes are provided: the delayed-reward sequence, where whatever the
//! agent holds at the end of a phase follows it into the next one, and the
//! key-to-door sequence, where only a key fetched in the first room is handed
//! straight to the door room.

use crate::compose::{CarryPolicy, PhaseSequencer, PhaseSpec, SeedPolicy, SequencerPolicy};
use crate::env::EnvError;
use crate::infra::Color;
use crate::scenarios::{
    DoorKeyOptionalConfig, FetchKeyConfig, GoalKeyOptionalConfig, OpenGiftsConfig,
};

/// Initial seed of the preset sequences. The first reset bumps it to 112.
pub const DEFAULT_SEED: u64 = 111;

/// FetchKey, then a distractor, then a phase whose reward depends on the key.
///
/// The held object is forwarded at every boundary, so a key dropped in the
/// distractor is lost for the last phase.
pub fn three_phase_delayed_reward(
    key: FetchKeyConfig,
    distractor: PhaseSpec,
    delayed_reward: PhaseSpec,
    seed: u64,
) -> Result<PhaseSequencer, EnvError> {
    let policy = SequencerPolicy {
        carry: CarryPolicy::Held { only: None },
        seed: SeedPolicy::PerEpisode,
    };
    PhaseSequencer::new(
        vec![PhaseSpec::new(key), distractor, delayed_reward],
        seed,
        policy,
    )
}

/// FetchKey, an optional gifts room, then the door room.
///
/// The door room starts with a key of the color reported when the first phase
/// ended, if any. Without `gifts` the sequence has two phases.
pub fn key_to_gifts_to_door(
    key: FetchKeyConfig,
    gifts: Option<OpenGiftsConfig>,
    door: DoorKeyOptionalConfig,
    seed: u64,
) -> Result<PhaseSequencer, EnvError> {
    let mut phases = vec![PhaseSpec::new(key)];
    phases.extend(gifts.map(PhaseSpec::new));
    phases.push(PhaseSpec::new(door));

    let policy = SequencerPolicy {
        carry: CarryPolicy::KeyColorToFinal,
        seed: SeedPolicy::PerEpisode,
    };
    PhaseSequencer::new(phases, seed, policy)
}

fn small_key_room(max_steps: usize) -> FetchKeyConfig {
    FetchKeyConfig {
        size: 6,
        key_color: Color::Yellow,
        start_by_key: false,
        max_steps,
        ..Default::default()
    }
}

fn door_room(size: i32, max_steps: usize) -> DoorKeyOptionalConfig {
    DoorKeyOptionalConfig {
        size,
        key_color: None,
        door_color: Color::Yellow,
        max_steps,
    }
}

fn gifts_room(num_objs: usize, gift_reward: f64, max_steps: usize) -> OpenGiftsConfig {
    OpenGiftsConfig {
        size: 6,
        num_objs,
        max_steps,
        ..Default::default()
    }
    .with_gift_reward(gift_reward)
}

/// Key room, three gifts, door room.
pub fn tiny_key_gifts_door(seed: u64) -> Result<PhaseSequencer, EnvError> {
    three_phase_delayed_reward(
        small_key_room(5 * 6 * 6),
        PhaseSpec::new(gifts_room(3, 1.0, 5 * 6 * 6)),
        PhaseSpec::new(door_room(8, 5 * 8 * 8)),
        seed,
    )
}

/// Like [`tiny_key_gifts_door`] but the gifts room has no step budget and is
/// left on its first step.
pub fn key_no_distractor_door(seed: u64) -> Result<PhaseSequencer, EnvError> {
    three_phase_delayed_reward(
        small_key_room(5 * 6 * 6),
        PhaseSpec::new(gifts_room(2, 0.1, 0)),
        PhaseSpec::new(door_room(8, 5 * 8 * 8)),
        seed,
    )
}

/// Key room, gifts, then a goal room that pays extra for the key.
pub fn tiny_key_gifts_goal(seed: u64) -> Result<PhaseSequencer, EnvError> {
    let goal = GoalKeyOptionalConfig {
        size: 8,
        carrying: None,
        max_steps: 5 * 8 * 8,
        goal_reward: 1.0,
        key_reward: 4.0,
        ..Default::default()
    };
    three_phase_delayed_reward(
        FetchKeyConfig {
            done_when_fetched: false,
            ..small_key_room(5 * 6 * 6)
        },
        PhaseSpec::new(OpenGiftsConfig {
            done_when_all_opened: false,
            ..gifts_room(3, 1.0, 5 * 6 * 6)
        }),
        PhaseSpec::new(goal),
        seed,
    )
}

pub fn medium_key_gifts_door(seed: u64) -> Result<PhaseSequencer, EnvError> {
    key_to_gifts_to_door(
        small_key_room(5 * 6 * 6),
        Some(gifts_room(2, 0.1, 5 * 6 * 6)),
        door_room(6, 5 * 6 * 6),
        seed,
    )
}

pub fn key_no_gifts_door(seed: u64) -> Result<PhaseSequencer, EnvError> {
    key_to_gifts_to_door(
        small_key_room(5 * 6 * 6),
        None,
        door_room(8, 5 * 8 * 8),
        seed,
    )
}

/// Key-to-door layout with tight step budgets in the key and door rooms.
pub fn tiny_key_gifts_door_direct(seed: u64) -> Result<PhaseSequencer, EnvError> {
    key_to_gifts_to_door(
        small_key_room(6 * 6),
        Some(gifts_room(3, 1.0, 5 * 6 * 6)),
        door_room(8, 8 * 8),
        seed,
    )
}
