//! Single-phase grid scenarios
//!
//! Each scenario owns a [`GridWorld`](crate::state::GridWorld), lays out its
//! room on reset and layers its own reward and termination rule over the shared
//! dynamics. Configs implement [`PhaseTemplate`](crate::compose::PhaseTemplate)
//! so any of them can fill a slot in a composed episode.

mod door_key_optional;
mod fetch_key;
mod goal_key_optional;
mod key_goal;
mod open_gifts;

pub use door_key_optional::{DoorKeyOptional, DoorKeyOptionalConfig};
pub use fetch_key::{FetchKey, FetchKeyConfig};
pub use goal_key_optional::{GoalKeyOptional, GoalKeyOptionalConfig};
pub use key_goal::{KeyGoal, KeyGoalConfig};
pub use open_gifts::{OpenGifts, OpenGiftsConfig};
