use std::collections::BTreeMap;

use tracing::debug;

use crate::compose::{PhaseSequencer, PhaseTemplate};
use crate::env::{EnvError, Scenario};
use crate::infra::Color;
use crate::presets;
use crate::scenarios::{
    DoorKeyOptionalConfig, FetchKeyConfig, GoalKeyOptionalConfig, KeyGoalConfig, OpenGiftsConfig,
};
use crate::state::WorldObject;

pub type ScenarioBuilder = fn(u64) -> Result<Box<dyn Scenario>, EnvError>;

#[derive(Clone, Copy)]
struct Entry {
    description: &'static str,
    builder: ScenarioBuilder,
}

/// Catalog of named scenarios, single-phase and composed.
pub struct ScenarioRegistry {
    entries: BTreeMap<String, Entry>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in scenario.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("Key-8x8-v0", "FetchKey, 8x8", |seed| {
            FetchKeyConfig::default().build(seed)
        });
        registry.register(
            "Key-8x8-startbykey-v0",
            "FetchKey, 8x8, key next to the agent",
            |seed| {
                FetchKeyConfig {
                    start_by_key: true,
                    ..Default::default()
                }
                .build(seed)
            },
        );
        registry.register("Key-10x10-v0", "FetchKey, 10x10", |seed| {
            FetchKeyConfig {
                size: 10,
                ..Default::default()
            }
            .build(seed)
        });

        registry.register("Gifts-8x8-N3-Rew10-v0", "OpenGifts, 3 gifts worth 10", |seed| {
            OpenGiftsConfig::default().with_gift_reward(10.0).build(seed)
        });
        registry.register(
            "Gifts-15x15-N15-Rew10-v0",
            "OpenGifts, 15x15, 15 gifts worth 10",
            |seed| {
                OpenGiftsConfig {
                    size: 15,
                    num_objs: 15,
                    ..Default::default()
                }
                .with_gift_reward(10.0)
                .build(seed)
            },
        );

        registry.register(
            "DoorHasKey-8x8-v0",
            "DoorKeyOptional, starting with the matching key",
            |seed| {
                DoorKeyOptionalConfig {
                    key_color: Some(Color::Yellow),
                    door_color: Color::Yellow,
                    ..Default::default()
                }
                .build(seed)
            },
        );
        registry.register(
            "DoorNoKey-8x8-v0",
            "DoorKeyOptional, empty-handed",
            |seed| DoorKeyOptionalConfig::default().build(seed),
        );

        registry.register(
            "GoalKeyOptionalEnvNoKey-6x6-v0",
            "GoalKeyOptional, 6x6, empty-handed",
            |seed| goal_key_optional_6x6(None, 10 * 6 * 6, true).build(seed),
        );
        registry.register(
            "GoalKeyOptionalEnvWithKey-6x6-v0",
            "GoalKeyOptional, 6x6, starting with a key",
            |seed| {
                goal_key_optional_6x6(Some(WorldObject::Key(Color::Yellow)), 10 * 6 * 6, true)
                    .build(seed)
            },
        );
        registry.register(
            "GoalKeyOptionalEnvWithKeyFixedSteps-6x6-v0",
            "GoalKeyOptional, 6x6, starting with a key, runs the full 20 steps",
            |seed| {
                goal_key_optional_6x6(Some(WorldObject::Key(Color::Yellow)), 20, false)
                    .build(seed)
            },
        );

        registry.register("KeyGoal-6x6-v0", "KeyGoal, 6x6", |seed| {
            key_goal(6).build(seed)
        });
        registry.register("KeyGoal-8x8-v0", "KeyGoal, 8x8", |seed| {
            key_goal(8).build(seed)
        });
        registry.register("KeyGoal-10x10-v0", "KeyGoal, 10x10", |seed| {
            key_goal(10).build(seed)
        });

        registry.register(
            "KeyGiftsDoor-tiny-v0",
            "key room, gifts, door room; held object carried through",
            |seed| composed(presets::tiny_key_gifts_door(seed)),
        );
        registry.register(
            "KeyGiftsDoor-tiny-direct-v0",
            "key room, gifts, door room; key color handed to the door room",
            |seed| composed(presets::tiny_key_gifts_door_direct(seed)),
        );
        registry.register(
            "KeyNoDistractorDoor-v0",
            "key room, zero-budget gifts room, door room",
            |seed| composed(presets::key_no_distractor_door(seed)),
        );
        registry.register(
            "KeyGiftsGoal-tiny-v0",
            "key room, gifts, goal room paying extra for the key",
            |seed| composed(presets::tiny_key_gifts_goal(seed)),
        );
        registry.register(
            "KeyGiftsDoor-medium-v0",
            "key room, gifts, 6x6 door room",
            |seed| composed(presets::medium_key_gifts_door(seed)),
        );
        registry.register(
            "KeyNoGiftsDoor-v0",
            "key room, door room",
            |seed| composed(presets::key_no_gifts_door(seed)),
        );

        registry
    }

    /// Adds or replaces an entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: &'static str,
        builder: ScenarioBuilder,
    ) {
        let name = name.into();
        if self
            .entries
            .insert(name.clone(), Entry { description, builder })
            .is_some()
        {
            debug!("Replaced scenario {}", name);
        }
    }

    pub fn make(&self, name: &str, seed: u64) -> Result<Box<dyn Scenario>, EnvError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| EnvError::UnknownScenario {
                name: name.to_string(),
            })?;
        debug!(name, seed, "building scenario");
        (entry.builder)(seed)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn description(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).map(|entry| entry.description)
    }

    /// Registered names in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn composed(sequencer: Result<PhaseSequencer, EnvError>) -> Result<Box<dyn Scenario>, EnvError> {
    Ok(Box::new(sequencer?))
}

fn goal_key_optional_6x6(
    carrying: Option<WorldObject>,
    max_steps: usize,
    done_when_goal_reached: bool,
) -> GoalKeyOptionalConfig {
    GoalKeyOptionalConfig {
        size: 6,
        carrying,
        max_steps,
        done_when_goal_reached,
        ..Default::default()
    }
}

fn key_goal(size: i32) -> KeyGoalConfig {
    KeyGoalConfig {
        size,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Action, AttrValue};

    #[test]
    fn test_unknown_name() {
        let registry = ScenarioRegistry::with_defaults();
        assert!(matches!(
            registry.make("Key-9x9-v0", 0),
            Err(EnvError::UnknownScenario { name }) if name == "Key-9x9-v0"
        ));
    }

    #[test]
    fn test_every_entry_builds_and_steps() {
        let registry = ScenarioRegistry::with_defaults();
        let ids: Vec<String> = registry.ids().map(str::to_string).collect();
        assert_eq!(ids.len(), 19);

        for id in ids {
            let mut env = registry.make(&id, 3).unwrap();
            env.reset().unwrap();
            env.step(Action::Idle).unwrap();
            env.close();
        }
    }

    #[test]
    fn test_composed_entries_expose_phases() {
        let registry = ScenarioRegistry::with_defaults();

        let mut env = registry.make("KeyNoGiftsDoor-v0", 5).unwrap();
        assert_eq!(env.attribute("num_phases"), Ok(AttrValue::Int(2)));
        env.reset().unwrap();
        assert_eq!(env.attribute("running_seed"), Ok(AttrValue::UInt(6)));

        let env = registry.make("KeyGiftsDoor-tiny-v0", 5).unwrap();
        assert_eq!(env.attribute("num_phases"), Ok(AttrValue::Int(3)));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ScenarioRegistry::new();
        registry.register("custom", "first", |seed| KeyGoalConfig::default().build(seed));
        registry.register("custom", "second", |seed| key_goal(6).build(seed));

        assert_eq!(registry.ids().count(), 1);
        assert_eq!(registry.description("custom"), Some("second"));
        let env = registry.make("custom", 0).unwrap();
        assert_eq!(env.attribute("width"), Ok(AttrValue::Int(6)));
    }
}
