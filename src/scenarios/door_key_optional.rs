use crate::compose::PhaseTemplate;
use crate::env::{
    Action, AttrValue, Descriptors, EnvError, Observation, RenderMode, Scenario, StepResult,
};
use crate::infra::{Bounds, Color, Position};
use crate::state::{GridWorld, WorldObject};

const NAME: &str = "DoorKeyOptional";

#[derive(Debug, Clone, PartialEq)]
pub struct DoorKeyOptionalConfig {
    pub size: i32,
    /// Color of the key the agent starts with; `None` starts empty-handed
    pub key_color: Option<Color>,
    pub door_color: Color,
    pub max_steps: usize,
}

impl Default for DoorKeyOptionalConfig {
    fn default() -> Self {
        Self {
            size: 8,
            key_color: None,
            door_color: Color::Yellow,
            max_steps: 10 * 8 * 8,
        }
    }
}

impl PhaseTemplate for DoorKeyOptionalConfig {
    fn scenario_name(&self) -> &'static str {
        NAME
    }

    /// Only keys can be carried into this room; anything else arrives as empty hands.
    fn derive(&self, carry: Option<WorldObject>) -> Self {
        Self {
            key_color: carry.filter(WorldObject::is_key).and_then(|key| key.color()),
            ..self.clone()
        }
    }

    fn build(&self, seed: u64) -> Result<Box<dyn Scenario>, EnvError> {
        Ok(Box::new(DoorKeyOptional::new(self.clone(), seed)?))
    }
}

/// Two rooms split by a wall with a locked door and no key in sight.
/// Only solvable when the agent arrives holding a key of the door's color.
#[derive(Debug)]
pub struct DoorKeyOptional {
    config: DoorKeyOptionalConfig,
    world: GridWorld,
}

impl DoorKeyOptional {
    pub fn new(config: DoorKeyOptionalConfig, seed: u64) -> Result<Self, EnvError> {
        if config.size < 5 {
            return Err(EnvError::config(
                NAME,
                format!("size must be at least 5, got {}", config.size),
            ));
        }

        let world = GridWorld::new(NAME, config.size, config.size, config.max_steps, seed)?;
        Ok(Self { config, world })
    }

    fn gen_grid(&mut self) -> Result<(), EnvError> {
        let (width, height) = (self.world.width(), self.world.height());
        self.world.grid.wall_rect(0, 0, width, height);

        self.world
            .put_obj(WorldObject::Goal, Position::new(width - 2, height - 2));

        let split = self.world.rand_int(2, width - 2);
        self.world.grid.vert_wall(split, 0, None);

        self.world
            .place_agent(Bounds::new(1, split - 1, 1, height - 2))?;

        let door_row = self.world.rand_int(1, height - 2);
        self.world.put_obj(
            WorldObject::locked_door(self.config.door_color),
            Position::new(split, door_row),
        );

        self.world.mission = "use the key to open the door and then get to the goal".to_string();
        Ok(())
    }
}

impl Scenario for DoorKeyOptional {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.world.begin_reset();
        self.gen_grid()?;
        self.world.carrying = self.config.key_color.map(WorldObject::Key);
        self.world.finish_reset()
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let outcome = self.world.step(action)?;
        Ok(StepResult {
            observation: self.world.observe(),
            reward: outcome.reward,
            done: outcome.done,
            info: outcome.info,
        })
    }

    fn seed(&mut self, seed: u64) -> Vec<u64> {
        self.world.seed(seed)
    }

    fn render(&mut self, mode: RenderMode) -> Option<String> {
        self.world.render(mode)
    }

    fn close(&mut self) {}

    fn descriptors(&self) -> &Descriptors {
        self.world.descriptors()
    }

    fn carrying(&self) -> Option<WorldObject> {
        self.world.carrying
    }

    fn attribute(&self, name: &str) -> Result<AttrValue, EnvError> {
        match name {
            "key_color" => Ok(AttrValue::Color(self.config.key_color)),
            "door_color" => Ok(AttrValue::Color(Some(self.config.door_color))),
            _ => self.world.attribute(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ObjectKind;

    #[test]
    fn test_layout_splits_rooms() {
        for seed in 0..10 {
            let mut env = DoorKeyOptional::new(DoorKeyOptionalConfig::default(), seed).unwrap();
            let obs = env.reset().unwrap();

            let doors = obs.grid.positions_of(ObjectKind::Door);
            assert_eq!(doors.len(), 1);
            assert!(obs.agent_pos.x < doors[0].x, "agent starts left of the wall");
            assert_eq!(
                obs.grid.get(&Position::new(6, 6)),
                Some(&WorldObject::Goal)
            );
            assert_eq!(obs.carrying, None);
        }
    }

    #[test]
    fn test_starts_with_key() {
        let config = DoorKeyOptionalConfig {
            key_color: Some(Color::Yellow),
            ..Default::default()
        };
        let mut env = DoorKeyOptional::new(config, 0).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.carrying, Some(WorldObject::Key(Color::Yellow)));
    }

    #[test]
    fn test_derive_overwrites_template_key() {
        let template = DoorKeyOptionalConfig {
            key_color: Some(Color::Red),
            ..Default::default()
        };

        let derived = template.derive(Some(WorldObject::Key(Color::Yellow)));
        assert_eq!(derived.key_color, Some(Color::Yellow));
        assert_eq!(template.derive(None).key_color, None);
        assert_eq!(template.derive(Some(WorldObject::Gift)).key_color, None);
        assert_eq!(template.key_color, Some(Color::Red));
    }
}
