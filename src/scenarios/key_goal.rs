use crate::compose::PhaseTemplate;
use crate::env::{
    Action, AttrValue, Descriptors, EnvError, Observation, RenderMode, Scenario, StepResult,
};
use crate::infra::{Bounds, Color, Position};
use crate::state::{GridWorld, WorldObject};

const NAME: &str = "KeyGoal";

#[derive(Debug, Clone, PartialEq)]
pub struct KeyGoalConfig {
    pub size: i32,
    pub key_color: Color,
    /// Delayed reward for holding the key when the phase ends
    pub key_reward: f64,
    pub max_steps: usize,
    pub carrying: Option<WorldObject>,
}

impl Default for KeyGoalConfig {
    fn default() -> Self {
        Self {
            size: 8,
            key_color: Color::Yellow,
            key_reward: 3.0,
            max_steps: 2 * 8 * 8,
            carrying: None,
        }
    }
}

impl PhaseTemplate for KeyGoalConfig {
    fn scenario_name(&self) -> &'static str {
        NAME
    }

    fn derive(&self, carry: Option<WorldObject>) -> Self {
        Self {
            carrying: carry,
            ..self.clone()
        }
    }

    fn build(&self, seed: u64) -> Result<Box<dyn Scenario>, EnvError> {
        Ok(Box::new(KeyGoal::new(self.clone(), seed)?))
    }
}

/// Fetch a key and reach the goal in one room; the key only pays at the end.
#[derive(Debug)]
pub struct KeyGoal {
    config: KeyGoalConfig,
    world: GridWorld,
}

impl KeyGoal {
    pub fn new(config: KeyGoalConfig, seed: u64) -> Result<Self, EnvError> {
        if config.size < 4 {
            return Err(EnvError::config(
                NAME,
                format!("size must be at least 4, got {}", config.size),
            ));
        }

        let world = GridWorld::new(NAME, config.size, config.size, config.max_steps, seed)?;
        Ok(Self { config, world })
    }

    fn gen_grid(&mut self) -> Result<(), EnvError> {
        let (width, height) = (self.world.width(), self.world.height());
        self.world.grid.wall_rect(0, 0, width, height);
        self.world.set_agent(Position::new(1, 1));
        self.world
            .put_obj(WorldObject::Goal, Position::new(width - 2, height - 2));
        self.world.place_obj(
            Some(WorldObject::Key(self.config.key_color)),
            Bounds::interior(width, height),
        )?;
        self.world.mission = "fetch the key and go to goal".to_string();
        Ok(())
    }
}

impl Scenario for KeyGoal {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.world.begin_reset();
        self.gen_grid()?;
        self.world.carrying = self.config.carrying;
        self.world.finish_reset()
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let mut outcome = self.world.step(action)?;

        if outcome.done && self.world.carrying.is_some_and(|obj| obj.is_key()) {
            outcome.reward += self.config.key_reward;
        }

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
            "key_color" => Ok(AttrValue::Color(Some(self.config.key_color))),
            "key_reward" => Ok(AttrValue::Float(self.config.key_reward)),
            _ => self.world.attribute(name),
        }
    }
}
