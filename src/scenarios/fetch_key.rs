use crate::compose::PhaseTemplate;
use crate::env::{
    Action, AttrValue, Descriptors, EnvError, InfoValue, Observation, RenderMode, Scenario,
    StepResult,
};
use crate::infra::{Bounds, Color, Position};
use crate::state::{GridWorld, WorldObject};

const NAME: &str = "FetchKey";

/// Fetch-a-key configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FetchKeyConfig {
    /// Side length of the square grid, walls included
    pub size: i32,
    pub key_color: Color,
    /// Put the key right next to the agent instead of on a random cell
    pub start_by_key: bool,
    pub max_steps: usize,
    /// End the phase as soon as the key is held; otherwise only the step budget ends it
    pub done_when_fetched: bool,
    /// Object the agent starts with
    pub carrying: Option<WorldObject>,
}

impl Default for FetchKeyConfig {
    fn default() -> Self {
        Self {
            size: 8,
            key_color: Color::Yellow,
            start_by_key: false,
            max_steps: 2 * 8 * 8,
            done_when_fetched: false,
            carrying: None,
        }
    }
}

impl PhaseTemplate for FetchKeyConfig {
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
        Ok(Box::new(FetchKey::new(self.clone(), seed)?))
    }
}

/// Empty room with one key. Holding the key is never rewarded here; later
/// phases decide whether it was worth fetching.
#[derive(Debug)]
pub struct FetchKey {
    config: FetchKeyConfig,
    world: GridWorld,
}

impl FetchKey {
    pub fn new(config: FetchKeyConfig, seed: u64) -> Result<Self, EnvError> {
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

        let agent = Position::new(1, 1);
        self.world.set_agent(agent);

        let key = WorldObject::Key(self.config.key_color);
        if self.config.start_by_key {
            self.world.put_obj(key, Position::new(agent.x + 1, agent.y));
        } else {
            self.world
                .place_obj(Some(key), Bounds::interior(width, height))?;
        }

        self.world.mission = "fetch a key".to_string();
        Ok(())
    }
}

impl Scenario for FetchKey {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.world.begin_reset();
        self.gen_grid()?;
        self.world.carrying = self.config.carrying;
        self.world.finish_reset()
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let mut outcome = self.world.step(action)?;

        if let Some(WorldObject::Key(color)) = self.world.carrying {
            outcome
                .info
                .insert("carrying_key_color".to_string(), InfoValue::Color(color));
            outcome.reward = 0.0;

            if self.config.done_when_fetched {
                outcome.done = true;
            }
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
            "start_by_key" => Ok(AttrValue::Bool(self.config.start_by_key)),
            "done_when_fetched" => Ok(AttrValue::Bool(self.config.done_when_fetched)),
            _ => self.world.attribute(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Direction;

    fn start_by_key(done_when_fetched: bool) -> FetchKey {
        FetchKey::new(
            FetchKeyConfig {
                size: 6,
                start_by_key: true,
                done_when_fetched,
                ..Default::default()
            },
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_reset_layout() {
        let mut env = start_by_key(false);
        let obs = env.reset().unwrap();

        assert_eq!(obs.agent_pos, Position::new(1, 1));
        assert_eq!(
            obs.grid.get(&Position::new(2, 1)),
            Some(&WorldObject::Key(Color::Yellow))
        );
        assert_eq!(obs.mission, "fetch a key");
        assert_eq!(obs.carrying, None);
    }

    #[test]
    fn test_random_key_placement_avoids_agent() {
        for seed in 0..20 {
            let mut env = FetchKey::new(FetchKeyConfig::default(), seed).unwrap();
            let obs = env.reset().unwrap();
            let keys = obs.grid.positions_of(crate::state::ObjectKind::Key);
            assert_eq!(keys.len(), 1);
            assert_ne!(keys[0], obs.agent_pos);
        }
    }

    #[test]
    fn test_pickup_reports_color_without_reward() {
        let mut env = start_by_key(false);
        env.reset().unwrap();

        let result = env.step(Action::Use(Direction::East)).unwrap();
        assert_eq!(result.reward, 0.0);
        assert!(!result.done);
        assert_eq!(
            result.info.get("carrying_key_color"),
            Some(&InfoValue::Color(Color::Yellow))
        );
        assert_eq!(env.carrying(), Some(WorldObject::Key(Color::Yellow)));
    }

    #[test]
    fn test_done_when_fetched() {
        let mut env = start_by_key(true);
        env.reset().unwrap();

        assert!(!env.step(Action::Idle).unwrap().done);
        assert!(env.step(Action::Use(Direction::East)).unwrap().done);
    }

    #[test]
    fn test_rejects_small_grid() {
        let err = FetchKey::new(
            FetchKeyConfig {
                size: 3,
                ..Default::default()
            },
            0,
        )
        .unwrap_err();
        assert!(matches!(err, EnvError::Config { scenario: NAME, .. }));
    }
}
