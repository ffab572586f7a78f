use crate::compose::PhaseTemplate;
use crate::env::{
    Action, AttrValue, Descriptors, EnvError, Observation, RenderMode, Scenario, StepResult,
};
use crate::infra::Bounds;
use crate::state::{Event, GridWorld, ObjectKind, WorldObject};

const NAME: &str = "OpenGifts";

/// Distractor room configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OpenGiftsConfig {
    pub size: i32,
    /// Number of gifts placed, at least one
    pub num_objs: usize,
    /// Reward per opened gift, sampled uniformly from `[min, max)`
    pub gift_reward: (f64, f64),
    /// A zero budget turns the room into a pass-through phase
    pub max_steps: usize,
    pub done_when_all_opened: bool,
    pub carrying: Option<WorldObject>,
}

impl Default for OpenGiftsConfig {
    fn default() -> Self {
        Self {
            size: 8,
            num_objs: 3,
            gift_reward: (10.0, 10.0),
            max_steps: 5 * 8 * 8,
            done_when_all_opened: false,
            carrying: None,
        }
    }
}

impl OpenGiftsConfig {
    /// Fixed reward per gift.
    pub fn with_gift_reward(mut self, reward: f64) -> Self {
        self.gift_reward = (reward, reward);
        self
    }
}

impl PhaseTemplate for OpenGiftsConfig {
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
        Ok(Box::new(OpenGifts::new(self.clone(), seed)?))
    }
}

/// Room with randomly placed gifts that pay out when opened.
#[derive(Debug)]
pub struct OpenGifts {
    config: OpenGiftsConfig,
    world: GridWorld,
    num_opened: usize,
}

impl OpenGifts {
    pub fn new(config: OpenGiftsConfig, seed: u64) -> Result<Self, EnvError> {
        if config.num_objs < 1 {
            return Err(EnvError::config(
                NAME,
                "num_objs must be an integer greater than 0",
            ));
        }

        let (low, high) = config.gift_reward;
        if !(low.is_finite() && high.is_finite()) || high < low {
            return Err(EnvError::config(
                NAME,
                format!("gift_reward range [{}, {}) is invalid", low, high),
            ));
        }

        let interior = ((config.size - 2).max(0) * (config.size - 2).max(0)) as usize;
        if interior < config.num_objs + 1 {
            return Err(EnvError::config(
                NAME,
                format!(
                    "{} gifts and the agent do not fit in a {}x{} grid",
                    config.num_objs, config.size, config.size
                ),
            ));
        }

        let world = GridWorld::new(NAME, config.size, config.size, config.max_steps, seed)?;
        Ok(Self {
            config,
            world,
            num_opened: 0,
        })
    }

    fn gen_grid(&mut self) -> Result<(), EnvError> {
        let (width, height) = (self.world.width(), self.world.height());
        self.world.grid.wall_rect(0, 0, width, height);

        let interior = Bounds::interior(width, height);
        for _ in 0..self.config.num_objs {
            self.world.place_obj(Some(WorldObject::Gift), interior)?;
        }

        self.world.place_agent(interior)?;
        self.world.mission = "open all the gifts".to_string();
        Ok(())
    }
}

impl Scenario for OpenGifts {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.world.begin_reset();
        self.gen_grid()?;
        self.world.carrying = self.config.carrying;
        self.num_opened = 0;
        self.world.finish_reset()
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let mut outcome = self.world.step(action)?;

        if outcome.event == Some(Event::OpenedGift) {
            let (low, high) = self.config.gift_reward;
            outcome.reward += self.world.rand_float(low, high);
            self.num_opened += 1;

            if self.config.done_when_all_opened && self.num_opened == self.config.num_objs {
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
            "num_objs" => Ok(AttrValue::Int(self.config.num_objs as i64)),
            "num_opened" => Ok(AttrValue::Int(self.num_opened as i64)),
            "gifts_remaining" => Ok(AttrValue::Int(
                self.world.grid.count(ObjectKind::Gift) as i64,
            )),
            _ => self.world.attribute(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Direction;

    /// Opens the first gift found next to the agent.
    fn open_adjacent_gift(env: &mut OpenGifts) -> Option<StepResult> {
        let agent = env.world.agent().ok()?;
        let dir = Direction::ALL.into_iter().find(|dir| {
            env.world.grid.get(&agent.step(*dir)) == Some(&WorldObject::Gift)
        })?;
        env.step(Action::Use(dir)).ok()
    }

    #[test]
    fn test_layout_has_all_gifts() {
        let mut env = OpenGifts::new(OpenGiftsConfig::default(), 4).unwrap();
        let obs = env.reset().unwrap();

        assert_eq!(obs.grid.count(ObjectKind::Gift), 3);
        assert_eq!(obs.grid.get(&obs.agent_pos), None);
        assert_eq!(obs.mission, "open all the gifts");
    }

    #[test]
    fn test_opening_gift_pays_reward() {
        let config = OpenGiftsConfig {
            size: 4,
            num_objs: 3,
            done_when_all_opened: true,
            ..Default::default()
        }
        .with_gift_reward(2.0);
        let mut env = OpenGifts::new(config, 9).unwrap();
        env.reset().unwrap();

        // A 2x2 interior with three gifts: every gift touches the agent's cell or a neighbour.
        let result = open_adjacent_gift(&mut env).expect("a gift is adjacent in a 2x2 room");
        assert_eq!(result.reward, 2.0);
        assert_eq!(env.attribute("num_opened"), Ok(AttrValue::Int(1)));
        assert!(!result.done);
    }

    #[test]
    fn test_zero_budget_ends_on_first_step() {
        let config = OpenGiftsConfig {
            max_steps: 0,
            ..Default::default()
        };
        let mut env = OpenGifts::new(config, 0).unwrap();
        env.reset().unwrap();
        assert!(env.step(Action::Idle).unwrap().done);
    }

    #[test]
    fn test_rejects_no_gifts() {
        let config = OpenGiftsConfig {
            num_objs: 0,
            ..Default::default()
        };
        assert!(matches!(
            OpenGifts::new(config, 0),
            Err(EnvError::Config { .. })
        ));
    }

    #[test]
    fn test_rejects_overfull_room() {
        let config = OpenGiftsConfig {
            size: 4,
            num_objs: 4,
            ..Default::default()
        };
        assert!(matches!(
            OpenGifts::new(config, 0),
            Err(EnvError::Config { .. })
        ));
    }
}
