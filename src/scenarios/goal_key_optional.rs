use crate::compose::PhaseTemplate;
use crate::env::{
    Action, AttrValue, Descriptors, EnvError, Observation, RenderMode, Scenario, StepResult,
};
use crate::infra::Position;
use crate::state::{Event, GridWorld, WorldObject};

const NAME: &str = "GoalKeyOptional";

#[derive(Debug, Clone, PartialEq)]
pub struct GoalKeyOptionalConfig {
    pub size: i32,
    pub carrying: Option<WorldObject>,
    /// Bonus for reaching the goal while holding a key of any color
    pub key_reward: f64,
    pub max_steps: usize,
    pub goal_reward: f64,
    /// When false the phase runs for its full budget and only the first goal visit pays
    pub done_when_goal_reached: bool,
}

impl Default for GoalKeyOptionalConfig {
    fn default() -> Self {
        Self {
            size: 8,
            carrying: None,
            key_reward: 3.0,
            max_steps: 8 * 8,
            goal_reward: 1.0,
            done_when_goal_reached: true,
        }
    }
}

impl PhaseTemplate for GoalKeyOptionalConfig {
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
        Ok(Box::new(GoalKeyOptional::new(self.clone(), seed)?))
    }
}

/// Reach the goal; arriving with a key pays extra.
#[derive(Debug)]
pub struct GoalKeyOptional {
    config: GoalKeyOptionalConfig,
    world: GridWorld,
    reached_goal_count: usize,
}

impl GoalKeyOptional {
    pub fn new(config: GoalKeyOptionalConfig, seed: u64) -> Result<Self, EnvError> {
        if config.size < 4 {
            return Err(EnvError::config(
                NAME,
                format!("size must be at least 4, got {}", config.size),
            ));
        }

        let world = GridWorld::new(NAME, config.size, config.size, config.max_steps, seed)?;
        Ok(Self {
            config,
            world,
            reached_goal_count: 0,
        })
    }

    fn gen_grid(&mut self) {
        let (width, height) = (self.world.width(), self.world.height());
        self.world.grid.wall_rect(0, 0, width, height);
        self.world.set_agent(Position::new(1, 1));
        self.world
            .put_obj(WorldObject::Goal, Position::new(width - 2, height - 2));
        self.world.mission = "go to goal".to_string();
    }

    fn goal_reward(&self) -> f64 {
        let mut reward = self.config.goal_reward;
        if self.world.carrying.is_some_and(|obj| obj.is_key()) {
            reward += self.config.key_reward;
        }
        reward - 0.9 * (self.world.step_count as f64 / self.world.max_steps.max(1) as f64)
    }
}

impl Scenario for GoalKeyOptional {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.world.begin_reset();
        self.gen_grid();
        self.world.carrying = self.config.carrying;
        self.reached_goal_count = 0;
        self.world.finish_reset()
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let mut outcome = self.world.step(action)?;

        if outcome.event == Some(Event::ReachedGoal) {
            outcome.reward = self.goal_reward();
        }

        if outcome.done
            && !self.config.done_when_goal_reached
            && self.world.step_count < self.world.max_steps
        {
            if self.reached_goal_count > 0 {
                outcome.reward = 0.0;
            }
            outcome.done = false;
            self.reached_goal_count += 1;
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
            "key_reward" => Ok(AttrValue::Float(self.config.key_reward)),
            "goal_reward" => Ok(AttrValue::Float(self.config.goal_reward)),
            "reached_goal_count" => Ok(AttrValue::Int(self.reached_goal_count as i64)),
            _ => self.world.attribute(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{Color, Direction};

    /// 4x4 grid: agent at (1,1), goal at (2,2).
    fn small(carrying: Option<WorldObject>, done_when_goal_reached: bool) -> GoalKeyOptional {
        let config = GoalKeyOptionalConfig {
            size: 4,
            carrying,
            max_steps: 10,
            done_when_goal_reached,
            ..Default::default()
        };
        let mut env = GoalKeyOptional::new(config, 0).unwrap();
        env.reset().unwrap();
        env
    }

    fn walk_to_goal(env: &mut GoalKeyOptional) -> StepResult {
        env.step(Action::Move(Direction::East)).unwrap();
        env.step(Action::Move(Direction::South)).unwrap()
    }

    #[test]
    fn test_goal_without_key() {
        let mut env = small(None, true);
        let result = walk_to_goal(&mut env);
        assert!(result.done);
        assert!((result.reward - (1.0 - 0.9 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_goal_with_key_pays_bonus() {
        let mut env = small(Some(WorldObject::Key(Color::Yellow)), true);
        let result = walk_to_goal(&mut env);
        assert!(result.done);
        assert!((result.reward - (4.0 - 0.9 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_repeat_visits_pay_once() {
        let mut env = small(None, false);
        let first = walk_to_goal(&mut env);
        assert!(!first.done);
        assert!(first.reward > 0.0);

        env.step(Action::Move(Direction::North)).unwrap();
        let second = env.step(Action::Move(Direction::South)).unwrap();
        assert!(!second.done);
        assert_eq!(second.reward, 0.0);
        assert_eq!(env.attribute("reached_goal_count"), Ok(AttrValue::Int(2)));
    }
}
