use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::{
    Action, AttrValue, Descriptors, EnvError, Info, InfoValue, Observation, RenderMode,
};
use crate::infra::{Bounds, Position};
use crate::state::{Grid, WorldObject};

const MAX_PLACEMENT_TRIES: usize = 10_000;

/// What the base dynamics did during one step, for scenarios to build reward rules on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    ReachedGoal,
    PickedUp(WorldObject),
    Dropped(WorldObject),
    OpenedGift,
    ToggledDoor { unlocked: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub reward: f64,
    pub done: bool,
    pub info: Info,
    pub event: Option<Event>,
}

/// Grid, agent and generator shared by every grid scenario.
///
/// Scenarios lay out the grid between `begin_reset` and `finish_reset`, then
/// delegate movement and interaction to `step` and adjust reward/termination on
/// top of the returned [`StepOutcome`].
#[derive(Debug, Clone)]
pub struct GridWorld {
    scenario: &'static str,
    pub grid: Grid,
    agent_pos: Option<Position>,
    pub carrying: Option<WorldObject>,
    pub step_count: usize,
    pub max_steps: usize,
    pub mission: String,
    rng: StdRng,
    seed: u64,
    descriptors: Descriptors,
}

impl GridWorld {
    pub fn new(
        scenario: &'static str,
        width: i32,
        height: i32,
        max_steps: usize,
        seed: u64,
    ) -> Result<Self, EnvError> {
        if width < 3 || height < 3 {
            return Err(EnvError::config(
                scenario,
                format!("grid must be at least 3x3, got {}x{}", width, height),
            ));
        }

        Ok(Self {
            scenario,
            grid: Grid::new(width, height),
            agent_pos: None,
            carrying: None,
            step_count: 0,
            max_steps,
            mission: String::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            descriptors: Descriptors::for_grid(width, height),
        })
    }

    pub fn width(&self) -> i32 {
        self.grid.width
    }

    pub fn height(&self) -> i32 {
        self.grid.height
    }

    pub fn descriptors(&self) -> &Descriptors {
        &self.descriptors
    }

    pub fn seed(&mut self, seed: u64) -> Vec<u64> {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        vec![seed]
    }

    /// Agent position, or `NotReset` if no layout has been generated yet.
    pub fn agent(&self) -> Result<Position, EnvError> {
        self.agent_pos.ok_or(EnvError::NotReset {
            scenario: self.scenario,
        })
    }

    pub fn set_agent(&mut self, pos: Position) {
        self.agent_pos = Some(pos);
    }

    /// Clears the grid and the episode counters ahead of layout generation.
    pub fn begin_reset(&mut self) {
        self.grid = Grid::new(self.grid.width, self.grid.height);
        self.agent_pos = None;
        self.carrying = None;
        self.step_count = 0;
    }

    /// Checks the invariants every layout must establish.
    pub fn finish_reset(&self) -> Result<Observation, EnvError> {
        let agent = self
            .agent_pos
            .ok_or_else(|| EnvError::contract(self.scenario, "layout did not place the agent"))?;

        if !self.grid.is_walkable(&agent) {
            return Err(EnvError::contract(
                self.scenario,
                format!("agent placed on blocked cell {}", agent),
            ));
        }

        Ok(self.observe())
    }

    /// Uniform integer in `[low, high)`.
    pub fn rand_int(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    /// Uniform float in `[low, high)`.
    pub fn rand_float(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    pub fn put_obj(&mut self, object: WorldObject, pos: Position) {
        self.grid.insert(pos, object);
    }

    /// Places `object` on a random empty cell within `bounds` that is not under the agent.
    /// With `None`, only picks the cell.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn place_obj(
        &mut self,
        object: Option<WorldObject>,
        bounds: Bounds,
    ) -> Result<Position, EnvError> {
        if bounds.is_empty() {
            return Err(EnvError::contract(self.scenario, "placement region is empty"));
        }

        for _ in 0..MAX_PLACEMENT_TRIES {
            let pos = Position::new(
                self.rand_int(bounds.min_x, bounds.max_x + 1),
                self.rand_int(bounds.min_y, bounds.max_y + 1),
            );

            if !self.grid.is_empty_at(&pos) || self.agent_pos == Some(pos) {
                continue;
            }

            if let Some(object) = object {
                self.grid.insert(pos, object);
            }
            return Ok(pos);
        }

        tracing::warn!(scenario = self.scenario, "placement attempts exhausted");
        Err(EnvError::contract(
            self.scenario,
            format!("no free cell found in {:?}", bounds),
        ))
    }

    pub fn place_agent(&mut self, bounds: Bounds) -> Result<Position, EnvError> {
        let pos = self.place_obj(None, bounds)?;
        self.agent_pos = Some(pos);
        Ok(pos)
    }

    /// Default goal reward: decays with the steps spent.
    pub fn goal_reward(&self) -> f64 {
        1.0 - 0.9 * (self.step_count as f64 / self.max_steps.max(1) as f64)
    }

    pub fn step(&mut self, action: Action) -> Result<StepOutcome, EnvError> {
        let agent = self.agent()?;
        self.step_count += 1;

        let mut outcome = StepOutcome {
            reward: 0.0,
            done: false,
            info: Info::new(),
            event: None,
        };

        match action {
            Action::Idle => {}
            Action::Move(dir) => {
                let target = agent.step(dir);
                if self.grid.is_walkable(&target) {
                    self.agent_pos = Some(target);
                    if let Some(WorldObject::Goal) = self.grid.get(&target) {
                        outcome.done = true;
                        outcome.reward = self.goal_reward();
                        outcome.event = Some(Event::ReachedGoal);
                    }
                }
            }
            Action::Use(dir) => {
                let target = agent.step(dir);
                outcome.event = self.interact(target);
                if matches!(
                    outcome.event,
                    Some(Event::OpenedGift | Event::ToggledDoor { .. })
                ) {
                    outcome
                        .info
                        .insert("toggle_succeeded".to_string(), InfoValue::Bool(true));
                }
            }
            Action::Drop(dir) => {
                let target = agent.step(dir);
                if let Some(object) = self.carrying
                    && self.grid.is_empty_at(&target)
                {
                    self.grid.insert(target, object);
                    self.carrying = None;
                    outcome.event = Some(Event::Dropped(object));
                }
            }
        }

        if self.step_count >= self.max_steps {
            outcome.done = true;
        }

        Ok(outcome)
    }

    fn interact(&mut self, target: Position) -> Option<Event> {
        let object = *self.grid.get(&target)?;

        match object {
            obj if obj.can_pickup() => {
                if self.carrying.is_some() {
                    return None;
                }
                self.grid.remove(&target);
                self.carrying = Some(obj);
                Some(Event::PickedUp(obj))
            }
            WorldObject::Door {
                color,
                locked: true,
                ..
            } => {
                let has_key = self.carrying == Some(WorldObject::Key(color));
                has_key.then(|| {
                    self.grid.insert(
                        target,
                        WorldObject::Door {
                            color,
                            locked: false,
                            open: true,
                        },
                    );
                    Event::ToggledDoor { unlocked: true }
                })
            }
            WorldObject::Door { color, open, .. } => {
                self.grid.insert(
                    target,
                    WorldObject::Door {
                        color,
                        locked: false,
                        open: !open,
                    },
                );
                Some(Event::ToggledDoor { unlocked: false })
            }
            WorldObject::Gift => {
                self.grid.remove(&target);
                Some(Event::OpenedGift)
            }
            _ => None,
        }
    }

    pub fn observe(&self) -> Observation {
        Observation {
            grid: self.grid.clone(),
            agent_pos: self.agent_pos.unwrap_or(Position::new(-1, -1)),
            carrying: self.carrying,
            mission: self.mission.clone(),
            step_count: self.step_count,
        }
    }

    pub fn render(&self, mode: RenderMode) -> Option<String> {
        let agent = self.agent_pos?;
        let frame = self.grid.draw_ascii(agent);
        match mode {
            RenderMode::Ansi => Some(frame),
            RenderMode::Human => {
                let _ = writeln!(io::stdout(), "{}", frame);
                let _ = writeln!(
                    io::stdout(),
                    "Mission: {} | Carrying: {:?} | Step: {}/{}",
                    self.mission,
                    self.carrying,
                    self.step_count,
                    self.max_steps
                );
                None
            }
        }
    }

    /// Attributes common to every grid scenario.
    pub fn attribute(&self, name: &str) -> Result<AttrValue, EnvError> {
        match name {
            "mission" => Ok(AttrValue::Text(self.mission.clone())),
            "step_count" => Ok(AttrValue::Int(self.step_count as i64)),
            "max_steps" => Ok(AttrValue::Int(self.max_steps as i64)),
            "agent_pos" => self.agent().map(AttrValue::Position),
            "carrying" => Ok(AttrValue::Object(self.carrying)),
            "width" => Ok(AttrValue::Int(self.grid.width as i64)),
            "height" => Ok(AttrValue::Int(self.grid.height as i64)),
            "seed" => Ok(AttrValue::UInt(self.seed)),
            _ => Err(EnvError::missing(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{Color, Direction};

    fn open_room(max_steps: usize) -> GridWorld {
        let mut world = GridWorld::new("test", 6, 6, max_steps, 7).unwrap();
        world.begin_reset();
        world.grid.wall_rect(0, 0, 6, 6);
        world.set_agent(Position::new(1, 1));
        world
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let err = GridWorld::new("test", 2, 5, 10, 0).unwrap_err();
        assert!(matches!(err, EnvError::Config { .. }));
    }

    #[test]
    fn test_step_before_layout() {
        let mut world = GridWorld::new("test", 5, 5, 10, 0).unwrap();
        assert_eq!(
            world.step(Action::Idle),
            Err(EnvError::NotReset { scenario: "test" })
        );
    }

    #[test]
    fn test_walls_block_movement() {
        let mut world = open_room(10);
        world.step(Action::Move(Direction::North)).unwrap();
        assert_eq!(world.agent().unwrap(), Position::new(1, 1));

        world.step(Action::Move(Direction::East)).unwrap();
        assert_eq!(world.agent().unwrap(), Position::new(2, 1));
    }

    #[test]
    fn test_pickup_and_drop_key() {
        let mut world = open_room(10);
        world.put_obj(WorldObject::Key(Color::Yellow), Position::new(2, 1));

        let outcome = world.step(Action::Use(Direction::East)).unwrap();
        assert_eq!(
            outcome.event,
            Some(Event::PickedUp(WorldObject::Key(Color::Yellow)))
        );
        assert_eq!(world.carrying, Some(WorldObject::Key(Color::Yellow)));
        assert!(world.grid.is_empty_at(&Position::new(2, 1)));

        let outcome = world.step(Action::Drop(Direction::South)).unwrap();
        assert!(matches!(outcome.event, Some(Event::Dropped(_))));
        assert_eq!(world.carrying, None);
        assert_eq!(
            world.grid.get(&Position::new(1, 2)),
            Some(&WorldObject::Key(Color::Yellow))
        );
    }

    #[test]
    fn test_locked_door_needs_matching_key() {
        let mut world = open_room(10);
        let door = Position::new(2, 1);
        world.put_obj(WorldObject::locked_door(Color::Yellow), door);

        world.carrying = Some(WorldObject::Key(Color::Red));
        let outcome = world.step(Action::Use(Direction::East)).unwrap();
        assert_eq!(outcome.event, None);
        assert!(!outcome.info.contains_key("toggle_succeeded"));

        world.carrying = Some(WorldObject::Key(Color::Yellow));
        let outcome = world.step(Action::Use(Direction::East)).unwrap();
        assert_eq!(outcome.event, Some(Event::ToggledDoor { unlocked: true }));
        assert_eq!(
            outcome.info.get("toggle_succeeded"),
            Some(&InfoValue::Bool(true))
        );

        world.step(Action::Move(Direction::East)).unwrap();
        assert_eq!(world.agent().unwrap(), door);
    }

    #[test]
    fn test_goal_reward_decays() {
        let mut world = open_room(10);
        world.put_obj(WorldObject::Goal, Position::new(2, 1));
        world.step(Action::Idle).unwrap();

        let outcome = world.step(Action::Move(Direction::East)).unwrap();
        assert!(outcome.done);
        assert_eq!(outcome.event, Some(Event::ReachedGoal));
        assert!((outcome.reward - (1.0 - 0.9 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_step_budget_terminates() {
        let mut world = open_room(2);
        assert!(!world.step(Action::Idle).unwrap().done);
        assert!(world.step(Action::Idle).unwrap().done);

        let mut zero = open_room(0);
        assert!(zero.step(Action::Idle).unwrap().done);
    }

    #[test]
    fn test_placement_is_seeded() {
        let place = |seed| {
            let mut world = GridWorld::new("test", 8, 8, 10, seed).unwrap();
            world.begin_reset();
            world.grid.wall_rect(0, 0, 8, 8);
            world
                .place_obj(Some(WorldObject::Gift), Bounds::interior(8, 8))
                .unwrap()
        };
        assert_eq!(place(3), place(3));
    }

    #[test]
    fn test_unknown_attribute() {
        let world = open_room(5);
        assert_eq!(world.attribute("max_steps"), Ok(AttrValue::Int(5)));
        assert_eq!(
            world.attribute("colour"),
            Err(EnvError::MissingAttribute {
                name: "colour".to_string()
            })
        );
    }

    #[test]
    fn test_seed_attribute_keeps_full_range() {
        let mut world = open_room(10);
        assert_eq!(world.attribute("seed"), Ok(AttrValue::UInt(7)));

        world.seed(u64::MAX);
        assert_eq!(world.attribute("seed"), Ok(AttrValue::UInt(u64::MAX)));
    }
}
