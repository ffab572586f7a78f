use std::io::{self, Write};

use tracing::{debug, info};

use crate::env::{Action, Observation, StepResult};
use crate::infra::EpisodeObserver;

/// Logs episode events; with `render` set, also prints the grid after every step.
#[derive(Debug, Default)]
pub struct DefaultObserver {
    render: bool,
}

impl DefaultObserver {
    pub fn new(render: bool) -> Self {
        Self { render }
    }

    fn print_frame(&self, observation: &Observation) {
        let frame = observation.grid.draw_ascii(observation.agent_pos);
        let _ = writeln!(io::stdout(), "{}", frame);
        let _ = writeln!(
            io::stdout(),
            "Mission: {} | Carrying: {:?} | Step: {}",
            observation.mission,
            observation.carrying,
            observation.step_count
        );
    }
}

impl EpisodeObserver for DefaultObserver {
    fn on_episode_start(&mut self, episode: usize, scenario: &str, observation: &Observation) {
        info!("Episode {} of {} started", episode, scenario);
        info!("- mission: {}", observation.mission);
        info!(
            "- grid size: {}x{}",
            observation.grid.width, observation.grid.height
        );
        if self.render {
            self.print_frame(observation);
        }
    }

    fn on_phase_changed(&mut self, from: usize, to: usize, observation: &Observation) {
        info!(
            "Phase changed {} -> {} ({}), carrying: {:?}",
            from, to, observation.mission, observation.carrying
        );
    }

    fn on_step(&mut self, action: Action, result: &StepResult) {
        debug!(
            "action: {:?}, pos: {}, reward: {:.3}, done: {}",
            action, result.observation.agent_pos, result.reward, result.done
        );
        if self.render {
            self.print_frame(&result.observation);
        }
    }

    fn on_episode_finished(&mut self, episode: usize, total_reward: f64, steps: usize, done: bool) {
        if done {
            info!(
                "Episode {} finished after {} steps, reward {:.3}",
                episode, steps, total_reward
            );
        } else {
            info!(
                "Episode {} stopped at the step cap ({} steps), reward {:.3}",
                episode, steps, total_reward
            );
        }
    }
}
