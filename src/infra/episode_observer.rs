use crate::env::{Action, Observation, StepResult};

/// Trait for observing episode events while a runner drives a scenario
pub trait EpisodeObserver {
    /// Called after reset, with the first observation
    fn on_episode_start(&mut self, episode: usize, scenario: &str, observation: &Observation);

    /// Called when the active phase index changes within an episode
    fn on_phase_changed(&mut self, from: usize, to: usize, observation: &Observation);

    /// Called after every step
    fn on_step(&mut self, _action: Action, _result: &StepResult) {
        // Default implementation does nothing
    }

    /// Called when the episode ends or hits the step cap
    fn on_episode_finished(&mut self, episode: usize, total_reward: f64, steps: usize, done: bool);
}
