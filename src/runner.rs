//! Episode loop and run metrics

use std::collections::VecDeque;

use tracing::info;

use crate::env::{AttrValue, EnvError, Scenario};
use crate::infra::EpisodeObserver;
use crate::policy::Policy;

/// Moving average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.window_size
            && let Some(old) = self.values.pop_front()
        {
            self.sum -= old;
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of a single episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub total_reward: f64,
    pub steps: usize,
    /// The scenario signalled done (as opposed to hitting the step cap)
    pub done: bool,
    /// Highest phase index reached, for composed scenarios
    pub final_phase: Option<usize>,
}

#[derive(Debug)]
pub struct RunMetrics {
    pub episode_rewards: MovingAverage,
    pub episode_lengths: MovingAverage,
    pub completion_rate: MovingAverage,
    pub num_episodes: usize,
}

impl RunMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: MovingAverage::new(window_size),
            episode_lengths: MovingAverage::new(window_size),
            completion_rate: MovingAverage::new(window_size),
            num_episodes: 0,
        }
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        self.episode_rewards.push(summary.total_reward);
        self.episode_lengths.push(summary.steps as f64);
        self.completion_rate
            .push(if summary.done { 1.0 } else { 0.0 });
        self.num_episodes += 1;
    }

    pub fn log_summary(&self) {
        info!("=== Run Summary ===");
        info!("Episodes: {}", self.num_episodes);
        info!("Avg reward: {:.3}", self.episode_rewards.average());
        info!("Avg length: {:.1}", self.episode_lengths.average());
        info!("Completion: {:.1}%", self.completion_rate.average() * 100.0);
    }
}

/// Drives a scenario with a policy, one episode at a time.
pub struct EpisodeRunner {
    max_steps: usize,
    metrics: RunMetrics,
}

impl EpisodeRunner {
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            metrics: RunMetrics::new(100),
        }
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn run_episode(
        &mut self,
        env: &mut dyn Scenario,
        policy: &mut dyn Policy,
        observer: &mut dyn EpisodeObserver,
        episode: usize,
        scenario: &str,
    ) -> Result<EpisodeSummary, EnvError> {
        policy.reset();
        let mut observation = env.reset()?;
        observer.on_episode_start(episode, scenario, &observation);

        let mut phase = current_phase(env);
        let mut summary = EpisodeSummary {
            total_reward: 0.0,
            steps: 0,
            done: false,
            final_phase: phase,
        };

        while summary.steps < self.max_steps {
            let action = policy.act(&observation);
            let result = env.step(action)?;
            summary.steps += 1;
            summary.total_reward += result.reward;
            observer.on_step(action, &result);

            let next_phase = current_phase(env);
            if let (Some(from), Some(to)) = (phase, next_phase)
                && from != to
            {
                observer.on_phase_changed(from, to, &result.observation);
            }
            phase = next_phase;
            summary.final_phase = summary.final_phase.max(phase);

            if result.done {
                summary.done = true;
                break;
            }
            observation = result.observation;
        }

        observer.on_episode_finished(episode, summary.total_reward, summary.steps, summary.done);
        self.metrics.record_episode(&summary);
        Ok(summary)
    }
}

/// Phase index of a composed scenario; `None` for single-phase ones.
fn current_phase(env: &dyn Scenario) -> Option<usize> {
    match env.attribute("phase_index") {
        Ok(AttrValue::Int(index)) => usize::try_from(index).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Action, Observation, StepResult};
    use crate::policy::{GreedyPolicy, RandomPolicy};
    use crate::presets::{self, DEFAULT_SEED};
    use crate::registry::ScenarioRegistry;

    #[derive(Default)]
    struct Recorder {
        starts: usize,
        phase_changes: Vec<(usize, usize)>,
        steps: usize,
        finished: Vec<(usize, bool)>,
    }

    impl EpisodeObserver for Recorder {
        fn on_episode_start(&mut self, _episode: usize, _scenario: &str, _obs: &Observation) {
            self.starts += 1;
        }

        fn on_phase_changed(&mut self, from: usize, to: usize, _obs: &Observation) {
            self.phase_changes.push((from, to));
        }

        fn on_step(&mut self, _action: Action, _result: &StepResult) {
            self.steps += 1;
        }

        fn on_episode_finished(&mut self, _episode: usize, _reward: f64, steps: usize, done: bool) {
            self.finished.push((steps, done));
        }
    }

    #[test]
    fn test_moving_average_window() {
        let mut avg = MovingAverage::new(3);
        assert!(avg.is_empty());
        assert_eq!(avg.average(), 0.0);

        for value in [1.0, 2.0, 3.0, 4.0] {
            avg.push(value);
        }
        assert_eq!(avg.len(), 3);
        assert!((avg.average() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_greedy_completes_delayed_reward_sequence() {
        let mut env = presets::tiny_key_gifts_door(DEFAULT_SEED).unwrap();
        let mut policy = GreedyPolicy::new();
        let mut recorder = Recorder::default();
        let mut runner = EpisodeRunner::new(2000);

        let summary = runner
            .run_episode(&mut env, &mut policy, &mut recorder, 0, "KeyGiftsDoor-tiny-v0")
            .unwrap();

        assert!(summary.done);
        assert_eq!(summary.final_phase, Some(2));
        assert_eq!(recorder.phase_changes, vec![(0, 1), (1, 2)]);
        assert_eq!(recorder.steps, summary.steps);
        // three gifts worth 1.0 plus the goal
        assert!(summary.total_reward > 3.0);
        assert_eq!(runner.metrics().num_episodes, 1);
    }

    #[test]
    fn test_step_cap_stops_episode() {
        let registry = ScenarioRegistry::with_defaults();
        let mut env = registry.make("DoorNoKey-8x8-v0", 1).unwrap();
        let mut policy = RandomPolicy::new(1);
        let mut recorder = Recorder::default();
        let mut runner = EpisodeRunner::new(10);

        let summary = runner
            .run_episode(env.as_mut(), &mut policy, &mut recorder, 0, "DoorNoKey-8x8-v0")
            .unwrap();

        assert!(!summary.done);
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.final_phase, None);
        assert_eq!(recorder.finished, vec![(10, false)]);
        assert!(recorder.phase_changes.is_empty());
    }

    #[test]
    fn test_same_seed_same_summary() {
        let run = || {
            let mut env = presets::medium_key_gifts_door(DEFAULT_SEED).unwrap();
            let mut policy = RandomPolicy::new(4);
            let mut recorder = Recorder::default();
            let mut runner = EpisodeRunner::new(2000);
            (0..3)
                .map(|episode| {
                    runner
                        .run_episode(&mut env, &mut policy, &mut recorder, episode, "medium")
                        .unwrap()
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }
}
