use tracing::{debug, info, warn};

use crate::env::{
    Action, AttrValue, Descriptors, EnvError, Info, Observation, RenderMode, Scenario, StepResult,
};
use crate::state::WorldObject;

use super::phase::{CarryWrite, PhaseSpec};
use super::policy::{CarryPayload, SequencerPolicy};

/// Where in the sequence the current episode is.
///
/// `phase_index` is `None` until the first reset, after close, and after an
/// episode was aborted by a failed phase construction. `active` is `None`
/// after close or an abort.
struct ComposerState {
    phase_index: Option<usize>,
    active: Option<Box<dyn Scenario>>,
    running_seed: u64,
    carry_payload: Option<CarryPayload>,
    closed: bool,
}

/// Runs a fixed sequence of phases as one episode.
///
/// A terminal step from any phase but the last is turned into a transition:
/// the next phase is built (with the carried object, per the carry policy),
/// reset, and its first observation is returned together with the outgoing
/// phase's reward, `done = false` and empty info. Only the last phase can end
/// the episode.
pub struct PhaseSequencer {
    phases: Vec<PhaseSpec>,
    policy: SequencerPolicy,
    descriptors: Descriptors,
    state: ComposerState,
}

impl PhaseSequencer {
    /// Builds phase 0 once so its descriptors are available before the first
    /// reset. That instance is replaced by reset.
    pub fn new(
        phases: Vec<PhaseSpec>,
        initial_seed: u64,
        policy: SequencerPolicy,
    ) -> Result<Self, EnvError> {
        let first = phases
            .first()
            .ok_or_else(|| EnvError::config("PhaseSequencer", "at least one phase is required"))?;
        let preview = first.construct(None, initial_seed)?;
        let descriptors = preview.descriptors().clone();

        debug!(
            phases = ?phases.iter().map(PhaseSpec::name).collect::<Vec<_>>(),
            initial_seed,
            ?policy,
            "phase sequencer created"
        );

        Ok(Self {
            phases,
            policy,
            descriptors,
            state: ComposerState {
                phase_index: None,
                active: Some(preview),
                running_seed: initial_seed,
                carry_payload: None,
                closed: false,
            },
        })
    }

    pub fn num_phases(&self) -> usize {
        self.phases.len()
    }

    pub fn phase_index(&self) -> Option<usize> {
        self.state.phase_index
    }

    pub fn running_seed(&self) -> u64 {
        self.state.running_seed
    }

    pub fn policy(&self) -> SequencerPolicy {
        self.policy
    }

    /// The live phase, for read-only inspection.
    pub fn active(&self) -> Option<&dyn Scenario> {
        self.state.active.as_deref()
    }

    fn ensure_open(&self) -> Result<(), EnvError> {
        if self.state.closed {
            return Err(EnvError::Closed);
        }
        Ok(())
    }

    /// Error for calls that need a live phase when there is none.
    fn no_active_phase(&self) -> EnvError {
        if self.state.closed {
            EnvError::Closed
        } else {
            EnvError::EpisodeNotStarted
        }
    }

    /// Builds phase `index`. Only a pending carry that targets this phase is
    /// written into its config; every other phase is built from its template
    /// as is.
    fn construct_phase(&mut self, index: usize) -> Result<Box<dyn Scenario>, EnvError> {
        let carry: CarryWrite = match self.state.carry_payload {
            Some(payload) if payload.target_phase == index => {
                self.state.carry_payload = None;
                Some(payload.object)
            }
            _ => None,
        };
        let seed = self.policy.seed.phase_seed(self.state.running_seed, index);

        debug!(
            phase = index,
            scenario = self.phases[index].name(),
            seed,
            ?carry,
            "constructing phase"
        );
        self.phases[index].construct(carry, seed)
    }

    /// Installs `next` as the live phase, closing the one it replaces.
    fn replace_active(&mut self, next: Box<dyn Scenario>) {
        if let Some(mut previous) = self.state.active.replace(next) {
            previous.close();
        }
    }

    /// Ends the episode after a phase failed to build or reset. The live phase
    /// is closed and every later step fails with `EpisodeNotStarted` until the
    /// next reset.
    fn abort_episode(&mut self, error: &EnvError) {
        warn!(phase = ?self.state.phase_index, %error, "episode aborted");
        if let Some(mut active) = self.state.active.take() {
            active.close();
        }
        self.state.phase_index = None;
        self.state.carry_payload = None;
    }

    /// Builds and resets phase `index` and makes it the live phase.
    fn enter_phase(&mut self, index: usize) -> Result<Observation, EnvError> {
        let mut next = self.construct_phase(index)?;
        let observation = match next.reset() {
            Ok(observation) => observation,
            Err(error) => {
                next.close();
                return Err(error);
            }
        };
        self.replace_active(next);
        self.state.phase_index = Some(index);
        Ok(observation)
    }

    fn transition(&mut self, from: usize, outgoing: StepResult) -> Result<StepResult, EnvError> {
        let to = from + 1;

        if let Some(active) = self.state.active.as_deref()
            && let Some(payload) =
                self.policy
                    .carry
                    .extract(from, self.phases.len(), active, &outgoing.info)
        {
            if from == 0 && payload.object.is_some_and(|obj| obj.is_key()) {
                info!(color = ?payload.object.and_then(|obj| obj.color()), "agent picked up key");
            }
            self.state.carry_payload = Some(payload);
        }

        let observation = match self.enter_phase(to) {
            Ok(observation) => observation,
            Err(error) => {
                self.abort_episode(&error);
                return Err(error);
            }
        };

        info!(
            from,
            to,
            scenario = self.phases[to].name(),
            reward = outgoing.reward,
            carrying = ?observation.carrying,
            "phase transition"
        );

        Ok(StepResult {
            observation,
            reward: outgoing.reward,
            done: false,
            info: Info::new(),
        })
    }
}

impl Scenario for PhaseSequencer {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.ensure_open()?;

        self.state.running_seed = self.state.running_seed.wrapping_add(1);
        self.state.carry_payload = None;

        let observation = match self.enter_phase(0) {
            Ok(observation) => observation,
            Err(error) => {
                self.abort_episode(&error);
                return Err(error);
            }
        };

        info!(seed = self.state.running_seed, "episode reset");
        Ok(observation)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        self.ensure_open()?;
        let phase = self.state.phase_index.ok_or(EnvError::EpisodeNotStarted)?;
        let active = self
            .state
            .active
            .as_mut()
            .ok_or(EnvError::EpisodeNotStarted)?;

        let result = active.step(action)?;
        if !result.done || phase + 1 >= self.phases.len() {
            return Ok(result);
        }

        self.transition(phase, result)
    }

    fn seed(&mut self, seed: u64) -> Vec<u64> {
        self.state.running_seed = seed;
        match self.state.active.as_mut() {
            Some(active) => active.seed(seed),
            None => Vec::new(),
        }
    }

    fn render(&mut self, mode: RenderMode) -> Option<String> {
        self.state.active.as_mut()?.render(mode)
    }

    fn close(&mut self) {
        if let Some(mut active) = self.state.active.take() {
            active.close();
            debug!(phase = ?self.state.phase_index, "phase sequencer closed");
        }
        self.state.phase_index = None;
        self.state.carry_payload = None;
        self.state.closed = true;
    }

    fn descriptors(&self) -> &Descriptors {
        &self.descriptors
    }

    fn carrying(&self) -> Option<WorldObject> {
        self.state.active.as_ref()?.carrying()
    }

    fn attribute(&self, name: &str) -> Result<AttrValue, EnvError> {
        match name {
            "phase_index" => self
                .state
                .phase_index
                .map(|i| AttrValue::Int(i as i64))
                .ok_or(EnvError::EpisodeNotStarted),
            "num_phases" => Ok(AttrValue::Int(self.phases.len() as i64)),
            "running_seed" => Ok(AttrValue::UInt(self.state.running_seed)),
            _ if name.starts_with('_') => Err(EnvError::missing(name)),
            _ => self
                .state
                .active
                .as_ref()
                .ok_or_else(|| self.no_active_phase())?
                .attribute(name),
        }
    }
}
