use std::time::Instant;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tabsolve_core::{
    Action, GroundedAction, ObjectState, RewardFunction, SolverError, SolverState,
    TerminalFunction,
};

use crate::RunMetrics;

#[derive(Debug, Clone)]
/// Seeded episode runner over a solver's catalog.
///
/// Options are executed through their own semantics and rewarded through
/// the solver's (decorated) reward function, so they count as one decision.
pub struct EpisodeSimulator {
    rng: ChaCha8Rng,
    max_decisions: usize,
}

impl EpisodeSimulator {
    /// Create a simulator with deterministic RNG seed.
    pub fn new(seed: u64, max_decisions: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_decisions,
        }
    }

    /// Run an episode choosing uniformly among applicable grounded actions.
    pub fn run_random<S>(
        &mut self,
        solver: &SolverState<S>,
        start: &S,
    ) -> Result<(S, RunMetrics), SolverError>
    where
        S: ObjectState + Clone + 'static,
    {
        let rng = &mut self.rng;
        run_episode(self.max_decisions, solver, start, |_state, actions| {
            Some(rng.gen_range(0..actions.len()))
        })
    }

    /// Run an episode where `policy` picks an index into the applicable actions,
    /// or `None` to stop early.
    pub fn run_with_policy<S, P>(
        &self,
        solver: &SolverState<S>,
        start: &S,
        policy: P,
    ) -> Result<(S, RunMetrics), SolverError>
    where
        S: ObjectState + Clone + 'static,
        P: FnMut(&S, &[GroundedAction<S>]) -> Option<usize>,
    {
        run_episode(self.max_decisions, solver, start, policy)
    }
}

fn run_episode<S, P>(
    max_decisions: usize,
    solver: &SolverState<S>,
    start: &S,
    mut policy: P,
) -> Result<(S, RunMetrics), SolverError>
where
    S: ObjectState + Clone + 'static,
    P: FnMut(&S, &[GroundedAction<S>]) -> Option<usize>,
{
    let started = Instant::now();
    let reward = solver.reward();
    let terminal = solver.terminal();
    let mut state = start.clone();
    let mut metrics = RunMetrics::default();

    while metrics.iterations < max_decisions && !terminal.is_terminal(&state) {
        let actions = solver.all_grounded_actions(&state);
        if actions.is_empty() {
            break;
        }
        let Some(choice) = policy(&state, &actions) else {
            break;
        };
        let grounded = actions.get(choice).ok_or_else(|| SolverError::InvalidAction {
            action: format!("#{choice}"),
            reason: format!("policy chose outside of {} applicable actions", actions.len()),
        })?;

        let (next_state, steps) = match grounded.action() {
            Action::Primitive(primitive) => (primitive.apply(&state, grounded.params()), 1),
            Action::Option(_) => {
                let outcome = solver.execute_option(&state, grounded)?;
                (outcome.state, outcome.steps)
            }
        };

        metrics.cumulative_reward += reward.reward(&state, grounded, &next_state);
        metrics.iterations += 1;
        metrics.steps += steps;
        state = next_state;
    }

    metrics.duration = started.elapsed();
    debug!(
        "episode finished after {} decisions and {} steps, reward {}",
        metrics.iterations, metrics.steps, metrics.cumulative_reward
    );
    Ok((state, metrics))
}
