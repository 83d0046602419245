use std::{collections::HashMap, rc::Rc};

use crate::solver::{
    action::{Action, GroundedAction, OptionOutcome},
    config::SolverConfig,
    debug::DebugChannel,
    error::SolverError,
    grounding::{self, ObjectState},
    hashing::{CanonicalIndex, StateHasher},
    ids::{StateHandle, StateKey},
    options::OptionManager,
    reward::{RewardFunction, TerminalFunction},
};

/// The part of a task definition the solver consumes: its declared action templates.
pub struct Domain<S> {
    name: String,
    actions: Vec<Action<S>>,
}

impl<S> Domain<S> {
    pub fn new(name: impl Into<String>, actions: Vec<Action<S>>) -> Self {
        Domain {
            name: name.into(),
            actions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Action<S>] {
        &self.actions
    }
}

impl<S> Clone for Domain<S> {
    fn clone(&self) -> Self {
        Domain {
            name: self.name.clone(),
            actions: self.actions.clone(),
        }
    }
}

/// Lifecycle every concrete planning or learning algorithm implements on top of [`SolverState`].
///
/// Algorithms that do not support an operation inherit the default, which
/// reports [`SolverError::UnsupportedOperation`].
pub trait Solver<S> {
    fn solver_state(&self) -> &SolverState<S>;

    fn solver_state_mut(&mut self) -> &mut SolverState<S>;

    /// Plan (or learn) starting from `initial_state`.
    fn plan_from_state(&mut self, _initial_state: &S) -> Result<(), SolverError> {
        Err(SolverError::UnsupportedOperation {
            operation: "plan_from_state",
        })
    }

    /// Forget all results so the solver can start fresh with the same configuration.
    fn reset_solver(&mut self) -> Result<(), SolverError> {
        Err(SolverError::UnsupportedOperation {
            operation: "reset_solver",
        })
    }
}

/// Shared configuration and mutable context of a tabular solver.
///
/// Owns the action catalog (domain actions plus registered options), the
/// canonical state index and the possibly option-decorated reward function.
pub struct SolverState<S> {
    domain: Rc<Domain<S>>,
    reward: Rc<dyn RewardFunction<S>>,
    terminal: Rc<dyn TerminalFunction<S>>,
    hasher: Rc<dyn StateHasher<S>>,
    gamma: f64,
    max_option_steps: usize,
    actions: Vec<Action<S>>,
    index: CanonicalIndex<S>,
    contains_parameterized_actions: bool,
    debug: DebugChannel,
}

impl<S: 'static> SolverState<S> {
    /// Initialize solver state from a domain and task definition using default settings.
    pub fn initialize(
        domain: Rc<Domain<S>>,
        reward: Rc<dyn RewardFunction<S>>,
        terminal: Rc<dyn TerminalFunction<S>>,
        gamma: f64,
        hasher: Rc<dyn StateHasher<S>>,
    ) -> Result<Self, SolverError> {
        let config = SolverConfig {
            gamma,
            ..SolverConfig::default()
        };
        Self::initialize_with_config(domain, reward, terminal, hasher, &config)
    }

    /// Initialize solver state, taking gamma, option step cap and debug settings from `config`.
    pub fn initialize_with_config(
        domain: Rc<Domain<S>>,
        reward: Rc<dyn RewardFunction<S>>,
        terminal: Rc<dyn TerminalFunction<S>>,
        hasher: Rc<dyn StateHasher<S>>,
        config: &SolverConfig,
    ) -> Result<Self, SolverError> {
        config
            .validate()
            .map_err(|err| SolverError::configuration(err.to_string()))?;
        if !hasher.supports_tabular() {
            return Err(SolverError::configuration(
                "state hasher does not produce stable keys for tabular indexing",
            ));
        }

        let mut state = SolverState {
            actions: domain.actions().to_vec(),
            domain,
            reward,
            terminal,
            hasher,
            gamma: config.gamma,
            max_option_steps: config.max_option_steps,
            index: CanonicalIndex::new(),
            contains_parameterized_actions: false,
            debug: DebugChannel::new(config.debug_code, config.debug_printing),
        };
        state.wire_catalog();

        state.debug.print(format_args!(
            "initialized solver for domain '{}' with {} actions",
            state.domain.name(),
            state.actions.len()
        ));
        Ok(state)
    }

    /// Wire all catalog options and recompute the parameterized-action flag.
    fn wire_catalog(&mut self) {
        OptionManager::new(self.gamma, &self.terminal)
            .register_all(&mut self.actions, &mut self.reward);
        self.contains_parameterized_actions =
            self.actions.iter().any(Action::is_parameterized);
    }

    /// Add an action the domain does not declare, such as an option.
    ///
    /// Returns `false` without changing anything if an equal action is already in the catalog.
    pub fn add_non_domain_action(&mut self, action: Action<S>) -> bool {
        if self.actions.contains(&action) {
            self.debug.print(format_args!(
                "action '{}' already registered, skipping",
                action.name()
            ));
            return false;
        }

        let mut action = action;
        if let Action::Option(option) = &mut action {
            OptionManager::new(self.gamma, &self.terminal).register(option, &mut self.reward);
        }
        if action.is_parameterized() {
            self.contains_parameterized_actions = true;
        }
        self.debug
            .print(format_args!("registered action '{}'", action.name()));
        self.actions.push(action);
        true
    }

    /// Replace the action catalog. Options in `actions` are wired like registered ones.
    pub fn set_actions(&mut self, actions: Vec<Action<S>>) {
        self.actions = actions;
        self.wire_catalog();
    }

    /// A copy of the catalog; modifying it does not affect the solver.
    pub fn actions(&self) -> Vec<Action<S>> {
        self.actions.clone()
    }

    /// Replace the domain. The catalog is rebuilt from the new domain's actions
    /// only; previously added non-domain actions must be registered again.
    pub fn set_domain(&mut self, domain: Rc<Domain<S>>) {
        self.actions = domain.actions().to_vec();
        self.domain = domain;
        self.wire_catalog();
        self.debug.print(format_args!(
            "domain replaced by '{}', catalog reset to {} actions",
            self.domain.name(),
            self.actions.len()
        ));
    }

    pub fn domain(&self) -> &Rc<Domain<S>> {
        &self.domain
    }

    /// The active reward function, decorated if the catalog holds options.
    pub fn reward(&self) -> Rc<dyn RewardFunction<S>> {
        Rc::clone(&self.reward)
    }

    pub fn set_reward(&mut self, reward: Rc<dyn RewardFunction<S>>) {
        self.reward = reward;
        self.wire_catalog();
    }

    pub fn terminal(&self) -> Rc<dyn TerminalFunction<S>> {
        Rc::clone(&self.terminal)
    }

    pub fn set_terminal(&mut self, terminal: Rc<dyn TerminalFunction<S>>) {
        self.terminal = terminal;
        self.wire_catalog();
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<(), SolverError> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(SolverError::configuration(format!(
                "gamma must be within [0, 1], got {gamma}"
            )));
        }
        self.gamma = gamma;
        self.wire_catalog();
        Ok(())
    }
}

impl<S> SolverState<S> {
    pub fn hasher(&self) -> &Rc<dyn StateHasher<S>> {
        &self.hasher
    }

    /// Equivalence key of `state` under this solver's hasher.
    pub fn hash(&self, state: &S) -> StateKey {
        self.hasher.key(state)
    }

    /// Intern `state` and return the handle of its canonical representative.
    pub fn canonicalize(&mut self, state: S) -> StateHandle {
        self.index.canonicalize(self.hasher.as_ref(), state)
    }

    /// Handle of the canonical representative of `state`, if it has been seen.
    pub fn lookup(&self, state: &S) -> Option<StateHandle> {
        self.index.lookup(self.hasher.as_ref(), state)
    }

    pub fn canonical_state(&self, handle: StateHandle) -> Option<&S> {
        self.index.get(handle).map(|hashed| hashed.state())
    }

    /// Canonical representative of `state` together with the identifier
    /// matching from that representative to `state`.
    ///
    /// Actions stored against the representative can be re-targeted to
    /// `state` with [`translate_action`](Self::translate_action).
    pub fn canonical_matching(&self, state: &S) -> Option<(StateHandle, HashMap<String, String>)> {
        let handle = self.lookup(state)?;
        let canonical = self.canonical_state(handle)?;
        let matching = self.hasher.matching(canonical, state)?;
        Some((handle, matching))
    }

    pub fn index(&self) -> &CanonicalIndex<S> {
        &self.index
    }

    /// Empty the canonical index, keeping domain, functions, gamma and catalog.
    pub fn reset_index(&mut self) {
        let dropped = self.index.len();
        self.index.clear();
        self.debug
            .print(format_args!("canonical index reset, {dropped} states dropped"));
    }

    /// All applicable grounded actions in `state` for every catalog entry.
    pub fn all_grounded_actions(&self, state: &S) -> Vec<GroundedAction<S>>
    where
        S: ObjectState,
    {
        grounding::all_applicable(&self.actions, state)
    }

    /// Re-target `action` through an identifier matching between equivalent states.
    pub fn translate_action(
        &self,
        action: &GroundedAction<S>,
        matching: &HashMap<String, String>,
    ) -> Result<GroundedAction<S>, SolverError> {
        grounding::translate(action, matching)
    }

    /// Run a grounded option from `state` with this solver's step cap.
    ///
    /// The option is resolved against the catalog, so it always runs with the
    /// solver's current gamma, reward and task terminal, whichever copy of the
    /// option `action` was grounded from.
    pub fn execute_option(
        &self,
        state: &S,
        action: &GroundedAction<S>,
    ) -> Result<OptionOutcome<S>, SolverError>
    where
        S: ObjectState + Clone,
    {
        if !action.action().is_option() {
            return Err(SolverError::invalid_action(
                action.to_string(),
                "not an option",
            ));
        }
        let Some(option) = self
            .actions
            .iter()
            .find(|entry| *entry == action.action())
            .and_then(Action::as_option)
        else {
            return Err(SolverError::invalid_action(
                action.to_string(),
                "option is not registered with this solver",
            ));
        };
        grounding::check_bindings(action, state)?;

        let outcome = option.execute(state, action.params(), self.max_option_steps)?;
        // Copies that do not share the catalog entry's record still see the latest return.
        if let Action::Option(grounded) = action.action() {
            grounded.last_return.set(Some(outcome.cumulative_return));
        }
        Ok(outcome)
    }

    pub fn contains_parameterized_actions(&self) -> bool {
        self.contains_parameterized_actions
    }

    pub fn max_option_steps(&self) -> usize {
        self.max_option_steps
    }

    pub fn debug_code(&self) -> u32 {
        self.debug.code()
    }

    pub fn set_debug_code(&mut self, code: u32) {
        self.debug.set_code(code);
    }

    /// Enable or disable this solver's diagnostic output.
    pub fn toggle_debug_printing(&mut self, enabled: bool) {
        self.debug.toggle(enabled);
    }

    pub fn debug_channel(&self) -> &DebugChannel {
        &self.debug
    }
}
