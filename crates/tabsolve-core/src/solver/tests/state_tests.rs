use std::{collections::VecDeque, rc::Rc};

use crate::{
    Action, Domain, OptionAction, OptionTermination, ParamType, RewardFunction, Solver,
    SolverConfig, SolverError, SolverState,
};

use super::fixture::{
    SignatureHasher, TestState, UnstableHasher, counter_domain, inc_action, never_terminal,
    noop_action, unit_reward,
};

fn solver_state() -> SolverState<TestState> {
    SolverState::initialize(
        counter_domain(),
        unit_reward(),
        never_terminal(),
        0.95,
        Rc::new(SignatureHasher),
    )
    .expect("valid configuration")
}

fn bump(name: &str) -> Action<TestState> {
    Action::Option(OptionAction::new(
        name,
        vec![ParamType::object("counter")],
        |_state: &TestState, params: &[String]| Some(inc_action().ground(params.to_vec())),
        |_state: &TestState, _params: &[String]| true,
    ))
}

/// Breadth-first enumeration of canonical states reachable through primitives.
struct ReachabilitySolver {
    state: SolverState<TestState>,
    max_value: i64,
    expanded: usize,
}

impl Solver<TestState> for ReachabilitySolver {
    fn solver_state(&self) -> &SolverState<TestState> {
        &self.state
    }

    fn solver_state_mut(&mut self) -> &mut SolverState<TestState> {
        &mut self.state
    }

    fn plan_from_state(&mut self, initial_state: &TestState) -> Result<(), SolverError> {
        let mut frontier = VecDeque::from([initial_state.clone()]);
        let mut seen = std::collections::HashSet::new();

        while let Some(current) = frontier.pop_front() {
            let handle = self.state.canonicalize(current.clone());
            if !seen.insert(handle) {
                continue;
            }
            self.expanded += 1;

            for grounded in self.state.all_grounded_actions(&current) {
                let Some(primitive) = grounded.action().as_primitive() else {
                    continue;
                };
                let next = primitive.apply(&current, grounded.params());
                if next.objects.iter().all(|(_, _, value)| *value <= self.max_value) {
                    frontier.push_back(next);
                }
            }
        }
        Ok(())
    }

    fn reset_solver(&mut self) -> Result<(), SolverError> {
        self.state.reset_index();
        self.expanded = 0;
        Ok(())
    }
}

struct InertSolver {
    state: SolverState<TestState>,
}

impl Solver<TestState> for InertSolver {
    fn solver_state(&self) -> &SolverState<TestState> {
        &self.state
    }

    fn solver_state_mut(&mut self) -> &mut SolverState<TestState> {
        &mut self.state
    }
}

#[test]
fn initialization_copies_domain_actions_and_flags_parameters() {
    let state = solver_state();

    let names: Vec<String> = state.actions().iter().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["inc", "noop"]);
    assert!(state.contains_parameterized_actions());
    assert!(state.index().is_empty());
    assert_eq!(state.gamma(), 0.95);
    assert!(!state.reward().is_option_evaluating());
}

#[test]
fn initialization_rejects_unstable_hasher_and_bad_gamma() {
    let unstable = SolverState::initialize(
        counter_domain(),
        unit_reward(),
        never_terminal(),
        0.9,
        Rc::new(UnstableHasher),
    );
    assert!(matches!(unstable, Err(SolverError::Configuration { .. })));

    let bad_gamma = SolverState::initialize(
        counter_domain(),
        unit_reward(),
        never_terminal(),
        1.5,
        Rc::new(SignatureHasher),
    );
    assert!(matches!(bad_gamma, Err(SolverError::Configuration { .. })));
}

#[test]
fn domain_declared_options_are_wired_at_initialization() {
    let domain = Rc::new(Domain::new(
        "with_options",
        vec![noop_action(), bump("bump")],
    ));
    let state = SolverState::initialize(
        domain,
        unit_reward(),
        never_terminal(),
        0.5,
        Rc::new(SignatureHasher),
    )
    .expect("valid configuration");

    assert!(state.reward().is_option_evaluating());
    let actions = state.actions();
    let option = actions[1].as_option().expect("second action is an option");
    assert_eq!(option.gamma(), Some(0.5));
}

#[test]
fn adding_the_same_non_domain_action_twice_is_idempotent() {
    let mut state = solver_state();
    let before = state.actions().len();

    assert!(state.add_non_domain_action(bump("bump")));
    assert!(!state.add_non_domain_action(bump("bump")));

    assert_eq!(state.actions().len(), before + 1);
}

#[test]
fn three_options_leave_one_decoration_layer() {
    let mut state = solver_state();
    for name in ["first", "second", "third"] {
        state.add_non_domain_action(bump(name));
    }

    let reward = state.reward();
    assert!(reward.is_option_evaluating());
    let base = reward.undecorated().expect("decorated");
    assert!(!base.is_option_evaluating());

    let s = TestState::new(&[("c0", "counter", 0)]);
    let primitive = inc_action().ground(vec!["c0".to_string()]);
    let next = s.with_value("c0", 1);
    assert_eq!(reward.reward(&s, &primitive, &next), 1.0);
}

#[test]
fn set_domain_replaces_catalog_and_drops_added_actions() {
    let mut state = solver_state();
    state.add_non_domain_action(bump("bump"));

    let second = Rc::new(Domain::new("only_noop", vec![noop_action()]));
    state.set_domain(Rc::clone(&second));

    assert_eq!(state.actions(), second.actions().to_vec());
    assert_eq!(state.domain().name(), "only_noop");
    assert!(!state.contains_parameterized_actions());
}

#[test]
fn actions_returns_a_defensive_copy() {
    let state = solver_state();
    let mut copy = state.actions();
    copy.clear();
    assert_eq!(state.actions().len(), 2);
}

#[test]
fn set_actions_and_setters_keep_options_wired() {
    let mut state = solver_state();
    state.set_actions(vec![inc_action(), bump("bump")]);
    assert!(state.reward().is_option_evaluating());

    state.set_reward(unit_reward());
    assert!(state.reward().is_option_evaluating());

    state.set_gamma(0.25).expect("gamma within range");
    let actions = state.actions();
    assert_eq!(actions[1].as_option().and_then(|o| o.gamma()), Some(0.25));

    assert!(state.set_gamma(-0.1).is_err());
    assert_eq!(state.gamma(), 0.25);
}

#[test]
fn execute_option_uses_solver_wiring() {
    let mut state = solver_state();
    state.add_non_domain_action(bump("bump"));

    let s = TestState::new(&[("c0", "counter", 0)]);
    let grounded = state
        .all_grounded_actions(&s)
        .into_iter()
        .find(|a| a.action().is_option())
        .expect("option is grounded");

    let outcome = state.execute_option(&s, &grounded).expect("option runs");
    assert_eq!(outcome.termination, OptionTermination::Internal);
    assert_eq!(outcome.steps, 1);
    assert_eq!(state.reward().reward(&s, &grounded, &outcome.state), 1.0);

    let primitive = inc_action().ground(vec!["c0".to_string()]);
    assert!(matches!(
        state.execute_option(&s, &primitive),
        Err(SolverError::InvalidAction { .. })
    ));
}

fn count_to_five() -> OptionAction<TestState> {
    OptionAction::new(
        "countToFive",
        vec![ParamType::object("counter")],
        |_state: &TestState, params: &[String]| Some(inc_action().ground(params.to_vec())),
        |state: &TestState, params: &[String]| {
            state.value_of(&params[0]).is_some_and(|value| value >= 5)
        },
    )
}

#[test]
fn previously_grounded_option_follows_terminal_change() {
    let mut state = solver_state();
    state.add_non_domain_action(Action::Option(count_to_five()));

    let s = TestState::new(&[("c0", "counter", 0)]);
    let grounded = state
        .all_grounded_actions(&s)
        .into_iter()
        .find(|a| a.action().is_option())
        .expect("option is grounded");

    state.set_terminal(Rc::new(|s: &TestState| {
        s.value_of("c0").is_some_and(|value| value >= 2)
    }));
    let outcome = state.execute_option(&s, &grounded).expect("option runs");
    assert_eq!(outcome.termination, OptionTermination::External);
    assert_eq!(outcome.steps, 2);

    state.set_terminal(never_terminal());
    state.set_gamma(0.5).expect("gamma within range");
    let outcome = state.execute_option(&s, &grounded).expect("option runs");
    assert_eq!(outcome.termination, OptionTermination::Internal);
    assert_eq!(outcome.steps, 5);
    let expected = 1.0 + 0.5 + 0.25 + 0.125 + 0.0625;
    assert!((outcome.cumulative_return - expected).abs() < 1e-12);
    let reported = state.reward().reward(&s, &grounded, &outcome.state);
    assert!((reported - expected).abs() < 1e-12);
}

#[test]
fn option_kept_by_caller_executes_after_registration() {
    let mut state = solver_state();
    let option = count_to_five();
    assert!(state.add_non_domain_action(Action::Option(option.clone())));

    let s = TestState::new(&[("c0", "counter", 3)]);
    let grounded = Action::Option(option.clone()).ground(vec!["c0".to_string()]);
    let outcome = state.execute_option(&s, &grounded).expect("registered option runs");

    assert_eq!(outcome.termination, OptionTermination::Internal);
    assert_eq!(outcome.steps, 2);
    assert_eq!(option.last_return(), Some(outcome.cumulative_return));
    assert_eq!(state.reward().reward(&s, &grounded, &outcome.state), outcome.cumulative_return);
}

#[test]
fn unregistered_option_is_rejected() {
    let state = solver_state();
    let s = TestState::new(&[("c0", "counter", 0)]);
    let grounded = Action::Option(count_to_five()).ground(vec!["c0".to_string()]);

    assert!(matches!(
        state.execute_option(&s, &grounded),
        Err(SolverError::InvalidAction { .. })
    ));
}

#[test]
fn canonical_matching_retargets_actions_to_renamed_states() {
    let mut state = solver_state();
    let stored = TestState::new(&[("a", "counter", 1), ("b", "counter", 2)]);
    let query = TestState::new(&[("x", "counter", 2), ("y", "counter", 1)]);
    let handle = state.canonicalize(stored);

    let (found, matching) = state
        .canonical_matching(&query)
        .expect("query is equivalent to the stored state");
    assert_eq!(found, handle);

    let action = inc_action().ground(vec!["a".to_string()]);
    let translated = state
        .translate_action(&action, &matching)
        .expect("a is matched");
    assert_eq!(translated.params(), ["y".to_string()]);
    assert_eq!(state.hash(&query), state.hash(state.canonical_state(handle).expect("stored")));
}

#[test]
fn concrete_solver_plans_and_resets() {
    let mut solver = ReachabilitySolver {
        state: solver_state(),
        max_value: 2,
        expanded: 0,
    };
    let start = TestState::new(&[("c0", "counter", 0), ("c1", "counter", 0)]);

    solver.plan_from_state(&start).expect("planning succeeds");
    // Unordered pairs over {0, 1, 2}: renamed states collapse.
    assert_eq!(solver.solver_state().index().len(), 6);
    assert_eq!(solver.expanded, 6);

    solver.reset_solver().expect("reset succeeds");
    assert!(solver.solver_state().index().is_empty());
    assert_eq!(solver.solver_state().gamma(), 0.95);

    solver.plan_from_state(&start).expect("replanning succeeds");
    assert_eq!(solver.solver_state().index().len(), 6);
}

#[test]
fn unimplemented_lifecycle_operations_are_unsupported() {
    let mut solver = InertSolver {
        state: solver_state(),
    };
    let start = TestState::new(&[("c0", "counter", 0)]);

    assert_eq!(
        solver.plan_from_state(&start),
        Err(SolverError::UnsupportedOperation {
            operation: "plan_from_state"
        })
    );
    assert!(matches!(
        solver.reset_solver(),
        Err(SolverError::UnsupportedOperation { .. })
    ));
    solver.solver_state_mut().set_debug_code(7);
    assert_eq!(solver.solver_state().debug_code(), 7);
}

#[test]
fn config_drives_debug_channel_and_option_cap() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = SolverConfig {
        gamma: 0.8,
        debug_code: 42,
        debug_printing: true,
        max_option_steps: 3,
    };
    let mut state = SolverState::initialize_with_config(
        counter_domain(),
        unit_reward(),
        never_terminal(),
        Rc::new(SignatureHasher),
        &config,
    )
    .expect("valid configuration");

    assert_eq!(state.debug_code(), 42);
    assert!(state.debug_channel().is_enabled());
    assert_eq!(state.max_option_steps(), 3);

    state.toggle_debug_printing(false);
    assert!(!state.debug_channel().is_enabled());
}

#[test]
fn default_config_yaml_parses() {
    let config = SolverConfig::from_default_yaml().expect("default yaml should parse");
    assert_eq!(config, SolverConfig::default());

    let invalid = SolverConfig::from_yaml_str("gamma: 2.0\n");
    assert!(invalid.is_err());
}
