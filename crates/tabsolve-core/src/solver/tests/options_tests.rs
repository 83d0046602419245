use std::rc::Rc;

use crate::{
    Action, GroundedAction, OptionAction, OptionEvaluatingReward, OptionManager,
    OptionTermination, ParamType, RewardFunction, SolverError, TerminalFunction,
};

use super::fixture::{TestState, inc_action, never_terminal};

/// Increments `counter` until it reaches `goal`.
fn count_to(name: &str, goal: i64) -> OptionAction<TestState> {
    OptionAction::new(
        name,
        vec![ParamType::object("counter")],
        |_state: &TestState, params: &[String]| Some(inc_action().ground(params.to_vec())),
        move |state: &TestState, params: &[String]| {
            state.value_of(&params[0]).is_some_and(|value| value >= goal)
        },
    )
}

fn step_reward() -> Rc<dyn RewardFunction<TestState>> {
    Rc::new(|_s: &TestState, _a: &GroundedAction<TestState>, _n: &TestState| 2.0)
}

#[test]
fn registering_many_options_decorates_reward_once() {
    let terminal = never_terminal();
    let manager = OptionManager::new(0.9, &terminal);
    let base = step_reward();
    let mut reward = Rc::clone(&base);

    let mut options = vec![count_to("a", 1), count_to("b", 2), count_to("c", 3)];
    for option in &mut options {
        manager.register(option, &mut reward);
    }

    assert!(reward.is_option_evaluating());
    let inner = reward.undecorated().expect("decorated reward wraps a base");
    assert!(!inner.is_option_evaluating());
    assert!(Rc::ptr_eq(&inner, &base));
    assert!(options.iter().all(|option| option.gamma() == Some(0.9)));

    let state = TestState::new(&[("c0", "counter", 0)]);
    let primitive = inc_action().ground(vec!["c0".to_string()]);
    let next = state.with_value("c0", 1);
    assert_eq!(
        reward.reward(&state, &primitive, &next),
        base.reward(&state, &primitive, &next)
    );
}

#[test]
fn decorate_reuses_an_already_decorated_reward() {
    let decorated: Rc<dyn RewardFunction<TestState>> =
        Rc::new(OptionEvaluatingReward::new(step_reward()));
    let again = OptionManager::decorate(&decorated);
    assert!(Rc::ptr_eq(&decorated, &again));
}

#[test]
fn option_accumulates_discounted_return_until_internal_termination() {
    let terminal = never_terminal();
    let mut reward = step_reward();
    let mut option = count_to("to_three", 3);
    OptionManager::new(0.5, &terminal).register(&mut option, &mut reward);

    let state = TestState::new(&[("c0", "counter", 0)]);
    let params = vec!["c0".to_string()];
    let outcome = option
        .execute(&state, &params, 100)
        .expect("wired option runs");

    assert_eq!(outcome.termination, OptionTermination::Internal);
    assert_eq!(outcome.steps, 3);
    assert_eq!(outcome.state.value_of("c0"), Some(3));
    // 2 + 0.5 * 2 + 0.25 * 2
    assert!((outcome.cumulative_return - 3.5).abs() < f64::EPSILON);

    let grounded = Action::Option(option.clone()).ground(params);
    assert!((reward.reward(&state, &grounded, &outcome.state) - 3.5).abs() < f64::EPSILON);
}

#[test]
fn external_termination_halts_option_mid_execution() {
    let terminal: Rc<dyn TerminalFunction<TestState>> = Rc::new(|state: &TestState| {
        state.value_of("c0").is_some_and(|value| value >= 2)
    });
    let mut reward = step_reward();
    let mut go_to_door = count_to("goToDoor", 10);
    OptionManager::new(1.0, &terminal).register(&mut go_to_door, &mut reward);

    let state = TestState::new(&[("c0", "counter", 0)]);
    let outcome = go_to_door
        .execute(&state, &["c0".to_string()], 100)
        .expect("wired option runs");

    assert_eq!(outcome.termination, OptionTermination::External);
    assert_eq!(outcome.steps, 2);
    assert_eq!(outcome.state.value_of("c0"), Some(2));
    assert_eq!(go_to_door.last_return(), Some(4.0));
}

#[test]
fn step_limit_and_policy_exhaustion_stop_execution() {
    let terminal = never_terminal();
    let mut reward = step_reward();
    let manager = OptionManager::new(1.0, &terminal);

    let mut endless = count_to("endless", i64::MAX);
    manager.register(&mut endless, &mut reward);
    let state = TestState::new(&[("c0", "counter", 0)]);
    let outcome = endless
        .execute(&state, &["c0".to_string()], 4)
        .expect("wired option runs");
    assert_eq!(outcome.termination, OptionTermination::StepLimit);
    assert_eq!(outcome.steps, 4);

    let mut idle = OptionAction::new(
        "idle",
        Vec::new(),
        |_state: &TestState, _params: &[String]| None,
        |_state: &TestState, _params: &[String]| false,
    );
    manager.register(&mut idle, &mut reward);
    let outcome = idle.execute(&state, &[], 4).expect("wired option runs");
    assert_eq!(outcome.termination, OptionTermination::PolicyExhausted);
    assert_eq!(outcome.cumulative_return, 0.0);
}

#[test]
fn unwired_option_reports_configuration_error() {
    let option = count_to("loose", 1);
    let state = TestState::new(&[("c0", "counter", 0)]);

    let err = option
        .execute(&state, &["c0".to_string()], 10)
        .expect_err("option was never registered");
    assert!(matches!(err, SolverError::Configuration { .. }));
    assert_eq!(option.last_return(), None);
}

#[test]
fn option_policy_with_dangling_binding_is_rejected() {
    let terminal = never_terminal();
    let mut reward = step_reward();
    let mut broken = OptionAction::new(
        "broken",
        Vec::new(),
        |_state: &TestState, _params: &[String]| {
            Some(inc_action().ground(vec!["ghost".to_string()]))
        },
        |_state: &TestState, _params: &[String]| false,
    );
    OptionManager::new(1.0, &terminal).register(&mut broken, &mut reward);

    let state = TestState::new(&[("c0", "counter", 0)]);
    let err = broken.execute(&state, &[], 10).expect_err("ghost is absent");
    assert!(matches!(err, SolverError::InvalidAction { .. }));
}

#[test]
fn decorated_reward_reports_zero_for_option_that_never_ran() {
    let terminal = never_terminal();
    let mut reward = step_reward();
    let mut option = count_to("fresh", 1);
    OptionManager::new(1.0, &terminal).register(&mut option, &mut reward);

    let state = TestState::new(&[("c0", "counter", 0)]);
    let grounded = Action::Option(option).ground(vec!["c0".to_string()]);
    assert_eq!(reward.reward(&state, &grounded, &state), 0.0);
}
