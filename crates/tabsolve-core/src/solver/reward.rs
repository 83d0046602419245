use std::rc::Rc;

use crate::solver::action::{Action, GroundedAction};

/// Reward signal `(state, action, next_state) -> r`.
///
/// Any `Fn(&S, &GroundedAction<S>, &S) -> f64` closure is a reward function.
pub trait RewardFunction<S> {
    fn reward(&self, state: &S, action: &GroundedAction<S>, next_state: &S) -> f64;

    /// Capability test used to keep option decoration to a single layer.
    fn is_option_evaluating(&self) -> bool {
        false
    }

    /// The undecorated reward this function wraps, if it is a decorator.
    fn undecorated(&self) -> Option<Rc<dyn RewardFunction<S>>> {
        None
    }
}

impl<S, F> RewardFunction<S> for F
where
    F: Fn(&S, &GroundedAction<S>, &S) -> f64,
{
    fn reward(&self, state: &S, action: &GroundedAction<S>, next_state: &S) -> f64 {
        self(state, action, next_state)
    }
}

/// Task termination predicate.
pub trait TerminalFunction<S> {
    fn is_terminal(&self, state: &S) -> bool;
}

impl<S, F> TerminalFunction<S> for F
where
    F: Fn(&S) -> bool,
{
    fn is_terminal(&self, state: &S) -> bool {
        self(state)
    }
}

/// Reports an option's realized discounted return in place of a one-step reward.
///
/// Primitive actions are passed through to the wrapped reward untouched.
///
/// For an option the result is its most recent execution's return, whatever
/// `state` and `next_state` are passed. A planner that evaluates one option
/// from several states must read the reward right after each execution.
pub struct OptionEvaluatingReward<S> {
    base: Rc<dyn RewardFunction<S>>,
}

impl<S> OptionEvaluatingReward<S> {
    pub fn new(base: Rc<dyn RewardFunction<S>>) -> Self {
        OptionEvaluatingReward { base }
    }

    pub fn base(&self) -> &Rc<dyn RewardFunction<S>> {
        &self.base
    }
}

impl<S> RewardFunction<S> for OptionEvaluatingReward<S> {
    fn reward(&self, state: &S, action: &GroundedAction<S>, next_state: &S) -> f64 {
        match action.action() {
            Action::Primitive(_) => self.base.reward(state, action, next_state),
            // An option that never ran has realized nothing yet.
            Action::Option(option) => option.last_return().unwrap_or(0.0),
        }
    }

    fn is_option_evaluating(&self) -> bool {
        true
    }

    fn undecorated(&self) -> Option<Rc<dyn RewardFunction<S>>> {
        Some(Rc::clone(&self.base))
    }
}
