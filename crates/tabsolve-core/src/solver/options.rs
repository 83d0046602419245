use std::rc::Rc;

use log::trace;

use crate::solver::{
    action::{Action, OptionAction, OptionOutcome, OptionTermination, OptionWiring},
    error::SolverError,
    grounding::{ObjectState, check_bindings},
    reward::{OptionEvaluatingReward, RewardFunction, TerminalFunction},
};

/// Wires options into a solver's discount, reward and task terminal.
///
/// Registering any number of options leaves the active reward decorated by
/// exactly one [`OptionEvaluatingReward`] layer.
pub struct OptionManager<'a, S> {
    gamma: f64,
    terminal: &'a Rc<dyn TerminalFunction<S>>,
}

impl<'a, S: 'static> OptionManager<'a, S> {
    pub fn new(gamma: f64, terminal: &'a Rc<dyn TerminalFunction<S>>) -> Self {
        OptionManager { gamma, terminal }
    }

    /// Configure `option` and make sure `reward` reports option returns.
    pub fn register(&self, option: &mut OptionAction<S>, reward: &mut Rc<dyn RewardFunction<S>>) {
        // Internal returns are accumulated with the primitive reward, never the decorator.
        let base = reward.undecorated().unwrap_or_else(|| Rc::clone(reward));
        option.wiring = Some(OptionWiring {
            gamma: self.gamma,
            reward: base,
            external_terminal: Rc::clone(self.terminal),
        });
        *reward = Self::decorate(reward);
        trace!("wired option '{}' with gamma {}", option.name(), self.gamma);
    }

    /// Wire every option in `actions`; primitives are left untouched.
    pub fn register_all(&self, actions: &mut [Action<S>], reward: &mut Rc<dyn RewardFunction<S>>) {
        for action in actions.iter_mut() {
            if let Action::Option(option) = action {
                self.register(option, reward);
            }
        }
    }

    /// Wrap `reward` unless it already evaluates options.
    pub fn decorate(reward: &Rc<dyn RewardFunction<S>>) -> Rc<dyn RewardFunction<S>> {
        if reward.is_option_evaluating() {
            Rc::clone(reward)
        } else {
            Rc::new(OptionEvaluatingReward::new(Rc::clone(reward)))
        }
    }
}

impl<S> OptionAction<S> {
    /// Run the option from `start` under `params` until it terminates.
    ///
    /// Termination is evaluated before every internal step: the task terminal
    /// first, then (after the first step) the option's own condition, then the
    /// step cap. The realized return is recorded for the reward decorator.
    pub fn execute(
        &self,
        start: &S,
        params: &[String],
        max_steps: usize,
    ) -> Result<OptionOutcome<S>, SolverError>
    where
        S: ObjectState + Clone,
    {
        let wiring = self.wiring.as_ref().ok_or_else(|| {
            SolverError::configuration(format!(
                "option '{}' executed before being registered with a solver",
                self.name()
            ))
        })?;

        let mut state = start.clone();
        let mut cumulative_return = 0.0;
        let mut discount = 1.0;
        let mut steps = 0;

        let termination = loop {
            if wiring.external_terminal.is_terminal(&state) {
                break OptionTermination::External;
            }
            if steps > 0 && self.terminates(&state, params) {
                break OptionTermination::Internal;
            }
            if steps >= max_steps {
                break OptionTermination::StepLimit;
            }

            let Some(grounded) = self.policy(&state, params) else {
                break OptionTermination::PolicyExhausted;
            };
            let Action::Primitive(primitive) = grounded.action() else {
                return Err(SolverError::invalid_action(
                    grounded.to_string(),
                    format!("option '{}' may only select primitive actions", self.name()),
                ));
            };
            check_bindings(&grounded, &state)?;

            let next_state = primitive.apply(&state, grounded.params());
            let reward = wiring.reward.reward(&state, &grounded, &next_state);
            cumulative_return += discount * reward;
            discount *= wiring.gamma;
            steps += 1;
            state = next_state;
        };

        self.last_return.set(Some(cumulative_return));
        trace!(
            "option '{}' stopped after {} steps ({:?}) with return {}",
            self.name(),
            steps,
            termination,
            cumulative_return
        );

        Ok(OptionOutcome {
            state,
            cumulative_return,
            steps,
            termination,
        })
    }
}
