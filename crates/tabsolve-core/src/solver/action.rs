use std::{
    cell::Cell,
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use crate::solver::reward::{RewardFunction, TerminalFunction};

/// Applicability (or initiation) test over a state and a parameter binding.
pub type ApplicableFn<S> = Rc<dyn Fn(&S, &[String]) -> bool>;
/// Successor of a primitive action. Supplied by the domain.
pub type ApplyFn<S> = Rc<dyn Fn(&S, &[String]) -> S>;
/// Internal policy of an option: the next primitive to run, or `None` to stop.
pub type PolicyFn<S> = Rc<dyn Fn(&S, &[String]) -> Option<GroundedAction<S>>>;

/// Type of one parameter slot of an action template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Bound to the identifier of an object of `class` present in the state.
    Object { class: String },
    /// Bound to one of a fixed set of literal values (for example compass directions).
    Values { values: Vec<String> },
}

impl ParamType {
    pub fn object(class: impl Into<String>) -> Self {
        ParamType::Object {
            class: class.into(),
        }
    }

    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        ParamType::Values {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether values of this slot are object identifiers subject to renaming.
    pub fn is_object(&self) -> bool {
        matches!(self, ParamType::Object { .. })
    }
}

/// A single-step action template.
pub struct PrimitiveAction<S> {
    name: String,
    params: Vec<ParamType>,
    applicable: Option<ApplicableFn<S>>,
    apply: ApplyFn<S>,
}

impl<S> PrimitiveAction<S> {
    /// Create a template that is applicable under every binding.
    pub fn new<F>(name: impl Into<String>, params: Vec<ParamType>, apply: F) -> Self
    where
        F: Fn(&S, &[String]) -> S + 'static,
    {
        PrimitiveAction {
            name: name.into(),
            params,
            applicable: None,
            apply: Rc::new(apply),
        }
    }

    /// Restrict the bindings under which this action may be taken.
    pub fn with_applicability<F>(mut self, applicable: F) -> Self
    where
        F: Fn(&S, &[String]) -> bool + 'static,
    {
        self.applicable = Some(Rc::new(applicable));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the action's transition for one binding.
    pub fn apply(&self, state: &S, params: &[String]) -> S {
        (self.apply)(state, params)
    }
}

impl<S> Clone for PrimitiveAction<S> {
    fn clone(&self) -> Self {
        PrimitiveAction {
            name: self.name.clone(),
            params: self.params.clone(),
            applicable: self.applicable.clone(),
            apply: Rc::clone(&self.apply),
        }
    }
}

/// Settings an option receives when it is registered with a solver.
pub(crate) struct OptionWiring<S> {
    pub gamma: f64,
    pub reward: Rc<dyn RewardFunction<S>>,
    pub external_terminal: Rc<dyn TerminalFunction<S>>,
}

impl<S> Clone for OptionWiring<S> {
    fn clone(&self) -> Self {
        OptionWiring {
            gamma: self.gamma,
            reward: Rc::clone(&self.reward),
            external_terminal: Rc::clone(&self.external_terminal),
        }
    }
}

/// Why an option trajectory stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTermination {
    /// The option's own termination condition fired.
    Internal,
    /// The surrounding task's terminal predicate held.
    External,
    /// The internal policy had nothing to execute.
    PolicyExhausted,
    /// The configured step cap was reached.
    StepLimit,
}

/// Result of running an option to completion.
#[derive(Debug, Clone)]
pub struct OptionOutcome<S> {
    pub state: S,
    pub cumulative_return: f64,
    pub steps: usize,
    pub termination: OptionTermination,
}

/// A temporally-extended action: an internal policy run until a termination
/// condition holds, exposed to solvers as one transition.
///
/// Clones share the record of the last realized return, so a grounded copy
/// executed by a solver is visible to the reward decorator.
pub struct OptionAction<S> {
    name: String,
    params: Vec<ParamType>,
    initiation: Option<ApplicableFn<S>>,
    policy: PolicyFn<S>,
    terminates: ApplicableFn<S>,
    pub(crate) wiring: Option<OptionWiring<S>>,
    pub(crate) last_return: Rc<Cell<Option<f64>>>,
}

impl<S> OptionAction<S> {
    pub fn new<P, T>(name: impl Into<String>, params: Vec<ParamType>, policy: P, terminates: T) -> Self
    where
        P: Fn(&S, &[String]) -> Option<GroundedAction<S>> + 'static,
        T: Fn(&S, &[String]) -> bool + 'static,
    {
        OptionAction {
            name: name.into(),
            params,
            initiation: None,
            policy: Rc::new(policy),
            terminates: Rc::new(terminates),
            wiring: None,
            last_return: Rc::new(Cell::new(None)),
        }
    }

    /// Restrict the states in which the option may be initiated.
    pub fn with_initiation<F>(mut self, initiation: F) -> Self
    where
        F: Fn(&S, &[String]) -> bool + 'static,
    {
        self.initiation = Some(Rc::new(initiation));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a solver has wired this option to a discount, reward and task terminal.
    pub fn is_wired(&self) -> bool {
        self.wiring.is_some()
    }

    /// Discount factor the option accumulates its return with, once wired.
    pub fn gamma(&self) -> Option<f64> {
        self.wiring.as_ref().map(|wiring| wiring.gamma)
    }

    /// Discounted return of the most recent execution of this option (or any clone of it).
    pub fn last_return(&self) -> Option<f64> {
        self.last_return.get()
    }

    pub(crate) fn policy(&self, state: &S, params: &[String]) -> Option<GroundedAction<S>> {
        (self.policy)(state, params)
    }

    pub(crate) fn terminates(&self, state: &S, params: &[String]) -> bool {
        (self.terminates)(state, params)
    }
}

impl<S> Clone for OptionAction<S> {
    fn clone(&self) -> Self {
        OptionAction {
            name: self.name.clone(),
            params: self.params.clone(),
            initiation: self.initiation.clone(),
            policy: Rc::clone(&self.policy),
            terminates: Rc::clone(&self.terminates),
            wiring: self.wiring.clone(),
            last_return: Rc::clone(&self.last_return),
        }
    }
}

/// An entry of a solver's action catalog.
pub enum Action<S> {
    Primitive(PrimitiveAction<S>),
    Option(OptionAction<S>),
}

impl<S> Action<S> {
    pub fn name(&self) -> &str {
        match self {
            Action::Primitive(action) => &action.name,
            Action::Option(option) => &option.name,
        }
    }

    pub fn params(&self) -> &[ParamType] {
        match self {
            Action::Primitive(action) => &action.params,
            Action::Option(option) => &option.params,
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    pub fn is_parameterized(&self) -> bool {
        self.arity() > 0
    }

    /// Applicability test for primitives, initiation test for options.
    pub fn is_applicable(&self, state: &S, params: &[String]) -> bool {
        let test = match self {
            Action::Primitive(action) => action.applicable.as_ref(),
            Action::Option(option) => option.initiation.as_ref(),
        };
        test.is_none_or(|test| test(state, params))
    }

    pub fn is_option(&self) -> bool {
        matches!(self, Action::Option(_))
    }

    pub fn as_option(&self) -> Option<&OptionAction<S>> {
        match self {
            Action::Option(option) => Some(option),
            Action::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveAction<S>> {
        match self {
            Action::Primitive(action) => Some(action),
            Action::Option(_) => None,
        }
    }

    /// Bind this template to concrete parameters.
    pub fn ground(&self, params: Vec<String>) -> GroundedAction<S> {
        GroundedAction::new(self.clone(), params)
    }
}

impl<S> Clone for Action<S> {
    fn clone(&self) -> Self {
        match self {
            Action::Primitive(action) => Action::Primitive(action.clone()),
            Action::Option(option) => Action::Option(option.clone()),
        }
    }
}

impl<S> PartialEq for Action<S> {
    /// Catalog entries are identified by kind and name.
    fn eq(&self, other: &Self) -> bool {
        self.is_option() == other.is_option() && self.name() == other.name()
    }
}

impl<S> Eq for Action<S> {}

impl<S> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_option() { "Option" } else { "Primitive" };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("params", &self.params())
            .finish()
    }
}

/// An action template bound to an ordered tuple of identifiers.
pub struct GroundedAction<S> {
    action: Action<S>,
    params: Vec<String>,
}

impl<S> GroundedAction<S> {
    pub fn new(action: Action<S>, params: Vec<String>) -> Self {
        GroundedAction { action, params }
    }

    pub fn action(&self) -> &Action<S> {
        &self.action
    }

    pub fn name(&self) -> &str {
        self.action.name()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_applicable(&self, state: &S) -> bool {
        self.action.is_applicable(state, &self.params)
    }
}

impl<S> Clone for GroundedAction<S> {
    fn clone(&self) -> Self {
        GroundedAction {
            action: self.action.clone(),
            params: self.params.clone(),
        }
    }
}

impl<S> PartialEq for GroundedAction<S> {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action && self.params == other.params
    }
}

impl<S> Eq for GroundedAction<S> {}

impl<S> Hash for GroundedAction<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.action.is_option().hash(state);
        self.action.name().hash(state);
        self.params.hash(state);
    }
}

impl<S> fmt::Display for GroundedAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(", "))?;
        }
        Ok(())
    }
}

impl<S> fmt::Debug for GroundedAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroundedAction({self})")
    }
}
