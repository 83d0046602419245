use std::collections::HashMap;

use tabsolve_core::{Action, Domain, PrimitiveAction};

use crate::{DomainSpec, MdpError, OoState};

type TransitionFn = Box<dyn Fn(&OoState, &[String]) -> OoState>;
type ApplicabilityFn = Box<dyn Fn(&OoState, &[String]) -> bool>;

#[derive(Default)]
struct Behavior {
    transition: Option<TransitionFn>,
    applicability: Option<ApplicabilityFn>,
}

/// Turns a validated [`DomainSpec`] into a solver [`Domain`] by attaching
/// behavior to each declared action.
pub struct DomainBuilder {
    spec: DomainSpec,
    behaviors: HashMap<String, Behavior>,
}

impl DomainBuilder {
    /// Start building from `spec`, which is validated first.
    pub fn new(spec: DomainSpec) -> Result<Self, MdpError> {
        spec.validate()?;
        Ok(Self {
            spec,
            behaviors: HashMap::new(),
        })
    }

    pub fn spec(&self) -> &DomainSpec {
        &self.spec
    }

    fn behavior(&mut self, action_id: &str) -> Result<&mut Behavior, MdpError> {
        if self.spec.action(action_id).is_none() {
            return Err(MdpError::BuilderUnknownAction {
                action: action_id.to_string(),
            });
        }
        Ok(self.behaviors.entry(action_id.to_string()).or_default())
    }

    /// Attach the transition of a declared action. Every action needs one.
    pub fn on_apply<F>(&mut self, action_id: &str, transition: F) -> Result<&mut Self, MdpError>
    where
        F: Fn(&OoState, &[String]) -> OoState + 'static,
    {
        self.behavior(action_id)?.transition = Some(Box::new(transition));
        Ok(self)
    }

    /// Restrict when a declared action applies. Actions without one always apply.
    pub fn on_applicable<F>(&mut self, action_id: &str, applicability: F) -> Result<&mut Self, MdpError>
    where
        F: Fn(&OoState, &[String]) -> bool + 'static,
    {
        self.behavior(action_id)?.applicability = Some(Box::new(applicability));
        Ok(self)
    }

    /// Produce the domain with actions in declaration order.
    pub fn build(mut self) -> Result<Domain<OoState>, MdpError> {
        let mut actions = Vec::with_capacity(self.spec.actions.len());

        for spec in &self.spec.actions {
            let behavior = self.behaviors.remove(&spec.id).unwrap_or_default();
            let transition = behavior.transition.ok_or_else(|| MdpError::MissingTransition {
                action: spec.id.clone(),
            })?;

            let mut primitive = PrimitiveAction::new(spec.id.clone(), spec.param_types(), transition);
            if let Some(applicability) = behavior.applicability {
                primitive = primitive.with_applicability(applicability);
            }
            actions.push(Action::Primitive(primitive));
        }

        Ok(Domain::new(self.spec.name.clone(), actions))
    }
}
