use std::collections::HashMap;

use crate::solver::{
    action::{Action, GroundedAction, ParamType},
    error::SolverError,
};

/// States whose objects can be bound to action parameters.
pub trait ObjectState {
    /// Identifiers of the objects of `class`, in a stable order.
    fn objects_of_class(&self, class: &str) -> Vec<String>;

    /// Whether an object named `name` of `class` exists in this state.
    fn has_object(&self, class: &str, name: &str) -> bool {
        self.objects_of_class(class).iter().any(|object| object == name)
    }
}

/// Every applicable grounding of every action in `catalog` for `state`.
///
/// Output follows catalog order, then slot-candidate order, so it is stable
/// for a fixed state and catalog. An object is bound to at most one slot of
/// the same action; enumerated values may repeat.
pub fn all_applicable<S>(catalog: &[Action<S>], state: &S) -> Vec<GroundedAction<S>>
where
    S: ObjectState,
{
    let mut grounded = Vec::new();

    for action in catalog {
        let candidates: Vec<Vec<String>> = action
            .params()
            .iter()
            .map(|slot| slot_candidates(slot, state))
            .collect();

        let mut bindings = Vec::new();
        extend_bindings(action.params(), &candidates, &mut Vec::new(), &mut bindings);

        for params in bindings {
            if action.is_applicable(state, &params) {
                grounded.push(action.ground(params));
            }
        }
    }

    grounded
}

fn slot_candidates<S: ObjectState>(slot: &ParamType, state: &S) -> Vec<String> {
    match slot {
        ParamType::Object { class } => state.objects_of_class(class),
        ParamType::Values { values } => values.clone(),
    }
}

fn extend_bindings(
    slots: &[ParamType],
    candidates: &[Vec<String>],
    binding: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    let depth = binding.len();
    if depth == slots.len() {
        out.push(binding.clone());
        return;
    }

    for candidate in &candidates[depth] {
        let reused = slots[depth].is_object()
            && slots
                .iter()
                .zip(binding.iter())
                .any(|(slot, bound)| slot.is_object() && bound == candidate);
        if reused {
            continue;
        }

        binding.push(candidate.clone());
        extend_bindings(slots, candidates, binding, out);
        binding.pop();
    }
}

/// Re-target `action` through an identifier `matching` between two equivalent states.
///
/// Object parameters are rewritten; enumerated-value parameters are literals
/// and carried over as-is. The source action is left untouched.
pub fn translate<S>(
    action: &GroundedAction<S>,
    matching: &HashMap<String, String>,
) -> Result<GroundedAction<S>, SolverError> {
    let slots = action.action().params();
    if slots.len() != action.params().len() {
        return Err(arity_error(action));
    }

    let params = slots
        .iter()
        .zip(action.params())
        .map(|(slot, param)| {
            if !slot.is_object() {
                return Ok(param.clone());
            }
            matching.get(param).cloned().ok_or_else(|| {
                SolverError::invalid_action(
                    action.to_string(),
                    format!("parameter '{param}' has no counterpart in the matching"),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GroundedAction::new(action.action().clone(), params))
}

/// Check that every parameter of `action` is bound to something that exists in `state`.
pub fn check_bindings<S>(action: &GroundedAction<S>, state: &S) -> Result<(), SolverError>
where
    S: ObjectState,
{
    let slots = action.action().params();
    if slots.len() != action.params().len() {
        return Err(arity_error(action));
    }

    for (slot, param) in slots.iter().zip(action.params()) {
        let present = match slot {
            ParamType::Object { class } => state.has_object(class, param),
            ParamType::Values { values } => values.contains(param),
        };
        if !present {
            return Err(SolverError::invalid_action(
                action.to_string(),
                format!("parameter '{param}' is not bound in the current state"),
            ));
        }
    }

    Ok(())
}

fn arity_error<S>(action: &GroundedAction<S>) -> SolverError {
    SolverError::invalid_action(
        action.to_string(),
        format!(
            "expected {} parameters, got {}",
            action.action().arity(),
            action.params().len()
        ),
    )
}
