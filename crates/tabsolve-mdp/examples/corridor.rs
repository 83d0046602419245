use std::{path::PathBuf, rc::Rc};

use tabsolve_core::{Action, GroundedAction, OptionAction, ParamType, SolverState};
use tabsolve_mdp::{
    DomainBuilder, EpisodeSimulator, MetricsAccumulator, NameInvariantHasher, OoState, load_yaml,
};

fn agent_x(state: &OoState) -> i64 {
    state
        .objects()
        .iter()
        .find(|object| object.class == "agent")
        .and_then(|object| object.attributes.get("x").copied())
        .unwrap_or(0)
}

fn agent_name(state: &OoState) -> String {
    state
        .objects()
        .iter()
        .find(|object| object.class == "agent")
        .map(|object| object.name.clone())
        .unwrap_or_default()
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/tabsolve-mdp/examples/corridor.domain.yaml"));

    let spec = load_yaml(&path).expect("failed to load domain YAML");
    let mut builder = DomainBuilder::new(spec).expect("invalid domain");
    builder
        .on_apply("move", |state: &OoState, params: &[String]| {
            let dx = match params[0].as_str() {
                "E" => 1,
                "W" => -1,
                _ => 0,
            };
            state.with_attribute(&agent_name(state), "x", agent_x(state) + dx)
        })
        .expect("move is declared")
        .on_apply("open", |state: &OoState, params: &[String]| {
            state.with_attribute(&params[0], "open", 1)
        })
        .expect("open is declared")
        .on_applicable("open", |state: &OoState, params: &[String]| {
            state.attribute(&params[0], "x") == Some(agent_x(state))
        })
        .expect("open is declared");
    let domain = Rc::new(builder.build().expect("failed to build domain"));
    let step_east = domain.actions()[0].ground(vec!["E".to_string()]);

    let mut solver = SolverState::initialize(
        Rc::clone(&domain),
        Rc::new(|_s: &OoState, _a: &GroundedAction<OoState>, _n: &OoState| -1.0),
        Rc::new(|s: &OoState| {
            s.objects()
                .iter()
                .any(|object| object.attributes.get("open") == Some(&1))
        }),
        0.95,
        Rc::new(NameInvariantHasher),
    )
    .expect("invalid solver configuration");

    let start = OoState::new()
        .with_object("agent0", "agent", [("x", 0)])
        .with_object("door0", "door", [("x", 4), ("open", 0)]);

    let mut accumulator = MetricsAccumulator::new();
    let mut simulator = EpisodeSimulator::new(12345, 500);
    for run in 0..5 {
        let (_, metrics) = simulator
            .run_random(&solver, &start)
            .expect("episode failed");
        accumulator.record(run, "corridor", "random_primitives", &metrics);
    }

    solver.add_non_domain_action(Action::Option(OptionAction::new(
        "walkToDoor",
        vec![ParamType::object("door")],
        move |_state: &OoState, _params: &[String]| Some(step_east.clone()),
        |state: &OoState, params: &[String]| state.attribute(&params[0], "x") == Some(agent_x(state)),
    )));
    for run in 0..5 {
        let (_, metrics) = simulator
            .run_random(&solver, &start)
            .expect("episode failed");
        accumulator.record(run, "corridor", "random_with_options", &metrics);
    }

    let written = accumulator
        .flush(std::io::stdout().lock(), ',')
        .expect("failed to write metrics");
    println!("rows={written}");
}
