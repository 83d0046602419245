mod solver;

pub use solver::action::{
    Action, GroundedAction, OptionAction, OptionOutcome, OptionTermination, ParamType,
    PrimitiveAction,
};
pub use solver::config::{SolverConfig, SolverConfigError};
pub use solver::debug::DebugChannel;
pub use solver::error::SolverError;
pub use solver::grounding::{ObjectState, all_applicable, check_bindings, translate};
pub use solver::hashing::{CanonicalIndex, HashedState, StateHasher};
pub use solver::ids::{StateHandle, StateKey};
pub use solver::options::OptionManager;
pub use solver::reward::{OptionEvaluatingReward, RewardFunction, TerminalFunction};
pub use solver::snapshot::{BucketSnapshot, IndexSnapshot};
pub use solver::state::{Domain, Solver, SolverState};
