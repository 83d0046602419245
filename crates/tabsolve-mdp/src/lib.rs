mod builder;
mod error;
mod hasher;
mod io;
mod report;
mod simulator;
mod spec;
mod state;

pub use builder::DomainBuilder;
pub use error::MdpError;
pub use hasher::NameInvariantHasher;
pub use io::{load_state_yaml, load_yaml, save_yaml};
pub use report::{Metric, MetricRow, MetricSummary, MetricsAccumulator, RunMetrics};
pub use simulator::EpisodeSimulator;
pub use spec::{ActionSpec, ClassSpec, DomainSpec, ParamSpec};
pub use state::{ObjectInstance, OoState};
