// Domain models

mod counter;
mod interface;
mod outcome;

pub use counter::{Baseline, CounterSample};
pub use interface::{InterfaceId, InterfaceKind};
pub use outcome::{Metric, MetricResult, ServiceState};
