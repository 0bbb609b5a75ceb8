// Plugin states and evaluated metric results

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Monitoring-plugin exit code.
    pub fn exit_code(self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }

    /// Rank used for the worst-of rule: CRITICAL > WARNING > UNKNOWN > OK.
    pub fn severity(self) -> u8 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Unknown => 1,
            ServiceState::Warning => 2,
            ServiceState::Critical => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        }
    }

    /// Most severe state; OK for an empty input.
    pub fn worst<I: IntoIterator<Item = ServiceState>>(states: I) -> ServiceState {
        states
            .into_iter()
            .max_by_key(|s| s.severity())
            .unwrap_or(ServiceState::Ok)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw measurement produced by a probe, before threshold evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    /// Perfdata unit of measure (`%`, `B`, `c`, or empty).
    pub unit: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            unit: "",
            min: None,
            max: None,
        }
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

/// Evaluated outcome for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricResult {
    pub name: String,
    pub state: ServiceState,
    /// `None` when the metric could not be produced (e.g. a counter fault).
    pub metric: Option<Metric>,
    /// Violated threshold or failure message, shown in non-OK summaries.
    pub hint: Option<String>,
    pub warning: Option<String>,
    pub critical: Option<String>,
    /// Whether the metric is emitted as perfdata.
    pub perfdata: bool,
}

impl MetricResult {
    pub fn unknown(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ServiceState::Unknown,
            metric: None,
            hint: Some(message.into()),
            warning: None,
            critical: None,
            perfdata: false,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.metric.as_ref().map(|m| m.value)
    }
}
