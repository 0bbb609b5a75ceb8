// Check catalogue: one CheckKind per metric family, each mapped to a probe,
// a threshold direction and an OK-summary formatter.

mod certificates;
mod environment;
mod system;
mod throughput;

use crate::appliance_client::ApplianceClient;
use crate::error::Result;
use crate::models::{InterfaceId, Metric, MetricResult};
use crate::threshold::Direction;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Cpu,
    DiskSpace,
    SessInfo,
    Throughput,
    Environmental,
    Temperature,
    Certificates,
}

/// Static description of a check family.
pub struct CheckProfile {
    pub name: &'static str,
    pub direction: Direction,
    /// Summary line when every metric is OK.
    pub summary: fn(&[MetricResult]) -> String,
}

impl CheckKind {
    pub const ALL: [CheckKind; 7] = [
        CheckKind::Cpu,
        CheckKind::DiskSpace,
        CheckKind::SessInfo,
        CheckKind::Throughput,
        CheckKind::Environmental,
        CheckKind::Temperature,
        CheckKind::Certificates,
    ];

    pub fn profile(self) -> CheckProfile {
        match self {
            CheckKind::Cpu => CheckProfile {
                name: "CPU",
                direction: Direction::Range,
                summary: system::cpu_summary,
            },
            CheckKind::DiskSpace => CheckProfile {
                name: "DiskSpace",
                direction: Direction::Range,
                summary: system::disk_summary,
            },
            CheckKind::SessInfo => CheckProfile {
                name: "SessInfo",
                direction: Direction::Range,
                summary: system::session_summary,
            },
            CheckKind::Throughput => CheckProfile {
                name: "Throughput",
                direction: Direction::Range,
                summary: throughput::summary,
            },
            CheckKind::Environmental => CheckProfile {
                name: "Environmental",
                direction: Direction::Alarm,
                summary: environment::environmental_summary,
            },
            CheckKind::Temperature => CheckProfile {
                name: "Temperature",
                direction: Direction::Ceiling,
                summary: environment::temperature_summary,
            },
            CheckKind::Certificates => CheckProfile {
                name: "Certificates",
                direction: Direction::Floor,
                summary: certificates::summary,
            },
        }
    }
}

/// What the operator asked for.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub kind: CheckKind,
    pub interfaces: Vec<InterfaceId>,
    /// Names to skip: interface indexes/ids, sensor descriptions, certificate names.
    pub exclude: Vec<String>,
    pub warning: Option<String>,
    pub critical: Option<String>,
    pub reset_counters: bool,
}

impl CheckRequest {
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            interfaces: Vec::new(),
            exclude: Vec::new(),
            warning: None,
            critical: None,
            reset_counters: false,
        }
    }

    pub(crate) fn is_excluded(&self, names: &[&str]) -> bool {
        self.exclude
            .iter()
            .any(|x| names.iter().any(|n| n.eq_ignore_ascii_case(x.trim())))
    }
}

/// Wall clock, or a fixed instant for reproducible runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    System,
    Fixed(f64),
}

impl Clock {
    /// Seconds since the Unix epoch.
    pub fn now(self) -> f64 {
        match self {
            Clock::System => Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            Clock::Fixed(t) => t,
        }
    }

    pub fn now_utc(self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => {
                let secs = t.floor();
                let nanos = ((t - secs) * 1e9) as u32;
                DateTime::from_timestamp(secs as i64, nanos).unwrap_or_default()
            }
        }
    }
}

/// Collaborators shared by every probe.
pub struct ProbeContext {
    pub client: ApplianceClient,
    pub state_path: PathBuf,
    pub lock_timeout: Duration,
    pub clock: Clock,
}

/// One measured value awaiting evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub metric: Metric,
    /// Alarm raised by the appliance itself; forces CRITICAL.
    pub alarm: Option<String>,
    /// Reported but never compared against thresholds.
    pub informational: bool,
}

impl Reading {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            alarm: None,
            informational: false,
        }
    }

    pub fn informational(metric: Metric) -> Self {
        Self {
            informational: true,
            ..Self::new(metric)
        }
    }
}

/// Output of the collecting phase.
#[derive(Debug, Default)]
pub struct Collection {
    pub readings: Vec<Reading>,
    /// Per-metric failures that did not abort the whole check.
    pub faults: Vec<MetricResult>,
    /// Extra lines for verbose output.
    pub notes: Vec<String>,
}

/// Runs the probe for `request.kind`. An `Err` aborts the check (UNKNOWN).
pub async fn collect(ctx: &ProbeContext, request: &CheckRequest) -> Result<Collection> {
    match request.kind {
        CheckKind::Cpu => system::collect_cpu(ctx, request).await,
        CheckKind::DiskSpace => system::collect_disk(ctx, request).await,
        CheckKind::SessInfo => system::collect_sessions(ctx).await,
        CheckKind::Throughput => throughput::collect(ctx, request).await,
        CheckKind::Environmental => environment::collect_environmental(ctx, request).await,
        CheckKind::Temperature => environment::collect_temperature(ctx, request).await,
        CheckKind::Certificates => certificates::collect(ctx, request).await,
    }
}

/// `1234.5` -> `1234.5`, `3.0` -> `3`.
pub(crate) fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_profile() {
        for kind in CheckKind::ALL {
            let profile = kind.profile();
            assert!(!profile.name.is_empty());
        }
    }

    #[test]
    fn inverted_families_do_not_use_ranges() {
        assert_eq!(CheckKind::Certificates.profile().direction, Direction::Floor);
        assert_eq!(CheckKind::Environmental.profile().direction, Direction::Alarm);
        assert_eq!(CheckKind::Temperature.profile().direction, Direction::Ceiling);
        assert_eq!(CheckKind::Throughput.profile().direction, Direction::Range);
    }

    #[test]
    fn exclude_is_case_insensitive() {
        let mut req = CheckRequest::new(CheckKind::Certificates);
        req.exclude = vec!["Web-UI".into()];
        assert!(req.is_excluded(&["web-ui"]));
        assert!(!req.is_excluded(&["root-ca"]));
    }

    #[test]
    fn fixed_clock_converts_to_utc() {
        let c = Clock::Fixed(86_400.5);
        assert_eq!(c.now(), 86_400.5);
        assert_eq!(c.now_utc().timestamp(), 86_400);
    }

    #[test]
    fn fmt_num_drops_trailing_zero() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(2.67), "2.67");
    }
}
