// Warning/critical evaluation. Each check family declares a Direction; boundary
// behaviour differs per direction (see DESIGN.md).

use crate::error::{ProbeError, Result};
use crate::models::{Metric, MetricResult, ServiceState};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Nagios range; alert when the value is outside `start:end` (bounds inclusive).
    Range,
    /// Alert when the value is strictly above the limit.
    Ceiling,
    /// Alert when the value is strictly below the limit.
    Floor,
    /// Non-zero value is a raised alarm; always CRITICAL, thresholds ignored.
    Alarm,
}

/// Nagios plugin range: `[@]start:end`, `end` alone means `0:end`, `~` is -inf,
/// empty end is +inf. `@` alerts inside the range instead of outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: f64,
    pub end: f64,
    pub invert: bool,
}

impl Range {
    /// True when `value` does not trigger an alert.
    pub fn contains(&self, value: f64) -> bool {
        let inside = value >= self.start && value <= self.end;
        inside != self.invert
    }

    fn violation(&self) -> String {
        if self.invert {
            format!("inside range {}", self)
        } else {
            format!("outside range {}", self)
        }
    }
}

impl FromStr for Range {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || ProbeError::Usage(format!("invalid range '{}'", s));
        let raw = s.trim();
        let (invert, body) = match raw.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (start, end) = match body.split_once(':') {
            Some((start, end)) => {
                let start = match start {
                    "~" => f64::NEG_INFINITY,
                    "" => 0.0,
                    v => v.parse::<f64>().map_err(|_| bad())?,
                };
                let end = match end {
                    "" => f64::INFINITY,
                    v => v.parse::<f64>().map_err(|_| bad())?,
                };
                (start, end)
            }
            None => (0.0, body.parse::<f64>().map_err(|_| bad())?),
        };
        if start.is_nan() || end.is_nan() || start > end {
            return Err(bad());
        }
        Ok(Range { start, end, invert })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            f.write_str("@")?;
        }
        if self.start == f64::NEG_INFINITY {
            f.write_str("~:")?;
        } else if self.start != 0.0 || self.end.is_infinite() {
            write!(f, "{}:", self.start)?;
        }
        if self.end.is_finite() {
            write!(f, "{}", self.end)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Bound {
    Range(Range),
    Limit(f64),
}

impl Bound {
    fn parse(direction: Direction, raw: &str) -> Result<Self> {
        match direction {
            Direction::Range => raw.parse().map(Bound::Range),
            _ => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Bound::Limit)
                .ok_or_else(|| ProbeError::Usage(format!("invalid threshold '{}'", raw))),
        }
    }

    /// Violation description, or `None` when `value` is acceptable.
    fn check(&self, direction: Direction, value: f64) -> Option<String> {
        match (self, direction) {
            (Bound::Range(r), _) => (!r.contains(value)).then(|| r.violation()),
            (Bound::Limit(l), Direction::Floor) => (value < *l).then(|| format!("below {}", l)),
            (Bound::Limit(l), _) => (value > *l).then(|| format!("above {}", l)),
        }
    }

    /// Perfdata rendering. A Ceiling limit `N` is the Nagios range `N`, a Floor limit is `N:`.
    fn perfdata(&self, direction: Direction) -> String {
        match (self, direction) {
            (Bound::Range(r), _) => r.to_string(),
            (Bound::Limit(l), Direction::Floor) => format!("{}:", l),
            (Bound::Limit(l), _) => l.to_string(),
        }
    }
}

/// Warning/critical bounds for one check family.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    direction: Direction,
    warning: Option<Bound>,
    critical: Option<Bound>,
}

impl Thresholds {
    /// Empty strings mean "no threshold" (`-w ''`). Alarm families take no bounds, so
    /// whatever was passed is ignored.
    pub fn parse(
        direction: Direction,
        warning: Option<&str>,
        critical: Option<&str>,
    ) -> Result<Self> {
        let parse = |raw: Option<&str>| -> Result<Option<Bound>> {
            if direction == Direction::Alarm {
                return Ok(None);
            }
            match raw.map(str::trim).filter(|r| !r.is_empty()) {
                Some(r) => Bound::parse(direction, r).map(Some),
                None => Ok(None),
            }
        };
        Ok(Self {
            direction,
            warning: parse(warning)?,
            critical: parse(critical)?,
        })
    }

    pub fn evaluate(&self, metric: Metric) -> MetricResult {
        let (state, hint) = if self.direction == Direction::Alarm {
            if metric.value != 0.0 {
                (ServiceState::Critical, Some("alarm raised".to_string()))
            } else {
                (ServiceState::Ok, None)
            }
        } else if let Some(v) = self
            .critical
            .as_ref()
            .and_then(|b| b.check(self.direction, metric.value))
        {
            (ServiceState::Critical, Some(v))
        } else if let Some(v) = self
            .warning
            .as_ref()
            .and_then(|b| b.check(self.direction, metric.value))
        {
            (ServiceState::Warning, Some(v))
        } else {
            (ServiceState::Ok, None)
        };

        MetricResult {
            name: metric.name.clone(),
            state,
            hint,
            warning: self.warning.as_ref().map(|b| b.perfdata(self.direction)),
            critical: self.critical.as_ref().map(|b| b.perfdata(self.direction)),
            perfdata: self.direction != Direction::Alarm,
            metric: Some(metric),
        }
    }

    /// Result for a reported-only metric: always OK, thresholds not applied.
    pub fn informational(metric: Metric) -> MetricResult {
        MetricResult {
            name: metric.name.clone(),
            state: ServiceState::Ok,
            hint: None,
            warning: None,
            critical: None,
            perfdata: true,
            metric: Some(metric),
        }
    }
}
