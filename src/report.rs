// Plugin output: `<STATUS> - <summary> | <perfdata>`, plus long output at -v.

use crate::checks::{CheckProfile, fmt_num};
use crate::error::ProbeError;
use crate::models::{MetricResult, ServiceState};

#[derive(Debug, Clone)]
pub struct Report {
    pub check: &'static str,
    pub state: ServiceState,
    pub summary: String,
    pub results: Vec<MetricResult>,
    pub notes: Vec<String>,
}

impl Report {
    /// The check could not produce any metrics.
    pub fn failed(check: &'static str, error: &ProbeError) -> Self {
        Self {
            check,
            state: ServiceState::Unknown,
            summary: error.to_string(),
            results: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Worst-of aggregation; the family formatter only speaks when everything is OK.
    pub fn from_results(
        profile: &CheckProfile,
        results: Vec<MetricResult>,
        notes: Vec<String>,
    ) -> Self {
        let state = ServiceState::worst(results.iter().map(|r| r.state));
        let summary = if state == ServiceState::Ok {
            (profile.summary)(&results)
        } else {
            problem_summary(&results, state)
        };
        Self {
            check: profile.name,
            state,
            summary,
            results,
            notes,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    pub fn render(&self, verbose: u8) -> String {
        let summary = self.summary.replace('|', "/").replace('\n', " ");
        let mut out = format!("{} - {}", self.state, summary);
        let perf = perfdata(&self.results);
        if !perf.is_empty() {
            out.push_str(" | ");
            out.push_str(&perf);
        }
        if verbose > 0 {
            for r in &self.results {
                out.push('\n');
                out.push_str(&long_line(r));
            }
            for note in &self.notes {
                out.push('\n');
                out.push_str(note);
            }
        }
        out
    }
}

fn problem_summary(results: &[MetricResult], state: ServiceState) -> String {
    results
        .iter()
        .filter(|r| r.state == state)
        .map(describe)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(r: &MetricResult) -> String {
    match (&r.metric, &r.hint) {
        (Some(m), Some(hint)) => format!("{} is {}{} ({})", r.name, fmt_num(m.value), m.unit, hint),
        (Some(m), None) => format!("{} is {}{}", r.name, fmt_num(m.value), m.unit),
        (None, Some(hint)) => format!("{}: {}", r.name, hint),
        (None, None) => r.name.clone(),
    }
}

fn long_line(r: &MetricResult) -> String {
    format!("{}: {}", r.state, describe(r))
}

/// Space-separated `label=value[uom];warn;crit;min;max`, trailing empty fields dropped.
pub fn perfdata(results: &[MetricResult]) -> String {
    results
        .iter()
        .filter(|r| r.perfdata)
        .filter_map(|r| {
            let m = r.metric.as_ref()?;
            let fields = [
                format!("{}{}", fmt_num(m.value), m.unit),
                r.warning.clone().unwrap_or_default(),
                r.critical.clone().unwrap_or_default(),
                m.min.map(fmt_num).unwrap_or_default(),
                m.max.map(fmt_num).unwrap_or_default(),
            ];
            let joined = fields.join(";");
            Some(format!("{}={}", perf_label(&r.name), joined.trim_end_matches(';')))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn perf_label(name: &str) -> String {
    if name.contains([' ', '=', '\'']) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckKind;
    use crate::models::Metric;
    use crate::threshold::{Direction, Thresholds};

    fn cpu(name: &str, v: f64) -> MetricResult {
        Thresholds::parse(Direction::Range, Some("80"), Some("90"))
            .unwrap()
            .evaluate(
                Metric::new(name, v)
                    .with_unit("%")
                    .with_min(0.0)
                    .with_max(100.0),
            )
    }

    #[test]
    fn ok_report_uses_family_summary_and_perfdata() {
        let profile = CheckKind::Cpu.profile();
        let report =
            Report::from_results(&profile, vec![cpu("CPU0", 3.0), cpu("CPU1", 5.0)], vec![]);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.render(0),
            "OK - CPU load is CPU0 3%, CPU1 5% | CPU0=3%;80;90;0;100 CPU1=5%;80;90;0;100"
        );
    }

    #[test]
    fn problem_summary_lists_worst_metrics_only() {
        let profile = CheckKind::Cpu.profile();
        let report = Report::from_results(
            &profile,
            vec![cpu("CPU0", 3.0), cpu("CPU1", 85.0), cpu("CPU2", 95.0)],
            vec![],
        );
        assert_eq!(report.state, ServiceState::Critical);
        assert_eq!(report.exit_code(), 2);
        assert!(
            report
                .render(0)
                .starts_with("CRITICAL - CPU2 is 95% (outside range 90) |")
        );
    }

    #[test]
    fn warning_beats_unknown_fault() {
        let profile = CheckKind::Throughput.profile();
        let report = Report::from_results(
            &profile,
            vec![
                cpu("eth1_in_bps", 85.0),
                MetricResult::unknown("eth2", "counter regression"),
            ],
            vec![],
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn failed_report_is_unknown_without_perfdata() {
        let err = ProbeError::Network("no answer from https://fw within 10s".into());
        let report = Report::failed("CPU", &err);
        assert_eq!(report.exit_code(), 3);
        assert_eq!(
            report.render(2),
            "UNKNOWN - network error: no answer from https://fw within 10s"
        );
    }

    #[test]
    fn perfdata_quotes_labels_and_trims_empty_fields() {
        let r = Thresholds::informational(Metric::new("Temperature near CPU", 41.5));
        assert_eq!(perfdata(&[r]), "'Temperature near CPU'=41.5");
    }

    #[test]
    fn verbose_adds_long_output() {
        let profile = CheckKind::Cpu.profile();
        let report = Report::from_results(
            &profile,
            vec![cpu("CPU0", 3.0)],
            vec!["note line".into()],
        );
        let lines: Vec<String> = report.render(1).lines().map(String::from).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "OK: CPU0 is 3%");
        assert_eq!(lines[2], "note line");
    }

    #[test]
    fn summary_cannot_break_perfdata_separator() {
        let err = ProbeError::ApiRejected("a|b".into());
        assert!(!Report::failed("CPU", &err).render(0).contains('|'));
    }
}
