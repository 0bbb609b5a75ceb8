// One check run: Collecting -> Evaluating -> Reporting. Never fails; every error
// becomes an UNKNOWN report.

use crate::checks::{self, CheckRequest, ProbeContext, Reading};
use crate::models::{MetricResult, ServiceState};
use crate::report::Report;
use crate::threshold::Thresholds;
use tracing::{debug, instrument, warn};

#[instrument(skip_all, fields(check = request.kind.profile().name))]
pub async fn run(ctx: &ProbeContext, request: &CheckRequest) -> Report {
    let profile = request.kind.profile();
    let thresholds = match Thresholds::parse(
        profile.direction,
        request.warning.as_deref(),
        request.critical.as_deref(),
    ) {
        Ok(t) => t,
        Err(e) => return Report::failed(profile.name, &e),
    };

    debug!(phase = "collecting");
    let collection = match checks::collect(ctx, request).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "check aborted");
            return Report::failed(profile.name, &e);
        }
    };

    debug!(
        phase = "evaluating",
        readings = collection.readings.len(),
        faults = collection.faults.len()
    );
    let results = evaluate(&thresholds, collection.readings, collection.faults);

    let report = Report::from_results(&profile, results, collection.notes);
    debug!(phase = "reporting", state = %report.state);
    report
}

/// Pure: readings against thresholds, appliance alarms forced to CRITICAL, faults appended.
pub fn evaluate(
    thresholds: &Thresholds,
    readings: Vec<Reading>,
    faults: Vec<MetricResult>,
) -> Vec<MetricResult> {
    let mut results: Vec<MetricResult> = readings
        .into_iter()
        .map(|r| {
            if r.informational {
                return Thresholds::informational(r.metric);
            }
            let mut result = thresholds.evaluate(r.metric);
            if let Some(alarm) = r.alarm {
                result.state = ServiceState::Critical;
                result.hint = Some(alarm);
            }
            result
        })
        .collect();
    results.extend(faults);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;
    use crate::threshold::Direction;

    #[test]
    fn informational_reading_skips_thresholds() {
        let t = Thresholds::parse(Direction::Range, Some("10"), Some("20")).unwrap();
        let results = evaluate(
            &t,
            vec![
                Reading::informational(Metric::new("maxsess", 262142.0)),
                Reading::new(Metric::new("actsess", 15.0)),
            ],
            vec![],
        );
        assert_eq!(results[0].state, ServiceState::Ok);
        assert_eq!(results[0].warning, None);
        assert_eq!(results[1].state, ServiceState::Warning);
    }

    #[test]
    fn appliance_alarm_overrides_thresholds() {
        let t = Thresholds::parse(Direction::Ceiling, Some("80"), Some("90")).unwrap();
        let reading = Reading {
            alarm: Some("appliance alarm".into()),
            ..Reading::new(Metric::new("Temperature near CPU", 30.0))
        };
        let results = evaluate(&t, vec![reading], vec![]);
        assert_eq!(results[0].state, ServiceState::Critical);
        assert_eq!(results[0].hint.as_deref(), Some("appliance alarm"));
    }

    #[test]
    fn faults_are_kept_after_readings() {
        let t = Thresholds::parse(Direction::Range, None, None).unwrap();
        let results = evaluate(
            &t,
            vec![Reading::new(Metric::new("eth1_in_bps", 1.0))],
            vec![MetricResult::unknown("eth2", "counter regression")],
        );
        assert_eq!(results.len(), 2);
        assert_eq!(
            ServiceState::worst(results.iter().map(|r| r.state)),
            ServiceState::Unknown
        );
    }
}
