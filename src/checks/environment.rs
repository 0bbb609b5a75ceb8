// Environmental alarms and thermal sensors (same appliance command).

use super::{CheckRequest, Collection, ProbeContext, Reading, fmt_num};
use crate::appliance_client::{commands, parse};
use crate::error::Result;
use crate::models::{Metric, MetricResult};
use tracing::info;

pub(super) async fn collect_environmental(
    ctx: &ProbeContext,
    request: &CheckRequest,
) -> Result<Collection> {
    info!("reading environmentals");
    let xml = ctx.client.fetch(commands::ENVIRONMENTALS).await?;
    let readings = parse::environmentals(&xml)?
        .into_iter()
        .filter(|s| !request.is_excluded(&[s.description.as_str()]))
        .map(|s| Reading::new(Metric::new(s.description, if s.alarm { 1.0 } else { 0.0 })))
        .collect();
    Ok(Collection {
        readings,
        ..Default::default()
    })
}

pub(super) fn environmental_summary(results: &[MetricResult]) -> String {
    if results.is_empty() {
        "No sensors reported.".into()
    } else {
        "No alarms found.".into()
    }
}

/// Thermal sensors only. The appliance's own alarm flag on a sensor is CRITICAL
/// regardless of the operator's thresholds.
pub(super) async fn collect_temperature(
    ctx: &ProbeContext,
    request: &CheckRequest,
) -> Result<Collection> {
    info!("reading temperatures");
    let xml = ctx.client.fetch(commands::ENVIRONMENTALS).await?;
    let mut readings = Vec::new();
    for s in parse::environmentals(&xml)? {
        let Some(degrees) = s.degrees_c else { continue };
        if s.section != "thermal" || request.is_excluded(&[s.description.as_str()]) {
            continue;
        }
        let mut metric = Metric::new(s.description, degrees);
        metric.min = s.min;
        metric.max = s.max;
        let alarm = s.alarm.then(|| match (s.min, s.max) {
            (Some(lo), Some(hi)) => format!(
                "appliance alarm, limits {}..{} C",
                fmt_num(lo),
                fmt_num(hi)
            ),
            _ => "appliance alarm".to_string(),
        });
        readings.push(Reading {
            alarm,
            ..Reading::new(metric)
        });
    }
    Ok(Collection {
        readings,
        ..Default::default()
    })
}

pub(super) fn temperature_summary(results: &[MetricResult]) -> String {
    let hottest = results
        .iter()
        .filter_map(|r| r.value().map(|v| (r.name.as_str(), v)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    match hottest {
        Some((name, v)) => format!(
            "{} sensor(s) OK, hottest is {} at {} C",
            results.len(),
            name,
            fmt_num(v)
        ),
        None => "No temperature sensors reported.".into(),
    }
}
