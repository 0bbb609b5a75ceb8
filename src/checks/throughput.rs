// Interface throughput: byte counters differenced against the stored baseline.
// Each interface is its own store transaction, so a fault on one never touches the others.

use super::{CheckRequest, Collection, ProbeContext, Reading};
use crate::appliance_client::{commands, parse};
use crate::counter_store::CounterStore;
use crate::error::{ProbeError, Result};
use crate::models::{CounterSample, InterfaceId, Metric, MetricResult};
use crate::rate::{self, RateResult, round_to};
use std::collections::HashSet;
use tracing::{info, warn};

pub(super) async fn collect(ctx: &ProbeContext, request: &CheckRequest) -> Result<Collection> {
    let mut seen = HashSet::new();
    let interfaces: Vec<&InterfaceId> = request
        .interfaces
        .iter()
        .filter(|i| !request.is_excluded(&[i.index.as_str(), i.counter_id().as_str()]))
        .filter(|i| seen.insert(i.counter_id()))
        .collect();
    if interfaces.is_empty() {
        return Err(ProbeError::Usage(
            "Throughput needs at least one --interface that is not excluded".into(),
        ));
    }

    let mut store = CounterStore::open(&ctx.state_path, ctx.lock_timeout).await?;
    let mut collection = Collection::default();

    if request.reset_counters {
        let ids: Vec<String> = interfaces.iter().map(|i| i.counter_id()).collect();
        let removed = store.reset(&ids).await?;
        info!(removed, "stored baselines reset");
        collection
            .notes
            .push(format!("reset {} stored baseline(s)", removed));
    }

    for iface in interfaces {
        let id = iface.counter_id();
        info!(interface = %iface.appliance_name(), "reading interface counters");
        let xml = ctx
            .client
            .fetch(&commands::interface_counters(iface))
            .await?;
        let raw = parse::interface_counters(&xml, &iface.appliance_name())?;

        let sample = match CounterSample::parse(
            &id,
            raw.ibytes.as_deref(),
            raw.obytes.as_deref(),
            ctx.clock.now(),
        ) {
            Ok(s) => s,
            Err(e) => {
                warn!(counter_id = %id, error = %e, "invalid counter sample");
                collection
                    .faults
                    .push(MetricResult::unknown(id.clone(), e.to_string()));
                continue;
            }
        };

        let outcome = store
            .update(&id, |previous| {
                let bootstrap = previous.is_none();
                let rate = rate::compute(&sample, previous.as_ref())?;
                Ok(((rate, bootstrap), sample.as_baseline()))
            })
            .await;

        match outcome {
            Ok((rate, bootstrap)) => {
                if bootstrap {
                    info!(counter_id = %id, "no baseline yet; stored current counters");
                    collection
                        .notes
                        .push(format!("{}: first sample stored as baseline", id));
                }
                collection.readings.extend(readings(&id, rate));
            }
            Err(ProbeError::Rate(e)) => {
                warn!(
                    counter_id = %id,
                    in_value = sample.in_value,
                    out_value = sample.out_value,
                    observed_at = sample.observed_at,
                    error = %e,
                    "counter rate rejected; baseline left unchanged"
                );
                collection
                    .faults
                    .push(MetricResult::unknown(id.clone(), e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    store.close().await?;
    Ok(collection)
}

fn readings(id: &str, rate: RateResult) -> [Reading; 2] {
    [
        Reading::new(Metric::new(format!("{}_in_bps", id), rate.in_rate).with_min(0.0)),
        Reading::new(Metric::new(format!("{}_out_bps", id), rate.out_rate).with_min(0.0)),
    ]
}

/// `eth3: Input is 0.8 kbps - Output is 0.4 kbps; tun1: ...`
pub(super) fn summary(results: &[MetricResult]) -> String {
    let mut parts = Vec::new();
    for r in results {
        let Some(id) = r.name.strip_suffix("_in_bps") else {
            continue;
        };
        let out_name = format!("{}_out_bps", id);
        let out = results
            .iter()
            .find(|o| o.name == out_name)
            .and_then(|o| o.value());
        let (Some(input), Some(output)) = (r.value(), out) else {
            continue;
        };
        parts.push(format!(
            "{}: Input is {} kbps - Output is {} kbps",
            id,
            round_to(input / 1000.0, 2),
            round_to(output / 1000.0, 2)
        ));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::Thresholds;

    #[test]
    fn summary_pairs_directions_in_kbps() {
        let results: Vec<MetricResult> = readings("eth3", RateResult {
            in_rate: 800.0,
            out_rate: 400.0,
        })
        .into_iter()
        .map(|r| Thresholds::informational(r.metric))
        .collect();
        assert_eq!(
            summary(&results),
            "eth3: Input is 0.8 kbps - Output is 0.4 kbps"
        );
    }

    #[test]
    fn metric_names_carry_counter_id() {
        let [i, o] = readings("tun12", RateResult::ZERO);
        assert_eq!(i.metric.name, "tun12_in_bps");
        assert_eq!(o.metric.name, "tun12_out_bps");
        assert_eq!(i.metric.min, Some(0.0));
    }
}
