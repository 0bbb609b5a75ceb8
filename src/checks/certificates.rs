// Certificate expiry: days until not-valid-after; fewer days is worse.

use super::{CheckRequest, Collection, ProbeContext, Reading};
use crate::appliance_client::{commands, parse};
use crate::error::Result;
use crate::models::{Metric, MetricResult};
use chrono::{DateTime, Utc};
use tracing::info;

pub(super) async fn collect(ctx: &ProbeContext, request: &CheckRequest) -> Result<Collection> {
    info!("reading certificates");
    let xml = ctx.client.fetch(commands::CERTIFICATES).await?;
    let now = ctx.clock.now_utc();
    let readings = parse::certificates(&xml)?
        .into_iter()
        .filter(|c| !request.is_excluded(&[c.name.as_str()]))
        .map(|c| {
            let days = days_until(c.not_valid_after, now);
            Reading::new(Metric::new(c.name, days as f64))
        })
        .collect();
    Ok(Collection {
        readings,
        ..Default::default()
    })
}

/// Whole days left, rounded down: an already expired certificate is negative.
fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_seconds().div_euclid(86_400)
}

pub(super) fn summary(results: &[MetricResult]) -> String {
    let next = results
        .iter()
        .filter_map(|r| r.value().map(|v| (r.name.as_str(), v)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    match next {
        Some((name, days)) => format!(
            "{} certificate(s) valid, next to expire is {} in {} days",
            results.len(),
            name,
            days as i64
        ),
        None => "No certificates found.".into(),
    }
}
