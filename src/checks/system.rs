// CPU load, disk usage and session table probes.

use super::{CheckRequest, Collection, ProbeContext, Reading, fmt_num};
use crate::appliance_client::{commands, parse};
use crate::error::Result;
use crate::models::{Metric, MetricResult};
use tracing::info;

pub(super) async fn collect_cpu(ctx: &ProbeContext, request: &CheckRequest) -> Result<Collection> {
    info!("reading CPU load");
    let xml = ctx.client.fetch(commands::CPU_LOAD).await?;
    let readings = parse::cpu_load(&xml)?
        .into_iter()
        .map(|core| (format!("CPU{}", core.core_id), core.percent))
        .filter(|(name, _)| !request.is_excluded(&[name.as_str()]))
        .map(|(name, pct)| {
            Reading::new(
                Metric::new(name, pct)
                    .with_unit("%")
                    .with_min(0.0)
                    .with_max(100.0),
            )
        })
        .collect();
    Ok(Collection {
        readings,
        ..Default::default()
    })
}

pub(super) fn cpu_summary(results: &[MetricResult]) -> String {
    format!("CPU load is {}", percent_list(results))
}

pub(super) async fn collect_disk(
    ctx: &ProbeContext,
    request: &CheckRequest,
) -> Result<Collection> {
    info!("reading disk space");
    let xml = ctx.client.fetch(commands::DISK_SPACE).await?;
    let readings = parse::disk_space(&xml)?
        .into_iter()
        .filter(|d| !request.is_excluded(&[d.device.as_str()]))
        .map(|d| {
            Reading::new(
                Metric::new(d.device, d.used_percent)
                    .with_unit("%")
                    .with_min(0.0)
                    .with_max(100.0),
            )
        })
        .collect();
    Ok(Collection {
        readings,
        ..Default::default()
    })
}

pub(super) fn disk_summary(results: &[MetricResult]) -> String {
    format!("Used Diskspace is {}", percent_list(results))
}

/// The session table size is reported but not compared against thresholds.
pub(super) async fn collect_sessions(ctx: &ProbeContext) -> Result<Collection> {
    info!("reading session info");
    let xml = ctx.client.fetch(commands::SESSION_INFO).await?;
    let s = parse::session_info(&xml)?;
    Ok(Collection {
        readings: vec![
            Reading::informational(Metric::new("maxsess", s.max_sessions as f64).with_min(0.0)),
            Reading::new(Metric::new("actsess", s.active_sessions as f64).with_min(0.0)),
            Reading::new(Metric::new("throughput", s.throughput_kbps as f64).with_min(0.0)),
        ],
        ..Default::default()
    })
}

pub(super) fn session_summary(results: &[MetricResult]) -> String {
    let value = |name: &str| {
        results
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.value())
            .map(fmt_num)
            .unwrap_or_else(|| "?".into())
    };
    format!(
        "Max possible sessions: {} / Active sessions: {} / Throughput in kbps: {}",
        value("maxsess"),
        value("actsess"),
        value("throughput")
    )
}

fn percent_list(results: &[MetricResult]) -> String {
    results
        .iter()
        .filter_map(|r| r.value().map(|v| format!("{} {}%", r.name, fmt_num(v))))
        .collect::<Vec<_>>()
        .join(", ")
}
