// Row encoding. Counters are stored as decimal text: SQLite INTEGER is i64 and appliance
// counters are u64.

use crate::error::{ProbeError, Result};
use crate::models::Baseline;

pub(super) fn encode(baseline: &Baseline) -> (String, String) {
    (
        baseline.in_value.to_string(),
        baseline.out_value.to_string(),
    )
}

pub(super) fn decode(
    counter_id: &str,
    in_bytes: &str,
    out_bytes: &str,
    observed_at: f64,
) -> Result<Baseline> {
    let parse = |field: &str, raw: &str| {
        raw.parse::<u64>().map_err(|_| {
            ProbeError::Store(format!(
                "corrupt {} for {}: '{}' (delete the entry to re-baseline)",
                field, counter_id, raw
            ))
        })
    };
    if !observed_at.is_finite() {
        return Err(ProbeError::Store(format!(
            "corrupt timestamp for {}: {}",
            counter_id, observed_at
        )));
    }
    Ok(Baseline {
        in_value: parse("in_bytes", in_bytes)?,
        out_value: parse("out_bytes", out_bytes)?,
        observed_at,
    })
}
