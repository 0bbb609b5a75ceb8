// Interface byte counters: one fresh sample per invocation, one stored baseline per counter.

use crate::rate::RateError;

/// One reading of an interface's byte counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSample {
    /// Interface kind + index, e.g. `eth3` or `tun12`.
    pub counter_id: String,
    pub in_value: u64,
    pub out_value: u64,
    /// Seconds since the Unix epoch.
    pub observed_at: f64,
}

impl CounterSample {
    /// Build a sample from the raw `ibytes`/`obytes` text of an appliance response.
    /// Missing or non-numeric counters are an `InvalidSample`, never zero.
    pub fn parse(
        counter_id: &str,
        in_raw: Option<&str>,
        out_raw: Option<&str>,
        observed_at: f64,
    ) -> Result<Self, RateError> {
        let invalid = |detail: String| RateError::InvalidSample {
            counter_id: counter_id.to_string(),
            detail,
        };
        let in_value = parse_counter(in_raw).map_err(|e| invalid(format!("ibytes {e}")))?;
        let out_value = parse_counter(out_raw).map_err(|e| invalid(format!("obytes {e}")))?;
        if !observed_at.is_finite() || observed_at < 0.0 {
            return Err(invalid(format!("bad timestamp {observed_at}")));
        }
        Ok(Self {
            counter_id: counter_id.to_string(),
            in_value,
            out_value,
            observed_at,
        })
    }

    pub fn as_baseline(&self) -> Baseline {
        Baseline {
            in_value: self.in_value,
            out_value: self.out_value,
            observed_at: self.observed_at,
        }
    }
}

fn parse_counter(raw: Option<&str>) -> Result<u64, String> {
    let raw = raw.ok_or_else(|| "missing".to_string())?.trim();
    raw.parse::<u64>()
        .map_err(|_| format!("not an unsigned integer: '{raw}'"))
}

/// Last persisted sample for a counter; the "previous" side of a rate computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub in_value: u64,
    pub out_value: u64,
    pub observed_at: f64,
}
