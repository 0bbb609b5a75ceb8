// Counter differencing: per-second bit rates from two monotonic byte counters.

use crate::models::{Baseline, CounterSample};

/// Rates are rounded to this many decimal digits.
pub const RATE_PRECISION: i32 = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("invalid counter sample for {counter_id}: {detail}")]
    InvalidSample { counter_id: String, detail: String },

    #[error(
        "counter regression on {counter_id}: in {prev_in} -> {cur_in}, out {prev_out} -> {cur_out} \
         (appliance reboot or stale state; reset the stored counters to re-baseline)"
    )]
    CounterRegression {
        counter_id: String,
        prev_in: u64,
        cur_in: u64,
        prev_out: u64,
        cur_out: u64,
    },

    #[error("non-positive interval on {counter_id}: {interval_secs:.3}s since last sample")]
    NonPositiveInterval {
        counter_id: String,
        interval_secs: f64,
    },
}

/// Bits per second in each direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateResult {
    pub in_rate: f64,
    pub out_rate: f64,
}

impl RateResult {
    pub const ZERO: RateResult = RateResult {
        in_rate: 0.0,
        out_rate: 0.0,
    };
}

/// Rate for `current` relative to `previous`. On `Ok`, `current` is the next baseline;
/// on `Err` the stored baseline must stay as it is.
pub fn compute(
    current: &CounterSample,
    previous: Option<&Baseline>,
) -> Result<RateResult, RateError> {
    let Some(prev) = previous else {
        return Ok(RateResult::ZERO);
    };

    if current.in_value < prev.in_value || current.out_value < prev.out_value {
        return Err(RateError::CounterRegression {
            counter_id: current.counter_id.clone(),
            prev_in: prev.in_value,
            cur_in: current.in_value,
            prev_out: prev.out_value,
            cur_out: current.out_value,
        });
    }

    let interval = current.observed_at - prev.observed_at;
    if interval <= 0.0 || !interval.is_finite() {
        return Err(RateError::NonPositiveInterval {
            counter_id: current.counter_id.clone(),
            interval_secs: interval,
        });
    }

    let d_in = (current.in_value - prev.in_value) as f64;
    let d_out = (current.out_value - prev.out_value) as f64;
    Ok(RateResult {
        in_rate: round_to(d_in / interval * 8.0, RATE_PRECISION),
        out_rate: round_to(d_out / interval * 8.0, RATE_PRECISION),
    })
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
