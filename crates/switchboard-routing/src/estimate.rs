//! Cost and latency estimation from catalog metadata

use std::time::Duration;

use serde::Serialize;

use crate::catalog::ModelDescriptor;
use crate::provider::SpeedClass;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Characters per token for the rough size heuristic
pub const CHARS_PER_TOKEN: usize = 4;

/// USD cost of one call, priced independently for input and output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Cost {
    pub input: f64,
    pub output: f64,
    pub total: f64,
}

impl Cost {
    pub fn new(input: f64, output: f64) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// Rough token count for a text length: `ceil(chars / 4)`
pub const fn estimate_tokens(chars: usize) -> u64 {
    chars.div_ceil(CHARS_PER_TOKEN) as u64
}

/// Cost of a call given token counts and per-million pricing
#[allow(clippy::cast_precision_loss)]
pub fn estimate_cost(model: &ModelDescriptor, input_tokens: u64, output_tokens: u64) -> Cost {
    let input = input_tokens as f64 * model.input_per_mtok.max(0.0) / TOKENS_PER_MILLION;
    let output = output_tokens as f64 * model.output_per_mtok.max(0.0) / TOKENS_PER_MILLION;
    Cost::new(input, output)
}

/// Fixed overhead plus per-token prefill and decode time
struct SpeedProfile {
    overhead_ms: u64,
    prefill_us_per_token: u64,
    decode_ms_per_token: u64,
}

const fn profile(class: SpeedClass) -> SpeedProfile {
    match class {
        SpeedClass::Fast => SpeedProfile {
            overhead_ms: 150,
            prefill_us_per_token: 2,
            decode_ms_per_token: 2,
        },
        SpeedClass::Quick => SpeedProfile {
            overhead_ms: 400,
            prefill_us_per_token: 10,
            decode_ms_per_token: 8,
        },
        SpeedClass::Standard => SpeedProfile {
            overhead_ms: 600,
            prefill_us_per_token: 15,
            decode_ms_per_token: 15,
        },
        SpeedClass::Unrated => SpeedProfile {
            overhead_ms: 900,
            prefill_us_per_token: 20,
            decode_ms_per_token: 20,
        },
    }
}

/// Expected wall-clock time of a call
pub fn estimate_latency(model: &ModelDescriptor, input_tokens: u64, output_tokens: u64) -> Duration {
    let profile = profile(model.provider.speed_class());

    Duration::from_millis(profile.overhead_ms)
        + Duration::from_micros(input_tokens.saturating_mul(profile.prefill_us_per_token))
        + Duration::from_millis(output_tokens.saturating_mul(profile.decode_ms_per_token))
}
