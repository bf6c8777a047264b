//! Metric names and dispatch recording helpers
//!
//! Instruments come from the global meter provider, which is a no-op until
//! [`crate::init`] installs an OTLP exporter.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};

/// Meter scope name
pub const METER_NAME: &str = "switchboard";

pub const DISPATCH_COUNT: &str = "switchboard.dispatch.count";
pub const DISPATCH_DURATION: &str = "switchboard.dispatch.duration";
pub const DISPATCH_COST: &str = "switchboard.dispatch.cost";
pub const PROVIDER_ATTEMPTS: &str = "switchboard.provider.attempts";
pub const TOKEN_USAGE: &str = "switchboard.token.usage";

/// One finished dispatch, as seen by metrics
#[derive(Debug, Clone, Copy)]
pub struct DispatchRecord<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    /// `success` or an error kind name
    pub outcome: &'a str,
    pub duration: Duration,
    /// Attempts made against the provider
    pub attempts: u32,
    /// USD, zero for failures
    pub cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Instruments for the dispatch path
#[derive(Debug, Clone)]
pub struct DispatchMetrics {
    count: Counter<u64>,
    duration: Histogram<f64>,
    cost: Histogram<f64>,
    attempts: Counter<u64>,
    tokens: Counter<u64>,
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchMetrics {
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter(METER_NAME);

        Self {
            count: meter
                .u64_counter(DISPATCH_COUNT)
                .with_description("Dispatches by outcome")
                .build(),
            duration: meter
                .f64_histogram(DISPATCH_DURATION)
                .with_unit("s")
                .with_description("Wall-clock dispatch duration")
                .build(),
            cost: meter
                .f64_histogram(DISPATCH_COST)
                .with_unit("USD")
                .with_description("Computed dispatch cost")
                .build(),
            attempts: meter
                .u64_counter(PROVIDER_ATTEMPTS)
                .with_description("Outbound provider call attempts")
                .build(),
            tokens: meter
                .u64_counter(TOKEN_USAGE)
                .with_description("Tokens consumed by direction")
                .build(),
        }
    }

    pub fn record(&self, record: &DispatchRecord<'_>) {
        let attrs = [
            KeyValue::new("provider", record.provider.to_owned()),
            KeyValue::new("model", record.model.to_owned()),
            KeyValue::new("outcome", record.outcome.to_owned()),
        ];

        self.count.add(1, &attrs);
        self.duration.record(record.duration.as_secs_f64(), &attrs);
        self.attempts.add(u64::from(record.attempts), &attrs[..2]);

        if record.outcome == "success" {
            self.cost.record(record.cost, &attrs[..2]);

            let with_direction = |direction: &'static str| {
                [
                    KeyValue::new("provider", record.provider.to_owned()),
                    KeyValue::new("model", record.model.to_owned()),
                    KeyValue::new("direction", direction),
                ]
            };
            self.tokens.add(record.input_tokens, &with_direction("input"));
            self.tokens.add(record.output_tokens, &with_direction("output"));
        }
    }
}
