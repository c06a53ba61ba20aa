//! Rendering of collected series in the Prometheus text format.
//!
//! Samples carry their value and timestamp as raw strings; this is the only
//! place they are converted. Samples that do not convert are dropped so a
//! single bad value never fails the whole scrape.

use prometheus::proto::{Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};
use tracing::{error, warn};

use crate::model::{Sample, TimeSeries};

/// `Content-Type` of the rendered body.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Encodes `series` in the text exposition format (version 0.0.4).
pub fn render(series: &[TimeSeries]) -> Vec<u8> {
    let families: Vec<MetricFamily> = series.iter().filter_map(to_family).collect();

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
    }
    buffer
}

fn to_family(series: &TimeSeries) -> Option<MetricFamily> {
    if !is_valid_metric_name(&series.name) {
        warn!(name = %series.name, "dropping series with invalid metric name");
        return None;
    }

    let mut family = MetricFamily::default();
    family.set_name(series.name.clone());
    family.set_help(series.help.clone());
    family.set_field_type(MetricType::GAUGE);

    for sample in &series.samples {
        match to_metric(sample) {
            Some(metric) => family.mut_metric().push(metric),
            None => warn!(
                name = %series.name,
                jobid = %sample.labels.jobid,
                stepid = %sample.labels.stepid,
                task = %sample.labels.task,
                value = %sample.value,
                timestamp = %sample.timestamp,
                "dropping non-numeric sample"
            ),
        }
    }

    // The encoder rejects families without metrics.
    if family.get_metric().is_empty() {
        return None;
    }
    Some(family)
}

fn to_metric(sample: &Sample) -> Option<Metric> {
    let value: f64 = sample.value.trim().parse().ok()?;
    let timestamp_ms = parse_timestamp_ms(&sample.timestamp)?;

    let mut metric = Metric::default();
    for (name, label_value) in sample.labels.pairs() {
        let mut pair = LabelPair::default();
        pair.set_name(name.to_string());
        pair.set_value(label_value.to_string());
        metric.mut_label().push(pair);
    }

    let mut gauge = Gauge::default();
    gauge.set_value(value);
    metric.set_gauge(gauge);
    metric.set_timestamp_ms(timestamp_ms);

    Some(metric)
}

/// Unix seconds (possibly fractional) to milliseconds.
fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    Some((secs * 1000.0) as i64)
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
