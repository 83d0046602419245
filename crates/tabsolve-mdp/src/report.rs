use std::{borrow::Cow, fmt, io::Write, time::Duration};

use serde::{Deserialize, Serialize};

use crate::MdpError;

/// Scalar results of one planning or learning run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunMetrics {
    pub iterations: usize,
    pub steps: usize,
    pub duration: Duration,
    pub cumulative_reward: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Iterations,
    Steps,
    DurationMs,
    CumulativeReward,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Iterations,
        Metric::Steps,
        Metric::DurationMs,
        Metric::CumulativeReward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Iterations => "iterations",
            Metric::Steps => "steps",
            Metric::DurationMs => "duration_ms",
            Metric::CumulativeReward => "cumulative_reward",
        }
    }

    fn value_of(&self, metrics: &RunMetrics) -> f64 {
        match self {
            Metric::Iterations => metrics.iterations as f64,
            Metric::Steps => metrics.steps as f64,
            Metric::DurationMs => metrics.duration.as_nanos() as f64 / 1_000_000.0,
            Metric::CumulativeReward => metrics.cumulative_reward,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exported value, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub run: usize,
    pub scenario: String,
    pub algorithm: String,
    pub metric: Metric,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Collects run metrics for one experiment batch.
///
/// The driver owns the accumulator, passes it into each run, and flushes it
/// once the batch is complete.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    rows: Vec<MetricRow>,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every metric of one run.
    pub fn record(
        &mut self,
        run: usize,
        scenario: impl Into<String>,
        algorithm: impl Into<String>,
        metrics: &RunMetrics,
    ) {
        let scenario = scenario.into();
        let algorithm = algorithm.into();
        for metric in Metric::ALL {
            self.rows.push(MetricRow {
                run,
                scenario: scenario.clone(),
                algorithm: algorithm.clone(),
                metric,
                value: metric.value_of(metrics),
            });
        }
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count, mean and range of one metric across all runs of `algorithm`.
    pub fn summary(&self, algorithm: &str, metric: Metric) -> Option<MetricSummary> {
        let values: Vec<f64> = self
            .rows
            .iter()
            .filter(|row| row.algorithm == algorithm && row.metric == metric)
            .map(|row| row.value)
            .collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        Some(MetricSummary {
            count,
            mean: values.iter().sum::<f64>() / count as f64,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// Write a header and all rows separated by `delimiter`, then empty the accumulator.
    /// Returns the number of rows written.
    ///
    /// Labels containing the delimiter, a quote or a line break are wrapped in
    /// double quotes with inner quotes doubled, so every row keeps five columns.
    pub fn flush<W: Write>(&mut self, mut writer: W, delimiter: char) -> Result<usize, MdpError> {
        writeln!(
            writer,
            "run{d}scenario{d}algorithm{d}metric{d}value",
            d = delimiter
        )?;
        for row in &self.rows {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}",
                row.run,
                escape_field(&row.scenario, delimiter),
                escape_field(&row.algorithm, delimiter),
                row.metric,
                row.value,
                d = delimiter
            )?;
        }
        writer.flush()?;

        let written = self.rows.len();
        self.rows.clear();
        Ok(written)
    }
}

fn escape_field(label: &str, delimiter: char) -> Cow<'_, str> {
    if label.contains([delimiter, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", label.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(label)
    }
}
