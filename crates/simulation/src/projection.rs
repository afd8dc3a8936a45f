//! Display projections of runs.
//!
//! This module turns runs and their statistics into chart series and metric
//! groups. Rendering is left to the front-end.

use crate::session::RunReport;
use aviator_domain::{SimulationRun, StrategyId};

/// Label of the balance series of a single-run chart.
pub const BALANCE_SERIES_LABEL: &str = "Balance Over Time";
/// Label of the upper band series of a single-run chart.
pub const UPPER_BAND_LABEL: &str = "Upper Band (95%)";
/// Label of the lower band series of a single-run chart.
pub const LOWER_BAND_LABEL: &str = "Lower Band (95%)";

/// One labelled line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend text.
    pub label: String,
    /// Strategy the series belongs to, if it is a per-strategy line.
    pub strategy: Option<StrategyId>,
    /// Y values, one per round index.
    pub values: Vec<f64>,
}

/// Balance lines over a shared round axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalanceChart {
    /// Round indices `0..longest`.
    pub labels: Vec<usize>,
    /// Lines in input order. Shorter lines are not padded.
    pub series: Vec<Series>,
}

impl BalanceChart {
    /// One series per run, labelled with the strategy name.
    pub fn from_runs<'a, I>(runs: I) -> Self
    where
        I: IntoIterator<Item = &'a SimulationRun>,
    {
        let series: Vec<Series> = runs
            .into_iter()
            .map(|run| Series {
                label: run.strategy.label().to_string(),
                strategy: Some(run.strategy),
                values: run.balances.as_slice().to_vec(),
            })
            .collect();
        let longest = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        Self {
            labels: (0..longest).collect(),
            series,
        }
    }

    /// Length of the longest series.
    #[must_use]
    pub fn longest(&self) -> usize {
        self.labels.len()
    }
}

/// Balance plus the flat dispersion bands of one run.
///
/// Band series are omitted when statistics are unavailable.
#[must_use]
pub fn run_chart(report: &RunReport) -> BalanceChart {
    let balances = report.run.balances.as_slice();
    let mut series = vec![Series {
        label: BALANCE_SERIES_LABEL.to_string(),
        strategy: Some(report.run.strategy),
        values: balances.to_vec(),
    }];
    if let Some(stats) = report.stats() {
        series.push(Series {
            label: UPPER_BAND_LABEL.to_string(),
            strategy: None,
            values: stats.upper_band.clone(),
        });
        series.push(Series {
            label: LOWER_BAND_LABEL.to_string(),
            strategy: None,
            values: stats.lower_band.clone(),
        });
    }
    BalanceChart {
        labels: (0..balances.len()).collect(),
        series,
    }
}

/// Metrics shown side by side in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    FinalBalance,
    WinRate,
    Roi,
    MaxDrawdown,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::FinalBalance,
        Metric::WinRate,
        Metric::Roi,
        Metric::MaxDrawdown,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Metric::FinalBalance => "Final Balance",
            Metric::WinRate => "Win Rate (%)",
            Metric::Roi => "ROI (%)",
            Metric::MaxDrawdown => "Max Drawdown (%)",
        }
    }

    /// Value of this metric for one report.
    ///
    /// Final balance comes from the run itself; the others need statistics.
    #[must_use]
    pub fn value(&self, report: &RunReport) -> Option<f64> {
        let stats = report.stats();
        match self {
            Metric::FinalBalance => Some(report.run.final_balance),
            Metric::WinRate => stats.map(|s| s.win_rate),
            Metric::Roi => stats.map(|s| s.roi),
            Metric::MaxDrawdown => stats.map(|s| s.max_drawdown * 100.0),
        }
    }
}

/// One bar of a metric group.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub strategy: StrategyId,
    /// `None` when the metric could not be computed for this run.
    pub value: Option<f64>,
}

/// Bars of one metric across strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGroup {
    pub metric: Metric,
    pub bars: Vec<Bar>,
}

/// Grouped bars, one group per metric, bars in run order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricComparison {
    pub groups: Vec<MetricGroup>,
}

impl MetricComparison {
    #[must_use]
    pub fn from_reports(reports: &[RunReport]) -> Self {
        let groups = Metric::ALL
            .iter()
            .map(|&metric| MetricGroup {
                metric,
                bars: reports
                    .iter()
                    .map(|report| Bar {
                        strategy: report.run.strategy,
                        value: metric.value(report),
                    })
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    /// Group for `metric`.
    #[must_use]
    pub fn group(&self, metric: Metric) -> Option<&MetricGroup> {
        self.groups.iter().find(|g| g.metric == metric)
    }
}
