//! Terminal tables.

use aviator_domain::SimulationRun;
use aviator_simulation::prelude::*;
use prettytable::{Table, row};

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Summary of a single run and its statistics.
pub fn run_summary(report: &RunReport) -> Table {
    let run = &report.run;
    let mut table = Table::new();
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Run", run.id]);
    table.add_row(row!["Strategy", run.strategy.label()]);
    table.add_row(row!["Rounds played", run.rounds_completed()]);
    table.add_row(row!["Final balance", format!("{:.2}", run.final_balance)]);
    table.add_row(row!["Ruin occurred", run.flags.ruin_occurred]);
    table.add_row(row!["Target reached", run.flags.target_reached]);
    if let Some(streak) = run.flags.max_loss_streak {
        table.add_row(row!["Reported max loss streak", streak]);
    }
    if let Some(realistic) = &run.flags.realistic {
        table.add_row(row!["Network errors", realistic.network_errors]);
        table.add_row(row!["Total delay (s)", format!("{:.2}", realistic.total_delay)]);
        table.add_row(row!["Bet limit hits", realistic.bet_limit_hits]);
    }

    match &report.stats {
        Ok(stats) => {
            table.add_row(row!["Max drawdown", format!("{:.2}%", stats.max_drawdown * 100.0)]);
            table.add_row(row!["Longest win streak", stats.max_win_streak]);
            table.add_row(row!["Longest loss streak", stats.max_loss_streak]);
            table.add_row(row!["Win rate", format!("{:.2}%", stats.win_rate)]);
            table.add_row(row!["ROI", format!("{:.2}%", stats.roi)]);
            table.add_row(row!["Avg return / round", format!("{:.4}", stats.avg_return_per_round)]);
            table.add_row(row!["Mean balance", format!("{:.2}", stats.mean)]);
            table.add_row(row!["Std deviation", format!("{:.2}", stats.std_dev)]);
        }
        Err(e) => {
            table.add_row(row!["Statistics", format!("unavailable: {e}")]);
        }
    }
    table
}

/// Series of a chart with their lengths and end points.
pub fn chart_summary(chart: &BalanceChart) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Series", "Points", "First", "Last", "Min", "Max"]);
    for series in &chart.series {
        let min = series.values.iter().copied().reduce(f64::min);
        let max = series.values.iter().copied().reduce(f64::max);
        table.add_row(row![
            series.label,
            series.values.len(),
            fmt_opt(series.values.first().copied(), 2),
            fmt_opt(series.values.last().copied(), 2),
            fmt_opt(min, 2),
            fmt_opt(max, 2)
        ]);
    }
    table
}

/// One row per strategy, one column per metric.
pub fn metric_table(comparison: &MetricComparison) -> Table {
    let mut table = Table::new();
    let mut titles = row!["Strategy"];
    for metric in Metric::ALL {
        titles.add_cell(prettytable::Cell::new(metric.label()));
    }
    table.set_titles(titles);

    let strategies = comparison
        .groups
        .first()
        .map(|g| g.bars.iter().map(|b| b.strategy).collect::<Vec<_>>())
        .unwrap_or_default();
    for (index, strategy) in strategies.iter().enumerate() {
        let mut line = row![strategy.label()];
        for metric in Metric::ALL {
            let value = comparison
                .group(metric)
                .and_then(|g| g.bars.get(index))
                .and_then(|b| b.value);
            line.add_cell(prettytable::Cell::new(&fmt_opt(value, 2)));
        }
        table.add_row(line);
    }
    table
}

/// Failed strategies of a batch.
pub fn failure_table(failures: &[StrategyFailure]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Strategy", "Error"]);
    for failure in failures {
        table.add_row(row![failure.strategy.label(), failure.message]);
    }
    table
}

/// History listing, newest first.
pub fn history_table<'a, I>(runs: I) -> Table
where
    I: IntoIterator<Item = &'a SimulationRun>,
{
    let mut table = Table::new();
    table.set_titles(row![
        "Id",
        "Timestamp",
        "Strategy",
        "Bet",
        "Rounds",
        "Bankroll",
        "Final balance",
        "Ruin"
    ]);
    for run in runs {
        table.add_row(row![
            run.id,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.strategy,
            run.request.shared.bet,
            run.request.shared.rounds,
            run.request.shared.bankroll,
            format!("{:.2}", run.final_balance),
            run.flags.ruin_occurred
        ]);
    }
    table
}
