//! Flat CSV export of history views.
//!
//! Every row has the same columns; realistic-condition counters and
//! strategy-specific parameters are left empty when a run has none, so the
//! header always lines up with every row.

use crate::error::ExportError;
use aviator_domain::SimulationRun;
use aviator_domain::value_objects::StrategyPayload;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Column order of the export, identical to the `ExportRow` field order.
pub const EXPORT_COLUMNS: [&str; 22] = [
    "timestamp",
    "strategy",
    "bet",
    "rounds",
    "bankroll",
    "percent_bet",
    "target_profit",
    "cashout_target",
    "bet_sequence",
    "custom_max_bet",
    "stop_loss",
    "take_profit",
    "progression_type",
    "final_balance",
    "ruin_occurred",
    "table_min_bet",
    "table_max_bet",
    "network_delay",
    "error_simulation",
    "network_errors",
    "total_delay",
    "bet_limit_hits",
];

/// One exported run.
///
/// Custom-strategy fields are filled only for `custom` runs and the table
/// settings only when realistic conditions were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub timestamp: String,
    pub strategy: String,
    pub bet: f64,
    pub rounds: u32,
    pub bankroll: f64,
    pub percent_bet: Option<f64>,
    pub target_profit: Option<f64>,
    pub cashout_target: Option<f64>,
    /// Comma-joined stakes, quoted by the CSV writer.
    pub bet_sequence: Option<String>,
    pub custom_max_bet: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub progression_type: Option<String>,
    pub final_balance: f64,
    pub ruin_occurred: bool,
    pub table_min_bet: Option<f64>,
    pub table_max_bet: Option<f64>,
    pub network_delay: Option<bool>,
    pub error_simulation: Option<bool>,
    pub network_errors: Option<u32>,
    pub total_delay: Option<f64>,
    pub bet_limit_hits: Option<u32>,
}

impl From<&SimulationRun> for ExportRow {
    fn from(run: &SimulationRun) -> Self {
        let (percent_bet, target_profit) = match &run.request.payload {
            StrategyPayload::FixedPercent { percent_bet } => (Some(*percent_bet), None),
            StrategyPayload::TargetProfit { target_profit } => (None, Some(*target_profit)),
            _ => (None, None),
        };
        let custom = match &run.request.payload {
            StrategyPayload::Custom(custom) => Some(custom),
            _ => None,
        };
        let table = run.request.shared.realistic.as_ref();
        let realistic = run.flags.realistic.as_ref();

        Self {
            timestamp: run.created_at.to_rfc3339(),
            strategy: run.strategy.as_str().to_string(),
            bet: run.request.shared.bet,
            rounds: run.request.shared.rounds,
            bankroll: run.request.shared.bankroll,
            percent_bet,
            target_profit,
            cashout_target: custom.map(|c| c.cashout_target),
            bet_sequence: custom.map(|c| c.bet_sequence_param()),
            custom_max_bet: custom.map(|c| c.max_bet),
            stop_loss: custom.map(|c| c.stop_loss),
            take_profit: custom.map(|c| c.take_profit),
            progression_type: custom.map(|c| c.progression_type.as_str().to_string()),
            final_balance: run.final_balance,
            ruin_occurred: run.flags.ruin_occurred,
            table_min_bet: table.map(|t| t.min_bet),
            table_max_bet: table.map(|t| t.max_bet),
            network_delay: table.map(|t| t.network_delay),
            error_simulation: table.map(|t| t.error_simulation),
            network_errors: realistic.map(|r| r.network_errors),
            total_delay: realistic.map(|r| r.total_delay),
            bet_limit_hits: realistic.map(|r| r.bet_limit_hits),
        }
    }
}

/// Flattens a sequence of runs, keeping their order.
pub fn export_rows<'a, I>(runs: I) -> Vec<ExportRow>
where
    I: IntoIterator<Item = &'a SimulationRun>,
{
    runs.into_iter().map(ExportRow::from).collect()
}

/// Serializes rows as CSV with a header line.
///
/// An empty slice still produces the header.
///
/// # Errors
/// Returns an error if CSV encoding fails.
pub fn export_csv(rows: &[ExportRow]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Writes rows as CSV to `path`.
///
/// # Errors
/// Returns an error if encoding or the file write fails.
pub fn write_csv(path: &Path, rows: &[ExportRow]) -> Result<(), ExportError> {
    let csv = export_csv(rows)?;
    std::fs::write(path, csv)?;
    info!(path = %path.display(), rows = rows.len(), "History exported");
    Ok(())
}
