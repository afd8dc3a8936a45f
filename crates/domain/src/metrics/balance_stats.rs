//! Risk and performance statistics over a single balance sequence.
//!
//! Everything here is a pure function of the balances and the starting
//! bankroll, so results can be cached per `(history, bankroll)` pair.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Starting bankroll assumed when the caller has none.
pub const DEFAULT_STARTING_BANKROLL: f64 = 100.0;

/// Number of standard deviations covered by the dispersion bands.
const BAND_WIDTH: f64 = 2.0;

/// Reasons a balance sequence cannot be summarized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Nothing to summarize.
    #[error("cannot compute statistics of an empty sequence")]
    EmptySequence,

    /// A balance was NaN or infinite.
    #[error("balance at index {index} is not finite ({value})")]
    NonFiniteBalance {
        /// Offending position.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// Drawdown is undefined while the running peak is zero or negative.
    #[error("non-positive peak {peak} at index {index}; drawdown is undefined")]
    NonPositivePeak {
        /// Position where the peak was observed.
        index: usize,
        /// Running peak at that position.
        peak: f64,
    },

    /// A balance at or below zero would put drawdown at 100% or beyond.
    #[error("balance {balance} at index {index} is not positive; drawdown is undefined")]
    NonPositiveBalance {
        /// Offending position.
        index: usize,
        /// Offending balance.
        balance: f64,
    },

    /// ROI needs a positive reference bankroll.
    #[error("starting bankroll must be positive and finite, got {0}")]
    InvalidStartingBankroll(f64),
}

/// Classification of one step between consecutive balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Balance strictly increased.
    Win,
    /// Balance strictly decreased.
    Loss,
    /// Balance unchanged.
    Flat,
}

/// Classifies the step from `previous` to `next`.
#[must_use]
pub fn classify_step(previous: f64, next: f64) -> StepOutcome {
    if next > previous {
        StepOutcome::Win
    } else if next < previous {
        StepOutcome::Loss
    } else {
        StepOutcome::Flat
    }
}

/// Running win/loss streak counters.
///
/// A win resets the loss streak and vice versa; a flat step touches neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakTracker {
    /// Length of the win streak in progress.
    pub current_win: u32,
    /// Length of the loss streak in progress.
    pub current_loss: u32,
    /// Longest win streak so far.
    pub max_win: u32,
    /// Longest loss streak so far.
    pub max_loss: u32,
}

impl StreakTracker {
    /// Creates a tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one step outcome.
    pub fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Win => {
                self.current_win += 1;
                self.current_loss = 0;
            }
            StepOutcome::Loss => {
                self.current_loss += 1;
                self.current_win = 0;
            }
            StepOutcome::Flat => {}
        }
        self.max_win = self.max_win.max(self.current_win);
        self.max_loss = self.max_loss.max(self.current_loss);
    }
}

/// Statistics derived from one balance sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    /// Largest fractional decline from a running peak.
    pub max_drawdown: f64,
    /// Longest run of strictly increasing steps.
    pub max_win_streak: u32,
    /// Longest run of strictly decreasing steps.
    pub max_loss_streak: u32,
    /// Winning steps.
    pub wins: usize,
    /// Losing steps.
    pub losses: usize,
    /// Winning steps as a percentage of all steps.
    pub win_rate: f64,
    /// Return on the starting bankroll, in percent.
    pub roi: f64,
    /// Net change per recorded round.
    pub avg_return_per_round: f64,
    /// Last balance of the sequence.
    pub final_balance: f64,
    /// Mean balance.
    pub mean: f64,
    /// Population standard deviation of the balances.
    pub std_dev: f64,
    /// `mean + 2σ`, repeated once per index.
    pub upper_band: Vec<f64>,
    /// `mean - 2σ`, repeated once per index.
    pub lower_band: Vec<f64>,
    /// Drawdown from the running peak at each index.
    pub drawdowns: Vec<f64>,
}

/// Computes statistics with the default starting bankroll of 100.
///
/// # Errors
/// See [`compute_stats`].
pub fn compute_stats_default(history: &[f64]) -> Result<DerivedStats, StatsError> {
    compute_stats(history, DEFAULT_STARTING_BANKROLL)
}

/// Computes drawdown, streak, win-rate, ROI and dispersion-band statistics.
///
/// The bands are a flat envelope around the mean of the whole sequence,
/// not a rolling estimate.
///
/// # Arguments
///
/// * `history` - Balance after each round, oldest first
/// * `starting_bankroll` - Reference value for ROI and average return
///
/// # Errors
///
/// * `EmptySequence` if `history` is empty
/// * `NonFiniteBalance` if any balance is NaN or infinite
/// * `NonPositivePeak` if the running peak is zero or negative at any index
/// * `NonPositiveBalance` if a later balance drops to zero or below, so every
///   drawdown stays in `[0, 1)`
/// * `InvalidStartingBankroll` if `starting_bankroll` is not a positive number
pub fn compute_stats(history: &[f64], starting_bankroll: f64) -> Result<DerivedStats, StatsError> {
    if history.is_empty() {
        return Err(StatsError::EmptySequence);
    }
    if !starting_bankroll.is_finite() || starting_bankroll <= 0.0 {
        return Err(StatsError::InvalidStartingBankroll(starting_bankroll));
    }

    let mut peak = history[0];
    let mut max_drawdown = 0.0_f64;
    let mut drawdowns = Vec::with_capacity(history.len());
    let mut streaks = StreakTracker::new();
    let mut wins = 0usize;
    let mut losses = 0usize;

    // Welford accumulators
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;

    for (index, &balance) in history.iter().enumerate() {
        if !balance.is_finite() {
            return Err(StatsError::NonFiniteBalance {
                index,
                value: balance,
            });
        }

        if balance > peak {
            peak = balance;
        }
        if peak <= 0.0 {
            return Err(StatsError::NonPositivePeak { index, peak });
        }
        if balance <= 0.0 {
            return Err(StatsError::NonPositiveBalance { index, balance });
        }
        let drawdown = (peak - balance) / peak;
        drawdowns.push(drawdown);
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }

        if index > 0 {
            let outcome = classify_step(history[index - 1], balance);
            match outcome {
                StepOutcome::Win => wins += 1,
                StepOutcome::Loss => losses += 1,
                StepOutcome::Flat => {}
            }
            streaks.record(outcome);
        }

        let count = (index + 1) as f64;
        let delta = balance - mean;
        mean += delta / count;
        m2 += delta * (balance - mean);
    }

    let len = history.len();
    let std_dev = (m2 / len as f64).sqrt();
    let steps = len - 1;
    let win_rate = if steps == 0 {
        0.0
    } else {
        wins as f64 / steps as f64 * 100.0
    };

    let final_balance = history[len - 1];
    let roi = (final_balance - starting_bankroll) / starting_bankroll * 100.0;
    let avg_return_per_round = (final_balance - starting_bankroll) / len as f64;

    Ok(DerivedStats {
        max_drawdown,
        max_win_streak: streaks.max_win,
        max_loss_streak: streaks.max_loss,
        wins,
        losses,
        win_rate,
        roi,
        avg_return_per_round,
        final_balance,
        mean,
        std_dev,
        upper_band: vec![mean + BAND_WIDTH * std_dev; len],
        lower_band: vec![mean - BAND_WIDTH * std_dev; len],
        drawdowns,
    })
}
