pub mod balance_stats;

pub use balance_stats::{
    DEFAULT_STARTING_BANKROLL, DerivedStats, StatsError, StepOutcome, StreakTracker,
    classify_step, compute_stats, compute_stats_default,
};
