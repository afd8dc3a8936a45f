pub mod balance_sequence;
pub mod parameters;
pub mod simulation_outcome;
pub mod simulation_request;

pub use balance_sequence::BalanceSequence;
pub use parameters::{
    CustomStrategy, DEFAULT_BANKROLL, DEFAULT_BET, DEFAULT_PERCENT_BET, DEFAULT_ROUNDS,
    DEFAULT_TARGET_PROFIT, MIN_CASHOUT_TARGET, RealisticConditions, SharedParameters,
};
pub use simulation_outcome::{SimulationOutcome, SimulationReply};
pub use simulation_request::{SimulationRequest, StrategyPayload};
