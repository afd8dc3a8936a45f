//! Command Line Interface for the Aviator strategy lab.
use anyhow::{Context, Result, bail};
use aviator_data::{
    HistoryConfig, HistoryFilter, HistoryStore, JsonFileStorage, export_rows, write_csv,
};
use aviator_domain::value_objects::{
    CustomStrategy, DEFAULT_BANKROLL, DEFAULT_BET, DEFAULT_PERCENT_BET, DEFAULT_ROUNDS,
    DEFAULT_TARGET_PROFIT, RealisticConditions, SharedParameters, SimulationRequest,
    StrategyPayload,
};
use aviator_domain::{ProgressionType, RunId, StrategyId};
use aviator_simulation::prelude::*;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use uuid::Uuid;

mod render;

#[derive(Parser)]
#[command(name = "aviator")]
#[command(about = "Aviator strategy simulator, comparison and history CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one strategy and record it in history
    Simulate {
        /// Strategy identifier (e.g., martingale, fixed_percent)
        #[arg(short, long, default_value = "early")]
        strategy: StrategyId,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Run several strategies under identical parameters
    Compare {
        /// Comma-separated strategy identifiers, in display order
        #[arg(short, long, value_delimiter = ',', required = true)]
        strategies: Vec<StrategyId>,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Inspect or manage the run history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List stored runs, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the run with the highest final balance
    Best,
    /// Export runs as CSV
    Export {
        /// Output file
        #[arg(short, long, default_value = "simulation_history.csv")]
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Delete one run
    Remove {
        /// Run id
        #[arg(long)]
        id: Uuid,
    },
    /// Delete every run
    Clear,
}

#[derive(Args)]
struct FilterArgs {
    /// Only runs whose final balance is at least this value
    #[arg(long)]
    min_final_balance: Option<f64>,

    /// Only runs of this strategy
    #[arg(long)]
    strategy: Option<StrategyId>,
}

impl FilterArgs {
    fn to_filter(&self) -> HistoryFilter {
        let mut filter = HistoryFilter::new();
        if let Some(min) = self.min_final_balance {
            filter = filter.with_min_final_balance(min);
        }
        if let Some(strategy) = self.strategy {
            filter = filter.with_strategy(strategy);
        }
        filter
    }
}

#[derive(Args)]
struct ParamArgs {
    /// Base stake per round
    #[arg(long, default_value_t = DEFAULT_BET)]
    bet: f64,

    /// Rounds to simulate
    #[arg(short, long, default_value_t = DEFAULT_ROUNDS)]
    rounds: u32,

    /// Starting bankroll
    #[arg(long, default_value_t = DEFAULT_BANKROLL)]
    bankroll: f64,

    /// Stake as a percentage of bankroll (fixed_percent)
    #[arg(long, default_value_t = DEFAULT_PERCENT_BET)]
    percent_bet: f64,

    /// Profit goal (target_profit)
    #[arg(long, default_value_t = DEFAULT_TARGET_PROFIT)]
    target_profit: f64,

    #[command(flatten)]
    realistic: RealisticArgs,

    #[command(flatten)]
    custom: CustomArgs,
}

#[derive(Args)]
struct RealisticArgs {
    /// Simulate realistic table conditions
    #[arg(long)]
    realistic: bool,

    /// Smallest accepted stake
    #[arg(long, default_value_t = 0.1)]
    min_bet: f64,

    /// Largest accepted stake
    #[arg(long, default_value_t = 100.0)]
    table_max_bet: f64,

    /// Simulate network latency
    #[arg(long)]
    network_delay: bool,

    /// Inject connection errors
    #[arg(long)]
    error_simulation: bool,
}

#[derive(Args)]
struct CustomArgs {
    /// Cash-out multiplier (custom)
    #[arg(long, default_value_t = 2.0)]
    cashout_target: f64,

    /// Comma-separated stakes (custom)
    #[arg(long, default_value = "1,2,4")]
    bet_sequence: String,

    /// Largest stake (custom)
    #[arg(long, default_value_t = 20.0)]
    max_bet: f64,

    /// Stop when the balance falls to this value (custom)
    #[arg(long, default_value_t = 50.0)]
    stop_loss: f64,

    /// Stop when the balance climbs to this value (custom)
    #[arg(long, default_value_t = 200.0)]
    take_profit: f64,

    /// Which outcome advances the sequence: loss or win (custom)
    #[arg(long, default_value = "loss")]
    progression: ProgressionType,
}

impl ParamArgs {
    fn shared(&self) -> SharedParameters {
        let shared = SharedParameters::new(self.bet, self.rounds, self.bankroll);
        if self.realistic.realistic {
            shared.with_realistic(RealisticConditions {
                min_bet: self.realistic.min_bet,
                max_bet: self.realistic.table_max_bet,
                network_delay: self.realistic.network_delay,
                error_simulation: self.realistic.error_simulation,
            })
        } else {
            shared
        }
    }

    fn custom(&self) -> Result<CustomStrategy> {
        Ok(CustomStrategy {
            cashout_target: self.custom.cashout_target,
            bet_sequence: CustomStrategy::parse_bet_sequence(&self.custom.bet_sequence)?,
            max_bet: self.custom.max_bet,
            stop_loss: self.custom.stop_loss,
            take_profit: self.custom.take_profit,
            progression_type: self.custom.progression,
        })
    }

    fn batch(&self, needs_custom: bool) -> Result<BatchParameters> {
        let batch = BatchParameters::new(self.shared())
            .with_percent_bet(self.percent_bet)
            .with_target_profit(self.target_profit);
        Ok(if needs_custom {
            batch.with_custom(self.custom()?)
        } else {
            batch
        })
    }
}

fn open_history() -> Result<HistoryStore<JsonFileStorage>> {
    let config = HistoryConfig::from_env();
    let storage = JsonFileStorage::from_config(&config);
    HistoryStore::open(storage)
        .with_context(|| format!("failed to open history in {}", config.dir.display()))
}

fn simulator() -> Result<HttpSimulator> {
    Ok(HttpSimulator::new(SimulatorConfig::from_env())?)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Simulate { strategy, params } => {
            let custom = match strategy {
                StrategyId::Custom => Some(params.custom()?),
                _ => None,
            };
            let payload = StrategyPayload::for_strategy(
                *strategy,
                params.percent_bet,
                params.target_profit,
                custom.as_ref(),
            )?;
            let request = SimulationRequest::new(params.shared(), payload);

            let mut history = open_history()?;
            let mut session = SimulationSession::new(simulator()?);

            println!("Simulating {} for {} rounds...", strategy.label(), params.rounds);
            let report = session.simulate(request, &mut history).await?;
            render::run_summary(report).printstd();
            render::chart_summary(&run_chart(report)).printstd();
        }
        Commands::Compare { strategies, params } => {
            let batch_params = params.batch(strategies.contains(&StrategyId::Custom))?;
            let mut history = open_history()?;
            let runner = ComparisonRunner::new(simulator()?);

            println!(
                "Comparing {} strategies over {} rounds...",
                strategies.len(),
                params.rounds
            );
            match runner.run(strategies, &batch_params, &mut history).await {
                Ok(batch) => {
                    print_batch(&batch);
                    if batch.is_empty() {
                        bail!("no strategy completed");
                    }
                }
                Err(ComparisonError::History {
                    recorded,
                    batch,
                    source,
                }) => {
                    print_batch(&batch);
                    bail!(
                        "only {recorded} of {} runs were saved to history: {source}",
                        batch.runs.len()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::History { command } => run_history(command)?,
    }

    Ok(())
}

fn print_batch(batch: &ComparisonBatch) {
    if !batch.failures.is_empty() {
        println!("Some strategies failed:");
        render::failure_table(&batch.failures).printstd();
    }
    if !batch.is_empty() {
        render::metric_table(&batch.metric_comparison()).printstd();
        render::chart_summary(&batch.balance_chart()).printstd();
    }
}

fn run_history(command: &HistoryCommands) -> Result<()> {
    let mut history = open_history()?;
    match command {
        HistoryCommands::List { filter } => {
            let runs = history.filter(&filter.to_filter());
            if runs.is_empty() {
                println!("No runs match.");
            } else {
                render::history_table(runs).printstd();
            }
        }
        HistoryCommands::Best => match history.best() {
            Some(best) => {
                println!(
                    "Best run: {} with final balance {:.2}",
                    best.strategy.label(),
                    best.final_balance
                );
                render::history_table([best]).printstd();
            }
            None => println!("History is empty."),
        },
        HistoryCommands::Export { output, filter } => {
            let rows = export_rows(history.filter(&filter.to_filter()));
            write_csv(output, &rows)?;
            println!("Exported {} runs to {}", rows.len(), output.display());
        }
        HistoryCommands::Remove { id } => {
            let removed = history.remove(RunId(*id))?;
            println!("Removed {} run {}", removed.strategy.label(), removed.id);
        }
        HistoryCommands::Clear => {
            let count = history.len();
            history.clear()?;
            println!("Cleared {count} runs.");
        }
    }
    Ok(())
}
