//! Runs several strategies under identical parameters.

use crate::backend::SimulationBackend;
use crate::error::{ComparisonError, SimulationError};
use crate::projection::{BalanceChart, MetricComparison};
use crate::session::RunReport;
use aviator_data::{HistoryStore, KeyValueStorage};
use aviator_domain::value_objects::{
    CustomStrategy, DEFAULT_PERCENT_BET, DEFAULT_TARGET_PROFIT, SharedParameters,
    SimulationRequest, StrategyPayload,
};
use aviator_domain::{SimulationRun, StrategyId};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, warn};

/// Parameters shared by every strategy of a batch, plus the
/// strategy-specific values that are attached only where they apply.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchParameters {
    pub shared: SharedParameters,
    pub percent_bet: f64,
    pub target_profit: f64,
    pub custom: Option<CustomStrategy>,
}

impl Default for BatchParameters {
    fn default() -> Self {
        Self {
            shared: SharedParameters::default(),
            percent_bet: DEFAULT_PERCENT_BET,
            target_profit: DEFAULT_TARGET_PROFIT,
            custom: None,
        }
    }
}

impl BatchParameters {
    #[must_use]
    pub fn new(shared: SharedParameters) -> Self {
        Self {
            shared,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_percent_bet(mut self, percent_bet: f64) -> Self {
        self.percent_bet = percent_bet;
        self
    }

    #[must_use]
    pub fn with_target_profit(mut self, target_profit: f64) -> Self {
        self.target_profit = target_profit;
        self
    }

    #[must_use]
    pub fn with_custom(mut self, custom: CustomStrategy) -> Self {
        self.custom = Some(custom);
        self
    }
}

/// A strategy whose simulator call failed.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFailure {
    pub strategy: StrategyId,
    pub message: String,
}

/// Outcome of one comparison batch.
#[derive(Debug, Clone)]
pub struct ComparisonBatch {
    /// Successful runs in selection order.
    pub runs: Vec<RunReport>,
    /// Failed strategies in selection order.
    pub failures: Vec<StrategyFailure>,
    /// Rounds requested for every strategy.
    pub rounds_requested: u32,
}

impl ComparisonBatch {
    /// Balance series of every successful run.
    #[must_use]
    pub fn balance_chart(&self) -> BalanceChart {
        BalanceChart::from_runs(self.runs.iter().map(|r| &r.run))
    }

    /// Metric groups over every successful run.
    #[must_use]
    pub fn metric_comparison(&self) -> MetricComparison {
        MetricComparison::from_reports(&self.runs)
    }

    /// Failure recorded for `strategy`, if any.
    #[must_use]
    pub fn failure_for(&self, strategy: StrategyId) -> Option<&StrategyFailure> {
        self.failures.iter().find(|f| f.strategy == strategy)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Issues one simulator call per selected strategy, sequentially.
pub struct ComparisonRunner<B: SimulationBackend> {
    backend: B,
}

impl<B: SimulationBackend> ComparisonRunner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Builds one request per strategy, rejecting the batch before any call
    /// is made.
    ///
    /// # Errors
    /// `EmptySelection`, `DuplicateStrategy`, `MissingCustomParameters` or
    /// `InvalidParameters` for the first problem found.
    pub fn plan(
        selection: &[StrategyId],
        params: &BatchParameters,
    ) -> Result<Vec<SimulationRequest>, ComparisonError> {
        if selection.is_empty() {
            return Err(ComparisonError::EmptySelection);
        }
        let mut seen = HashSet::with_capacity(selection.len());
        for &strategy in selection {
            if !seen.insert(strategy) {
                return Err(ComparisonError::DuplicateStrategy(strategy));
            }
        }
        if seen.contains(&StrategyId::Custom) && params.custom.is_none() {
            return Err(ComparisonError::MissingCustomParameters);
        }
        params.shared.validate()?;

        selection
            .iter()
            .map(|&strategy| {
                let payload = StrategyPayload::for_strategy(
                    strategy,
                    params.percent_bet,
                    params.target_profit,
                    params.custom.as_ref(),
                )?;
                let request = SimulationRequest::new(params.shared.clone(), payload);
                request.validate()?;
                Ok::<_, ComparisonError>(request)
            })
            .collect()
    }

    /// Runs the batch and prepends every successful run to `history`.
    ///
    /// A failing strategy is recorded in the batch and the remaining ones
    /// still run.
    ///
    /// # Errors
    /// Validation errors from [`Self::plan`], or `History` when a run cannot
    /// be persisted. That error carries the full batch and how many of its
    /// runs were recorded before the failure.
    pub async fn run<S: KeyValueStorage>(
        &self,
        selection: &[StrategyId],
        params: &BatchParameters,
        history: &mut HistoryStore<S>,
    ) -> Result<ComparisonBatch, ComparisonError> {
        let requests = Self::plan(selection, params)?;
        info!(strategies = requests.len(), rounds = params.shared.rounds, "Starting comparison");

        let mut runs = Vec::with_capacity(requests.len());
        let mut failures = Vec::new();

        for request in requests {
            let strategy = request.strategy();
            match self.run_one(request).await {
                Ok(run) => runs.push(RunReport::summarize(run)),
                Err(e) => {
                    warn!(strategy = %strategy, error = %e, "Strategy failed, continuing");
                    failures.push(StrategyFailure {
                        strategy,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = runs.len(),
            failed = failures.len(),
            "Comparison completed"
        );

        let batch = ComparisonBatch {
            runs,
            failures,
            rounds_requested: params.shared.rounds,
        };
        let mut failed = None;
        for (recorded, report) in batch.runs.iter().enumerate() {
            if let Err(source) = history.append(report.run.clone()) {
                failed = Some((recorded, source));
                break;
            }
        }
        match failed {
            Some((recorded, source)) => {
                warn!(recorded, error = %source, "Failed to record comparison runs");
                Err(ComparisonError::History {
                    recorded,
                    batch: Box::new(batch),
                    source,
                })
            }
            None => Ok(batch),
        }
    }

    async fn run_one(&self, request: SimulationRequest) -> Result<SimulationRun, SimulationError> {
        let outcome = self.backend.simulate(&request).await?;
        Ok(SimulationRun::from_outcome(request, outcome, Utc::now())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::ScriptedBackend;
    use aviator_data::{MemoryStorage, StorageError};
    use aviator_domain::DomainError;

    fn params() -> BatchParameters {
        BatchParameters::new(SharedParameters::new(1.0, 3, 100.0))
    }

    fn store() -> HistoryStore<MemoryStorage> {
        HistoryStore::open(MemoryStorage::new()).unwrap()
    }

    /// Accepts `writes_left` writes, then fails every write.
    struct LimitedStorage {
        inner: MemoryStorage,
        writes_left: usize,
    }

    impl KeyValueStorage for LimitedStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.writes_left == 0 {
                return Err(StorageError::Io {
                    path: "limited".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.writes_left -= 1;
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_history_failure_returns_batch_and_recorded_count() {
        let backend = ScriptedBackend::new()
            .succeed(StrategyId::Martingale, vec![100.0, 101.0])
            .fail(StrategyId::Dual, "Invalid strategy")
            .succeed(StrategyId::Paroli, vec![100.0, 98.0])
            .succeed(StrategyId::FixedPercent, vec![100.0, 102.0]);
        let runner = ComparisonRunner::new(backend);
        let mut history = HistoryStore::open(LimitedStorage {
            inner: MemoryStorage::new(),
            writes_left: 1,
        })
        .unwrap();
        let selection = [
            StrategyId::Martingale,
            StrategyId::Dual,
            StrategyId::Paroli,
            StrategyId::FixedPercent,
        ];

        let err = runner.run(&selection, &params(), &mut history).await.unwrap_err();
        let ComparisonError::History { recorded, batch, .. } = err else {
            panic!("expected a history error");
        };

        assert_eq!(recorded, 1);
        assert_eq!(batch.runs.len(), 3);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].strategy, StrategyId::Dual);

        assert_eq!(history.len(), 1);
        assert_eq!(history.runs()[0].id, batch.runs[0].run.id);
        let reopened = HistoryStore::open(history.into_storage()).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let backend = ScriptedBackend::new()
            .succeed(StrategyId::Martingale, vec![100.0, 99.0, 101.0])
            .fail(StrategyId::Paroli, "Invalid strategy");
        let runner = ComparisonRunner::new(backend);
        let mut history = store();

        let batch = runner
            .run(&[StrategyId::Martingale, StrategyId::Paroli], &params(), &mut history)
            .await
            .unwrap();

        assert_eq!(batch.runs.len(), 1);
        assert_eq!(batch.runs[0].run.strategy, StrategyId::Martingale);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(
            batch.failure_for(StrategyId::Paroli).unwrap().message,
            "Invalid strategy"
        );
        assert_eq!(history.len(), 1);
        assert_eq!(batch.rounds_requested, 3);
    }

    #[tokio::test]
    async fn test_selection_order_is_preserved() {
        let backend = ScriptedBackend::new()
            .succeed(StrategyId::TargetProfit, vec![100.0, 110.0])
            .succeed(StrategyId::FixedPercent, vec![100.0, 95.0])
            .succeed(StrategyId::Paroli, vec![100.0, 101.0, 102.0]);
        let runner = ComparisonRunner::new(backend);
        let mut history = store();
        let selection = [
            StrategyId::TargetProfit,
            StrategyId::FixedPercent,
            StrategyId::Paroli,
        ];

        let batch = runner.run(&selection, &params(), &mut history).await.unwrap();

        let order: Vec<_> = batch.runs.iter().map(|r| r.run.strategy).collect();
        assert_eq!(order, selection);
        assert_eq!(runner.backend().calls(), selection);

        // each run is prepended, so the last strategy is newest
        assert_eq!(history.runs()[0].strategy, StrategyId::Paroli);
        assert_eq!(history.runs()[2].strategy, StrategyId::TargetProfit);

        let chart = batch.balance_chart();
        assert_eq!(chart.labels, vec![0, 1, 2]);
        assert_eq!(chart.series.len(), 3);
    }

    #[tokio::test]
    async fn test_strategy_specific_values_only_where_they_apply() {
        let backend = ScriptedBackend::new()
            .succeed(StrategyId::FixedPercent, vec![100.0])
            .succeed(StrategyId::Martingale, vec![100.0]);
        let runner = ComparisonRunner::new(backend);
        let mut history = store();

        let batch = runner
            .run(
                &[StrategyId::FixedPercent, StrategyId::Martingale],
                &params().with_percent_bet(7.5),
                &mut history,
            )
            .await
            .unwrap();

        assert_eq!(
            batch.runs[0].run.request.payload,
            StrategyPayload::FixedPercent { percent_bet: 7.5 }
        );
        assert_eq!(batch.runs[1].run.request.payload, StrategyPayload::Martingale);
    }

    #[tokio::test]
    async fn test_all_failures_returns_empty_batch() {
        let backend = ScriptedBackend::new().fail(StrategyId::Early, "boom");
        let runner = ComparisonRunner::new(backend);
        let mut history = store();

        let batch = runner
            .run(&[StrategyId::Early, StrategyId::Mid], &params(), &mut history)
            .await
            .unwrap();

        assert!(batch.is_empty());
        assert_eq!(batch.failures.len(), 2);
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let runner = ComparisonRunner::new(ScriptedBackend::new());
        let mut history = store();

        let err = runner.run(&[], &params(), &mut history).await.unwrap_err();
        assert!(matches!(err, ComparisonError::EmptySelection));

        let err = runner
            .run(&[StrategyId::Mid, StrategyId::Mid], &params(), &mut history)
            .await
            .unwrap_err();
        assert!(matches!(err, ComparisonError::DuplicateStrategy(StrategyId::Mid)));

        let err = runner
            .run(&[StrategyId::Custom], &params(), &mut history)
            .await
            .unwrap_err();
        assert!(matches!(err, ComparisonError::MissingCustomParameters));

        let mut bad = params();
        bad.shared.bet = -1.0;
        let err = runner
            .run(&[StrategyId::Paroli], &bad, &mut history)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::InvalidParameters(DomainError::InvalidParameter { field: "bet", .. })
        ));

        assert!(runner.backend().calls().is_empty());
    }

    #[test]
    fn test_plan_attaches_custom_fields() {
        let custom = CustomStrategy::default();
        let requests = ComparisonRunner::<ScriptedBackend>::plan(
            &[StrategyId::Custom, StrategyId::Dual],
            &params().with_custom(custom.clone()),
        )
        .unwrap();
        assert_eq!(requests[0].payload, StrategyPayload::Custom(custom));
        assert_eq!(requests[1].payload, StrategyPayload::Dual);
    }
}
