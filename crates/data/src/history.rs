//! Newest-first log of simulation runs.
//!
//! The whole log is written back to storage after every mutation, so the
//! persisted record never lags behind the in-memory one. Clearing deletes
//! the record instead.

use crate::error::HistoryError;
use crate::storage::KeyValueStorage;
use aviator_domain::{RunId, SimulationRun, StrategyId};
use tracing::{debug, info};

/// Storage key holding the serialized log.
pub const HISTORY_KEY: &str = "simulation_history";

/// Criteria for a history view. Absent criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    /// Keep runs whose final balance is at least this value.
    pub min_final_balance: Option<f64>,
    /// Keep runs of this strategy only.
    pub strategy: Option<StrategyId>,
}

impl HistoryFilter {
    /// Creates a filter that matches every run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum final balance.
    #[must_use]
    pub fn with_min_final_balance(mut self, min: f64) -> Self {
        self.min_final_balance = Some(min);
        self
    }

    /// Sets the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyId) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Checks a single run against both criteria.
    #[must_use]
    pub fn matches(&self, run: &SimulationRun) -> bool {
        self.min_final_balance
            .is_none_or(|min| run.final_balance >= min)
            && self.strategy.is_none_or(|strategy| run.strategy == strategy)
    }
}

/// Owns the history log and mirrors it to a storage backend.
#[derive(Debug)]
pub struct HistoryStore<S: KeyValueStorage> {
    storage: S,
    runs: Vec<SimulationRun>,
}

impl<S: KeyValueStorage> HistoryStore<S> {
    /// Opens the store and loads whatever the backend holds.
    ///
    /// # Errors
    /// Returns an error if the stored record cannot be read or decoded.
    pub fn open(storage: S) -> Result<Self, HistoryError> {
        let mut store = Self {
            storage,
            runs: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Replaces the in-memory log with the persisted one.
    ///
    /// # Errors
    /// Returns an error if the stored record cannot be read or decoded.
    pub fn load(&mut self) -> Result<(), HistoryError> {
        self.runs = match self.storage.get(HISTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(HistoryError::Decode)?,
            None => Vec::new(),
        };

        match self.best() {
            Some(best) => info!(
                runs = self.runs.len(),
                best_strategy = %best.strategy,
                best_final_balance = best.final_balance,
                "History loaded"
            ),
            None => info!("History loaded (empty)"),
        }
        Ok(())
    }

    /// Writes the full log to storage.
    ///
    /// # Errors
    /// Returns an error if encoding or the storage write fails.
    pub fn persist(&mut self) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(&self.runs).map_err(HistoryError::Encode)?;
        self.storage.set(HISTORY_KEY, &raw)?;
        debug!(runs = self.runs.len(), "History persisted");
        Ok(())
    }

    /// Inserts a run at the head of the log and persists.
    ///
    /// If persisting fails the insert is undone, so memory and storage agree.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn append(&mut self, run: SimulationRun) -> Result<(), HistoryError> {
        let id = run.id;
        let strategy = run.strategy;
        self.runs.insert(0, run);
        if let Err(e) = self.persist() {
            self.runs.remove(0);
            return Err(e);
        }
        info!(run_id = %id, strategy = %strategy, runs = self.runs.len(), "Run appended to history");
        Ok(())
    }

    /// Deletes a run by id and persists.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, or the write error (the run is
    /// restored in that case).
    pub fn remove(&mut self, id: RunId) -> Result<SimulationRun, HistoryError> {
        let index = self
            .runs
            .iter()
            .position(|run| run.id == id)
            .ok_or(HistoryError::NotFound(id))?;
        let removed = self.runs.remove(index);
        if let Err(e) = self.persist() {
            self.runs.insert(index, removed);
            return Err(e);
        }
        info!(run_id = %id, "Run removed from history");
        Ok(removed)
    }

    /// Empties the log and deletes the stored record.
    ///
    /// A missing record loads as an empty log, so nothing is written back.
    ///
    /// # Errors
    /// Returns the storage error (the log is kept in memory in that case).
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.storage.remove(HISTORY_KEY)?;
        let previous = std::mem::take(&mut self.runs);
        info!(removed = previous.len(), "History cleared");
        Ok(())
    }

    /// All runs, newest first.
    #[must_use]
    pub fn runs(&self) -> &[SimulationRun] {
        &self.runs
    }

    /// Looks up a run by id.
    #[must_use]
    pub fn get(&self, id: RunId) -> Option<&SimulationRun> {
        self.runs.iter().find(|run| run.id == id)
    }

    /// Number of runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Runs matching `filter`, in log order.
    #[must_use]
    pub fn filter(&self, filter: &HistoryFilter) -> Vec<&SimulationRun> {
        self.filter_by(|run| filter.matches(run))
    }

    /// Runs matching an arbitrary predicate, in log order.
    pub fn filter_by<P>(&self, predicate: P) -> Vec<&SimulationRun>
    where
        P: Fn(&SimulationRun) -> bool,
    {
        self.runs.iter().filter(|run| predicate(*run)).collect()
    }

    /// Run with the highest final balance across the whole log.
    ///
    /// Ties keep the run encountered first.
    #[must_use]
    pub fn best(&self) -> Option<&SimulationRun> {
        self.runs.iter().fold(None, |best: Option<&SimulationRun>, run| match best {
            Some(current) if run.final_balance <= current.final_balance => Some(current),
            _ => Some(run),
        })
    }

    /// Backend reference.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Gives the backend back.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::{JsonFileStorage, MemoryStorage};
    use aviator_domain::value_objects::{
        SharedParameters, SimulationOutcome, SimulationRequest, StrategyPayload,
    };
    use chrono::{TimeZone, Utc};

    pub(crate) fn sample_run(strategy: StrategyId, final_balance: f64) -> SimulationRun {
        let payload = StrategyPayload::for_strategy(strategy, 5.0, 50.0, None)
            .unwrap_or(StrategyPayload::Early);
        let request = SimulationRequest::new(SharedParameters::new(1.0, 3, 100.0), payload);
        let outcome = SimulationOutcome {
            history: vec![100.0, (100.0 + final_balance) / 2.0, final_balance],
            final_balance,
            max_loss_streak: Some(1),
            ruin_occurred: final_balance < 1.0,
            target_reached: false,
            network_errors: None,
            total_delay: None,
            bet_limit_hits: None,
        };
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        SimulationRun::from_outcome(request, outcome, created_at).unwrap()
    }

    /// Storage whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: bool,
    }

    impl KeyValueStorage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Io {
                    path: "flaky".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Io {
                    path: "flaky".into(),
                    source: std::io::Error::other("read-only"),
                });
            }
            self.inner.remove(key)
        }
    }

    /// Log holding final balances `[80, 120, 50]` with strategies `[A, B, A]`,
    /// newest first.
    fn seeded_store() -> HistoryStore<MemoryStorage> {
        let mut store = HistoryStore::open(MemoryStorage::new()).unwrap();
        store.append(sample_run(StrategyId::Martingale, 50.0)).unwrap();
        store.append(sample_run(StrategyId::Paroli, 120.0)).unwrap();
        store.append(sample_run(StrategyId::Martingale, 80.0)).unwrap();
        store
    }

    fn balances(runs: &[&SimulationRun]) -> Vec<f64> {
        runs.iter().map(|run| run.final_balance).collect()
    }

    #[test]
    fn test_append_is_newest_first() {
        let store = seeded_store();
        let all: Vec<&SimulationRun> = store.runs().iter().collect();
        assert_eq!(balances(&all), vec![80.0, 120.0, 50.0]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_filter_by_min_balance() {
        let store = seeded_store();
        let view = store.filter(&HistoryFilter::new().with_min_final_balance(100.0));
        assert_eq!(balances(&view), vec![120.0]);
    }

    #[test]
    fn test_filter_by_strategy_keeps_order() {
        let store = seeded_store();
        let view = store.filter(&HistoryFilter::new().with_strategy(StrategyId::Martingale));
        assert_eq!(balances(&view), vec![80.0, 50.0]);
    }

    #[test]
    fn test_filter_combines_criteria_and_does_not_mutate() {
        let store = seeded_store();
        let view = store.filter(
            &HistoryFilter::new()
                .with_strategy(StrategyId::Martingale)
                .with_min_final_balance(60.0),
        );
        assert_eq!(balances(&view), vec![80.0]);
        assert_eq!(store.filter(&HistoryFilter::new()).len(), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_best_over_whole_log() {
        let store = seeded_store();
        assert_eq!(store.best().map(|run| run.final_balance), Some(120.0));
    }

    #[test]
    fn test_best_tie_keeps_first() {
        let mut store = HistoryStore::open(MemoryStorage::new()).unwrap();
        let older = sample_run(StrategyId::Paroli, 100.0);
        let newer = sample_run(StrategyId::Martingale, 100.0);
        let newer_id = newer.id;
        store.append(older).unwrap();
        store.append(newer).unwrap();

        assert_eq!(store.best().map(|run| run.id), Some(newer_id));
    }

    #[test]
    fn test_best_of_empty_log() {
        let store = HistoryStore::open(MemoryStorage::new()).unwrap();
        assert!(store.best().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_persist_and_reload_round_trip() {
        let store = seeded_store();
        let original = store.runs().to_vec();

        let reopened = HistoryStore::open(store.into_storage()).unwrap();
        assert_eq!(reopened.runs(), original.as_slice());
        assert_eq!(reopened.best().map(|run| run.final_balance), Some(120.0));
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(JsonFileStorage::new(dir.path())).unwrap();
        let mut run = sample_run(StrategyId::FixedPercent, 133.37);
        run.balances = aviator_domain::value_objects::BalanceSequence::new(vec![
            100.0, 104.99, 99.74, 133.37,
        ])
        .unwrap();
        store.append(run).unwrap();
        store.append(sample_run(StrategyId::Paroli, 0.1 + 0.2)).unwrap();
        let original = store.runs().to_vec();

        let reopened = HistoryStore::open(JsonFileStorage::new(dir.path())).unwrap();
        assert_eq!(reopened.runs(), original.as_slice());
    }

    #[test]
    fn test_failed_append_is_rolled_back() {
        let mut store = HistoryStore::open(FlakyStorage::default()).unwrap();
        store.append(sample_run(StrategyId::Paroli, 90.0)).unwrap();

        store.storage.fail_writes = true;
        assert!(store.append(sample_run(StrategyId::Paroli, 95.0)).is_err());
        assert_eq!(store.len(), 1);

        store.storage.fail_writes = false;
        store.load().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = seeded_store();
        let id = store.runs()[1].id;

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.final_balance, 120.0);
        assert!(store.get(id).is_none());
        assert!(matches!(store.remove(id), Err(HistoryError::NotFound(_))));

        store.clear().unwrap();
        assert!(store.is_empty());
        let reopened = HistoryStore::open(store.into_storage()).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_clear_deletes_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join(format!("{HISTORY_KEY}.json"));
        let mut store = HistoryStore::open(JsonFileStorage::new(dir.path())).unwrap();
        store.append(sample_run(StrategyId::Paroli, 110.0)).unwrap();
        assert!(record.exists());

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!record.exists());

        // Clearing an already empty history is fine.
        store.clear().unwrap();
        let reopened = HistoryStore::open(JsonFileStorage::new(dir.path())).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_failed_clear_keeps_runs() {
        let mut store = HistoryStore::open(FlakyStorage::default()).unwrap();
        store.append(sample_run(StrategyId::Paroli, 90.0)).unwrap();
        store.append(sample_run(StrategyId::Martingale, 70.0)).unwrap();

        store.storage.fail_writes = true;
        assert!(matches!(store.clear(), Err(HistoryError::Storage(_))));
        assert_eq!(store.len(), 2);

        store.storage.fail_writes = false;
        store.load().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let mut storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, "{not json").unwrap();
        assert!(matches!(
            HistoryStore::open(storage),
            Err(HistoryError::Decode(_))
        ));
    }
}
