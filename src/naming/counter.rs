//! Emission counters used for `%(format_id)s` and `%(global_id)s`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

static GLOBAL: OnceLock<Arc<TableCounter>> = OnceLock::new();

/// Ids assigned to one table emission: the counter values just before the increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableIds {
    /// Number of tables of the same format emitted before this one.
    pub format_id: usize,
    /// Number of tables of any format emitted before this one.
    pub global_id: usize,
}

#[derive(Debug, Default)]
struct CounterState {
    global: usize,
    per_format: HashMap<String, usize>,
}

/// Global and per-format table emission counters.
///
/// All operations take one mutex, so concurrent loaders never lose or double an increment.
/// [`TableCounter::reset`] is not ordered against loads running on other threads; callers that
/// reset while loading elsewhere get whichever interleaving the lock produces.
#[derive(Debug, Default)]
pub struct TableCounter {
    state: Mutex<CounterState>,
}

impl TableCounter {
    /// Create an independent counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide counter shared by loaders that were not given their own.
    pub fn global() -> Arc<TableCounter> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(TableCounter::new())))
    }

    fn lock(&self) -> MutexGuard<'_, CounterState> {
        // Every critical section leaves the state consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Increment the global counter and the counter for `format_name` by one.
    pub fn increment(&self, format_name: &str) {
        let mut state = self.lock();
        state.global += 1;
        *state.per_format.entry(format_name.to_string()).or_insert(0) += 1;
    }

    /// Read the current ids for `format_name` and increment, atomically.
    pub fn issue(&self, format_name: &str) -> TableIds {
        let mut state = self.lock();
        let global_id = state.global;
        let slot = state.per_format.entry(format_name.to_string()).or_insert(0);
        let format_id = *slot;
        *slot += 1;
        state.global += 1;
        TableIds {
            format_id,
            global_id,
        }
    }

    /// Pass the current ids for `format_name` to `f` and increment only if it succeeds.
    ///
    /// The lock is held while `f` runs, so `f` must not call back into this counter.
    pub fn issue_with<T, E>(
        &self,
        format_name: &str,
        f: impl FnOnce(TableIds) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut state = self.lock();
        let ids = TableIds {
            format_id: state.per_format.get(format_name).copied().unwrap_or(0),
            global_id: state.global,
        };
        let out = f(ids)?;
        state.global += 1;
        *state.per_format.entry(format_name.to_string()).or_insert(0) += 1;
        Ok(out)
    }

    /// Tables of `format_name` emitted since the last reset.
    pub fn current_format_count(&self, format_name: &str) -> usize {
        self.lock().per_format.get(format_name).copied().unwrap_or(0)
    }

    /// Tables of any format emitted since the last reset.
    pub fn current_global_count(&self) -> usize {
        self.lock().global
    }

    /// Set every counter back to zero.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.global = 0;
        state.per_format.clear();
    }
}
