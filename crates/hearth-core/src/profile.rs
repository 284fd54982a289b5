//! Explicit profiling context for timing named code paths.
//!
//! [`ProfileContext`] holds a table of named counters, each accumulating
//! total elapsed time and a hit count. It is an ordinary value owned by
//! the caller and passed by `&mut` into any code path that wants to
//! record timing; there is no process-wide counter table. The owner
//! decides when to [`snapshot`](ProfileContext::snapshot) and
//! [`reset`](ProfileContext::reset), typically once per frame.

use std::time::{Duration, Instant};

use indexmap::IndexMap;

/// Accumulated timing for one named counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counter {
    total: Duration,
    hits: u64,
}

/// An in-flight measurement started by [`ProfileContext::begin`].
///
/// Hand it back to [`ProfileContext::end`] to record the elapsed time.
/// Dropping it without calling `end` records nothing.
#[derive(Debug)]
#[must_use = "a timer records nothing unless passed to ProfileContext::end"]
pub struct ProfileTimer {
    name: &'static str,
    start: Instant,
}

impl ProfileTimer {
    /// The counter this timer will be recorded against.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Named timing counters with a caller-owned snapshot/reset lifecycle.
#[derive(Clone, Debug, Default)]
pub struct ProfileContext {
    counters: IndexMap<&'static str, Counter>,
}

impl ProfileContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing `name`.
    pub fn begin(&self, name: &'static str) -> ProfileTimer {
        ProfileTimer {
            name,
            start: Instant::now(),
        }
    }

    /// Stop `timer` and add its elapsed time to its counter.
    ///
    /// Returns the elapsed duration.
    pub fn end(&mut self, timer: ProfileTimer) -> Duration {
        let elapsed = timer.start.elapsed();
        self.record(timer.name, elapsed);
        elapsed
    }

    /// Add one hit of `elapsed` to the counter `name`, creating it if needed.
    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        let counter = self.counters.entry(name).or_default();
        counter.total += elapsed;
        counter.hits += 1;
    }

    /// Run `f`, recording its wall-clock time under `name`.
    pub fn time<R>(&mut self, name: &'static str, f: impl FnOnce() -> R) -> R {
        let timer = self.begin(name);
        let result = f();
        self.end(timer);
        result
    }

    /// Copy the current counter values, in first-recorded order.
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            samples: self
                .counters
                .iter()
                .map(|(&name, c)| CounterSample {
                    name,
                    total: c.total,
                    hits: c.hits,
                })
                .collect(),
        }
    }

    /// Zero every counter. Counter names (and their order) are retained.
    pub fn reset(&mut self) {
        for counter in self.counters.values_mut() {
            *counter = Counter::default();
        }
    }

    /// Number of distinct counters recorded so far.
    pub fn counter_count(&self) -> usize {
        self.counters.len()
    }
}

/// One counter's values at snapshot time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterSample {
    /// Counter name.
    pub name: &'static str,
    /// Total time accumulated across all hits.
    pub total: Duration,
    /// Number of recorded hits.
    pub hits: u64,
}

impl CounterSample {
    /// Mean time per hit, or zero if the counter was never hit.
    pub fn average(&self) -> Duration {
        if self.hits == 0 {
            return Duration::ZERO;
        }
        // u32 hit counts cover any realistic per-frame usage.
        let hits = u32::try_from(self.hits).unwrap_or(u32::MAX);
        self.total / hits
    }
}

/// Point-in-time copy of a [`ProfileContext`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    samples: Vec<CounterSample>,
}

impl ProfileSnapshot {
    /// Look up a counter by name.
    pub fn get(&self, name: &str) -> Option<&CounterSample> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Iterate samples in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = &CounterSample> {
        self.samples.iter()
    }

    /// Number of counters in the snapshot.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the snapshot holds no counters.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
