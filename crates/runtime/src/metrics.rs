use std::collections::BTreeMap;

/// Named counters and gauges for the detector and renderer.
///
/// Keys iterate in sorted order, so two runs that record the same events
/// produce identical snapshots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, i64>,
}

/// Owned copy of a [`Metrics`] table, detached from further updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, i64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of counter `name`; counters never touched read as zero.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).map_or(0, |v| *v)
    }

    pub fn inc_counter(&mut self, name: impl Into<String>, by: u64) {
        let slot = self.counters.entry(name.into()).or_default();
        *slot = slot.saturating_add(by);
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: impl Into<String>, value: i64) {
        self.gauges.insert(name.into(), value);
    }

    /// Folds `other` into `self`: counters add, gauges from `other` win.
    pub fn merge(&mut self, other: &Metrics) {
        for (name, by) in &other.counters {
            self.inc_counter(name.as_str(), *by);
        }
        self.gauges
            .extend(other.gauges.iter().map(|(name, v)| (name.clone(), *v)));
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.clone(),
            gauges: self.gauges.clone(),
        }
    }
}
