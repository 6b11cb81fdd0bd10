//! Area-level roll-up of object capacities

use indexmap::IndexMap;
use serde::Serialize;

/// Total and per-object breakdown, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaTotals {
    pub total: f64,
    pub breakdown: IndexMap<String, f64>,
}

/// Sums final capacities and keeps a name → value breakdown.
///
/// Display names are not unique; a repeated name gets a ` (2)`, ` (3)`, …
/// suffix so no entry is overwritten and insertion order is preserved.
#[derive(Debug, Default)]
pub struct AreaAggregator {
    totals: AreaTotals,
}

impl AreaAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one object and returns the breakdown key it was stored under
    pub fn add(&mut self, name: &str, capacity: f64) -> String {
        let key = self.unique_key(name);
        self.totals.total += capacity;
        self.totals.breakdown.insert(key.clone(), capacity);
        key
    }

    pub fn finish(self) -> AreaTotals {
        self.totals
    }

    fn unique_key(&self, name: &str) -> String {
        if !self.totals.breakdown.contains_key(name) {
            return name.to_string();
        }
        (2..)
            .map(|n| format!("{} ({})", name, n))
            .find(|candidate| !self.totals.breakdown.contains_key(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

impl<'a> FromIterator<(&'a str, f64)> for AreaTotals {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut aggregator = AreaAggregator::new();
        for (name, capacity) in iter {
            aggregator.add(name, capacity);
        }
        aggregator.finish()
    }
}
