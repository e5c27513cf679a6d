//! Seeded metric tables.
//!
//! Every table keeps its entries in seed order so that filtered views and
//! snapshots list keys the way they were declared.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered key → value table.
///
/// Keys of the lookup tables are stored lower-cased; [`MetricTable::lookup`]
/// lower-cases the query before matching. [`MetricTable::get`] matches the key
/// verbatim and is what supplier names use.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable<V> {
    entries: Vec<(String, V)>,
}

impl<V: Copy> MetricTable<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut table = Self::new();
        for (key, value) in entries {
            table.insert(key, value);
        }
        table
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Case-insensitive lookup. Returns the normalized key with the value.
    pub fn lookup(&self, raw: &str) -> Option<(String, V)> {
        let key = normalize_key(raw);
        self.get(&key).map(|value| (key, value))
    }

    /// Entries matching `keep`, in table order.
    pub fn filter(&self, mut keep: impl FnMut(&str, V) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, v)| keep(k, *v))
                .cloned()
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Copy> Default for MetricTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for MetricTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Lower-case a free-text entity value for table lookup.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
}

// ── Seed data ─────────────────────────────────────────────────────────

/// Fallback period for emissions queries.
pub const DEFAULT_EMISSIONS_PERIOD: &str = "dernier trimestre";
/// Fallback period for training-hours queries.
pub const DEFAULT_TRAINING_PERIOD: &str = "ce mois-ci";
/// Key of the company-wide ratio in the parity table.
pub const GLOBAL_PARITY_KEY: &str = "global";

/// The five immutable metric tables, built once per adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedTables {
    /// Tonnes of CO2 by period.
    pub emissions: MetricTable<i64>,
    /// Share of women by department, plus [`GLOBAL_PARITY_KEY`].
    pub parity: MetricTable<f64>,
    /// ESG training hours by period.
    pub training: MetricTable<i64>,
    /// Supplier ESG score in [0, 100], keyed by supplier name as given.
    pub suppliers: MetricTable<i64>,
    /// Tonnes of CO2 by country of operation.
    pub footprint: MetricTable<i64>,
}

impl SeedTables {
    /// The simulated data set.
    pub fn simulated() -> Self {
        Self {
            emissions: MetricTable::from_entries([
                (DEFAULT_EMISSIONS_PERIOD, 12500),
                ("ce mois-ci", 4200),
                ("cette année", 48000),
                ("2023", 52000),
                ("q2", 13200),
                ("l'année dernière", 51000),
            ]),
            parity: MetricTable::from_entries([
                (GLOBAL_PARITY_KEY, 0.42),
                ("r&d", 0.38),
                ("marketing", 0.51),
                ("finance", 0.45),
                ("production", 0.32),
                ("service client", 0.58),
                ("équipe technique", 0.35),
            ]),
            training: MetricTable::from_entries([
                (DEFAULT_TRAINING_PERIOD, 450),
                ("le premier trimestre", 1250),
                ("cette année", 3800),
                ("2023", 5200),
                ("le mois dernier", 420),
            ]),
            suppliers: MetricTable::from_entries([
                ("Supplier A", 42),
                ("Supplier B", 38),
                ("Supplier C", 45),
                ("Supplier D", 72),
                ("Supplier E", 68),
                ("Supplier F", 85),
            ]),
            footprint: MetricTable::from_entries([
                ("france", 8200),
                ("allemagne", 10500),
                ("espagne", 7800),
                ("portugal", 6500),
                ("italie", 9200),
                ("suisse", 5800),
                ("belgique", 6200),
                ("pays-bas", 7100),
                ("royaume-uni", 9800),
            ]),
        }
    }
}

impl Default for SeedTables {
    fn default() -> Self {
        Self::simulated()
    }
}
