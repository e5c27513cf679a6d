//! Cache adapter: the single entry point the action handlers use.
//!
//! Metric getters are total. A lookup miss falls back to a default key or an
//! empty result, never an error. Company ratings are cached in memory and in
//! the configured cache file (`company_esg_data.json` by default). The file
//! is authoritative at startup when it parses; otherwise the seeded table
//! replaces it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use common::config::BotConfig;
use common::{CompanyEsgRecord, CompanyTable, Error, Result};
use tracing::{debug, error, info, warn};

use crate::company::SimulatedRatings;
use crate::snapshot::write_snapshot;
use crate::tables::{
    MetricTable, SeedTables, DEFAULT_EMISSIONS_PERIOD, DEFAULT_TRAINING_PERIOD,
};

/// Result of a parity query.
#[derive(Debug, Clone, PartialEq)]
pub enum ParityResult {
    /// The requested department was recognized.
    Single { department: String, ratio: f64 },
    /// No department, or an unknown one: the whole table, "global" included.
    FullTable(MetricTable<f64>),
}

/// How the company table was obtained at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    /// Parsed from an existing cache file.
    Disk,
    /// No cache file existed; seeded and written.
    Seeded,
    /// The cache file could not be read or parsed; seeded and overwritten.
    Recovered,
}

#[derive(Debug)]
pub struct EsgAdapter {
    data_dir: PathBuf,
    cache_file_name: String,
    cache_path: PathBuf,
    tables: SeedTables,
    ratings: SimulatedRatings,
    companies: CompanyTable,
    origin: CacheOrigin,
}

impl EsgAdapter {
    /// Create the data directory if needed and load the company cache.
    ///
    /// Only fails when the data directory cannot be created. A missing or
    /// corrupt cache is replaced with the seeded companies and a full
    /// snapshot is written next to it.
    pub fn load(config: &BotConfig) -> Result<Self> {
        let data_dir = config.data_dir.clone();
        fs::create_dir_all(&data_dir).map_err(|e| {
            Error::Cache(format!(
                "failed to create data dir {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let tables = SeedTables::simulated();
        let ratings = SimulatedRatings::new();
        let cache_path = config.cache_path();

        let (companies, origin) = match read_cache(&cache_path) {
            Ok(Some(companies)) => {
                info!(
                    "Loaded {} cached companies from {}",
                    companies.len(),
                    cache_path.display()
                );
                (companies, CacheOrigin::Disk)
            }
            Ok(None) => {
                info!("No company cache at {}, seeding", cache_path.display());
                (ratings.seeded().clone(), CacheOrigin::Seeded)
            }
            Err(e) => {
                error!("Failed to load company cache {}: {}", cache_path.display(), e);
                (ratings.seeded().clone(), CacheOrigin::Recovered)
            }
        };

        if origin != CacheOrigin::Disk {
            if let Err(e) =
                write_snapshot(&data_dir, &tables, &config.cache_file_name, &companies)
            {
                warn!("Failed to write initial ESG snapshot: {}", e);
            }
        }

        Ok(Self {
            data_dir,
            cache_file_name: config.cache_file_name.clone(),
            cache_path,
            tables,
            ratings,
            companies,
            origin,
        })
    }

    /// Rewrite the whole company cache file from memory.
    pub fn persist(&self) -> Result<()> {
        let body = serde_json::to_string_pretty(&self.companies)?;
        fs::write(&self.cache_path, body)?;
        debug!(
            "Persisted {} companies to {}",
            self.companies.len(),
            self.cache_path.display()
        );
        Ok(())
    }

    // ── Metric getters ────────────────────────────────────────────────

    /// Tonnes of CO2 for `period`, or for "dernier trimestre" when the
    /// period is absent or unknown.
    pub fn emissions(&self, period: Option<&str>) -> i64 {
        info!("Fetching CO2 emissions for period: {:?}", period);
        lookup_or_default(&self.tables.emissions, period, DEFAULT_EMISSIONS_PERIOD)
    }

    pub fn parity(&self, department: Option<&str>) -> ParityResult {
        info!("Fetching gender parity for department: {:?}", department);
        match department.and_then(|d| self.tables.parity.lookup(d)) {
            Some((department, ratio)) => ParityResult::Single { department, ratio },
            None => ParityResult::FullTable(self.tables.parity.clone()),
        }
    }

    /// ESG training hours for `period`, defaulting to "ce mois-ci".
    pub fn training_hours(&self, period: Option<&str>) -> i64 {
        info!("Fetching ESG training hours for period: {:?}", period);
        lookup_or_default(&self.tables.training, period, DEFAULT_TRAINING_PERIOD)
    }

    /// Suppliers scoring strictly below `threshold`, in seed order.
    pub fn low_score_suppliers(&self, threshold: i64) -> MetricTable<i64> {
        info!("Fetching suppliers with ESG score < {}", threshold);
        self.tables.suppliers.filter(|_, score| score < threshold)
    }

    /// Footprints of the named countries that exist in the table. Unknown or
    /// absent countries are dropped, so the result has 0, 1 or 2 entries.
    pub fn carbon_footprint(&self, country1: Option<&str>, country2: Option<&str>) -> MetricTable<i64> {
        info!(
            "Comparing carbon footprint between {:?} and {:?}",
            country1, country2
        );
        let mut result = MetricTable::new();
        for (country, footprint) in [country1, country2]
            .into_iter()
            .flatten()
            .filter_map(|c| self.tables.footprint.lookup(c))
        {
            result.insert(country, footprint);
        }
        result
    }

    // ── Company ratings ───────────────────────────────────────────────

    /// Ratings for `ticker`.
    ///
    /// A cached record is returned unchanged unless `force_refresh` is set.
    /// Otherwise the record is fetched (seeded or synthesized), stored, and
    /// the cache file rewritten. A failed write is logged; the record is
    /// still returned.
    pub fn company_record(
        &mut self,
        ticker: &str,
        display_name: Option<&str>,
        force_refresh: bool,
    ) -> CompanyEsgRecord {
        if !force_refresh {
            if let Some(record) = self.companies.get(ticker) {
                debug!("Cache hit for {}", ticker);
                return record.clone();
            }
        }

        info!(
            "Refreshing ESG data for {} ({})",
            ticker,
            display_name.unwrap_or("unnamed")
        );
        let record = self.ratings.fetch(ticker);
        self.companies.insert(ticker.to_owned(), record.clone());
        if let Err(e) = self.persist() {
            warn!("Failed to persist company cache after fetching {}: {}", ticker, e);
        }
        record
    }

    /// Tickers currently cached, sorted.
    pub fn cached_tickers(&self) -> Vec<&str> {
        self.companies.keys().map(String::as_str).collect()
    }

    /// Write every table and the current company table to the data dir.
    pub fn export_snapshot(&self) -> Result<()> {
        write_snapshot(
            &self.data_dir,
            &self.tables,
            &self.cache_file_name,
            &self.companies,
        )
    }

    pub fn origin(&self) -> CacheOrigin {
        self.origin
    }
}

fn lookup_or_default(table: &MetricTable<i64>, key: Option<&str>, default_key: &str) -> i64 {
    key.and_then(|k| table.lookup(k))
        .map(|(_, value)| value)
        .or_else(|| table.get(default_key))
        .unwrap_or_default()
}

/// `Ok(None)` when the file does not exist.
fn read_cache(path: &Path) -> Result<Option<CompanyTable>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::within_synthetic_bounds;
    use crate::snapshot::{EMISSIONS_FILE, PARITY_FILE};
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> BotConfig {
        BotConfig {
            data_dir: dir.path().join("esg_data"),
            ..BotConfig::default()
        }
    }

    fn fresh_adapter() -> (TempDir, EsgAdapter) {
        let dir = tempfile::tempdir().expect("tempdir");
        let adapter = EsgAdapter::load(&test_config(&dir)).expect("adapter should load");
        (dir, adapter)
    }

    // ── Metric getters ────────────────────────────────────────────────

    #[test]
    fn test_emissions_seeded_periods_any_case() {
        let (_dir, adapter) = fresh_adapter();
        let cases = [
            ("dernier trimestre", 12500),
            ("CE MOIS-CI", 4200),
            ("Cette Année", 48000),
            ("2023", 52000),
            ("Q2", 13200),
            ("l'année dernière", 51000),
        ];
        for (period, expected) in cases {
            assert_eq!(adapter.emissions(Some(period)), expected, "period {}", period);
        }
    }

    #[test]
    fn test_emissions_fallback_to_last_quarter() {
        let (_dir, adapter) = fresh_adapter();
        assert_eq!(adapter.emissions(None), 12500);
        assert_eq!(adapter.emissions(Some("next century")), 12500);
        assert_eq!(adapter.emissions(Some("")), 12500);
    }

    #[test]
    fn test_training_seeded_and_fallback() {
        let (_dir, adapter) = fresh_adapter();
        assert_eq!(adapter.training_hours(Some("Le Premier Trimestre")), 1250);
        assert_eq!(adapter.training_hours(Some("le mois dernier")), 420);
        assert_eq!(adapter.training_hours(Some("q2")), 450);
        assert_eq!(adapter.training_hours(None), 450);
    }

    #[test]
    fn test_parity_full_table_without_department() {
        let (_dir, adapter) = fresh_adapter();
        match adapter.parity(None) {
            ParityResult::FullTable(table) => {
                assert_eq!(table.get("global"), Some(0.42));
                assert_eq!(table.len(), 7);
                assert_eq!(table.get("service client"), Some(0.58));
            }
            other => panic!("expected full table, got {:?}", other),
        }
    }

    #[test]
    fn test_parity_single_department() {
        let (_dir, adapter) = fresh_adapter();
        assert_eq!(
            adapter.parity(Some("R&D")),
            ParityResult::Single {
                department: "r&d".into(),
                ratio: 0.38
            }
        );
        assert!(matches!(
            adapter.parity(Some("legal")),
            ParityResult::FullTable(_)
        ));
    }

    #[test]
    fn test_low_score_suppliers_thresholds() {
        let (_dir, adapter) = fresh_adapter();

        let low = adapter.low_score_suppliers(50);
        let names: Vec<&str> = low.keys().collect();
        assert_eq!(names, vec!["Supplier A", "Supplier B", "Supplier C"]);

        assert_eq!(adapter.low_score_suppliers(100).len(), 6);
        assert!(adapter.low_score_suppliers(0).is_empty());
        // Strictly below: a supplier at exactly the threshold is excluded.
        assert_eq!(adapter.low_score_suppliers(42).keys().collect::<Vec<_>>(), vec!["Supplier B"]);
    }

    #[test]
    fn test_carbon_footprint_pairs() {
        let (_dir, adapter) = fresh_adapter();

        let both = adapter.carbon_footprint(Some("france"), Some("allemagne"));
        assert_eq!(
            both,
            MetricTable::from_entries([("france", 8200), ("allemagne", 10500)])
        );

        let one = adapter.carbon_footprint(Some("France"), Some("atlantis"));
        assert_eq!(one.len(), 1);
        assert_eq!(one.get("france"), Some(8200));

        assert!(adapter.carbon_footprint(None, Some("atlantis")).is_empty());
        assert_eq!(adapter.carbon_footprint(Some("suisse"), Some("SUISSE")).len(), 1);
    }

    // ── Company cache ─────────────────────────────────────────────────

    #[test]
    fn test_first_load_seeds_and_writes_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        let adapter = EsgAdapter::load(&config).expect("adapter should load");

        assert_eq!(adapter.origin(), CacheOrigin::Seeded);
        assert_eq!(adapter.cached_tickers(), vec!["AAPL", "GOOGL", "MSFT"]);
        assert!(config.cache_path().is_file());
        assert!(config.data_dir.join(EMISSIONS_FILE).is_file());
        assert!(config.data_dir.join(PARITY_FILE).is_file());
    }

    #[test]
    fn test_cache_round_trip_through_fresh_adapter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);

        let mut first = EsgAdapter::load(&config).expect("adapter should load");
        let aapl = first.company_record("AAPL", Some("Apple Inc."), false);
        let zzzz = first.company_record("ZZZZ", None, false);

        let mut second = EsgAdapter::load(&config).expect("adapter should reload");
        assert_eq!(second.origin(), CacheOrigin::Disk);
        assert_eq!(second.company_record("AAPL", None, false), aapl);
        assert_eq!(second.company_record("ZZZZ", None, false), zzzz);
        assert_eq!(aapl.msci.environmental_score, 7.8);
        assert_eq!(aapl.sustainalytics.governance_risk, 7.2);
    }

    #[test]
    fn test_unknown_ticker_synthesized_once() {
        let (_dir, mut adapter) = fresh_adapter();

        let first = adapter.company_record("ZZZZ", None, false);
        assert!(within_synthetic_bounds(&first));

        let second = adapter.company_record("ZZZZ", None, false);
        assert_eq!(first, second);
        assert!(adapter.cached_tickers().contains(&"ZZZZ"));
    }

    #[test]
    fn test_force_refresh_regenerates_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        let mut adapter = EsgAdapter::load(&config).expect("adapter should load");

        adapter.company_record("ZZZZ", None, false);
        let refreshed = adapter.company_record("ZZZZ", None, true);
        assert!(within_synthetic_bounds(&refreshed));

        let on_disk: CompanyTable = serde_json::from_str(
            &fs::read_to_string(config.cache_path()).expect("read cache"),
        )
        .expect("cache should parse");
        assert_eq!(on_disk.get("ZZZZ"), Some(&refreshed));
    }

    #[test]
    fn test_cached_entry_wins_over_seed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        fs::create_dir_all(&config.data_dir).expect("mkdir");

        let mut custom = SimulatedRatings::new().seeded().clone();
        if let Some(aapl) = custom.get_mut("AAPL") {
            aapl.msci.esg_rating = "BBB".into();
        }
        fs::write(
            config.cache_path(),
            serde_json::to_string(&custom).expect("serialize"),
        )
        .expect("write cache");

        let mut adapter = EsgAdapter::load(&config).expect("adapter should load");
        assert_eq!(adapter.company_record("AAPL", None, false).msci.esg_rating, "BBB");
        // Refresh goes back to the provider, which still says AA.
        assert_eq!(adapter.company_record("AAPL", None, true).msci.esg_rating, "AA");
    }

    #[test]
    fn test_corrupt_cache_is_recovered() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        fs::create_dir_all(&config.data_dir).expect("mkdir");
        fs::write(config.cache_path(), "{ not json").expect("write garbage");

        let adapter = EsgAdapter::load(&config).expect("corrupt cache must not fail load");
        assert_eq!(adapter.origin(), CacheOrigin::Recovered);
        assert_eq!(adapter.cached_tickers(), vec!["AAPL", "GOOGL", "MSFT"]);

        let rewritten: CompanyTable = serde_json::from_str(
            &fs::read_to_string(config.cache_path()).expect("read cache"),
        )
        .expect("rewritten cache should parse");
        assert_eq!(rewritten.len(), 3);
    }

    #[test]
    fn test_export_snapshot_includes_new_companies() {
        let (dir, mut adapter) = fresh_adapter();
        adapter.company_record("TSLA", Some("Tesla"), false);
        adapter.export_snapshot().expect("export");

        let cache: CompanyTable = serde_json::from_str(
            &fs::read_to_string(dir.path().join("esg_data").join("company_esg_data.json"))
                .expect("read cache"),
        )
        .expect("parse cache");
        assert!(cache.contains_key("TSLA"));
    }

    #[test]
    fn test_custom_cache_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BotConfig {
            cache_file_name: "ratings.json".into(),
            ..test_config(&dir)
        };

        let mut first = EsgAdapter::load(&config).expect("adapter should load");
        assert_eq!(first.origin(), CacheOrigin::Seeded);
        assert!(config.data_dir.join("ratings.json").is_file());
        assert!(!config.data_dir.join("company_esg_data.json").exists());

        let zzzz = first.company_record("ZZZZ", None, false);
        first.export_snapshot().expect("export");
        assert!(!config.data_dir.join("company_esg_data.json").exists());

        let mut second = EsgAdapter::load(&config).expect("adapter should reload");
        assert_eq!(second.origin(), CacheOrigin::Disk);
        assert_eq!(second.company_record("ZZZZ", None, false), zzzz);
    }

    #[test]
    fn test_persist_failure_still_returns_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        let mut adapter = EsgAdapter::load(&config).expect("adapter should load");

        // A directory in place of the cache file makes every rewrite fail.
        fs::remove_file(config.cache_path()).expect("remove cache");
        fs::create_dir(config.cache_path()).expect("mkdir over cache path");

        let first = adapter.company_record("ZZZZ", None, false);
        assert!(within_synthetic_bounds(&first));
        let second = adapter.company_record("ZZZZ", None, false);
        assert_eq!(first, second);
        assert!(adapter.persist().is_err());
    }

    #[test]
    fn test_load_fails_when_data_dir_uncreatable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "plain file").expect("write blocker");
        let config = BotConfig {
            data_dir: blocker.join("esg_data"),
            ..BotConfig::default()
        };

        assert!(matches!(EsgAdapter::load(&config), Err(Error::Cache(_))));
    }
}
