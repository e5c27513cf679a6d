//! Per-company ratings from the simulated providers.
//!
//! Seeded tickers return fixed values. Anything else gets a synthetic record
//! drawn uniformly from per-field ranges and rounded to one decimal.

use chrono::{NaiveDate, Utc};
use common::{CompanyEsgRecord, CompanyTable, MsciRating, SustainalyticsRating};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

/// Letter ratings a synthesized MSCI record can get.
pub const SYNTHETIC_RATINGS: [&str; 4] = ["A", "AA", "BBB", "BB"];

pub const ENVIRONMENTAL_SCORE_RANGE: (f64, f64) = (5.0, 8.5);
pub const SOCIAL_SCORE_RANGE: (f64, f64) = (5.0, 8.0);
pub const GOVERNANCE_SCORE_RANGE: (f64, f64) = (5.5, 8.5);
pub const RISK_RATING_RANGE: (f64, f64) = (15.0, 30.0);
pub const ENVIRONMENTAL_RISK_RANGE: (f64, f64) = (3.0, 7.0);
pub const SOCIAL_RISK_RANGE: (f64, f64) = (5.0, 9.0);
pub const GOVERNANCE_RISK_RANGE: (f64, f64) = (4.0, 8.0);

/// Stand-in for the rating providers. Never touches the network.
#[derive(Debug, Clone)]
pub struct SimulatedRatings {
    seeded: CompanyTable,
}

impl SimulatedRatings {
    pub fn new() -> Self {
        Self {
            seeded: seeded_companies(),
        }
    }

    /// The fixed company records.
    pub fn seeded(&self) -> &CompanyTable {
        &self.seeded
    }

    /// Ratings for `ticker`: the seeded record if there is one, otherwise a
    /// fresh synthetic record.
    pub fn fetch(&self, ticker: &str) -> CompanyEsgRecord {
        info!("Fetching ESG ratings for {}", ticker);
        match self.seeded.get(ticker) {
            Some(record) => record.clone(),
            None => synthesize_record(&mut rand::thread_rng(), Utc::now().date_naive()),
        }
    }
}

impl Default for SimulatedRatings {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a synthetic record stamped with `today`.
pub fn synthesize_record<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> CompanyEsgRecord {
    let esg_rating = SYNTHETIC_RATINGS
        .choose(rng)
        .copied()
        .unwrap_or("BBB")
        .to_string();

    CompanyEsgRecord {
        msci: MsciRating {
            esg_rating,
            environmental_score: uniform_1dp(rng, ENVIRONMENTAL_SCORE_RANGE),
            social_score: uniform_1dp(rng, SOCIAL_SCORE_RANGE),
            governance_score: uniform_1dp(rng, GOVERNANCE_SCORE_RANGE),
            date_extracted: Some(today),
        },
        sustainalytics: SustainalyticsRating {
            esg_risk_rating: uniform_1dp(rng, RISK_RATING_RANGE),
            environmental_risk: uniform_1dp(rng, ENVIRONMENTAL_RISK_RANGE),
            social_risk: uniform_1dp(rng, SOCIAL_RISK_RANGE),
            governance_risk: uniform_1dp(rng, GOVERNANCE_RISK_RANGE),
            date_extracted: Some(today),
        },
    }
}

fn uniform_1dp<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    let raw: f64 = rng.gen_range(low..=high);
    // Rounding can't leave the range: both bounds have one decimal.
    (raw * 10.0).round() / 10.0
}

fn msci(esg_rating: &str, environmental: f64, social: f64, governance: f64) -> MsciRating {
    MsciRating {
        esg_rating: esg_rating.into(),
        environmental_score: environmental,
        social_score: social,
        governance_score: governance,
        date_extracted: None,
    }
}

fn sustainalytics(rating: f64, environmental: f64, social: f64, governance: f64) -> SustainalyticsRating {
    SustainalyticsRating {
        esg_risk_rating: rating,
        environmental_risk: environmental,
        social_risk: social,
        governance_risk: governance,
        date_extracted: None,
    }
}

fn seeded_companies() -> CompanyTable {
    let mut table = CompanyTable::new();
    table.insert(
        "AAPL".into(),
        CompanyEsgRecord {
            msci: msci("AA", 7.8, 6.5, 8.2),
            sustainalytics: sustainalytics(18.5, 4.2, 7.1, 7.2),
        },
    );
    table.insert(
        "MSFT".into(),
        CompanyEsgRecord {
            msci: msci("AAA", 8.5, 7.2, 8.7),
            sustainalytics: sustainalytics(14.2, 3.8, 5.9, 4.5),
        },
    );
    table.insert(
        "GOOGL".into(),
        CompanyEsgRecord {
            msci: msci("AA", 7.9, 6.8, 7.5),
            sustainalytics: sustainalytics(17.8, 4.0, 7.5, 6.3),
        },
    );
    table
}

/// Whether every field of `record` lies inside its synthesis range.
#[cfg(test)]
pub(crate) fn within_synthetic_bounds(record: &CompanyEsgRecord) -> bool {
    let inside = |value: f64, (low, high): (f64, f64)| value >= low && value <= high;
    let m = &record.msci;
    let s = &record.sustainalytics;
    SYNTHETIC_RATINGS.contains(&m.esg_rating.as_str())
        && inside(m.environmental_score, ENVIRONMENTAL_SCORE_RANGE)
        && inside(m.social_score, SOCIAL_SCORE_RANGE)
        && inside(m.governance_score, GOVERNANCE_SCORE_RANGE)
        && inside(s.esg_risk_rating, RISK_RATING_RANGE)
        && inside(s.environmental_risk, ENVIRONMENTAL_RISK_RANGE)
        && inside(s.social_risk, SOCIAL_RISK_RANGE)
        && inside(s.governance_risk, GOVERNANCE_RISK_RANGE)
}
