//! Domain types shared across the bot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Company ESG Ratings ───────────────────────────────────────────────

/// Ratings for one company, keyed by provider in the persisted cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEsgRecord {
    pub msci: MsciRating,
    pub sustainalytics: SustainalyticsRating,
}

/// MSCI letter rating and pillar scores (0-10, higher is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsciRating {
    /// Letter rating, e.g. "AA".
    pub esg_rating: String,
    pub environmental_score: f64,
    pub social_score: f64,
    pub governance_score: f64,
    /// Set on synthesized entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_extracted: Option<NaiveDate>,
}

/// Sustainalytics risk ratings (lower is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainalyticsRating {
    pub esg_risk_rating: f64,
    pub environmental_risk: f64,
    pub social_risk: f64,
    pub governance_risk: f64,
    /// Set on synthesized entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_extracted: Option<NaiveDate>,
}

/// Company records keyed by ticker. This is the shape of the on-disk cache.
pub type CompanyTable = BTreeMap<String, CompanyEsgRecord>;
