//! Chatbot actions: turn adapter lookups into French responses.
//!
//! Each action takes the entities the dialogue layer extracted (possibly
//! none) and returns the text to utter. Trend sentences are keyed on the
//! literal period the user gave.

use esg_store::{EsgAdapter, ParityResult};
use tracing::{error, info};

pub const UNKNOWN_REQUEST: &str = "Je n'ai pas compris votre demande. Essayez par exemple: \
emissions dernier trimestre, parite r&d, formation ce mois-ci, fournisseurs, \
empreinte france espagne, entreprise AAPL.";

const NO_EMISSIONS: &str =
    "Je n'ai pas pu récupérer les données d'émissions de CO₂. Veuillez réessayer plus tard.";
const NO_PARITY: &str =
    "Je n'ai pas pu récupérer les données de parité. Veuillez réessayer plus tard.";
const NO_TRAINING: &str =
    "Je n'ai pas pu récupérer les données de formation RSE. Veuillez réessayer plus tard.";
const NO_SUPPLIERS: &str = "Je n'ai pas pu récupérer les données des scores ESG des fournisseurs. \
Veuillez réessayer plus tard.";
const NO_FOOTPRINT: &str = "Je n'ai pas pu comparer l'empreinte carbone entre les pays spécifiés. \
Veuillez vérifier que les pays sont bien dans notre base de données.";
const EXPORT_FAILED: &str = "Je n'ai pas pu exporter les données ESG en raison d'une erreur \
technique. Veuillez réessayer plus tard.";

/// Blank entities count as absent.
fn entity(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn action_get_emissions_co2(adapter: &EsgAdapter, period: Option<&str>) -> String {
    let period = entity(period);
    info!("action_get_emissions_co2 called, period={:?}", period);

    let emissions = adapter.emissions(period);
    info!("Emissions retrieved: {}", emissions);
    if emissions <= 0 {
        return NO_EMISSIONS.into();
    }

    let period_text = match period {
        Some(p) => format!("pour {p}"),
        None => "au dernier trimestre".into(),
    };
    let mut response = format!(
        "D'après nos données, les émissions de CO₂ {} étaient de {} tonnes.",
        period_text,
        format_thousands(emissions)
    );

    match period.map(str::to_lowercase).as_deref() {
        Some("dernier trimestre") => {
            response.push_str(" C'est une réduction de 8% par rapport au trimestre précédent.")
        }
        Some("ce mois-ci") => {
            response.push_str(" C'est une augmentation de 5% par rapport au mois précédent.")
        }
        _ => {}
    }
    response
}

pub fn action_get_parite(adapter: &EsgAdapter, department: Option<&str>) -> String {
    let department = entity(department);
    info!("action_get_parite called, department={:?}", department);

    match adapter.parity(department) {
        ParityResult::Single {
            department: key,
            ratio,
        } => format!(
            "Le taux de parité hommes-femmes dans le département {} est de {:.1}% de femmes.",
            department.unwrap_or(&key),
            ratio * 100.0
        ),
        ParityResult::FullTable(table) => {
            let Some(global) = table.get(esg_store::tables::GLOBAL_PARITY_KEY) else {
                return NO_PARITY.into();
            };
            let details: Vec<String> = table
                .iter()
                .filter(|(dept, _)| *dept != esg_store::tables::GLOBAL_PARITY_KEY)
                .map(|(dept, ratio)| format!("{}: {:.0}%", capitalize(dept), ratio * 100.0))
                .collect();
            format!(
                "Le taux de parité hommes-femmes global est de {:.0}% de femmes. Par département: {}.",
                global * 100.0,
                details.join(", ")
            )
        }
    }
}

pub fn action_get_formation_rse(adapter: &EsgAdapter, period: Option<&str>) -> String {
    let period = entity(period);
    info!("action_get_formation_rse called, period={:?}", period);

    let hours = adapter.training_hours(period);
    info!("Training hours retrieved: {}", hours);
    if hours <= 0 {
        return NO_TRAINING.into();
    }

    let mut response = format!(
        "{} heures de formation RSE ont été suivies {}.",
        hours,
        period.unwrap_or("ce mois-ci")
    );
    match period.map(str::to_lowercase).as_deref() {
        Some("ce mois-ci") => {
            response.push_str(" C'est une augmentation de 15% par rapport au mois précédent.")
        }
        Some("cette année") => {
            response.push_str(" Nous avons déjà atteint 73% de notre objectif annuel.")
        }
        _ => {}
    }
    response
}

pub fn action_get_score_fournisseurs(adapter: &EsgAdapter, threshold: i64) -> String {
    info!("action_get_score_fournisseurs called, threshold={}", threshold);

    let suppliers = adapter.low_score_suppliers(threshold);
    if suppliers.is_empty() {
        return NO_SUPPLIERS.into();
    }

    let details: Vec<String> = suppliers
        .iter()
        .map(|(name, score)| format!("{name} (score {score}/100)"))
        .collect();
    format!(
        "Les fournisseurs avec un score ESG faible cette année sont: {}. \
Nous avons mis en place des plans d'action avec ces fournisseurs pour améliorer leurs performances ESG.",
        details.join(", ")
    )
}

/// Compare the first two `countries`, or `defaults` when fewer than two were
/// named.
pub fn action_compare_empreinte_carbone(
    adapter: &EsgAdapter,
    countries: &[String],
    defaults: &[String],
) -> String {
    info!("action_compare_empreinte_carbone called, countries={:?}", countries);

    let pair = if countries.len() >= 2 { countries } else { defaults };
    let footprints = adapter.carbon_footprint(
        pair.first().map(String::as_str),
        pair.get(1).map(String::as_str),
    );

    let entries: Vec<(&str, i64)> = footprints.iter().collect();
    let [(first, a), (second, b)] = entries.as_slice() else {
        return NO_FOOTPRINT.into();
    };

    let largest = (*a).max(*b);
    let pct = if largest == 0 {
        0.0
    } else {
        (a - b).abs() as f64 / largest as f64 * 100.0
    };
    let direction = if a < b { "moins" } else { "plus" };

    format!(
        "L'empreinte carbone de nos sites en {c1} est de {v1} tonnes de CO₂ contre {v2} tonnes \
pour nos sites en {c2}. Les sites en {c1} émettent {pct:.1}% {direction} de CO₂. \
La différence s'explique principalement par le mix énergétique et l'efficacité des installations.",
        c1 = capitalize(first),
        c2 = capitalize(second),
        v1 = format_thousands(*a),
        v2 = format_thousands(*b),
    )
}

pub fn action_get_company_esg(
    adapter: &mut EsgAdapter,
    ticker: &str,
    name: Option<&str>,
    refresh: bool,
) -> String {
    let ticker = ticker.trim().to_uppercase();
    info!(
        "action_get_company_esg called, ticker={} name={:?} refresh={}",
        ticker, name, refresh
    );

    let record = adapter.company_record(&ticker, entity(name), refresh);
    let msci = &record.msci;
    let risk = &record.sustainalytics;
    format!(
        "Données ESG de {}: notation MSCI {} (environnement {:.1}/10, social {:.1}/10, \
gouvernance {:.1}/10). Risque ESG Sustainalytics {:.1} (environnement {:.1}, social {:.1}, \
gouvernance {:.1}).",
        entity(name).unwrap_or(&ticker),
        msci.esg_rating,
        msci.environmental_score,
        msci.social_score,
        msci.governance_score,
        risk.esg_risk_rating,
        risk.environmental_risk,
        risk.social_risk,
        risk.governance_risk
    )
}

pub fn action_export_snapshot(adapter: &EsgAdapter) -> String {
    info!("action_export_snapshot called");
    match adapter.export_snapshot() {
        Ok(()) => format!(
            "Les données ESG ont été exportées ({} entreprises).",
            adapter.cached_tickers().len()
        ),
        Err(e) => {
            error!("Snapshot export failed: {}", e);
            EXPORT_FAILED.into()
        }
    }
}

/// `12500` → `"12,500"`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
