//! JSON export of every table into the data directory.

use std::fs;
use std::path::Path;

use common::{CompanyTable, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::tables::SeedTables;

pub const EMISSIONS_FILE: &str = "emissions_co2.json";
pub const PARITY_FILE: &str = "parite.json";
pub const TRAINING_FILE: &str = "formation_rse.json";
pub const SUPPLIERS_FILE: &str = "score_fournisseurs.json";
pub const FOOTPRINT_FILE: &str = "empreinte_carbone.json";

/// Write the five metric tables and the company table, one pretty-printed
/// file each. The company table goes to `companies_file`, the cache file
/// name. Existing files are overwritten.
pub fn write_snapshot(
    dir: &Path,
    tables: &SeedTables,
    companies_file: &str,
    companies: &CompanyTable,
) -> Result<()> {
    info!("Writing ESG snapshot to {}", dir.display());
    fs::create_dir_all(dir)?;

    write_json(dir, EMISSIONS_FILE, &tables.emissions)?;
    write_json(dir, PARITY_FILE, &tables.parity)?;
    write_json(dir, TRAINING_FILE, &tables.training)?;
    write_json(dir, SUPPLIERS_FILE, &tables.suppliers)?;
    write_json(dir, FOOTPRINT_FILE, &tables.footprint)?;
    write_json(dir, companies_file, companies)?;

    info!("Snapshot written ({} companies)", companies.len());
    Ok(())
}

/// Pretty-print `value` to `dir/file_name`, replacing the whole file.
pub fn write_json<T: Serialize + ?Sized>(dir: &Path, file_name: &str, value: &T) -> Result<()> {
    let path = dir.join(file_name);
    let body = serde_json::to_string_pretty(value)?;
    fs::write(&path, body)?;
    debug!("Saved {}", path.display());
    Ok(())
}
