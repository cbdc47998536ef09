//! Weapon template loading from a data directory.
//!
//! The directory holds an `index.json` listing template files; each file's
//! stem becomes its template key. Broken files are skipped with a warning.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use fodder_core::weapons::WeaponCatalog;

pub fn load_catalog(dir: &Path) -> Result<WeaponCatalog> {
    let index_path = dir.join("index.json");
    let index_text = fs::read_to_string(&index_path)
        .with_context(|| format!("reading {}", index_path.display()))?;
    let files: Vec<String> = serde_json::from_str(&index_text)
        .with_context(|| format!("{} must be an array of file names", index_path.display()))?;

    let mut catalog = WeaponCatalog::new();
    for file in &files {
        let path = dir.join(file);
        let key = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => {
                log::warn!("skipping template entry without a file name: {file:?}");
                continue;
            }
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                continue;
            }
        };
        if let Err(e) = catalog.register_json(&key, &text) {
            log::warn!("skipping {}: {e}", path.display());
        }
    }

    log::info!(
        "loaded {} of {} weapon templates from {}",
        catalog.len(),
        files.len(),
        dir.display()
    );
    Ok(catalog)
}
