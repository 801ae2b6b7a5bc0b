//! Mapping between a package directory and the module list.
//!
//! A package root holds one pretty-printed JSON record per module plus an
//! optional `media/` folder. Only `*.json` files directly in the root are
//! module records; everything else is left alone.
//!
//! Every record carries its position in an `order` field, so the module list
//! reloads in the saved order whatever the file names are. Records without it
//! fall back to file-name order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::models::Module;
use super::settings::ModuleNaming;

pub const MEDIA_DIR: &str = "media";

const RECORD_EXTENSION: &str = "json";

/// A module as written to disk
#[derive(Serialize)]
struct RecordOut<'a> {
    order: usize,
    #[serde(flatten)]
    module: &'a Module,
}

/// A module as read from disk
#[derive(Deserialize)]
struct RecordIn {
    #[serde(default)]
    order: Option<usize>,
    #[serde(flatten)]
    module: Module,
}

fn is_record_file(path: &Path) -> bool {
    path.is_file() && path.extension().map_or(false, |e| e == RECORD_EXTENSION)
}

/// Index encoded in a positional `module_<n>.json` name
fn positional_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("module_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// File order for records without an `order` field: numeric when every file
/// uses positional naming, by file name otherwise.
fn order_record_files(names: &mut [String]) {
    if names.iter().all(|n| positional_index(n).is_some()) {
        names.sort_by_key(|n| positional_index(n));
    } else {
        names.sort();
    }
}

fn list_record_files(package: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(package).map_err(|e| Error::unreadable(package, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::unreadable(package, e))?;
        let path = entry.path();
        if is_record_file(&path) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Read every module record in the package root.
pub fn decode(package: &Path) -> Result<Vec<Module>> {
    let mut names = list_record_files(package)?;
    order_record_files(&mut names);

    let mut records = Vec::with_capacity(names.len());
    for name in names {
        let content = fs::read(package.join(&name))?;
        // Parsed from bytes so invalid UTF-8 is reported against the file.
        let record: RecordIn = serde_json::from_slice(&content)
            .map_err(|source| Error::CorruptArchive {
                file: name.clone(),
                source,
            })?;
        log::debug!("Decoded module '{}' from {}", record.module.title, name);
        records.push(record);
    }

    // Stable, so unordered records keep their file order after the ordered ones.
    records.sort_by_key(|record| record.order.unwrap_or(usize::MAX));
    Ok(records.into_iter().map(|record| record.module).collect())
}

/// Keep alphanumerics, spaces, underscores and commas, then trim
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | ','))
        .collect::<String>()
        .trim()
        .to_string()
}

/// File names for each module, unique within the package.
pub fn module_file_names(modules: &[Module], naming: ModuleNaming) -> Vec<String> {
    match naming {
        ModuleNaming::Positional => (0..modules.len())
            .map(|i| format!("module_{}.{}", i, RECORD_EXTENSION))
            .collect(),
        ModuleNaming::Title => {
            // Compared case-insensitively so case-folding filesystems cannot
            // merge two records.
            let mut taken = HashSet::new();
            let mut names = Vec::with_capacity(modules.len());

            for (i, module) in modules.iter().enumerate() {
                let mut stem = sanitize_title(&module.title);
                if stem.is_empty() {
                    stem = format!("module_{}", i);
                }

                let mut candidate = stem.clone();
                let mut attempt = 0;
                while taken.contains(&candidate.to_lowercase()) {
                    candidate = if attempt == 0 {
                        format!("{}_{}", stem, i)
                    } else {
                        format!("{}_{}_{}", stem, i, attempt)
                    };
                    attempt += 1;
                }

                taken.insert(candidate.to_lowercase());
                names.push(format!("{}.{}", candidate, RECORD_EXTENSION));
            }
            names
        }
    }
}

/// Replace the module records in `package` with `modules`.
///
/// Existing records are removed first; the media folder is never touched.
/// Returns the written file names in module order.
pub fn encode(modules: &[Module], package: &Path, naming: ModuleNaming) -> Result<Vec<String>> {
    fs::create_dir_all(package)?;

    for entry in fs::read_dir(package)? {
        let path = entry?.path();
        if is_record_file(&path) {
            fs::remove_file(&path)?;
        }
    }

    let names = module_file_names(modules, naming);
    for (order, (module, name)) in modules.iter().zip(&names).enumerate() {
        let content = serde_json::to_string_pretty(&RecordOut { order, module })?;
        fs::write(package.join(name), content)?;
        log::debug!("Encoded module '{}' as {}", module.title, name);
    }

    Ok(names)
}
