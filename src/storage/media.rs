//! The package's `media/` folder.
//!
//! Entities store media as bare file names relative to this folder. Imported
//! files get a lowercase, filesystem-safe name; a name already taken by a
//! different file is disambiguated with a numeric suffix instead of being
//! overwritten.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::codec::MEDIA_DIR;
use super::error::{Error, Result};

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("static pattern"))
}

/// Split a source file name into its safe stem and lowercased extension
/// (including the dot, or empty).
pub fn safe_media_name(source: &Path) -> Result<(String, String)> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidArgument(format!("no file name in {:?}", source)))?;
    let safe = unsafe_chars().replace_all(&stem, "_").to_lowercase();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    Ok((safe, ext))
}

/// A media reference must be a plain file name, never a path.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub struct MediaStore {
    media_dir: PathBuf,
}

impl MediaStore {
    pub fn new(package: &Path) -> Self {
        Self {
            media_dir: package.join(MEDIA_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.media_dir
    }

    pub fn exists(&self) -> bool {
        self.media_dir.is_dir()
    }

    /// Copy `source` into the media folder and return the name to store in
    /// `imgSrc`.
    ///
    /// Re-importing a file whose bytes already sit under a candidate name
    /// returns that name without copying again.
    pub fn import(&self, source: &Path) -> Result<String> {
        if !source.is_file() {
            return Err(Error::NotFound(format!("media source {:?}", source)));
        }
        let (safe, ext) = safe_media_name(source)?;
        let content = fs::read(source)?;

        fs::create_dir_all(&self.media_dir)?;

        let mut suffix = 0usize;
        loop {
            let name = if suffix == 0 {
                format!("{}{}", safe, ext)
            } else {
                format!("{}_{}{}", safe, suffix, ext)
            };
            let dest = self.media_dir.join(&name);

            if !dest.exists() {
                fs::write(&dest, &content)?;
                log::debug!("Imported {:?} as {}", source, name);
                return Ok(name);
            }
            if dest.is_file() && fs::read(&dest)? == content {
                log::debug!("{:?} already present as {}", source, name);
                return Ok(name);
            }
            suffix += 1;
        }
    }

    /// Absolute path of a stored reference, or `NotFound` when no such file
    /// exists.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.media_dir.join(name);
        if is_plain_name(name) && path.is_file() {
            Ok(path)
        } else {
            Err(Error::NotFound(format!("media '{}'", name)))
        }
    }

    /// References with no backing file, deduplicated, in first-seen order.
    pub fn missing<'a>(&self, references: &[&'a str]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        references
            .iter()
            .copied()
            .filter(|name| seen.insert(*name))
            .filter(|name| self.resolve(name).is_err())
            .collect()
    }

    /// Media files nothing references, sorted by name.
    pub fn unreferenced(&self, references: &[&str]) -> Result<Vec<String>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let referenced: HashSet<&str> = references.iter().copied().collect();
        let mut unused = Vec::new();
        for entry in fs::read_dir(&self.media_dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !referenced.contains(name.as_str()) {
                unused.push(name);
            }
        }
        unused.sort();
        Ok(unused)
    }

    /// Delete unreferenced media files, returning their names.
    pub fn prune(&self, references: &[&str]) -> Result<Vec<String>> {
        let unused = self.unreferenced(references)?;
        for name in &unused {
            fs::remove_file(self.media_dir.join(name))?;
            log::info!("Pruned unused media {}", name);
        }
        Ok(unused)
    }
}
