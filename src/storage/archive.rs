use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::error::{Error, Result};
use super::settings::ArchiveCompression;

/// Entry name for a path relative to the package root, always `/`-separated
fn entry_name(relative_path: &Path) -> String {
    relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Bundle the whole package directory into a single ZIP archive.
///
/// Entries are written in file-name order with a fixed timestamp, so bundling
/// the same package twice yields identical bytes. Returns the number of files
/// written.
pub fn bundle(package: &Path, archive_path: &Path, compression: ArchiveCompression) -> Result<usize> {
    bundle_excluding(package, archive_path, compression, &[])
}

/// Like [`bundle`], leaving out the files listed in `excluded`.
///
/// The archive is written next to `archive_path` and renamed into place once
/// complete, so a failed bundle leaves any previous archive untouched.
pub fn bundle_excluding(
    package: &Path,
    archive_path: &Path,
    compression: ArchiveCompression,
    excluded: &[PathBuf],
) -> Result<usize> {
    let mut tmp_name = archive_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    match write_archive(package, archive_path, &tmp_path, compression, excluded) {
        Ok(file_count) => {
            fs::rename(&tmp_path, archive_path)?;
            Ok(file_count)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                log::warn!("Failed to remove partial archive {:?}: {}", tmp_path, cleanup);
            }
            Err(e)
        }
    }
}

fn write_archive(
    package: &Path,
    archive_path: &Path,
    tmp_path: &Path,
    compression: ArchiveCompression,
    excluded: &[PathBuf],
) -> Result<usize> {
    let method = match compression {
        ArchiveCompression::Stored => CompressionMethod::Stored,
        ArchiveCompression::Deflated => CompressionMethod::Deflated,
    };
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default());

    let file = File::create(tmp_path)?;
    // Never pull the destination, or the archive being written, into itself.
    let skip: Vec<PathBuf> = [archive_path, tmp_path]
        .into_iter()
        .chain(excluded.iter().map(PathBuf::as_path))
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect();

    let mut zip = ZipWriter::new(file);
    let mut file_count = 0;

    for entry in WalkDir::new(package).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(io::Error::other(e.to_string())))?;
        let path = entry.path();

        let relative_path = path
            .strip_prefix(package)
            .map_err(|_| Error::Io(io::Error::other("Failed to get relative path")))?;
        let name = entry_name(relative_path);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            if fs::canonicalize(path).map_or(false, |p| skip.contains(&p)) {
                continue;
            }

            zip.start_file(name.as_str(), options)?;
            let mut file_content = Vec::new();
            File::open(path)?.read_to_end(&mut file_content)?;
            zip.write_all(&file_content)?;
            file_count += 1;
            log::debug!("Bundled {}", name);
        }
    }

    zip.finish()?;
    Ok(file_count)
}

/// Extract every entry of `archive_path` under `package`.
///
/// Anything that is not a readable ZIP, or that contains entries escaping the
/// package root, is reported as an unreadable archive.
pub fn unbundle(archive_path: &Path, package: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| Error::unreadable(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::unreadable(archive_path, e))?;

    fs::create_dir_all(package)?;
    let mut file_count = 0;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::unreadable(archive_path, e))?;
        let relative_path = file.enclosed_name().ok_or_else(|| {
            Error::unreadable(archive_path, format!("unsafe entry path '{}'", file.name()))
        })?;
        let outpath = package.join(relative_path);

        if file.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut outfile = File::create(&outpath)?;
            io::copy(&mut file, &mut outfile).map_err(|e| Error::unreadable(archive_path, e))?;
            file_count += 1;
        }
    }

    log::debug!("Extracted {} files from {:?}", file_count, archive_path);
    Ok(file_count)
}
