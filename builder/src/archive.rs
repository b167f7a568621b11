/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use flate2::{Compression, write::GzEncoder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tar::{EntryType, Header};
use tracing::debug;
use walkdir::WalkDir;

/// Streams `source` into a gzip-compressed tar at `archive_path`, with every
/// entry placed under `root_name/`. Returns the archive size in bytes.
///
/// Blocking; run it on the blocking pool.
pub fn create_archive(source: &Path, archive_path: &Path, root_name: &str) -> Result<u64> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive {}", archive_path.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut entries = 0usize;
    for entry in WalkDir::new(source).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(source)
            .context("Failed to relativize archive path")?;

        let mut entry_name = PathBuf::from(root_name);
        if !relative.as_os_str().is_empty() {
            entry_name.push(relative);
        }

        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());

        let mut header = Header::new_gnu();
        header.set_mtime(mtime);

        if metadata.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder
                .append_data(&mut header, &entry_name, std::io::empty())
                .with_context(|| format!("Failed to add directory {}", entry_name.display()))?;
        } else if metadata.is_file() {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(if is_executable(&metadata) { 0o755 } else { 0o644 });
            header.set_size(metadata.len());
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            builder
                .append_data(&mut header, &entry_name, file)
                .with_context(|| format!("Failed to add file {}", entry_name.display()))?;
        } else {
            debug!(path = %path.display(), "Skipping special file during archive");
            continue;
        }

        entries += 1;
    }

    let encoder = builder.into_inner().context("Failed to finish tar stream")?;
    let mut writer = encoder.finish().context("Failed to finish gzip stream")?;
    writer.flush().context("Failed to flush archive")?;
    drop(writer);

    let size = fs::metadata(archive_path)
        .with_context(|| format!("Failed to stat archive {}", archive_path.display()))?
        .len();

    debug!(entries, size, archive = %archive_path.display(), "Archive written");
    Ok(size)
}

fn is_executable(metadata: &fs::Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        return metadata.permissions().mode() & 0o111 != 0;
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        false
    }
}
