//! Single-entry zip compression of backup artifacts

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for archives
pub const COMPRESSION_LEVEL: i64 = 9;

/// Compress `source` into a zip archive at `target` holding exactly one entry
///
/// The entry is named after the source file. Success is only reported once the
/// archive has been finished and synced to disk. An archive left behind by a
/// failed write is removed; an existing archive is untouched when the source
/// cannot be read.
pub fn compress_file(source: &Path, target: &Path) -> Result<()> {
    info!("Compressing {:?} -> {:?}", source, target);

    let entry_name = source
        .file_name()
        .context("Source path has no file name")?
        .to_str()
        .context("Source file name is not valid UTF-8")?;

    let input = File::open(source).with_context(|| format!("Failed to open {:?}", source))?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let output =
        File::create(target).with_context(|| format!("Failed to create archive {:?}", target))?;

    let result = write_archive(BufReader::new(input), output, entry_name);

    match result {
        Ok(()) => info!("Archive written: {:?}", target),
        Err(_) => {
            if let Err(e) = fs::remove_file(target) {
                debug!("Failed to remove partial archive {:?}: {}", target, e);
            }
        }
    }

    result
}

fn write_archive(mut reader: impl Read, output: File, entry_name: &str) -> Result<()> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .large_file(true);

    let mut zip = ZipWriter::new(output);
    zip.start_file(entry_name, options)
        .context("Failed to start archive entry")?;
    io::copy(&mut reader, &mut zip).context("Failed to write archive entry")?;

    let file = zip.finish().context("Failed to finalize archive")?;
    file.sync_all().context("Failed to flush archive to disk")?;
    Ok(())
}
