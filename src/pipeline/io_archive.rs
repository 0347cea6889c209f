// Locating data files inside the downloaded ZIP archives.

use std::fs::File;
use std::io::{Read, Seek};

use log::{debug, info};
use snafu::prelude::*;
use zip::ZipArchive;

use crate::pipeline::*;

pub fn is_archive(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".zip")
}

pub fn read_archive_entry_path(
    path: &str,
    entry: Option<&str>,
    extension: &str,
) -> MapResult<Vec<u8>> {
    let file = File::open(path).context(ReadingInputSnafu { path })?;
    read_archive_entry(file, path, entry, extension)
}

/// Reads one entry out of a ZIP archive. The entry is picked by exact name
/// when `entry` is given, otherwise the first one with the wanted extension
/// is used.
pub fn read_archive_entry<R: Read + Seek>(
    input: R,
    path: &str,
    entry: Option<&str>,
    extension: &str,
) -> MapResult<Vec<u8>> {
    let mut archive = ZipArchive::new(input).context(ZipOpenSnafu { path })?;

    let name = match entry {
        Some(n) => n.to_string(),
        None => {
            let mut found: Option<String> = None;
            for idx in 0..archive.len() {
                let candidate = archive.by_index(idx).context(ZipOpenSnafu { path })?;
                if candidate.name().to_ascii_lowercase().ends_with(extension) {
                    found = Some(candidate.name().to_string());
                    break;
                }
            }
            found.context(ZipEntryMissingSnafu {
                wanted: extension,
                path,
            })?
        }
    };
    info!("read_archive_entry: using entry {:?} of {}", name, path);

    let mut file = archive.by_name(&name).ok().context(ZipEntryMissingSnafu {
        wanted: name.clone(),
        path,
    })?;
    let mut buf: Vec<u8> = Vec::new();
    file.read_to_end(&mut buf).context(ReadingInputSnafu { path })?;
    debug!("read_archive_entry: {} bytes read", buf.len());
    Ok(buf)
}
