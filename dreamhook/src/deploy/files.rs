use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::os::unix::fs::{chown, MetadataExt};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{io_error, Result};

const CHUNK_SIZE: usize = 8192;

/// `<path>.bak`, where the replaced file is kept for manual rollback
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Byte-for-byte comparison of two files
pub fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let a_len = fs::metadata(a).map_err(io_error(a))?.len();
    let b_len = fs::metadata(b).map_err(io_error(b))?.len();
    if a_len != b_len {
        return Ok(false);
    }

    let mut a_reader = BufReader::new(File::open(a).map_err(io_error(a))?);
    let mut b_reader = BufReader::new(File::open(b).map_err(io_error(b))?);
    let mut a_buf = [0u8; CHUNK_SIZE];
    let mut b_buf = [0u8; CHUNK_SIZE];
    loop {
        let read = read_chunk(&mut a_reader, &mut a_buf).map_err(io_error(a))?;
        let b_read = read_chunk(&mut b_reader, &mut b_buf).map_err(io_error(b))?;
        if read != b_read || a_buf[..read] != b_buf[..read] {
            return Ok(false);
        }
        if read == 0 {
            return Ok(true);
        }
    }
}

fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Replaces `old` with a copy of `new`, keeping the previous file at
/// [`backup_path`] and carrying over its owner, group and mode.
///
/// Returns `false` without touching anything when both files are equal.
pub fn deploy_file(file_type: &str, old: &Path, new: &Path) -> Result<bool> {
    if same_contents(old, new)? {
        warn!(
            path = %old.display(),
            "{} matches new {}, skipping deployment",
            old.display(),
            file_type
        );
        return Ok(false);
    }

    let metadata = fs::metadata(old).map_err(io_error(old))?;
    let backup = backup_path(old);
    fs::rename(old, &backup).map_err(io_error(old))?;
    fs::copy(new, old).map_err(io_error(old))?;
    // chown first, it may clear setuid/setgid bits that chmod restores
    chown(old, Some(metadata.uid()), Some(metadata.gid())).map_err(io_error(old))?;
    fs::set_permissions(old, metadata.permissions()).map_err(io_error(old))?;

    info!(
        path = %old.display(),
        backup = %backup.display(),
        "successfully deployed new {}",
        file_type
    );
    Ok(true)
}
