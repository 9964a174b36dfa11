//! Cached retrieval of the pipeline's remote inputs.
//!
//! A file already present at the destination path counts as fetched and
//! is never re-downloaded or checksummed; delete the cache to force a
//! refresh.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::map::GridMapError;

/// Download `url` to `dest` unless `dest` already exists.
///
/// Returns `true` if a download happened, `false` on a cache hit.
/// Parent directories are created as needed. A partial download is
/// removed so a failed run does not poison the cache.
pub fn fetch_cached(url: &str, dest: &Path) -> Result<bool, GridMapError> {
    if dest.exists() {
        return Ok(false);
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let response = ureq::get(url)
        .call()
        .map_err(|e| GridMapError::Fetch(url.to_string(), e.to_string()))?;

    let mut reader = response.into_reader();
    let mut file = File::create(dest)?;
    if let Err(e) = io::copy(&mut reader, &mut file) {
        drop(file);
        let _ = fs::remove_file(dest);
        return Err(e.into());
    }
    Ok(true)
}
