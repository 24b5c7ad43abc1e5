//! Path validation.
//!
//! Every path handed to a backend is relative to the data directory. This
//! module keeps them that way.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path, ensuring it can't escape the storage root.
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// The normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// otherwise.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use statdata_storage::validate_path;
/// assert!(validate_path("gameData.json").is_ok());
/// assert!(validate_path("temp/gearData/data.json").is_ok());
/// assert!(validate_path("temp/../gameData.json").is_ok()); // (never leaves the root)
/// assert!(validate_path("../gameData.json").is_err());
/// assert!(validate_path("temp/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("temp/./unitData//version.json/").unwrap(),
///     Path::new("temp/unitData/version.json")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                // Null bytes pass through Path::components() on Unix but
                // truncate C-based syscalls.
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(segment)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
