//! Location of the backing store file.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::CoreError;

/// Environment variable that overrides the store location.
pub const PATH_ENV: &str = "LCLIP_PATH";

/// File name of the store inside the home directory.
pub const DEFAULT_FILE_NAME: &str = ".lclip.json";

/// Resolve the store path: `$LCLIP_PATH` when set and non-empty, otherwise
/// `~/.lclip.json`.
pub fn default_path() -> Result<PathBuf, CoreError> {
    resolve(std::env::var_os(PATH_ENV), dirs::home_dir())
}

fn resolve(env_override: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf, CoreError> {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    home.map(|h| h.join(DEFAULT_FILE_NAME))
        .ok_or(CoreError::HomeDirNotFound)
}
