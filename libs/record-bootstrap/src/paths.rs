use std::env;
use std::path::{Path, PathBuf};

/// Errors for resolving configured paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("HOME environment variable is not set")]
    HomeMissing,
    #[error("path must not be empty")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Expand `~` prefix to user home directory.
///
/// Returns the path unchanged if no tilde prefix is present.
/// On Windows, uses `USERPROFILE` or `HOME` environment variable.
/// On Unix, uses `HOME` environment variable.
///
/// # Errors
/// [`PathError::HomeMissing`] when the path starts with `~` and no home
/// directory is known.
pub fn expand_tilde(raw: &str) -> Result<PathBuf, PathError> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(PathBuf::from(raw));
    };

    #[cfg(target_os = "windows")]
    let home = env::var("USERPROFILE")
        .or_else(|_| env::var("HOME"))
        .map_err(|_| PathError::HomeMissing)?;
    #[cfg(not(target_os = "windows"))]
    let home = env::var("HOME").map_err(|_| PathError::HomeMissing)?;

    // "~user" forms are not supported; they resolve under the current user's home.
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(PathBuf::from(home))
    } else {
        Ok(Path::new(&home).join(rest))
    }
}

/// Resolve a configured directory to an absolute path.
///
/// `~` is expanded and relative paths are anchored at the current working
/// directory. The directory itself is not created.
///
/// # Errors
/// [`PathError`] when the path is empty, the home directory is unknown or the
/// working directory cannot be determined.
pub fn resolve_dir(raw: &str) -> Result<PathBuf, PathError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = expand_tilde(raw)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(env::current_dir()?.join(expanded))
    }
}

/// Resolve `raw` against `base` unless it is already absolute.
///
/// # Errors
/// [`PathError::HomeMissing`] when `~` cannot be expanded.
pub fn resolve_in(base: &Path, raw: &str) -> Result<PathBuf, PathError> {
    let expanded = expand_tilde(raw)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}
