// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine absolute paths for the manifest itself, and for the source and
//! destination sides of every configuration unit. Resolution performs shell
//! expansion followed by lexical normalization, and never touches the
//! filesystem, so resolving the same unit twice always yields the same path.

use crate::config::ConfigUnit;

use std::{
    env,
    path::{Component, Path, PathBuf},
};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Determine absolute path to the user's manifest file.
///
/// The manifest always lives at
/// `$HOME/.config/configurator/configurator.yaml`. Does not check if the
/// path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn manifest_path() -> Result<PathBuf> {
    Ok(home_dir()?
        .join(".config")
        .join("configurator")
        .join("configurator.yaml"))
}

/// Determine default absolute path to the install root.
///
/// The install root is the directory tree that holds every tracked source
/// file, one subdirectory per target. Uses XDG Base Directory path
/// `$XDG_DATA_HOME/configurator` as the default. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_install_root() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|path| path.join("configurator"))
        .ok_or(PathError::NoWayHome)
}

/// Resolve absolute path to a unit's tracked source file.
///
/// Joins `<install_root>/<target>/<unit.source>`, expands environment
/// variables, and normalizes the result to an absolute path.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if the path references an
///   environment variable that is not set.
/// - Return [`PathError::CurrentDir`] if the path is relative and the
///   current working directory cannot be determined.
pub fn source_file(install_root: &Path, target: &str, unit: &ConfigUnit) -> Result<PathBuf> {
    absolutize(expand(install_root.join(target).join(&unit.source))?)
}

/// Resolve absolute path to a unit's live destination file.
///
/// Expands environment variables in `unit.dest`, and normalizes the result
/// to an absolute path.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if the path references an
///   environment variable that is not set.
/// - Return [`PathError::CurrentDir`] if the path is relative and the
///   current working directory cannot be determined.
pub fn dest_file(unit: &ConfigUnit) -> Result<PathBuf> {
    absolutize(expand(&unit.dest)?)
}

/// Locate a program on the `$PATH` search path.
///
/// Names containing a path separator are checked as given. Returns [`None`]
/// when no matching file exists.
pub fn find_in_path(program: impl AsRef<Path>) -> Option<PathBuf> {
    let program = program.as_ref();
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

fn expand(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref().to_string_lossy().into_owned();
    Ok(PathBuf::from(
        shellexpand::full(path.as_str())
            .map_err(PathError::ShellExpansion)?
            .into_owned(),
    ))
}

fn absolutize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map_err(PathError::CurrentDir)?
            .join(path)
    };

    // Lexical normalization only, symlinks are left unresolved on purpose.
    let mut normalized = PathBuf::new();
    for component in full.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    Ok(normalized)
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Shell expansion hit an unset environment variable.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Current working directory cannot be determined.
    #[error("cannot determine current working directory")]
    CurrentDir(#[source] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
