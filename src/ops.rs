// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command execution.
//!
//! Implements the five user-facing operations on top of a loaded manifest:
//! edit, list, which, deploy, and gather. Each operation is one-shot. There
//! is no transactional discipline around deploy or gather, a failure partway
//! through leaves partial results, and rerunning the command is the intended
//! recovery since every copy is idempotent.
//!
//! # Privilege Escalation
//!
//! Units flagged with `root: true` point at destinations the user cannot
//! touch directly, so editing or deploying them runs the underlying command
//! through the [`Elevation`] trait. Production code escalates through sudo,
//! tests swap in a recording double instead.
//!
//! # Symlink Skips
//!
//! Deploy never overwrites a destination that is a symbolic link, and gather
//! refuses to copy through a symlink on either side. Symlink-based dotfile
//! setups stay intact, and the skip is a designed no-op rather than a
//! failure.

use crate::{
    config::{ConfigUnit, Manifest},
    path::{dest_file, find_in_path, source_file, PathError},
    resolve::{resolve, InquirePicker, Picker, ResolveError},
};

use std::{
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use tracing::{debug, info, instrument, warn};

/// Layer of indirection for privilege escalation.
pub trait Elevation {
    /// Run a program with elevated privilege, returning its exit status.
    fn run_elevated(&self, program: &OsStr, args: &[OsString]) -> Result<ExitStatus>;
}

/// Privilege escalation through sudo.
#[derive(Debug, Default)]
pub struct SudoElevation;

impl Elevation for SudoElevation {
    fn run_elevated(&self, program: &OsStr, args: &[OsString]) -> Result<ExitStatus> {
        Ok(Command::new("sudo")
            .arg(program)
            .args(args)
            .spawn()
            .map_err(OpsError::Syscall)?
            .wait()
            .map_err(OpsError::Syscall)?)
    }
}

/// Executor over the five manifest operations.
///
/// Holds the loaded manifest and install root for the lifetime of the
/// process. Interactive selection and privilege escalation are injected so
/// every operation can run under test without a terminal or sudo.
pub struct Executor<P = InquirePicker, E = SudoElevation>
where
    P: Picker,
    E: Elevation,
{
    manifest: Manifest,
    install_root: PathBuf,
    picker: P,
    elevation: E,
}

impl Executor {
    /// Construct new executor with the production picker and elevation.
    pub fn new(manifest: Manifest, install_root: impl Into<PathBuf>) -> Self {
        Self::with_parts(manifest, install_root, InquirePicker, SudoElevation)
    }
}

impl<P, E> Executor<P, E>
where
    P: Picker,
    E: Elevation,
{
    /// Construct new executor from explicit parts.
    pub fn with_parts(
        manifest: Manifest,
        install_root: impl Into<PathBuf>,
        picker: P,
        elevation: E,
    ) -> Self {
        Self {
            manifest,
            install_root: install_root.into(),
            picker,
            elevation,
        }
    }

    /// Open a unit's destination file in the configured editor.
    ///
    /// Spawns the editor as a child process, waits for it to finish, and
    /// returns its exit code so the caller can propagate it. Units flagged
    /// `root: true` run the editor through the elevation strategy instead.
    ///
    /// # Errors
    ///
    /// - Return [`OpsError::Resolve`] if target resolution fails.
    /// - Return [`OpsError::EditorNotFound`] if the editor is not on `$PATH`.
    /// - Return [`OpsError::Syscall`] if the editor cannot be spawned.
    pub fn edit(&self, target: &str, subtarget: Option<&str>) -> Result<i32> {
        let unit = resolve(&self.manifest, target, subtarget, &self.picker)?;
        let dest = dest_file(unit)?;

        let status = if unit.root {
            self.elevation.run_elevated(
                OsStr::new(&self.manifest.editor),
                &[dest.into_os_string()],
            )?
        } else {
            let editor = find_in_path(&self.manifest.editor)
                .ok_or_else(|| OpsError::EditorNotFound(self.manifest.editor.clone()))?;
            debug!("open {:?} with {:?}", dest.display(), editor.display());
            Command::new(editor)
                .arg(&dest)
                .spawn()
                .map_err(OpsError::Syscall)?
                .wait()
                .map_err(OpsError::Syscall)?
        };

        Ok(status.code().unwrap_or(1))
    }

    /// List all target names in manifest order.
    pub fn list(&self) -> Vec<String> {
        self.manifest.configurations.keys().cloned().collect()
    }

    /// Resolve a unit and report its absolute destination path.
    ///
    /// # Errors
    ///
    /// - Return [`OpsError::Resolve`] if target resolution fails.
    /// - Return [`OpsError::Path`] if path resolution fails.
    pub fn which(&self, target: &str, subtarget: Option<&str>) -> Result<PathBuf> {
        let unit = resolve(&self.manifest, target, subtarget, &self.picker)?;
        Ok(dest_file(unit)?)
    }

    /// Copy every tracked source file out to its live destination.
    ///
    /// Creates missing parent directories at the destination. Skips units
    /// whose destination is a symlink, and units whose tracked source does
    /// not exist yet. Units flagged `root: true` copy through the elevation
    /// strategy.
    ///
    /// # Errors
    ///
    /// - Return [`OpsError::Path`] if path resolution fails.
    /// - Return [`OpsError::Copy`] if a copy fails.
    /// - Return [`OpsError::Elevation`] if an elevated command fails.
    #[instrument(skip(self), level = "debug")]
    pub fn deploy(&self) -> Result<()> {
        for (target, units) in &self.manifest.configurations {
            for unit in units {
                self.deploy_unit(target, unit)?;
            }
        }

        Ok(())
    }

    fn deploy_unit(&self, target: &str, unit: &ConfigUnit) -> Result<()> {
        let source = source_file(&self.install_root, target, unit)?;
        let dest = dest_file(unit)?;

        if is_symlink(&dest) {
            warn!("skip {:?}: destination is a symlink", dest.display());
            return Ok(());
        }

        if !source.is_file() {
            warn!("skip {}/{}: no tracked source at {:?}", target, unit.display_name(), source.display());
            return Ok(());
        }

        if unit.root {
            self.copy_elevated(&source, &dest)?;
        } else {
            copy_into_place(&source, &dest)?;
        }

        info!("deployed {:?} -> {:?}", source.display(), dest.display());

        Ok(())
    }

    fn copy_elevated(&self, source: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            let status = self.elevation.run_elevated(
                OsStr::new("mkdir"),
                &["-p".into(), parent.as_os_str().to_os_string()],
            )?;
            if !status.success() {
                return Err(OpsError::Elevation {
                    program: "mkdir".into(),
                    status,
                });
            }
        }

        let status = self.elevation.run_elevated(
            OsStr::new("cp"),
            &[
                source.as_os_str().to_os_string(),
                dest.as_os_str().to_os_string(),
            ],
        )?;
        if !status.success() {
            return Err(OpsError::Elevation {
                program: "cp".into(),
                status,
            });
        }

        Ok(())
    }

    /// Copy every live destination file back into the install tree.
    ///
    /// The reverse of [`deploy`](Self::deploy). Creates missing parent
    /// directories under the install root. Skips units where either side is
    /// a symlink, and units whose destination does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`OpsError::Path`] if path resolution fails.
    /// - Return [`OpsError::Copy`] if a copy fails.
    /// - Return [`OpsError::CreateDir`] if parent creation fails.
    #[instrument(skip(self), level = "debug")]
    pub fn gather(&self) -> Result<()> {
        for (target, units) in &self.manifest.configurations {
            for unit in units {
                self.gather_unit(target, unit)?;
            }
        }

        Ok(())
    }

    fn gather_unit(&self, target: &str, unit: &ConfigUnit) -> Result<()> {
        let source = source_file(&self.install_root, target, unit)?;
        let dest = dest_file(unit)?;

        // INVARIANT: Never copy through a symlink on either side.
        if is_symlink(&dest) || is_symlink(&source) {
            warn!("skip {}/{}: symlink in the way", target, unit.display_name());
            return Ok(());
        }

        if !dest.exists() {
            warn!("skip {}/{}: nothing to gather at {:?}", target, unit.display_name(), dest.display());
            return Ok(());
        }

        // Reversed on purpose, gather pulls live state back in.
        copy_into_place(&dest, &source)?;
        info!("gathered {:?} -> {:?}", dest.display(), source.display());

        Ok(())
    }
}

fn copy_into_place(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        mkdirp::mkdirp(parent).map_err(|source| OpsError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::copy(from, to).map_err(|source| OpsError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

/// Command execution error types.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    /// Target resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Path resolution failed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Configured editor is not on the search path.
    #[error("could not find editor {0:?}")]
    EditorNotFound(String),

    /// Child process could not be spawned or awaited.
    #[error(transparent)]
    Syscall(#[from] std::io::Error),

    /// Elevated command ran but failed.
    #[error("elevated command {program:?} failed: {status}")]
    Elevation {
        program: String,
        status: ExitStatus,
    },

    /// File copy failed.
    #[error("could not copy {from:?} to {to:?}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parent directory creation failed.
    #[error("could not create directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Friendly result alias :3
pub type Result<T, E = OpsError> = std::result::Result<T, E>;
