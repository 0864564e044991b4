// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Manifest layout.
//!
//! Specify the layout of the manifest file that Configurator uses to keep
//! track of every configuration file the user cares about. The manifest maps
//! logical target names to one or more [`ConfigUnit`] entries, each of which
//! pairs a tracked source file with the live destination it gets deployed to.
//!
//! # General Layout
//!
//! A manifest is a YAML document with two top-level fields. The optional
//! `editor` field names the program used to open destination files for
//! editing. The required `configurations` field maps each target name to an
//! ordered sequence of configuration units. Target order in the document is
//! preserved, which is why an [`IndexMap`] backs the mapping.
//!
//! The manifest is loaded once at process start and never written back.
//! Deployment and gathering operate on the files the manifest points at,
//! never on the manifest itself.

use indexmap::IndexMap;
use serde::Deserialize;
use std::{fs::read_to_string, path::Path, str::FromStr};

/// User manifest layout.
///
/// Expected to live at `$HOME/.config/configurator/configurator.yaml`. See
/// [`manifest_path`](crate::path::manifest_path).
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Editor used to open destination files.
    #[serde(default = "default_editor")]
    pub editor: String,

    /// Target name to configuration unit listing, in document order.
    pub configurations: IndexMap<String, Vec<ConfigUnit>>,
}

impl Manifest {
    /// Load manifest from target file path.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NotFound`] if no file exists at the path.
    /// - Return [`ConfigError::Read`] if the file cannot be read.
    /// - Return [`ConfigError::ParseFile`] if deserialization fails, with
    ///   serde_yaml's 1-based line and column in the message.
    /// - Return [`ConfigError::Validate`] if field-level validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let data = read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        data.parse::<Self>().map_err(|error| match error {
            // INVARIANT: Parse errors reported from a file carry its path.
            ConfigError::Parse(source) => ConfigError::ParseFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Field-level checks that the serde layout cannot express.
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        for (target, units) in &self.configurations {
            for (index, unit) in units.iter().enumerate() {
                if unit.source.is_empty() {
                    errors.push(format!(
                        "configurations.{target}[{index}].source: must not be empty"
                    ));
                }

                if unit.dest.is_empty() {
                    errors.push(format!(
                        "configurations.{target}[{index}].dest: must not be empty"
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validate(errors))
        }
    }
}

impl FromStr for Manifest {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let manifest: Manifest = serde_yaml::from_str(data).map_err(ConfigError::Parse)?;
        manifest.validate()?;

        Ok(manifest)
    }
}

/// One tracked source/destination file pair.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigUnit {
    /// Optional display name used to disambiguate between units.
    pub name: Option<String>,

    /// Tracked file path, relative to `<install_root>/<target>/`.
    pub source: String,

    /// Live destination path, may reference environment variables.
    pub dest: String,

    /// Whether editing or deploying this unit requires elevated privilege.
    #[serde(default)]
    pub root: bool,
}

impl ConfigUnit {
    /// Name shown to the user when picking between units.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.source)
    }
}

fn default_editor() -> String {
    std::env::var("EDITOR").unwrap_or_else(|_| String::from("nano"))
}

/// Manifest error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No manifest file at the expected path.
    #[error("could not find configuration file at {0:?}")]
    NotFound(std::path::PathBuf),

    /// Manifest file exists but cannot be read.
    #[error("could not read configuration file at {path:?}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deserialization of manifest data failed.
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),

    /// Deserialization of a manifest file failed.
    #[error("failed to read yaml at {path:?}: {source}")]
    ParseFile {
        path: std::path::PathBuf,
        source: serde_yaml::Error,
    },

    /// Manifest parsed but failed field-level validation.
    #[error("invalid manifest:\n  {}", .0.join("\n  "))]
    Validate(Vec<String>),
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("EDITOR", "vi")])]
    fn deserialize_manifest() -> anyhow::Result<()> {
        let result: Manifest = indoc! {r#"
            editor: nvim
            configurations:
              vim:
                - name: main
                  source: vimrc
                  dest: $HOME/.vimrc
                - source: gvimrc
                  dest: $HOME/.gvimrc
                  root: true
        "#}
        .parse()?;

        let expect = Manifest {
            editor: "nvim".into(),
            configurations: IndexMap::from([(
                "vim".to_string(),
                vec![
                    ConfigUnit {
                        name: Some("main".into()),
                        source: "vimrc".into(),
                        dest: "$HOME/.vimrc".into(),
                        root: false,
                    },
                    ConfigUnit {
                        name: None,
                        source: "gvimrc".into(),
                        dest: "$HOME/.gvimrc".into(),
                        root: true,
                    },
                ],
            )]),
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test(env = [("EDITOR", "vi")])]
    fn editor_defaults_to_environment() -> anyhow::Result<()> {
        let result: Manifest = indoc! {r#"
            configurations:
              shell:
                - source: bashrc
                  dest: $HOME/.bashrc
        "#}
        .parse()?;

        assert_eq!(result.editor, "vi");

        Ok(())
    }

    #[sealed_test]
    fn editor_falls_back_to_nano() -> anyhow::Result<()> {
        std::env::remove_var("EDITOR");
        let result: Manifest = indoc! {r#"
            configurations:
              shell:
                - source: bashrc
                  dest: $HOME/.bashrc
        "#}
        .parse()?;

        assert_eq!(result.editor, "nano");

        Ok(())
    }

    #[test]
    fn missing_configurations_is_schema_error() {
        let result = "editor: vi\n".parse::<Manifest>();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_source_is_schema_error() {
        let result = indoc! {r#"
            configurations:
              vim:
                - dest: $HOME/.vimrc
        "#}
        .parse::<Manifest>();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn unknown_field_is_schema_error() {
        let result = indoc! {r#"
            configurations:
              vim:
                - source: vimrc
                  dest: $HOME/.vimrc
                  sauce: extra
        "#}
        .parse::<Manifest>();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn empty_dest_fails_validation() {
        let result = indoc! {r#"
            configurations:
              vim:
                - source: vimrc
                  dest: ""
        "#}
        .parse::<Manifest>();

        let Err(ConfigError::Validate(errors)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(errors, vec!["configurations.vim[0].dest: must not be empty"]);
    }

    #[test]
    fn target_order_is_preserved() -> anyhow::Result<()> {
        let result: Manifest = indoc! {r#"
            configurations:
              zsh:
                - source: zshrc
                  dest: $HOME/.zshrc
              alacritty:
                - source: alacritty.toml
                  dest: $HOME/.config/alacritty/alacritty.toml
              mutt:
                - source: muttrc
                  dest: $HOME/.muttrc
        "#}
        .parse()?;

        let keys = result.configurations.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(keys, ["zsh", "alacritty", "mutt"]);

        Ok(())
    }

    #[sealed_test]
    fn load_reports_missing_file() {
        let result = Manifest::load("no/such/manifest.yaml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[sealed_test]
    fn load_reports_parse_failure_with_path() -> anyhow::Result<()> {
        std::fs::write("manifest.yaml", "configurations: ]broken\n")?;
        let result = Manifest::load("manifest.yaml");

        let Err(ConfigError::ParseFile { path, .. }) = result else {
            panic!("expected parse failure");
        };
        assert_eq!(path, std::path::PathBuf::from("manifest.yaml"));

        Ok(())
    }
}
