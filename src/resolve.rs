// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target resolution.
//!
//! Given a target name and an optional subtarget selector, find the one
//! [`ConfigUnit`] the user means. A target with a single unit resolves
//! directly. A target with several units is disambiguated by the subtarget:
//! an all-digit selector picks by 1-based position, anything else must match
//! a unit's display name exactly. When no subtarget is supplied at all, the
//! user gets prompted to pick interactively.
//!
//! Prompting sits behind the [`Picker`] trait so resolution stays testable
//! without a terminal attached.

use crate::config::{ConfigUnit, Manifest};

use inquire::Select;

/// Layer of indirection for interactive unit selection.
pub trait Picker {
    /// Pick one entry out of the display names, returning its 0-based index.
    fn pick(&self, names: &[String]) -> Result<usize>;
}

/// Interactive selection through an inquire prompt.
///
/// The cursor starts on the first entry, so a plain Enter keeps the
/// historical "default to entry 1" behavior.
#[derive(Debug, Default)]
pub struct InquirePicker;

impl Picker for InquirePicker {
    fn pick(&self, names: &[String]) -> Result<usize> {
        let choice = Select::new("Which file do you want to edit?", names.to_vec())
            .with_starting_cursor(0)
            .raw_prompt()
            .map_err(ResolveError::Prompt)?;

        Ok(choice.index)
    }
}

/// Resolve a target and optional subtarget to a single configuration unit.
///
/// # Errors
///
/// - Return [`ResolveError::UnknownTarget`] if the target is not a manifest
///   key.
/// - Return [`ResolveError::NoEntries`] if the target's unit list is empty.
/// - Return [`ResolveError::NoSuchEntry`] if the subtarget matches nothing,
///   including out-of-range numeric selectors.
/// - Return [`ResolveError::Prompt`] if interactive selection fails.
pub fn resolve<'m>(
    manifest: &'m Manifest,
    target: &str,
    subtarget: Option<&str>,
    picker: &impl Picker,
) -> Result<&'m ConfigUnit> {
    let units = manifest
        .configurations
        .get(target)
        .ok_or_else(|| ResolveError::UnknownTarget(target.to_string()))?;

    if units.is_empty() {
        return Err(ResolveError::NoEntries(target.to_string()));
    }

    // INVARIANT: A lone unit with no subtarget never prompts.
    if units.len() == 1 && subtarget.is_none() {
        return Ok(&units[0]);
    }

    let names = units
        .iter()
        .map(|unit| unit.display_name().to_string())
        .collect::<Vec<_>>();

    match subtarget {
        Some(selector) => select(units, &names, selector),
        None => Ok(&units[picker.pick(&names)?]),
    }
}

fn select<'m>(
    units: &'m [ConfigUnit],
    names: &[String],
    selector: &str,
) -> Result<&'m ConfigUnit> {
    if !selector.is_empty() && selector.chars().all(|c| c.is_ascii_digit()) {
        // 1-based position into the unit list.
        return selector
            .parse::<usize>()
            .ok()
            .and_then(|ordinal| ordinal.checked_sub(1))
            .and_then(|index| units.get(index))
            .ok_or_else(|| ResolveError::NoSuchEntry(selector.to_string()));
    }

    names
        .iter()
        .position(|name| name == selector)
        .map(|index| &units[index])
        .ok_or_else(|| ResolveError::NoSuchEntry(selector.to_string()))
}

/// Target resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Target is not a key of the manifest's configurations.
    #[error("unknown configuration {0:?}")]
    UnknownTarget(String),

    /// Target exists but its unit list is empty.
    #[error("no configurations for {0:?}")]
    NoEntries(String),

    /// Subtarget selector matched no unit.
    #[error("no such file {0:?}")]
    NoSuchEntry(String),

    /// Interactive selection failed.
    #[error(transparent)]
    Prompt(#[from] inquire::InquireError),
}

/// Friendly result alias :3
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    /// Picker double that must never be consulted.
    struct NoPrompt;

    impl Picker for NoPrompt {
        fn pick(&self, _: &[String]) -> Result<usize> {
            panic!("resolution should not have prompted");
        }
    }

    /// Picker double that always picks a fixed entry.
    struct Canned(usize);

    impl Picker for Canned {
        fn pick(&self, _: &[String]) -> Result<usize> {
            Ok(self.0)
        }
    }

    fn manifest() -> Manifest {
        indoc! {r#"
            editor: vi
            configurations:
              vim:
                - name: a
                  source: vimrc
                  dest: /tmp/.vimrc
                - name: b
                  source: gvimrc
                  dest: /tmp/.gvimrc
                - source: ideavimrc
                  dest: /tmp/.ideavimrc
              shell:
                - source: bashrc
                  dest: /tmp/.bashrc
              hollow: []
        "#}
        .parse()
        .unwrap()
    }

    #[test]
    fn lone_unit_resolves_without_prompt() {
        let manifest = manifest();
        let unit = resolve(&manifest, "shell", None, &NoPrompt).unwrap();
        assert_eq!(unit.source, "bashrc");
    }

    #[test_case("1", "vimrc"; "first by ordinal")]
    #[test_case("2", "gvimrc"; "second by ordinal")]
    #[test_case("b", "gvimrc"; "by display name")]
    #[test_case("ideavimrc", "ideavimrc"; "by source fallback name")]
    #[test]
    fn subtarget_selects_without_prompt(selector: &str, expect: &str) {
        use pretty_assertions::assert_eq;
        let manifest = manifest();
        let unit = resolve(&manifest, "vim", Some(selector), &NoPrompt).unwrap();
        assert_eq!(unit.source, expect);
    }

    #[test]
    fn missing_subtarget_prompts() {
        let manifest = manifest();
        let unit = resolve(&manifest, "vim", None, &Canned(2)).unwrap();
        assert_eq!(unit.source, "ideavimrc");
    }

    #[test]
    fn unknown_target_is_an_error() {
        let manifest = manifest();
        let result = resolve(&manifest, "foo", None, &NoPrompt);
        assert!(matches!(result, Err(ResolveError::UnknownTarget(_))));
    }

    #[test]
    fn empty_target_is_an_error() {
        let manifest = manifest();
        let result = resolve(&manifest, "hollow", None, &NoPrompt);
        assert!(matches!(result, Err(ResolveError::NoEntries(_))));
    }

    #[test_case("0"; "ordinal zero")]
    #[test_case("4"; "ordinal past the end")]
    #[test_case("nope"; "unmatched name")]
    #[test]
    fn bad_subtarget_is_an_error(selector: &str) {
        let manifest = manifest();
        let result = resolve(&manifest, "vim", Some(selector), &NoPrompt);
        assert!(matches!(result, Err(ResolveError::NoSuchEntry(_))));
    }
}
