// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Personal configuration file manager.
//!
//! Configurator keeps track of configuration files scattered across the
//! user's filesystem through a single declarative YAML manifest. The
//! manifest maps logical target names like "vim" to one or more
//! source/destination file pairs. On top of that mapping the tool can open a
//! destination in the user's editor, list and locate tracked targets, deploy
//! tracked sources out to their live destinations, and gather live
//! destinations back into the tracked install tree.
//!
//! # Manifest
//!
//! The manifest lives at `$HOME/.config/configurator/configurator.yaml`:
//!
//! ```yaml
//! editor: nvim
//! configurations:
//!   vim:
//!     - source: vimrc
//!       dest: $HOME/.vimrc
//!   boot:
//!     - name: refind
//!       source: refind.conf
//!       dest: /boot/efi/EFI/refind/refind.conf
//!       root: true
//! ```
//!
//! Tracked source files live under the install root, one subdirectory per
//! target, `$XDG_DATA_HOME/configurator` by default.

pub mod config;
pub mod ops;
pub mod path;
pub mod resolve;

#[doc(inline)]
pub use crate::{
    config::{ConfigUnit, Manifest},
    ops::Executor,
};
