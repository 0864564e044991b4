// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use configurator::{
    config::Manifest,
    ops::Executor,
    path::{default_install_root, manifest_path},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "configurator [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Directory tree holding tracked source files.
    #[arg(short = 'r', long, global = true, value_name = "path")]
    pub install_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<i32> {
        let manifest = Manifest::load(manifest_path()?)?;
        let install_root = match self.install_root {
            Some(path) => path,
            None => default_install_root()?,
        };
        let executor = Executor::new(manifest, install_root);

        match self.command {
            Command::Edit(opts) => {
                let code = executor.edit(&opts.target, opts.subtarget.as_deref())?;
                Ok(code)
            }
            Command::List => {
                for target in executor.list() {
                    println!("{target}");
                }
                Ok(0)
            }
            Command::Which(opts) => {
                let dest = executor.which(&opts.target, opts.subtarget.as_deref())?;
                println!("{}", dest.display());
                Ok(0)
            }
            Command::Deploy => {
                executor.deploy()?;
                Ok(0)
            }
            Command::Gather => {
                executor.gather()?;
                Ok(0)
            }
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Open a tracked configuration file in the configured editor.
    #[command(override_usage = "configurator edit [options] <target> [subtarget]")]
    Edit(TargetOptions),

    /// Print all target names in manifest order.
    #[command(override_usage = "configurator list [options]")]
    List,

    /// Print the resolved destination path of a tracked configuration file.
    #[command(override_usage = "configurator which [options] <target> [subtarget]")]
    Which(TargetOptions),

    /// Copy all tracked source files to their live destinations.
    #[command(override_usage = "configurator deploy [options]")]
    Deploy,

    /// Copy all live destination files back into the install tree.
    #[command(override_usage = "configurator gather [options]")]
    Gather,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct TargetOptions {
    /// What configuration target?
    #[arg(value_name = "target")]
    pub target: String,

    /// Specifically which file of the target?
    #[arg(value_name = "subtarget")]
    pub subtarget: Option<String>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match run() {
        Ok(code) => exit(code),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn run() -> Result<i32> {
    Cli::parse().run()
}
