//! Command-line front end.
//!
//! - `linguist-qm compile <catalog.json>...` compiles JSON catalogs
//! - `linguist-qm decompile <file.qm>` turns a compiled catalog back into JSON
//! - `linguist-qm plural-info` lists the built-in plural rules
//!
//! Flags override the project's `.linguist-qm.json`.

use std::io::Write;
use std::path::PathBuf;

use clap::{
    Args,
    Parser,
    Subcommand,
};
use thiserror::Error;

use crate::config::{
    ConfigError,
    ConfigManager,
    Settings,
};
use crate::diagnostics::Diagnostics;
use crate::numerus;
use crate::qm::SaveMode;
use crate::release::{
    self,
    ReleaseError,
};

/// Compiler for compact binary translation catalogs.
#[derive(Debug, Parser)]
#[command(name = "linguist-qm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Explain what is being done.
    #[arg(long, global = true, conflicts_with = "silent")]
    pub verbose: bool,

    /// Do not explain what is being done.
    #[arg(long, global = true)]
    pub silent: bool,

    /// Directory holding `.linguist-qm.json` (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile JSON catalogs into binary catalogs.
    Compile(CompileArgs),
    /// Decode a binary catalog into a JSON catalog.
    Decompile(DecompileArgs),
    /// List the built-in plural rules.
    PluralInfo,
}

/// Arguments of `compile`.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct CompileArgs {
    /// JSON catalogs to compile.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Merge all inputs into this file instead of writing one `.qm` per input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Key messages by id.
    #[arg(long)]
    pub id_based: bool,

    /// Write a stripped catalog with a context table.
    #[arg(long)]
    pub compress: bool,

    /// Leave unfinished translations out.
    #[arg(long)]
    pub no_unfinished: bool,

    /// Drop translations that equal their source text.
    #[arg(long)]
    pub remove_identical: bool,

    /// Emit untranslated messages as PREFIX followed by the source text.
    #[arg(long, value_name = "PREFIX")]
    pub mark_untranslated: Option<String>,

    /// Language code written into every output.
    #[arg(long, value_name = "CODE")]
    pub target_language: Option<String>,

    /// Key records without their comment when that stays unambiguous.
    #[arg(long)]
    pub squeeze_comments: bool,
}

impl CompileArgs {
    /// `settings` with these flags applied on top.
    #[must_use]
    pub fn apply(&self, settings: Settings) -> Settings {
        Settings {
            id_based: settings.id_based || self.id_based,
            save_mode: if self.compress { SaveMode::Stripped } else { settings.save_mode },
            ignore_unfinished: settings.ignore_unfinished || self.no_unfinished,
            remove_identical: settings.remove_identical || self.remove_identical,
            untranslated_prefix: self.mark_untranslated.clone().or(settings.untranslated_prefix),
            target_language: self.target_language.clone().or(settings.target_language),
            squeeze_comments: settings.squeeze_comments || self.squeeze_comments,
            ..settings
        }
    }
}

/// Arguments of `decompile`.
#[derive(Debug, Args)]
pub struct DecompileArgs {
    /// Binary catalog to decode.
    pub input: PathBuf,

    /// Output file (default: the input with a `.json` extension).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Failures that end a CLI run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset: `warn`, or `info` with
    /// `--verbose`.
    ///
    /// Diagnostics are already printed by [`Cli::execute`], so their log
    /// mirror stays off.
    #[must_use]
    pub fn default_log_filter(&self) -> String {
        let level = if self.verbose { "info" } else { "warn" };
        format!("{level},linguist_qm::diagnostics=off")
    }

    /// Effective settings: project file, then flags, then verbosity switches.
    ///
    /// # Errors
    /// Fails when the project file cannot be loaded or the result is invalid.
    pub fn settings(
        &self,
        overrides: impl FnOnce(Settings) -> Settings,
    ) -> Result<Settings, CliError> {
        let root = match &self.project {
            Some(project) => project.clone(),
            None => std::env::current_dir()?,
        };
        let mut manager = ConfigManager::new();
        manager.load_settings(Some(root))?;

        let mut settings = overrides(manager.get_settings().clone());
        if self.silent {
            settings.verbose = false;
        } else if self.verbose {
            settings.verbose = true;
        }
        manager.update_settings(settings)?;
        Ok(manager.get_settings().clone())
    }

    /// Diagnostics sink for the chosen verbosity.
    fn diagnostics(verbose: bool) -> Diagnostics {
        if verbose { Diagnostics::verbose() } else { Diagnostics::new() }
    }

    /// Runs the selected subcommand.
    ///
    /// Diagnostics are written to `stderr` even when the run fails.
    ///
    /// # Errors
    /// Fails on configuration, I/O, encoding and decoding errors.
    pub fn execute(&self, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<(), CliError> {
        match &self.command {
            Commands::Compile(args) => {
                let settings = self.settings(|settings| args.apply(settings))?;
                let mut diagnostics = Self::diagnostics(settings.verbose);
                let result = release::release_files(
                    &args.inputs,
                    args.output.as_deref(),
                    &settings,
                    &mut diagnostics,
                );
                stderr.write_all(diagnostics.error().as_bytes())?;
                let written = result?;
                tracing::debug!(files = written.len(), "Compile finished");
                Ok(())
            }
            Commands::Decompile(args) => {
                let settings = self.settings(|settings| settings)?;
                let mut diagnostics = Self::diagnostics(settings.verbose);
                let result =
                    release::decompile_file(&args.input, args.output.as_deref(), &mut diagnostics);
                stderr.write_all(diagnostics.error().as_bytes())?;
                let output = result?;
                if settings.verbose {
                    writeln!(stderr, "Wrote '{}'", output.display())?;
                }
                Ok(())
            }
            Commands::PluralInfo => {
                stdout.write_all(numerus::numerus_info_report().as_bytes())?;
                Ok(())
            }
        }
    }
}
