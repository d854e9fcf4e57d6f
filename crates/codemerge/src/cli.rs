//! Command-line front end.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::app::export::{ExportOptions, Exporter};
use crate::app::listing::{ListingFormat, render_listing};
use crate::app::session::MergeSession;
use crate::domain::model::{MergeOptions, SeparatorStyle, SortKey};
use crate::domain::source::FileSource;
use crate::infra::config::Config;
use crate::infra::fs::{DiskFile, MemoryFile};

#[derive(Debug, Parser)]
#[command(name = "codemerge", author, version)]
#[command(about = "Combine text files into a single document with file headers")]
#[command(after_help = "EXAMPLES:\n  \
    codemerge src/*.rs\n  \
    codemerge --sort name --style hash a.py b.py c.py\n  \
    codemerge --no-separator --stdout notes/*.md\n  \
    cat snippet.txt | codemerge main.rs -")]
pub struct Cli {
    /// Files to merge, in order. Use `-` for standard input.
    pub files: Vec<PathBuf>,

    /// Ordering applied before merging
    #[arg(short, long, value_enum)]
    pub sort: Option<SortKey>,

    /// Character used to frame file headers
    #[arg(long, value_enum)]
    pub style: Option<SeparatorStyle>,

    /// Use a one-line comment marker instead of a framed header
    #[arg(long)]
    pub no_separator: bool,

    /// Maximum number of files accepted
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Write the merged file to this path
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory for the date-stamped merged file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print the merged text to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Copy the merged text to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Show the merge order and exit
    #[arg(long)]
    pub list: bool,

    /// Emit the listing as JSON
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Additional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Load configuration and apply flags on top of it.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load_with_explicit(self.config.as_deref())?;
        if let Some(max) = self.max_files {
            config.limits.set_max_files(max);
        }
        Ok(config)
    }

    fn merge_options(&self, config: &Config) -> MergeOptions {
        let mut options = config.merge.options();
        if self.no_separator {
            options.include_separator = false;
        }
        if let Some(style) = self.style {
            options.separator_style = style;
        }
        options
    }

    fn export_options(&self, config: &Config) -> ExportOptions {
        let mut options = ExportOptions::from_config(config);
        if let Some(dir) = &self.output_dir {
            options.output_dir = dir.clone();
        }
        options.output_path = self.output.clone();
        // an explicit path or directory still gets written alongside stdout
        options.no_file = self.stdout && self.output.is_none() && self.output_dir.is_none();
        options.to_stdout = self.stdout;
        options.copy_to_clipboard |= self.copy;
        options
    }
}

/// Open every input before touching the session so a bad path adds nothing.
fn open_sources(paths: &[PathBuf]) -> Result<Vec<Arc<dyn FileSource>>> {
    let mut stdin_used = false;
    paths
        .iter()
        .map(|path| -> Result<Arc<dyn FileSource>> {
            if path.as_os_str() == "-" {
                anyhow::ensure!(!stdin_used, "standard input can only be given once");
                stdin_used = true;
                return Ok(Arc::new(MemoryFile::from_stdin()?));
            }
            Ok(Arc::new(DiskFile::open(path)?))
        })
        .collect()
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "codemerge", &mut io::stdout());
        return Ok(());
    }

    let config = cli.resolve_config()?;
    let mut session = MergeSession::from_config(&config);
    if let Some(sort) = cli.sort {
        session.set_sort_key(sort);
    }
    session.set_options(cli.merge_options(&config));

    let sources = open_sources(&cli.files)?;
    if let Err(err) = session.add_files(sources) {
        let notice = session.notice().map(str::to_owned).unwrap_or_else(|| err.to_string());
        return Err(err).context(notice);
    }

    if cli.list {
        let format = if cli.json {
            ListingFormat::Json
        } else {
            ListingFormat::Plain
        };
        println!("{}", render_listing(&session.ordered(), format)?);
        return Ok(());
    }

    let report = match session.merge() {
        Ok(Some(report)) => report,
        Ok(None) => anyhow::bail!("no files to merge"),
        Err(err) => {
            let notice = session.notice().unwrap_or("merge failed").to_owned();
            return Err(err).context(notice);
        }
    };

    for failure in &report.failures {
        eprintln!("warning: {}: {}", failure.name, failure.error);
    }

    let exporter = Exporter::new();
    let result = exporter.export(&report.text, &cli.export_options(&config))?;
    if let Some(path) = &result.output_path {
        eprintln!(
            "merged {} file{} into {}",
            report.file_count,
            if report.file_count == 1 { "" } else { "s" },
            path.display()
        );
    }
    if let Some(backend) = result.clipboard {
        eprintln!("copied {} bytes via {backend}", result.bytes_written);
    }
    Ok(())
}
