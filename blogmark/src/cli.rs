use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

/// Command line interface for blogmark
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Render blog Markdown and serve link-card metadata"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, dotted keys for
  /// sections, e.g. `server.bind=0.0.0.0:8787`)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// Output format of `render`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
  /// The rendered HTML fragment
  #[default]
  Html,
  /// `{ "html": ..., "headings": [...] }`
  Json,
}

/// File format of a generated configuration file.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
  #[default]
  Toml,
  Json,
}

/// All supported subcommands for the blogmark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render a Markdown article to HTML.
  Render {
    /// Markdown file to render, or a CMS entry with `--entry`.
    input: PathBuf,

    /// Treat the input as a CMS entry record (JSON) and render its content.
    #[arg(long)]
    entry: bool,

    /// Output format.
    #[arg(short = 'F', long, value_enum, default_value_t = RenderFormat::Html)]
    format: RenderFormat,

    /// Write to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resolve link cards now, fetching their metadata in-process.
    #[arg(long = "prerender-cards")]
    prerender_cards: bool,
  },

  /// Serve the OGP endpoint for link-card hydration.
  Serve {
    /// Address to listen on. Overrides `server.bind`.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
  },

  /// Initialize a new blogmark configuration file.
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "blogmark.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, value_enum, default_value_t = ConfigFormat::Toml)]
    format: ConfigFormat,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
