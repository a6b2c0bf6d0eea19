use std::fs;

use blogmark::{
  cli::{Cli, Commands},
  config::Config,
  render,
  serve,
};
use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
      && !parent.exists()
    {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }

    Config::generate_default_config(*format, output).wrap_err_with(|| {
      format!("Failed to generate configuration file: {}", output.display())
    })?;
    return Ok(());
  }

  let config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  match &cli.command {
    Commands::Render {
      input,
      entry,
      format,
      output,
      prerender_cards,
    } => {
      render::run(
        &config,
        input,
        *entry,
        *format,
        output.as_deref(),
        *prerender_cards,
      )
      .wrap_err_with(|| format!("Failed to render {}", input.display()))
    },
    Commands::Serve { bind } => {
      serve::run(&config, *bind).wrap_err("OGP server failed")
    },
    Commands::Init { .. } => Ok(()),
  }
}
