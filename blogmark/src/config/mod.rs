//! Configuration for the blogmark CLI.
//!
//! Configuration files are TOML or JSON, chosen by extension. Several files
//! merge in order (objects key by key, arrays appended, everything else
//! replaced) and `--config KEY=VALUE` overrides are applied last.
pub mod templates;

use std::{
  fs,
  net::SocketAddr,
  path::{Path, PathBuf},
  time::Duration,
};

use blogmark_markdown::{MarkdownOptions, MarkdownOptionsBuilder};
use blogmark_ogp::{OgpConfig, config::default_user_agent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  cli::ConfigFormat,
  error::{BlogmarkError, Result},
};

const fn default_true() -> bool {
  true
}

fn default_highlight_theme() -> String {
  "InspiredGitHub".to_string()
}

const fn default_max_nesting_depth() -> usize {
  blogmark_markdown::processor::types::DEFAULT_MAX_NESTING_DEPTH
}

fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 8787))
}

const fn default_timeout_secs() -> u64 {
  blogmark_ogp::config::DEFAULT_TIMEOUT.as_secs()
}

const fn default_max_body_bytes() -> usize {
  blogmark_ogp::config::DEFAULT_MAX_BODY_BYTES
}

const fn default_rate_limit_window_secs() -> u64 {
  blogmark_ogp::config::DEFAULT_RATE_LIMIT_WINDOW.as_secs()
}

const fn default_rate_limit_max_requests() -> u32 {
  blogmark_ogp::config::DEFAULT_RATE_LIMIT_MAX_REQUESTS
}

/// Configuration options for blogmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
  /// Markdown rendering
  #[serde(default)]
  pub markdown: MarkdownConfig,

  /// HTTP server of `blogmark serve`
  #[serde(default)]
  pub server: ServerConfig,

  /// Fetching and rate limiting of OGP lookups
  #[serde(default)]
  pub ogp: OgpSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkdownConfig {
  /// Enable GitHub Flavored Markdown extensions
  #[serde(default = "default_true")]
  pub gfm: bool,

  /// Whether to enable syntax highlighting for code blocks
  #[serde(default = "default_true")]
  pub highlight_code: bool,

  /// Syntax highlighting theme
  #[serde(default = "default_highlight_theme")]
  pub highlight_theme: String,

  /// Turn bare-URL paragraphs into link cards
  #[serde(default = "default_true")]
  pub link_cards: bool,

  /// Documents nested deeper than this render as escaped text
  #[serde(default = "default_max_nesting_depth")]
  pub max_nesting_depth: usize,
}

impl Default for MarkdownConfig {
  fn default() -> Self {
    Self {
      gfm:               true,
      highlight_code:    true,
      highlight_theme:   default_highlight_theme(),
      link_cards:        true,
      max_nesting_depth: default_max_nesting_depth(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
  /// Address the OGP endpoint listens on
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,

  /// Origins allowed by CORS. Empty allows any origin.
  #[serde(default)]
  pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind:            default_bind(),
      allowed_origins: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OgpSettings {
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,

  #[serde(default = "default_max_body_bytes")]
  pub max_body_bytes: usize,

  #[serde(default = "default_user_agent")]
  pub user_agent: String,

  #[serde(default = "default_rate_limit_window_secs")]
  pub rate_limit_window_secs: u64,

  #[serde(default = "default_rate_limit_max_requests")]
  pub rate_limit_max_requests: u32,
}

impl Default for OgpSettings {
  fn default() -> Self {
    Self {
      timeout_secs:            default_timeout_secs(),
      max_body_bytes:          default_max_body_bytes(),
      user_agent:              default_user_agent(),
      rate_limit_window_secs:  default_rate_limit_window_secs(),
      rate_limit_max_requests: default_rate_limit_max_requests(),
    }
  }
}

impl Config {
  /// Create a new configuration from a file
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    Self::from_value(read_value(path.as_ref())?)
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Without explicit files a config file is searched for in the usual
  /// places (see [`Config::find_config_file`]); without any file the defaults
  /// apply.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be read or parsed, if an override is
  /// malformed, or if the result contains unknown keys or mistyped values.
  pub fn load(config_files: &[PathBuf], overrides: &[String]) -> Result<Self> {
    let mut merged = Value::Object(Map::new());

    if config_files.is_empty() {
      if let Some(discovered) = Self::find_config_file() {
        log::info!("Using discovered config file: {}", discovered.display());
        merged = read_value(&discovered)?;
      }
    } else {
      for path in config_files {
        merge_values(&mut merged, read_value(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
    }

    let mut config = Self::from_value(merged)?;
    if !overrides.is_empty() {
      config.apply_overrides(overrides)?;
    }
    Ok(config)
  }

  fn from_value(value: Value) -> Result<Self> {
    serde_json::from_value(value)
      .map_err(|e| BlogmarkError::Config(format!("Invalid configuration: {e}")))
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Keys are dotted paths such as `ogp.timeout_secs`. Values are read as
  /// JSON when they parse as such (`true`, `42`, `["a"]`) and as plain strings
  /// otherwise.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not `KEY=VALUE`, names an unknown
  /// key, or has a value of the wrong type.
  pub fn apply_overrides(&mut self, overrides: &[String]) -> Result<()> {
    let mut value = serde_json::to_value(&*self)?;

    for override_str in overrides {
      let (key, raw) = override_str.split_once('=').ok_or_else(|| {
        BlogmarkError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;
      set_path(&mut value, key.trim(), parse_override_value(raw.trim()))?;
    }

    *self = Self::from_value(value)?;
    Ok(())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    let local = [
      "blogmark.toml",
      "blogmark.json",
      ".blogmark.toml",
      ".blogmark.json",
      ".config/blogmark.toml",
      ".config/blogmark.json",
    ]
    .iter()
    .map(|name| current_dir.join(name));

    let user = std::env::var_os("XDG_CONFIG_HOME")
      .map(PathBuf::from)
      .or_else(|| {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
      })
      .map(|dir| dir.join("blogmark"))
      .into_iter()
      .flat_map(|dir| [dir.join("config.toml"), dir.join("config.json")]);

    local.chain(user).find(|path| path.is_file())
  }

  /// Options for the Markdown processor.
  #[must_use]
  pub fn markdown_options(&self) -> MarkdownOptions {
    MarkdownOptionsBuilder::new()
      .gfm(self.markdown.gfm)
      .highlight_code(self.markdown.highlight_code)
      .highlight_theme(Some(self.markdown.highlight_theme.as_str()))
      .link_cards(self.markdown.link_cards)
      .max_nesting_depth(self.markdown.max_nesting_depth)
      .build()
  }

  /// Settings for the OGP service.
  #[must_use]
  pub fn ogp_config(&self) -> OgpConfig {
    OgpConfig {
      timeout:                 Duration::from_secs(self.ogp.timeout_secs),
      max_body_bytes:          self.ogp.max_body_bytes,
      user_agent:              self.ogp.user_agent.clone(),
      rate_limit_window:       Duration::from_secs(
        self.ogp.rate_limit_window_secs,
      ),
      rate_limit_max_requests: self.ogp.rate_limit_max_requests,
    }
  }

  /// Write a default configuration file in the given format.
  ///
  /// # Errors
  ///
  /// Returns an error if the configuration cannot be serialized or written.
  pub fn generate_default_config(
    format: ConfigFormat,
    path: &Path,
  ) -> Result<()> {
    let content = match format {
      ConfigFormat::Toml => templates::DEFAULT_TOML_TEMPLATE.to_string(),
      ConfigFormat::Json => {
        let mut json = serde_json::to_string_pretty(&Self::default())?;
        json.push('\n');
        json
      },
    };

    fs::write(path, content)?;
    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

/// Read a config file into a JSON value, by extension.
fn read_value(path: &Path) -> Result<Value> {
  let content = fs::read_to_string(path).map_err(|e| {
    BlogmarkError::Config(format!(
      "Failed to read config file {}: {e}",
      path.display()
    ))
  })?;

  let extension = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase);
  match extension.as_deref() {
    Some("json") => Ok(serde_json::from_str(&content)?),
    Some("toml") => Ok(toml::from_str(&content)?),
    Some(_) => {
      Err(BlogmarkError::Config(format!(
        "Unsupported config file format: {}",
        path.display()
      )))
    },
    None => {
      Err(BlogmarkError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )))
    },
  }
}

/// Merge `other` into `base`: objects recursively, arrays appended, other
/// values replaced.
fn merge_values(base: &mut Value, other: Value) {
  match (base, other) {
    (Value::Object(base), Value::Object(other)) => {
      for (key, value) in other {
        match base.get_mut(&key) {
          Some(existing) => merge_values(existing, value),
          None => {
            base.insert(key, value);
          },
        }
      }
    },
    (Value::Array(base), Value::Array(other)) => base.extend(other),
    (base, other) => *base = other,
  }
}

fn parse_override_value(raw: &str) -> Value {
  match serde_json::from_str::<Value>(raw) {
    Ok(Value::Object(_) | Value::Null) | Err(_) => {
      Value::String(raw.to_string())
    },
    Ok(value) => value,
  }
}

/// Set the dotted `key` of `root` to `value`. The key must already exist.
fn set_path(root: &mut Value, key: &str, value: Value) -> Result<()> {
  let unknown =
    || BlogmarkError::Config(format!("Unknown configuration key: '{key}'"));

  let mut target = root;
  for part in key.split('.') {
    target = target
      .as_object_mut()
      .and_then(|object| object.get_mut(part))
      .ok_or_else(unknown)?;
  }
  *target = value;
  Ok(())
}
