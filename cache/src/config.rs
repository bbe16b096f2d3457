//! Provider policy loaded from configuration files.
//!
//! The file format is YAML:
//!
//! ```yaml
//! encrypted: true
//! expirable: false
//! lifetime: 10m
//! ```
//!
//! Every field is optional. `lifetime` accepts `humantime` durations such as
//! `500ms`, `30s` or `1h 30m`.

use crate::error::ConfigError;

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ProviderConfigRaw {
  #[serde(default)]
  encrypted: bool,
  #[serde(default = "default_expirable")]
  expirable: bool,
  #[serde(default)]
  lifetime: Option<String>,
}

fn default_expirable() -> bool {
  true
}

/// A validated provider policy, ready for `ProviderBuilder::apply_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
  pub encrypted: bool,
  pub expirable: bool,
  pub lifetime: Option<Duration>,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self {
      encrypted: false,
      expirable: true,
      lifetime: None,
    }
  }
}

impl ProviderConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
    let raw: ProviderConfigRaw = serde_yaml::from_str(source)?;
    raw.process()
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }
}

impl ProviderConfigRaw {
  fn process(self) -> Result<ProviderConfig, ConfigError> {
    let lifetime = self
      .lifetime
      .map(|value| {
        humantime::parse_duration(value.trim()).map_err(|err| ConfigError::InvalidDuration {
          field: "lifetime".to_string(),
          message: err.to_string(),
        })
      })
      .transpose()?;

    Ok(ProviderConfig {
      encrypted: self.encrypted,
      expirable: self.expirable,
      lifetime,
    })
  }
}
