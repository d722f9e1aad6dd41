//! spack configuration
//!
//! Priority (highest to lowest):
//! 1. Environment variables prefixed `SPACK_`
//! 2. The `--config` file, or `spack.{toml,yaml,yml,json}` in the working
//!    directory
//! 3. Default values

use std::borrow::Cow;
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use structpack::ByteOrder;

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpackConfig {
    /// Print packed bytes with uppercase hex digits
    pub uppercase_hex: bool,
    pub output: OutputFormat,
    /// Byte order for formats that do not start with a marker
    pub default_order: ByteOrder,
}

impl Default for SpackConfig {
    fn default() -> Self {
        Self {
            uppercase_hex: true,
            output: OutputFormat::Text,
            default_order: ByteOrder::Native,
        }
    }
}

impl SpackConfig {
    /// Prefix `format` with the configured byte order unless it already
    /// selects one
    pub fn effective_format<'a>(&self, format: &'a str) -> Cow<'a, str> {
        let has_marker = format
            .trim_start()
            .chars()
            .next()
            .is_some_and(|ch| ByteOrder::from_marker(ch).is_some());

        if has_marker || self.default_order == ByteOrder::Native {
            Cow::Borrowed(format)
        } else {
            Cow::Owned(format!("{}{}", self.default_order.marker(), format))
        }
    }
}

const DEFAULT_FILES: [&str; 4] = ["spack.toml", "spack.yaml", "spack.yml", "spack.json"];

/// Load configuration from defaults, a config file and the environment
pub fn load(path: Option<&Path>) -> Result<SpackConfig> {
    let mut figment = Figment::from(Serialized::defaults(SpackConfig::default()));

    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            figment = merge_file(figment, path)?;
        },
        None => {
            for name in DEFAULT_FILES {
                let path = Path::new(name);
                if path.exists() {
                    figment = merge_file(figment, path)?;
                }
            }
        },
    }

    figment
        .merge(Env::prefixed("SPACK_"))
        .extract()
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

/// Merge one file, choosing the provider by extension
fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Config file must have an extension: {}", path.display()))?;

    let figment = match extension {
        "toml" => figment.merge(Toml::file(path)),
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "json" => figment.merge(Json::file(path)),
        _ => bail!("Unsupported config file format: {}", extension),
    };
    Ok(figment)
}
