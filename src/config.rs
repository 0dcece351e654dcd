// src/config.rs

use anyhow::{Context, Result};
use parquet::basic::{Compression, ZstdLevel};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_RAW_PATH: &str = "data/raw/online_retail.xlsx";
pub const DEFAULT_CLEAN_PATH: &str = "data/clean/transactions.parquet";
pub const DEFAULT_ROW_GROUP_SIZE: usize = 1024 * 1024;

/// Points at a YAML file whose keys override the defaults.
pub const CONFIG_ENV: &str = "RETAIL_CLEAN_CONFIG";
pub const RAW_PATH_ENV: &str = "RETAIL_RAW_PATH";
pub const CLEAN_PATH_ENV: &str = "RETAIL_CLEAN_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCompression {
    #[default]
    Snappy,
    Zstd,
    Uncompressed,
}

impl OutputCompression {
    pub fn to_parquet(self) -> Result<Compression> {
        Ok(match self {
            OutputCompression::Snappy => Compression::SNAPPY,
            OutputCompression::Zstd => Compression::ZSTD(ZstdLevel::try_new(3)?),
            OutputCompression::Uncompressed => Compression::UNCOMPRESSED,
        })
    }
}

/// Where the cleaner reads from, where it writes to, and how the Parquet file is encoded.
///
/// Relative paths resolve against the working directory, which is expected to be the
/// project root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub raw_path: PathBuf,
    pub clean_path: PathBuf,
    pub compression: OutputCompression,
    pub row_group_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            raw_path: PathBuf::from(DEFAULT_RAW_PATH),
            clean_path: PathBuf::from(DEFAULT_CLEAN_PATH),
            compression: OutputCompression::default(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

impl Config {
    /// Parse a YAML config file. Missing keys keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // an empty document deserializes to unit, not to a map
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        let cfg: Config = serde_yaml::from_str(text)?;
        Ok(cfg)
    }

    /// Defaults, then the file named by `RETAIL_CLEAN_CONFIG`, then the path env vars.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable lookup.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_ENV).filter(|v| !v.trim().is_empty()) {
            Some(file) => Self::from_yaml_file(file)?,
            None => Config::default(),
        };
        if let Some(raw) = lookup(RAW_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.raw_path = PathBuf::from(raw);
        }
        if let Some(clean) = lookup(CLEAN_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.clean_path = PathBuf::from(clean);
        }
        Ok(cfg)
    }
}
