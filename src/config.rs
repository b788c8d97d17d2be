// src/config.rs

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{Error, Result};

/// Where the code-reference table lives and which columns hold the two code schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    pub codefile: PathBuf,
    pub separator: char,
    pub quote: char,
    /// Column holding plot library codes (e.g. `ISO3166-1-Alpha-2`).
    pub plot_codes: String,
    /// Column holding GDP dataset codes (e.g. `ISO3166-1-Alpha-3`).
    pub data_codes: String,
}

/// Where the GDP table lives and how it is keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdpInfo {
    pub gdpfile: PathBuf,
    pub separator: char,
    pub quote: char,
    pub country_code: String,
    pub country_name: String,
    /// Informational bounds on the year columns.
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for CodeInfo {
    fn default() -> Self {
        Self {
            codefile: PathBuf::from("isp_country_codes.csv"),
            separator: ',',
            quote: '"',
            plot_codes: "ISO3166-1-Alpha-2".into(),
            data_codes: "ISO3166-1-Alpha-3".into(),
        }
    }
}

impl Default for GdpInfo {
    fn default() -> Self {
        Self {
            gdpfile: PathBuf::from("isp_gdp.csv"),
            separator: ',',
            quote: '"',
            country_code: "Country Code".into(),
            country_name: "Country Name".into(),
            min_year: 1960,
            max_year: 2015,
        }
    }
}

impl GdpInfo {
    /// True when `year` parses and lies within `min_year..=max_year`.
    pub fn contains_year(&self, year: &str) -> bool {
        year.trim()
            .parse::<i32>()
            .map_or(false, |y| (self.min_year..=self.max_year).contains(&y))
    }
}

/// Both option sets, as read from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub codeinfo: CodeInfo,
    #[serde(default)]
    pub gdpinfo: GdpInfo,
}

impl Config {
    /// Parse a YAML config. Relative table paths are resolved against the
    /// directory containing the config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg: Config = serde_yaml::from_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            cfg.codeinfo.codefile = rebase(base, &cfg.codeinfo.codefile);
            cfg.gdpinfo.gdpfile = rebase(base, &cfg.gdpinfo.gdpfile);
        }
        cfg.validate()?;
        debug!(?cfg, "loaded config");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ascii_byte(self.codeinfo.separator, "codeinfo.separator")?;
        ascii_byte(self.codeinfo.quote, "codeinfo.quote")?;
        ascii_byte(self.gdpinfo.separator, "gdpinfo.separator")?;
        ascii_byte(self.gdpinfo.quote, "gdpinfo.quote")?;
        if self.gdpinfo.min_year > self.gdpinfo.max_year {
            return Err(Error::InvalidConfig(format!(
                "gdpinfo.min_year {} is after max_year {}",
                self.gdpinfo.min_year, self.gdpinfo.max_year
            )));
        }
        Ok(())
    }
}

fn rebase(base: &Path, p: &Path) -> PathBuf {
    if p.is_relative() && !base.as_os_str().is_empty() {
        base.join(p)
    } else {
        p.to_path_buf()
    }
}

/// The delimited reader works on single bytes.
pub(crate) fn ascii_byte(c: char, what: &str) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be a single ASCII character, got {:?}",
            what, c
        )))
    }
}
