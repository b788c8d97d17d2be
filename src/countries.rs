// src/countries.rs
//! The plot library's country table: plot code → display name.
//!
//! The table is supplied by whoever draws the map; this module only reads it
//! from disk in a few plain formats.

use std::{collections::BTreeMap, fs, path::Path};
use tracing::info;

use crate::error::{Error, Result};
use crate::table::load_table;

pub type PlotCountries = BTreeMap<String, String>;

/// Load a plot country table, choosing the format by extension:
/// `.yaml`/`.yml` and `.json` hold a `code: name` map, `.csv`/`.tsv` need
/// `code` and `name` columns.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_plot_countries<P: AsRef<Path>>(path: P) -> Result<PlotCountries> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let countries = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&read(path)?)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?,
        "json" => serde_json::from_str(&read(path)?)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?,
        "csv" => load_plot_countries_table(path, ',', '"', "code", "name")?,
        "tsv" => load_plot_countries_table(path, '\t', '"', "code", "name")?,
        other => {
            return Err(Error::InvalidConfig(format!(
                "unsupported plot country file extension `{}` for {}",
                other,
                path.display()
            )))
        }
    };
    info!(countries = countries.len(), "plot countries loaded");
    Ok(countries)
}

/// Read plot countries from a delimited table with explicit column names.
/// Rows lacking either column are skipped.
pub fn load_plot_countries_table<P: AsRef<Path>>(
    path: P,
    separator: char,
    quote: char,
    code_field: &str,
    name_field: &str,
) -> Result<PlotCountries> {
    let table = load_table(path, separator, quote)?;
    for field in [code_field, name_field] {
        if table.header().position(field).is_none() {
            return Err(Error::missing_key(field, "plot country table header"));
        }
    }
    Ok(table
        .rows()
        .iter()
        .filter_map(|row| Some((row.get(code_field)?.to_string(), row.get(name_field)?.to_string())))
        .collect())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn yaml_json_and_csv_agree() -> Result<()> {
        let dir = tempdir()?;
        let yaml = dir.path().join("c.yaml");
        let json = dir.path().join("c.json");
        let csv = dir.path().join("c.csv");
        fs::write(&yaml, "xk: Kosovo\nfr: France\n")?;
        fs::write(&json, r#"{"xk": "Kosovo", "fr": "France"}"#)?;
        fs::write(&csv, "code,name\nxk,Kosovo\nfr,France\n")?;

        let expected: PlotCountries = [("fr", "France"), ("xk", "Kosovo")]
            .into_iter()
            .map(|(c, n)| (c.to_string(), n.to_string()))
            .collect();
        assert_eq!(load_plot_countries(&yaml)?, expected);
        assert_eq!(load_plot_countries(&json)?, expected);
        assert_eq!(load_plot_countries(&csv)?, expected);
        Ok(())
    }

    #[test]
    fn unknown_extension_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("c.txt");
        fs::write(&path, "xk Kosovo\n")?;
        assert!(matches!(
            load_plot_countries(&path),
            Err(Error::InvalidConfig(_))
        ));
        Ok(())
    }

    #[test]
    fn table_requires_named_columns() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("c.csv");
        fs::write(&path, "iso,label\nxk,Kosovo\n")?;
        assert!(load_plot_countries_table(&path, ',', '"', "iso", "label")?.contains_key("xk"));
        assert!(matches!(
            load_plot_countries(&path),
            Err(Error::MissingKey { .. })
        ));
        Ok(())
    }
}
