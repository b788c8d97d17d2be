// src/gdp.rs
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::config::{CodeInfo, GdpInfo};
use crate::convert::{build_converter, CodeMapping};
use crate::countries::PlotCountries;
use crate::error::{Error, Result};
use crate::table::{read_nested_table, NestedTable, Row};

/// Per-country log10 GDP for one year, plus the countries that could not be
/// given a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GdpMapResult {
    /// plot code → log10(GDP)
    pub gdp: BTreeMap<String, f64>,
    /// plot codes with no converter entry under either case
    pub missing_codes: BTreeSet<String>,
    /// plot codes whose GDP row has an empty value for the year
    pub no_data: BTreeSet<String>,
}

/// Partition sizes, for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GdpSummary {
    pub year: String,
    pub mapped: usize,
    pub missing_codes: usize,
    pub no_data: usize,
}

impl GdpMapResult {
    pub fn summary(&self, year: &str) -> GdpSummary {
        GdpSummary {
            year: year.to_string(),
            mapped: self.gdp.len(),
            missing_codes: self.missing_codes.len(),
            no_data: self.no_data.len(),
        }
    }

    /// Smallest and largest log10 GDP, if any country was mapped.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.gdp.values().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Load the GDP table keyed by its country code column.
pub fn gdp_countries(gdpinfo: &GdpInfo) -> Result<NestedTable> {
    read_nested_table(
        &gdpinfo.gdpfile,
        &gdpinfo.country_code,
        gdpinfo.separator,
        gdpinfo.quote,
    )
}

/// Load both tables and map every plot country to its log10 GDP for `year`.
#[tracing::instrument(level = "info", skip(gdpinfo, codeinfo, plot_countries), fields(gdpfile = %gdpinfo.gdpfile.display()))]
pub fn build_gdp_map(
    gdpinfo: &GdpInfo,
    codeinfo: &CodeInfo,
    plot_countries: &PlotCountries,
    year: &str,
) -> Result<GdpMapResult> {
    let gdp_data = gdp_countries(gdpinfo)?;
    let converter = build_converter(codeinfo)?;
    let result = map_gdp(&gdp_data, &converter, plot_countries, year)?;
    info!(summary = ?result.summary(year), "gdp map built");
    Ok(result)
}

/// The join behind `build_gdp_map`, on already loaded tables.
///
/// A plot code is known to the converter when its upper- or lower-cased form
/// is a key. Its data code is then looked up in `gdp_data` lower-cased first,
/// then upper-cased. A data code absent under both forms leaves the plot code
/// out of every partition.
pub fn map_gdp(
    gdp_data: &NestedTable,
    converter: &CodeMapping,
    plot_countries: &PlotCountries,
    year: &str,
) -> Result<GdpMapResult> {
    let mut out = GdpMapResult::default();

    for code in plot_countries.keys() {
        let known = converter.contains_key(&code.to_uppercase())
            || converter.contains_key(&code.to_lowercase());
        if !known {
            out.missing_codes.insert(code.clone());
            continue;
        }

        let Some((_, data_code)) = converter.resolve_ignore_case(code) else {
            continue;
        };

        let Some(row) = probe(gdp_data, data_code) else {
            warn!(plot_code = %code, data_code, "data code not in GDP table; country left out");
            continue;
        };

        let raw = row
            .get(year)
            .ok_or_else(|| Error::missing_key(year, format!("GDP row `{}`", data_code)))?;
        if raw.is_empty() {
            out.no_data.insert(code.clone());
        } else {
            out.gdp.insert(code.clone(), log_gdp(code, raw)?);
        }
    }

    debug!(
        mapped = out.gdp.len(),
        missing = out.missing_codes.len(),
        no_data = out.no_data.len(),
        "gdp partitions"
    );
    Ok(out)
}

fn probe<'a>(gdp_data: &'a NestedTable, data_code: &str) -> Option<&'a Row> {
    gdp_data
        .get(&data_code.to_lowercase())
        .or_else(|| gdp_data.get(&data_code.to_uppercase()))
}

/// log10 of a decimal GDP string.
pub fn log_gdp(code: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| Error::MalformedNumber {
        code: code.to_string(),
        value: raw.to_string(),
    })?;
    if value <= 0.0 {
        return Err(Error::NonPositiveValue {
            code: code.to_string(),
            value,
        });
    }
    Ok(value.log10())
}
