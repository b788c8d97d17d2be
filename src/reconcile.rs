// src/reconcile.rs
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;
use tracing::debug;

use crate::config::CodeInfo;
use crate::convert::{build_converter, CodeMapping};
use crate::countries::PlotCountries;
use crate::error::{Error, Result};
use crate::table::NestedTable;

/// Anything that can answer "is this GDP country code known?".
pub trait CountryKeys {
    fn contains_code(&self, code: &str) -> bool;
}

impl CountryKeys for NestedTable {
    fn contains_code(&self, code: &str) -> bool {
        self.contains_key(code)
    }
}

impl<S: BuildHasher> CountryKeys for HashSet<String, S> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(code)
    }
}

impl CountryKeys for BTreeSet<String> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(code)
    }
}

impl<V, S: BuildHasher> CountryKeys for HashMap<String, V, S> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains_key(code)
    }
}

impl<V> CountryKeys for BTreeMap<String, V> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains_key(code)
    }
}

impl<S: BuildHasher> CountryKeys for HashSet<&str, S> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(&code)
    }
}

/// Plot codes split by whether their GDP code is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// plot code (original case) → GDP data code
    pub matched: BTreeMap<String, String>,
    /// plot codes whose GDP code is not in the GDP key set
    pub unmatched: BTreeSet<String>,
}

/// Translate every plot code through `converter` and check the result against
/// `gdp_keys`.
///
/// Plot codes are upper-cased before the converter lookup; a code whose
/// upper-cased form is not a converter key fails the whole call. Membership in
/// `gdp_keys` is exact.
pub fn reconcile<K: CountryKeys + ?Sized>(
    converter: &CodeMapping,
    plot_countries: &PlotCountries,
    gdp_keys: &K,
) -> Result<ReconciliationResult> {
    let mut out = ReconciliationResult::default();
    for code in plot_countries.keys() {
        let upper = code.to_uppercase();
        let data_code = converter
            .get(&upper)
            .ok_or_else(|| Error::missing_key(upper.clone(), "code converter"))?;

        if gdp_keys.contains_code(data_code) {
            out.matched.insert(code.clone(), data_code.to_string());
        } else {
            out.unmatched.insert(code.clone());
        }
    }
    debug!(
        matched = out.matched.len(),
        unmatched = out.unmatched.len(),
        "reconciled plot codes"
    );
    Ok(out)
}

/// Build the converter described by `codeinfo`, then `reconcile` against the
/// keys of `gdp_countries`.
pub fn reconcile_countries_by_code<K: CountryKeys + ?Sized>(
    codeinfo: &CodeInfo,
    plot_countries: &PlotCountries,
    gdp_countries: &K,
) -> Result<ReconciliationResult> {
    let converter = build_converter(codeinfo)?;
    reconcile(&converter, plot_countries, gdp_countries)
}
