// src/convert.rs
use std::collections::{hash_map, HashMap};
use tracing::debug;

use crate::config::CodeInfo;
use crate::error::{Error, Result};
use crate::table::{load_table, Table};

/// One-way map from plot library codes to GDP dataset codes.
///
/// Keys are stored exactly as they appear in the reference table. A second
/// index groups keys by their lower-cased form so case-insensitive lookups do
/// not scan the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMapping {
    entries: HashMap<String, String>,
    /// lower-cased key → original keys, in first-seen order
    folded: HashMap<String, Vec<String>>,
}

impl CodeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `plot_code`. Returns the previous data code, if any.
    pub fn insert(&mut self, plot_code: String, data_code: String) -> Option<String> {
        if !self.entries.contains_key(&plot_code) {
            self.folded
                .entry(plot_code.to_lowercase())
                .or_default()
                .push(plot_code.clone());
        }
        self.entries.insert(plot_code, data_code)
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, plot_code: &str) -> Option<&str> {
        self.entries.get(plot_code).map(String::as_str)
    }

    pub fn contains_key(&self, plot_code: &str) -> bool {
        self.entries.contains_key(plot_code)
    }

    /// Every (key, data code) whose key equals `plot_code` ignoring case.
    pub fn matches_ignore_case<'a>(
        &'a self,
        plot_code: &str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.folded
            .get(&plot_code.to_lowercase())
            .into_iter()
            .flatten()
            .filter_map(move |k| self.entries.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    /// Case-insensitive lookup that settles on one entry when several keys
    /// differ only in case: the upper-cased key, then the lower-cased key,
    /// then whichever variant was seen first.
    pub fn resolve_ignore_case(&self, plot_code: &str) -> Option<(&str, &str)> {
        let upper = plot_code.to_uppercase();
        let lower = plot_code.to_lowercase();
        let mut first = None;
        let mut lower_hit = None;
        for (k, v) in self.matches_ignore_case(plot_code) {
            if k == upper {
                return Some((k, v));
            }
            if k == lower {
                lower_hit = Some((k, v));
            }
            first.get_or_insert((k, v));
        }
        lower_hit.or(first)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the converter from the code reference table named in `codeinfo`.
pub fn build_converter(codeinfo: &CodeInfo) -> Result<CodeMapping> {
    let table = load_table(&codeinfo.codefile, codeinfo.separator, codeinfo.quote)?;
    converter_from_table(&table, &codeinfo.plot_codes, &codeinfo.data_codes)
}

/// Map `plot_field` → `data_field` for every row; later rows overwrite earlier
/// ones with the same plot code. Both fields must be in the header.
pub fn converter_from_table(
    table: &Table,
    plot_field: &str,
    data_field: &str,
) -> Result<CodeMapping> {
    for field in [plot_field, data_field] {
        if table.header().position(field).is_none() {
            return Err(Error::missing_key(field, "code table header"));
        }
    }

    let mut mapping = CodeMapping::new();
    for row in table.rows() {
        match (row.get(plot_field), row.get(data_field)) {
            (Some(plot), Some(data)) => {
                mapping.insert(plot.to_string(), data.to_string());
            }
            _ => debug!(?row, "code row too short, skipped"),
        }
    }
    debug!(entries = mapping.len(), "converter built");
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::{init_test_logging, write_temp};
    use anyhow::Result;
    use std::collections::HashSet;

    fn codeinfo_for(path: &std::path::Path) -> CodeInfo {
        CodeInfo {
            codefile: path.to_path_buf(),
            separator: ',',
            quote: '"',
            plot_codes: "PL".into(),
            data_codes: "DATA".into(),
        }
    }

    #[test]
    fn keys_are_distinct_plot_codes() -> Result<()> {
        init_test_logging();
        let tmp = write_temp("NAME,PL,DATA\nA,US,USA\nB,FR,FRA\nC,us,XXX\nD,US,USB\n")?;
        let mapping = build_converter(&codeinfo_for(tmp.path()))?;

        let keys: HashSet<&str> = mapping.keys().collect();
        assert_eq!(keys, HashSet::from(["US", "FR", "us"]));
        // last row wins
        assert_eq!(mapping.get("US"), Some("USB"));
        assert_eq!(mapping.get("us"), Some("XXX"));
        assert_eq!(mapping.get("Us"), None);
        Ok(())
    }

    #[test]
    fn building_twice_is_identical() -> Result<()> {
        let tmp = write_temp("PL,DATA\nXK,UNK\nDE,DEU\n")?;
        let info = codeinfo_for(tmp.path());
        assert_eq!(build_converter(&info)?, build_converter(&info)?);
        Ok(())
    }

    #[test]
    fn missing_column_is_an_error() -> Result<()> {
        let tmp = write_temp("PL,OTHER\nXK,UNK\n")?;
        let err = build_converter(&codeinfo_for(tmp.path())).unwrap_err();
        assert!(matches!(err, Error::MissingKey { ref key, .. } if key == "DATA"));
        Ok(())
    }

    #[test]
    fn case_insensitive_resolution_prefers_upper_then_lower() {
        let mut m = CodeMapping::new();
        m.insert("Xk".into(), "MIX".into());
        m.insert("xk".into(), "LOW".into());
        assert_eq!(m.resolve_ignore_case("XK"), Some(("xk", "LOW")));
        m.insert("XK".into(), "UP".into());
        assert_eq!(m.resolve_ignore_case("xK"), Some(("XK", "UP")));
        assert_eq!(m.matches_ignore_case("xk").count(), 3);
        assert_eq!(m.resolve_ignore_case("zz"), None);
    }

    #[test]
    fn overwrite_keeps_single_folded_entry() {
        let mut m = CodeMapping::new();
        assert_eq!(m.insert("DE".into(), "DEU".into()), None);
        assert_eq!(m.insert("DE".into(), "GER".into()), Some("DEU".to_string()));
        assert_eq!(m.matches_ignore_case("de").collect::<Vec<_>>(), vec![("DE", "GER")]);
    }
}
