// src/table/nested.rs
use std::{
    collections::{hash_map, HashMap},
    path::Path,
};
use tracing::debug;

use super::{load_table, Row};
use crate::error::Result;

/// Rows keyed by the value of one designated field.
#[derive(Debug, Clone, Default)]
pub struct NestedTable {
    key_field: String,
    rows: HashMap<String, Row>,
}

impl NestedTable {
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn get(&self, key: &str) -> Option<&Row> {
        self.rows.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Key each row by its `key_field` value. Rows without the field are skipped;
/// a repeated key keeps the later row.
pub fn index_by_key<I>(rows: I, key_field: &str) -> NestedTable
where
    I: IntoIterator<Item = Row>,
{
    let mut out = HashMap::new();
    let mut skipped = 0usize;
    for row in rows {
        let Some(key) = row.get(key_field).map(str::to_string) else {
            skipped += 1;
            continue;
        };
        out.insert(key, row);
    }
    if skipped > 0 {
        debug!(skipped, key_field, "rows without key field dropped");
    }
    NestedTable {
        key_field: key_field.to_string(),
        rows: out,
    }
}

/// `load_table` followed by `index_by_key`.
pub fn read_nested_table<P: AsRef<Path>>(
    path: P,
    key_field: &str,
    separator: char,
    quote: char,
) -> Result<NestedTable> {
    let table = load_table(path, separator, quote)?;
    Ok(index_by_key(table.into_rows(), key_field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::write_temp;
    use anyhow::Result;

    #[test]
    fn later_duplicate_wins() -> Result<()> {
        let tmp = write_temp("Code,2000\nUSA,1\nFRA,2\nUSA,3\n")?;
        let nested = read_nested_table(tmp.path(), "Code", ',', '"')?;
        assert_eq!(nested.len(), 2);
        assert_eq!(nested.get("USA").and_then(|r| r.get("2000")), Some("3"));
        assert_eq!(nested.key_field(), "Code");
        Ok(())
    }

    #[test]
    fn rows_without_key_are_skipped() -> Result<()> {
        // second data line stops before the key column
        let tmp = write_temp("Name,Code\nFrance,FRA\nNowhere\n")?;
        let nested = read_nested_table(tmp.path(), "Code", ',', '"')?;
        assert_eq!(nested.keys().collect::<Vec<_>>(), vec!["FRA"]);
        Ok(())
    }

    #[test]
    fn unknown_key_field_yields_empty_table() -> Result<()> {
        let tmp = write_temp("Name,Code\nFrance,FRA\n")?;
        let nested = read_nested_table(tmp.path(), "ISO", ',', '"')?;
        assert!(nested.is_empty());
        Ok(())
    }

    #[test]
    fn empty_key_value_is_still_a_key() -> Result<()> {
        let tmp = write_temp("Name,Code\nFrance,\n")?;
        let nested = read_nested_table(tmp.path(), "Code", ',', '"')?;
        assert!(nested.contains_key(""));
        Ok(())
    }
}
