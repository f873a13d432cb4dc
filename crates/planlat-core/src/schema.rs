//! Table row-count statistics consumed by the plan parser.
//!
//! The estimator does not ingest DDL itself; an external collector supplies
//! per-table row counts. The parser only needs two operations: resolving the
//! (possibly quote-requiring) table name the engine reports, and looking up
//! the table's scan size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What the plan parser requires from a schema collaborator.
pub trait TableStatsSource {
    /// The engine reports table names unquoted; re-add quotes where the
    /// stored schema needs them.
    fn quote_table_name(&self, table_name: &str) -> Result<String>;

    /// Number of tuples a full scan of the table produces.
    fn get_table_scan_size(&self, table_name: &str) -> Result<u64>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStats {
    pub name: String,
    pub row_count: u64,
}

/// A named collection of table statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    tables: BTreeMap<String, TableStats>,
}

impl Schema {
    pub fn new(name: impl Into<String>, tables: impl IntoIterator<Item = TableStats>) -> Self {
        Self {
            name: name.into(),
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableStats> {
        self.tables.get(name)
    }
}

impl TableStatsSource for Schema {
    fn quote_table_name(&self, table_name: &str) -> Result<String> {
        let quoted = format!("\"{table_name}\"");
        if !self.tables.contains_key(table_name) && self.tables.contains_key(&quoted) {
            Ok(quoted)
        } else if self.tables.contains_key(table_name) {
            Ok(table_name.to_string())
        } else {
            Err(Error::Schema(format!(
                "could not find table {table_name} in {}",
                self.name
            )))
        }
    }

    fn get_table_scan_size(&self, table_name: &str) -> Result<u64> {
        self.tables
            .get(table_name)
            .map(|t| t.row_count)
            .ok_or_else(|| {
                Error::Schema(format!(
                    "could not find table {table_name} in {}",
                    self.name
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(
            "tpch",
            [
                TableStats {
                    name: "lineitem".into(),
                    row_count: 6_000_000,
                },
                TableStats {
                    name: "\"Order\"".into(),
                    row_count: 1_500_000,
                },
            ],
        )
    }

    #[test]
    fn quotes_only_when_needed() {
        let s = schema();
        assert_eq!(s.quote_table_name("lineitem").unwrap(), "lineitem");
        assert_eq!(s.quote_table_name("Order").unwrap(), "\"Order\"");
        assert!(s.quote_table_name("nation").is_err());
    }

    #[test]
    fn scan_size_lookup() {
        let s = schema();
        assert_eq!(s.get_table_scan_size("lineitem").unwrap(), 6_000_000);
        assert!(s.get_table_scan_size("Order").is_err());
    }
}
