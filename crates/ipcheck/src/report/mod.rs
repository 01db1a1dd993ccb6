//! Result reports: summary counts, filtering and export.

mod export;
mod filter;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use export::{CSV_HEADER, to_csv, to_json};
pub use filter::ReportFilter;

use crate::ingest::{GROUP_A, GROUP_B};
use crate::service::ResultRow;
use crate::types::CheckStatus;

/// Number of rows per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub timeout: usize,
    pub error: usize,
}

impl Summary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ResultRow>) -> Self {
        rows.into_iter().fold(Self::default(), |mut summary, row| {
            summary.total += 1;
            match row.status {
                CheckStatus::Online => summary.online += 1,
                CheckStatus::Offline => summary.offline += 1,
                CheckStatus::Timeout => summary.timeout += 1,
                CheckStatus::Error => summary.error += 1,
            }
            summary
        })
    }
}

/// A finished batch together with the values its filters can take
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ResultRow>,
    pub summary: Summary,
    /// Distinct `groupA` values, sorted
    pub group_a_values: Vec<String>,
    /// Distinct `groupB` values, sorted
    pub group_b_values: Vec<String>,
}

impl Report {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        let summary = Summary::from_rows(&rows);
        let group_a_values = distinct(&rows, GROUP_A);
        let group_b_values = distinct(&rows, GROUP_B);
        Self { rows, summary, group_a_values, group_b_values }
    }

    /// Rows matching the filter, in report order
    pub fn filtered<'a>(&'a self, filter: &'a ReportFilter) -> impl Iterator<Item = &'a ResultRow> {
        self.rows.iter().filter(move |row| filter.matches(row))
    }
}

fn distinct(rows: &[ResultRow], key: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.field(key))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
