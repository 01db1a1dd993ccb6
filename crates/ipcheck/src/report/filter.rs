use serde::{Deserialize, Serialize};

use crate::ingest::{DISPLAY_NAME, GROUP_A, GROUP_B};
use crate::service::ResultRow;
use crate::types::CheckStatus;

/// Client-side view filter; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub status: Option<CheckStatus>,
    pub group_a: Option<String>,
    pub group_b: Option<String>,
    /// Case-insensitive substring searched in address, name and groups
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.group_a.is_none() && self.group_b.is_none() && self.search_term().is_none()
    }

    pub fn matches(&self, row: &ResultRow) -> bool {
        if self.status.is_some_and(|status| status != row.status) {
            return false;
        }
        if !field_matches(self.group_a.as_deref(), row.field(GROUP_A)) {
            return false;
        }
        if !field_matches(self.group_b.as_deref(), row.field(GROUP_B)) {
            return false;
        }

        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                std::iter::once(Some(row.address.as_str()))
                    .chain([DISPLAY_NAME, GROUP_A, GROUP_B].map(|key| row.field(key)))
                    .flatten()
                    .any(|value| value.to_lowercase().contains(&term))
            }
            None => true,
        }
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}
