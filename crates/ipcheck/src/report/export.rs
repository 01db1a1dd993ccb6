use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use super::{Report, ReportFilter};
use crate::ingest::{DISPLAY_NAME, GROUP_A, GROUP_B};

/// Header row of CSV exports
pub const CSV_HEADER: &str = "Status,Address,Name,GroupA,GroupB";

const BOM: char = '\u{feff}';

/// Export the filtered rows as CSV, prefixed with a UTF-8 byte-order mark so
/// spreadsheet tools pick the right encoding
pub fn to_csv(report: &Report, filter: &ReportFilter) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(CSV_HEADER);

    for row in report.filtered(filter) {
        let fields = [
            row.status.as_str(),
            row.address.as_str(),
            row.field(DISPLAY_NAME).unwrap_or_default(),
            row.field(GROUP_A).unwrap_or_default(),
            row.field(GROUP_B).unwrap_or_default(),
        ];
        out.push('\n');
        out.push_str(&fields.map(escape_csv).join(","));
    }

    out.push('\n');
    out
}

/// Export the filtered rows as JSON with the summary and a snapshot of the
/// filters that were applied
pub fn to_json(report: &Report, filter: &ReportFilter) -> Value {
    to_json_at(report, filter, Utc::now())
}

pub(crate) fn to_json_at(report: &Report, filter: &ReportFilter, generated_at: DateTime<Utc>) -> Value {
    let entries: Vec<_> = report.filtered(filter).collect();
    let or_all = |value: Option<&str>| value.unwrap_or("all").to_string();

    json!({
        "generatedAt": generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "summary": report.summary,
        "appliedFilters": {
            "status": or_all(filter.status.map(|s| s.as_str())),
            "groupA": or_all(filter.group_a.as_deref()),
            "groupB": or_all(filter.group_b.as_deref()),
            "search": filter.search.clone().unwrap_or_default(),
        },
        "entries": entries,
    })
}

/// Quote a CSV field when it contains a separator, quote or line break
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::report::tests::{row, sample};
    use crate::types::CheckStatus;

    #[test]
    fn csv_has_bom_header_and_filtered_rows() {
        let filter = ReportFilter { status: Some(CheckStatus::Online), ..Default::default() };
        let csv = to_csv(&sample(), &filter);

        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<_> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(
            lines,
            vec![
                CSV_HEADER,
                "online,10.0.0.1,Main Server,Tower B,North",
                "online,10.0.0.4,Sensor,Tower C,North",
            ]
        );
    }

    #[test]
    fn csv_quotes_awkward_fields() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");

        let report = Report::new(vec![row("10.0.0.9", "Lab, rack 2", "A", "B", CheckStatus::Offline)]);
        let csv = to_csv(&report, &ReportFilter::default());
        assert!(csv.contains("offline,10.0.0.9,\"Lab, rack 2\",A,B"));
    }

    #[test]
    fn json_snapshots_filters() {
        let filter = ReportFilter {
            group_a: Some("Tower A".into()),
            search: Some("cam".into()),
            ..Default::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let exported = to_json_at(&sample(), &filter, at);

        assert_eq!(exported["generatedAt"], "2024-05-01T12:00:00Z");
        assert_eq!(exported["summary"]["total"], 4);
        assert_eq!(
            exported["appliedFilters"],
            json!({"status": "all", "groupA": "Tower A", "groupB": "all", "search": "cam"})
        );

        let entries = exported["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["address"], "10.0.0.3");
        assert_eq!(entries[0]["status"], "timeout");
        assert_eq!(entries[0]["displayName"], "Camera");
    }
}
