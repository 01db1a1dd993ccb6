use ipcheck::ingest::{DISPLAY_NAME, GROUP_A, GROUP_B};
use ipcheck::report::{Report, ReportFilter};
use ipcheck::service::ResultRow;

const HEADERS: [&str; 7] = ["STATUS", "ADDRESS", "NAME", "GROUP A", "GROUP B", "METHOD", "LATENCY"];

/// Plain-text table of the filtered rows followed by the summary counts
pub fn render(report: &Report, filter: &ReportFilter) -> String {
    let rows: Vec<[String; 7]> = report.filtered(filter).map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }

    let summary = &report.summary;
    out.push_str(&format!(
        "\n{} shown of {} | online {} | offline {} | timeout {} | error {}\n",
        rows.len(),
        summary.total,
        summary.online,
        summary.offline,
        summary.timeout,
        summary.error
    ));
    out
}

fn cells(row: &ResultRow) -> [String; 7] {
    let port = row.port.map(|p| format!(":{p}")).unwrap_or_default();
    let latency = if row.latency_ms > 0 { format!("{} ms", row.latency_ms) } else { "-".into() };
    [
        row.status.to_string(),
        row.address.clone(),
        row.field(DISPLAY_NAME).unwrap_or_default().to_string(),
        row.field(GROUP_A).unwrap_or_default().to_string(),
        row.field(GROUP_B).unwrap_or_default().to_string(),
        format!("{}{port}", row.method),
        latency,
    ]
}

fn push_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
