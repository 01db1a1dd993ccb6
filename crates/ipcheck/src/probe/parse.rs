//! Parsing of textual `ping` output.
//!
//! Different platforms and locales phrase replies differently, so several
//! reply markers and statistics formats are recognised:
//!
//! - Linux/BSD/macOS: `64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.42 ms`
//!   and `rtt min/avg/max/mdev = ...` or `round-trip min/avg/max/stddev = ...`
//! - Windows (English): `Reply from 10.0.0.1: bytes=32 time<1ms TTL=128`
//!   and `Minimum = 0ms, Maximum = 1ms, Average = 0ms`
//! - Windows (Spanish): `Respuesta desde 10.0.0.1: bytes=32 tiempo=3ms TTL=64`
//!   and `Mínimo = 1ms, Máximo = 3ms, Media = 2ms`

const REPLY_MARKERS: &[&str] = &["bytes from", "bytes=", "ttl="];
const REPLY_PREFIXES: &[&str] = &["reply from", "respuesta desde"];
const TIME_MARKERS: &[&str] = &["time=", "time<", "tiempo=", "tiempo<"];
const AVERAGE_MARKERS: &[&str] = &["average =", "media ="];
const UNREACHABLE_MARKERS: &[&str] = &["unreachable", "inaccesible", "inalcanzable"];

/// What a run of the echo tool reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EchoReport {
    /// Number of successful reply lines
    pub replies: usize,
    /// Average round-trip time, from the statistics line or the replies
    pub average_ms: Option<f64>,
    /// An unreachable notice was seen
    pub unreachable: bool,
}

impl EchoReport {
    pub fn is_alive(&self) -> bool {
        self.replies > 0
    }
}

/// Parse the standard output of a `ping` run
pub fn parse_echo_output(output: &str) -> EchoReport {
    let mut report = EchoReport::default();
    let mut times = Vec::new();
    let mut aggregate = None;

    for line in output.lines() {
        let line = line.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }

        if UNREACHABLE_MARKERS.iter().any(|marker| line.contains(marker)) {
            report.unreachable = true;
        } else if is_reply_line(&line) {
            report.replies += 1;
            if let Some(time) = reply_time(&line) {
                times.push(time);
            }
        }

        if aggregate.is_none() {
            aggregate = aggregate_average(&line);
        }
    }

    report.average_ms = aggregate.or_else(|| {
        (!times.is_empty()).then(|| times.iter().sum::<f64>() / times.len() as f64)
    });
    report
}

fn is_reply_line(line: &str) -> bool {
    REPLY_MARKERS.iter().any(|marker| line.contains(marker))
        || (REPLY_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
            && TIME_MARKERS.iter().any(|marker| line.contains(marker)))
}

/// Round-trip time of one reply line; `time<1ms` counts as the bound itself
fn reply_time(line: &str) -> Option<f64> {
    TIME_MARKERS.iter().find_map(|marker| {
        let index = line.find(marker)?;
        leading_number(&line[index + marker.len()..])
    })
}

/// Average from a statistics line, if this is one
fn aggregate_average(line: &str) -> Option<f64> {
    if line.contains("min/avg/max") {
        // "rtt min/avg/max/mdev = 0.035/0.045/0.056/0.010 ms"
        let (_, values) = line.split_once('=')?;
        return values.split('/').nth(1).and_then(leading_number);
    }

    AVERAGE_MARKERS.iter().find_map(|marker| {
        let index = line.find(marker)?;
        leading_number(&line[index + marker.len()..])
    })
}

fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let end = text.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(text.len());
    text[..end].parse().ok()
}
