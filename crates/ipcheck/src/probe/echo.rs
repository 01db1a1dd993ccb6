use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::parse::parse_echo_output;
use super::{Probe, classify_io_error};
use crate::types::{FailureKind, ProbeMethod, ProbeOutcome};

/// Time between two echo requests sent by the tool
pub(crate) const ECHO_INTERVAL_MS: u64 = 1_000;

/// Slack between the tool's own deadline and the outer ceiling, so the tool
/// normally exits and prints its statistics before it would be killed
pub(crate) const ECHO_GRACE_MS: u64 = 500;

const DEFAULT_PROGRAM: &str = "ping";

/// Echo probe backed by the platform `ping` tool
///
/// The tool gets its own deadline flag, set below the ceiling, and the whole
/// run is additionally bounded by an outer timeout. Output is collected line
/// by line, so replies printed before the tool is killed still count.
#[derive(Debug, Clone)]
pub struct EchoProbe {
    program: String,
    count: u8,
}

impl EchoProbe {
    pub fn new(count: u8) -> Self {
        Self::with_program(DEFAULT_PROGRAM, count)
    }

    /// Use another executable that speaks `ping`'s arguments and output
    pub fn with_program(program: impl Into<String>, count: u8) -> Self {
        Self { program: program.into(), count }
    }

    /// Run the tool once and capture what it printed before `ceiling`
    pub(crate) async fn run(&self, address: &str, ceiling: Duration) -> Result<String, FailureKind> {
        let mut command = Command::new(&self.program);
        command
            .args(ping_args(self.count, address, ceiling))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| spawn_failure(&e))?;
        let stdout = child.stdout.take().ok_or(FailureKind::Io)?;

        let mut reader = BufReader::new(stdout);
        let mut line = Vec::new();
        let mut output = String::new();

        let read = async {
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line).await? == 0 {
                    return Ok::<_, io::Error>(());
                }
                // Localized Windows output is not always UTF-8
                output.push_str(&String::from_utf8_lossy(&line));
            }
        };
        let finished = timeout(ceiling, read).await;

        match finished {
            Ok(Ok(())) => {}
            Ok(Err(error)) if output.is_empty() => return Err(classify_io_error(&error)),
            Ok(Err(error)) => debug!(address, %error, "Echo output cut short"),
            Err(_) => {
                debug!(address, "Echo tool reached its ceiling, killing it");
                if let Err(error) = child.start_kill() {
                    debug!(address, %error, "Echo tool already gone");
                }
            }
        }

        Ok(output)
    }
}

#[async_trait]
impl Probe for EchoProbe {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Ping
    }

    async fn probe(&self, address: &str, _port: Option<u16>, deadline: Duration) -> ProbeOutcome {
        let address = address.trim().trim_start_matches('[').trim_end_matches(']');
        // Never let an address be read as a flag by the tool
        if address.is_empty() || address.starts_with('-') {
            return ProbeOutcome::failure(ProbeMethod::Ping, None, FailureKind::Unresolved);
        }

        let start = Instant::now();
        let outcome = match self.run(address, deadline).await {
            Ok(stdout) => {
                let report = parse_echo_output(&stdout);
                if report.is_alive() {
                    let latency = report
                        .average_ms
                        .map(|avg| avg.round() as u64)
                        .unwrap_or_else(|| start.elapsed().as_millis() as u64);
                    ProbeOutcome::success(ProbeMethod::Ping, latency, None)
                } else if report.unreachable {
                    ProbeOutcome::failure(ProbeMethod::Ping, None, FailureKind::Unreachable)
                } else {
                    ProbeOutcome::failure(ProbeMethod::Ping, None, FailureKind::TimedOut)
                }
            }
            Err(kind) => ProbeOutcome::failure(ProbeMethod::Ping, None, kind),
        };

        debug!(address, reachable = outcome.reachable, failure = ?outcome.failure, "echo probe");
        outcome
    }
}

fn spawn_failure(error: &io::Error) -> FailureKind {
    match error.kind() {
        io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
        _ => FailureKind::Io,
    }
}

/// Deadline handed to the tool, always short of the outer ceiling
fn tool_deadline(ceiling: Duration) -> Duration {
    ceiling.saturating_sub(Duration::from_millis(ECHO_GRACE_MS))
}

/// Whole seconds for the tool's own deadline flag, never below one
#[cfg_attr(target_os = "windows", allow(dead_code))]
fn deadline_secs(ceiling: Duration) -> u64 {
    tool_deadline(ceiling).as_secs().max(1)
}

#[cfg(target_os = "windows")]
fn ping_args(count: u8, address: &str, ceiling: Duration) -> Vec<String> {
    // -w is the per-reply wait in milliseconds
    let per_reply = (tool_deadline(ceiling).as_millis() as u64 / u64::from(count.max(1))).max(100);
    vec![
        "-n".into(),
        count.to_string(),
        "-w".into(),
        per_reply.to_string(),
        address.to_string(),
    ]
}

#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "openbsd"))]
fn ping_args(count: u8, address: &str, ceiling: Duration) -> Vec<String> {
    // -t is the overall deadline in seconds on the BSDs
    vec![
        "-n".into(),
        "-c".into(),
        count.to_string(),
        "-t".into(),
        deadline_secs(ceiling).to_string(),
        address.to_string(),
    ]
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd"
)))]
fn ping_args(count: u8, address: &str, ceiling: Duration) -> Vec<String> {
    // -w is the overall deadline in seconds for iputils and busybox
    vec![
        "-n".into(),
        "-c".into(),
        count.to_string(),
        "-w".into(),
        deadline_secs(ceiling).to_string(),
        address.to_string(),
    ]
}
