//! Target list ingestion from uploaded CSV text.
//!
//! Each non-empty line is `address, displayName, groupA, groupB`. Fields are
//! trimmed; a line with fewer than four non-empty fields is skipped, and so is
//! a line whose address is malformed. Extra trailing fields are ignored.

use tracing::{debug, warn};

use crate::service::validate_address;
use crate::types::Target;

pub const DISPLAY_NAME: &str = "displayName";
pub const GROUP_A: &str = "groupA";
pub const GROUP_B: &str = "groupB";

/// Parse uploaded CSV text into targets, in line order
pub fn parse_targets(text: &str) -> Vec<Target> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| {
            let Some(target) = parse_line(line) else {
                debug!(line = index + 1, "Skipping incomplete CSV line");
                return None;
            };
            if let Err(error) = validate_address(&target.address) {
                warn!(line = index + 1, %error, "Skipping CSV line with a malformed address");
                return None;
            }
            Some(target)
        })
        .collect()
}

fn parse_line(line: &str) -> Option<Target> {
    let mut fields = line.split(',').map(str::trim);
    let address = fields.next().filter(|f| !f.is_empty())?;
    let name = fields.next().filter(|f| !f.is_empty())?;
    let group_a = fields.next().filter(|f| !f.is_empty())?;
    let group_b = fields.next().filter(|f| !f.is_empty())?;

    Some(
        Target::new(address)
            .with_field(DISPLAY_NAME, name)
            .with_field(GROUP_A, group_a)
            .with_field(GROUP_B, group_b),
    )
}
