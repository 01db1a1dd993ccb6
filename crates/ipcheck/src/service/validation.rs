//! Request validation for the check service.
//!
//! Everything here runs before any probing starts.

use std::net::IpAddr;

use serde_json::Value;

use crate::error::ServiceError;
use crate::types::{Metadata, Target};

const MAX_ADDRESS_LEN: usize = 253;

/// Validate a single address
pub fn validate_address(address: &str) -> Result<(), ServiceError> {
    if address.is_empty() {
        return Err(ServiceError::invalid("address is required"));
    }

    if address.len() > MAX_ADDRESS_LEN {
        return Err(ServiceError::invalid(format!(
            "address too long: {} bytes (max: {} bytes)",
            address.len(),
            MAX_ADDRESS_LEN
        )));
    }

    let literal = address.trim_start_matches('[').trim_end_matches(']');
    if literal.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    validate_hostname(address)
}

fn validate_hostname(host: &str) -> Result<(), ServiceError> {
    let valid_chars = host.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid_chars {
        return Err(ServiceError::invalid(format!("invalid address: {host}")));
    }

    let valid_labels = host
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));
    if !valid_labels {
        return Err(ServiceError::invalid(format!("invalid address: {host}")));
    }

    Ok(())
}

/// Validate the size of a batch
pub fn validate_batch_size(len: usize, max: usize) -> Result<(), ServiceError> {
    if len == 0 {
        return Err(ServiceError::invalid("entries must be a non-empty list"));
    }

    if len > max {
        return Err(ServiceError::invalid(format!("too many entries: {len} (max: {max})")));
    }

    Ok(())
}

/// Turn one batch entry into a target.
///
/// The entry must be an object with a string `address` (or legacy `ip`)
/// field. Every other field becomes passthrough metadata; a legacy `ip`
/// stays in the metadata so older clients find it in the result row.
pub fn target_from_entry(index: usize, entry: Value) -> Result<Target, ServiceError> {
    let Value::Object(mut fields) = entry else {
        return Err(ServiceError::invalid(format!("entry {index} is not an object")));
    };

    let raw = match fields.remove("address") {
        Some(address) => Some(address),
        None => fields.get("ip").cloned(),
    };
    let address = match raw {
        Some(Value::String(address)) => address.trim().to_string(),
        Some(_) => return Err(ServiceError::invalid(format!("entry {index}: address must be a string"))),
        None => return Err(ServiceError::invalid(format!("entry {index}: address is required"))),
    };

    validate_address(&address)
        .map_err(|e| ServiceError::invalid(format!("entry {index}: {e}")))?;

    let metadata: Metadata = fields;
    Ok(Target { address, metadata })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_ip_literals_and_hostnames() {
        assert!(validate_address("192.168.1.1").is_ok());
        assert!(validate_address("::1").is_ok());
        assert!(validate_address("[fe80::1]").is_ok());
        assert!(validate_address("router-01.tower-a.example").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(validate_address("").is_err());
        assert!(validate_address("10.0.0.1; rm -rf /").is_err());
        assert!(validate_address("-c").is_err());
        assert!(validate_address("host..example").is_err());
        assert!(validate_address(&"a".repeat(300)).is_err());
    }

    #[test]
    fn batch_must_be_non_empty_and_bounded() {
        assert!(validate_batch_size(0, 10).is_err());
        assert!(validate_batch_size(10, 10).is_ok());
        assert!(validate_batch_size(11, 10).is_err());
    }

    #[test]
    fn entries_keep_their_passthrough_fields() {
        let target = target_from_entry(0, json!({"ip": " 10.0.0.1 ", "name": "AP", "n": 3})).unwrap();
        assert_eq!(target.address, "10.0.0.1");
        assert_eq!(target.field("name"), Some("AP"));
        assert_eq!(target.metadata.get("n"), Some(&json!(3)));
        assert_eq!(target.field("ip"), Some(" 10.0.0.1 "));
    }

    #[test]
    fn address_key_wins_and_is_not_echoed() {
        let target = target_from_entry(0, json!({"address": "10.0.0.2", "ip": "10.0.0.9"})).unwrap();
        assert_eq!(target.address, "10.0.0.2");
        assert!(!target.metadata.contains_key("address"));
        assert_eq!(target.field("ip"), Some("10.0.0.9"));
    }

    #[test]
    fn entries_without_a_valid_address_are_rejected() {
        assert!(target_from_entry(0, json!({"name": "AP"})).is_err());
        assert!(target_from_entry(1, json!({"address": 42})).is_err());
        assert!(target_from_entry(2, json!("10.0.0.1")).is_err());
        assert!(target_from_entry(3, json!({"address": "  "})).is_err());
    }
}
