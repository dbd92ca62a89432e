//! Common validation utilities.

use validator::ValidationError;

use crate::mac::is_valid_mac_input;

/// Validates a MAC address as typed by a user.
///
/// The input must be present and in one of the accepted shapes
/// (`XX:XX:XX:XX:XX:XX` or `XX-XX-XX-XX-XX-XX`).
pub fn validate_mac_address(input: &str) -> Result<(), ValidationError> {
    if input.is_empty() {
        let mut err = ValidationError::new("mac_required");
        err.message = Some("MAC Address is required.".into());
        return Err(err);
    }

    if !is_valid_mac_input(input) {
        let mut err = ValidationError::new("mac_format");
        err.message = Some(
            "Invalid MAC Address format. Use XX:XX:XX:XX:XX:XX or XX-XX-XX-XX-XX-XX.".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a VLAN name against the configured set of allowed names.
pub fn validate_vlan_name(name: &str, allowed: &[String]) -> Result<(), ValidationError> {
    if name.is_empty() {
        let mut err = ValidationError::new("vlan_required");
        err.message = Some("VLAN Name is required.".into());
        return Err(err);
    }

    if !allowed.iter().any(|v| v == name) {
        let mut err = ValidationError::new("vlan_invalid");
        err.message = Some(format!("Invalid VLAN Name. Must be one of: {}.", allowed.join(", ")).into());
        return Err(err);
    }

    Ok(())
}
