//! MAC address normalization and display formatting.
//!
//! Every table stores MAC addresses in one canonical form: lowercase, no
//! separators, 12 hex characters (`aabbccddeeff`). The colon-separated form
//! (`aa:bb:cc:dd:ee:ff`) is only ever derived for display.

use lazy_static::lazy_static;
use regex::Regex;

/// Length of a normalized MAC address.
pub const NORMALIZED_MAC_LEN: usize = 12;

lazy_static! {
    /// Accepted input shape: six hex pairs separated uniformly by `:` or by `-`.
    static ref MAC_INPUT_REGEX: Regex = Regex::new(
        r"^(?:[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5}|[0-9A-Fa-f]{2}(?:-[0-9A-Fa-f]{2}){5})$"
    )
    .unwrap();
}

/// Normalizes a MAC address for storage.
///
/// Strips every non-alphanumeric character and lowercases the rest. Returns
/// `None` for empty input. No hex validation happens here; callers check the
/// input shape with [`is_valid_mac_input`] first.
pub fn normalize_mac(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }

    Some(
        input
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect(),
    )
}

/// Formats a normalized MAC address as `aa:bb:cc:dd:ee:ff`.
///
/// Anything that is not exactly 12 characters long is returned unchanged.
pub fn format_mac_display(normalized: &str) -> String {
    if normalized.chars().count() != NORMALIZED_MAC_LEN {
        return normalized.to_string();
    }

    let chars: Vec<char> = normalized.chars().collect();
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
}

/// Returns true if the input matches an accepted MAC address shape.
pub fn is_valid_mac_input(input: &str) -> bool {
    MAC_INPUT_REGEX.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_colon_separated() {
        assert_eq!(
            normalize_mac("AA:BB:CC:DD:EE:FF"),
            Some("aabbccddeeff".to_string())
        );
    }

    #[test]
    fn test_normalize_hyphen_separated() {
        assert_eq!(
            normalize_mac("aa-bb-cc-dd-ee-ff"),
            Some("aabbccddeeff".to_string())
        );
    }

    #[test]
    fn test_normalize_mixed_case_and_noise() {
        assert_eq!(
            normalize_mac(" Aa.Bb cC:dd-EE_ff "),
            Some("aabbccddeeff".to_string())
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_mac(""), None);
    }

    #[test]
    fn test_normalize_does_not_check_hex() {
        assert_eq!(normalize_mac("not-a-mac"), Some("notamac".to_string()));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_mac_display("aabbccddeeff"), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_format_display_passthrough() {
        for input in ["", "abc", "aabbccddeef", "aabbccddeeff0", "aa:bb:cc:dd:ee:ff"] {
            assert_eq!(format_mac_display(input), input);
        }
    }

    #[test]
    fn test_normalize_then_format_is_canonical() {
        let inputs = [
            "AA:BB:CC:DD:EE:FF",
            "aa:bb:cc:dd:ee:ff",
            "AA-BB-CC-DD-EE-FF",
            "aa-bb-cc-dd-ee-ff",
            "Aa:bB:Cc:dD:Ee:fF",
        ];
        for input in inputs {
            let normalized = normalize_mac(input).unwrap();
            assert_eq!(format_mac_display(&normalized), "aa:bb:cc:dd:ee:ff");
        }
    }

    #[test]
    fn test_format_is_stable_after_renormalizing() {
        let display = format_mac_display(&normalize_mac("01-23-45-67-89-AB").unwrap());
        let again = format_mac_display(&normalize_mac(&display).unwrap());
        assert_eq!(display, again);
    }

    #[test]
    fn test_valid_mac_input() {
        assert!(is_valid_mac_input("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac_input("aa-bb-cc-dd-ee-ff"));
        assert!(is_valid_mac_input("01:23:45:67:89:ab"));
    }

    #[test]
    fn test_invalid_mac_input() {
        assert!(!is_valid_mac_input(""));
        assert!(!is_valid_mac_input("not-a-mac"));
        assert!(!is_valid_mac_input("aabbccddeeff"));
        assert!(!is_valid_mac_input("aa:bb:cc:dd:ee"));
        assert!(!is_valid_mac_input("aa:bb:cc:dd:ee:ff:00"));
        assert!(!is_valid_mac_input("gg:bb:cc:dd:ee:ff"));
        assert!(!is_valid_mac_input(" aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_mixed_separators_rejected() {
        assert!(!is_valid_mac_input("aa:bb-cc:dd:ee:ff"));
        assert!(!is_valid_mac_input("aa-bb-cc-dd-ee:ff"));
    }
}
