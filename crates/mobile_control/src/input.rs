//! Argument preparation for input and intent commands

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{DeviceError, Result};

lazy_static! {
    static ref PHONE_NUMBER: Regex = Regex::new(r"^[0-9+\-]+$").unwrap();
    static ref MONKEY_ELAPSED: Regex = Regex::new(r"elapsed time=(\d+)ms").unwrap();
}

/// Characters the device shell would otherwise interpret
const SHELL_SPECIALS: &[char] = &[
    '\\', '"', '\'', '`', '$', '&', '|', ';', '<', '>', '(', ')', '*', '?', '~', '#', '!', '[',
    ']', '{', '}',
];

/// Escape text for `input text`
///
/// `adb shell` joins its arguments into one device-side shell command, so
/// metacharacters are backslash-escaped and spaces become `%s`, which
/// `input text` turns back into spaces.
///
/// `input text` has no escape for a literal `%s`, so text containing it is
/// rejected rather than typed with a space in its place. A lone `%` is fine.
pub fn escape_input_text(text: &str) -> Result<String> {
    if text.is_empty() {
        return Err(DeviceError::InvalidInput("text must not be empty".to_string()));
    }
    if text.contains(['\n', '\r']) {
        return Err(DeviceError::InvalidInput(
            "text must be a single line".to_string(),
        ));
    }
    if text.contains("%s") {
        return Err(DeviceError::InvalidInput(
            "text must not contain `%s`, the device types it as a space".to_string(),
        ));
    }

    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        match ch {
            ' ' => escaped.push_str("%s"),
            c if SHELL_SPECIALS.contains(&c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Loose phone number check: non-empty, digits, `+` and `-` only
pub fn validate_phone_number(number: &str) -> Result<&str> {
    let number = number.trim();
    if PHONE_NUMBER.is_match(number) {
        Ok(number)
    } else {
        Err(DeviceError::InvalidInput(format!(
            "invalid phone number `{}`",
            number
        )))
    }
}

/// Launch time reported by `monkey`, if present
pub fn parse_launch_elapsed(stdout: &str) -> Option<u64> {
    MONKEY_ELAPSED
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_spaces_and_specials() {
        assert_eq!(escape_input_text("hello world").unwrap(), "hello%sworld");
        assert_eq!(escape_input_text("a&b").unwrap(), "a\\&b");
        assert_eq!(
            escape_input_text("it's $5 (ok)").unwrap(),
            "it\\'s%s\\$5%s\\(ok\\)"
        );
        assert_eq!(escape_input_text("3803").unwrap(), "3803");
    }

    #[test]
    fn test_escape_rejects_empty_and_multiline() {
        assert!(matches!(
            escape_input_text(""),
            Err(DeviceError::InvalidInput(_))
        ));
        assert!(matches!(
            escape_input_text("line1\nline2"),
            Err(DeviceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_escape_rejects_literal_space_placeholder() {
        assert!(matches!(
            escape_input_text("50%sale"),
            Err(DeviceError::InvalidInput(_))
        ));
        assert_eq!(escape_input_text("50% off").unwrap(), "50%%soff");
    }

    #[test]
    fn test_phone_number_validation() {
        assert_eq!(validate_phone_number("+1-555-0100").unwrap(), "+1-555-0100");
        assert_eq!(validate_phone_number(" 112 ").unwrap(), "112");
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("555 0100").is_err());
        assert!(validate_phone_number("call-me").is_err());
        assert!(validate_phone_number("123;reboot").is_err());
    }

    #[test]
    fn test_parse_launch_elapsed() {
        let out = "Events injected: 1\n## Network stats: elapsed time=312ms (0ms mobile, 0ms wifi, 312ms not connected)\n";
        assert_eq!(parse_launch_elapsed(out), Some(312));
        assert_eq!(parse_launch_elapsed("Events injected: 1\n"), None);
    }
}
