//! Classification of bridge output into error kinds
//!
//! adb reports most failures as free text, sometimes with a zero exit code
//! (`monkey` on a missing package, `connect` to an unreachable host). The
//! rules below are matched against the lowercased stdout and stderr. They
//! track the wording of current platform-tools and will need revisiting when
//! that wording changes.

use crate::bridge::CommandOutput;
use crate::error::{BridgeErrorKind, DeviceError, Result};

/// How a rule matches the lowercased output
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// Substring anywhere in the output
    Contains(&'static str),
    /// Prefix of a trimmed line
    LineStart(&'static str),
}

impl Pattern {
    fn matches(&self, text: &str) -> bool {
        match self {
            Pattern::Contains(needle) => text.contains(needle),
            Pattern::LineStart(prefix) => text.lines().any(|l| l.trim_start().starts_with(prefix)),
        }
    }
}

/// Ordered rule table; the first matching rule wins
pub static RULES: &[(Pattern, BridgeErrorKind)] = &[
    (Pattern::Contains("no devices/emulators found"), BridgeErrorKind::NoDevice),
    (Pattern::Contains("device offline"), BridgeErrorKind::DeviceOffline),
    (Pattern::Contains("device unauthorized"), BridgeErrorKind::Unauthorized),
    (Pattern::Contains("device still authorizing"), BridgeErrorKind::Unauthorized),
    (Pattern::LineStart("error: device '"), BridgeErrorKind::DeviceNotFound),
    (Pattern::Contains("device not found"), BridgeErrorKind::DeviceNotFound),
    (Pattern::Contains("connection refused"), BridgeErrorKind::ConnectionRefused),
    (Pattern::Contains("failed to connect"), BridgeErrorKind::ConnectionRefused),
    (Pattern::Contains("unable to connect"), BridgeErrorKind::ConnectionRefused),
    (Pattern::Contains("cannot connect"), BridgeErrorKind::ConnectionRefused),
    (Pattern::Contains("no activities found to run"), BridgeErrorKind::PackageNotFound),
    (Pattern::Contains("unknown package"), BridgeErrorKind::PackageNotFound),
    (Pattern::Contains("unknown command"), BridgeErrorKind::SettingRejected),
    (Pattern::Contains("unknown service"), BridgeErrorKind::SettingRejected),
    (Pattern::Contains("permission denial"), BridgeErrorKind::PermissionDenied),
    (Pattern::Contains("securityexception"), BridgeErrorKind::PermissionDenied),
    (Pattern::Contains("does not exist"), BridgeErrorKind::RemoteFileMissing),
    // screencap on a secure window
    (Pattern::Contains("status: -1"), BridgeErrorKind::Failed),
    (Pattern::LineStart("error:"), BridgeErrorKind::Failed),
    (Pattern::LineStart("adb: error:"), BridgeErrorKind::Failed),
];

/// Classify a finished command
///
/// Returns `None` for a zero exit code with no matching rule. A non-zero exit
/// code always yields a kind, falling back to [`BridgeErrorKind::Failed`].
pub fn classify(exit_code: Option<i32>, stdout: &str, stderr: &str) -> Option<BridgeErrorKind> {
    let text = format!("{}\n{}", stdout, stderr).to_lowercase();
    let matched = RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(&text))
        .map(|(_, kind)| *kind);

    match (matched, exit_code) {
        (Some(kind), _) => Some(kind),
        (None, Some(0)) => None,
        (None, _) => Some(BridgeErrorKind::Failed),
    }
}

/// Classify a command whose stdout is a diagnostic report
///
/// `dumpsys` and `getprop` output quotes arbitrary log text (connectivity
/// probes print `Failed to connect to ...` on a healthy bridge). With a zero
/// exit code only stderr is matched against the rules; a non-zero exit is
/// classified like any other command.
pub fn classify_report(
    exit_code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Option<BridgeErrorKind> {
    match exit_code {
        Some(0) => classify(exit_code, "", stderr),
        _ => classify(exit_code, stdout, stderr),
    }
}

/// Turn a classified failure into [`DeviceError::Bridge`], passing successes through
pub fn check_output(operation: &'static str, output: CommandOutput) -> Result<CommandOutput> {
    let verdict = classify(output.exit_code, &output.stdout, &output.stderr);
    into_result(operation, verdict, output)
}

/// [`check_output`] for report commands, see [`classify_report`]
pub fn check_report(operation: &'static str, output: CommandOutput) -> Result<CommandOutput> {
    let verdict = classify_report(output.exit_code, &output.stdout, &output.stderr);
    into_result(operation, verdict, output)
}

fn into_result(
    operation: &'static str,
    verdict: Option<BridgeErrorKind>,
    output: CommandOutput,
) -> Result<CommandOutput> {
    match verdict {
        None => Ok(output),
        Some(kind) => Err(failure(operation, kind, output)),
    }
}

/// Build the error for an output judged to be a failure
pub fn failure(operation: &'static str, kind: BridgeErrorKind, output: CommandOutput) -> DeviceError {
    DeviceError::Bridge {
        operation,
        kind,
        exit_code: output.exit_code,
        output: output.combined().trim().to_string(),
        command: output.command,
    }
}
