//! Device handles and `adb devices` parsing

use serde::Serialize;
use std::fmt;

use crate::config::DEFAULT_TCPIP_PORT;

/// How the bridge reaches a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Usb,
    Emulator,
    /// TCP/IP (`host:port` serial)
    Remote,
}

impl ConnectionType {
    fn from_serial(serial: &str) -> Self {
        if serial.starts_with("emulator-") {
            Self::Emulator
        } else if serial.contains(':') {
            Self::Remote
        } else {
            Self::Usb
        }
    }
}

/// A device selected for control
///
/// Returned by [`DeviceController::connect_device`](crate::DeviceController::connect_device)
/// and passed to every device-scoped operation, so several devices can be
/// driven from one controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceHandle {
    serial: String,
    #[serde(skip)]
    connection_type: ConnectionType,
}

impl DeviceHandle {
    pub fn new(serial: impl Into<String>) -> Self {
        let serial = serial.into();
        let connection_type = ConnectionType::from_serial(&serial);
        Self {
            serial,
            connection_type,
        }
    }

    /// Serial passed to the bridge with `-s`
    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serial)
    }
}

/// One row of `adb devices -l`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    /// `device`, `offline`, `unauthorized`, ...
    pub state: String,
    pub connection_type: ConnectionType,
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Ready to accept commands
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }

    pub fn handle(&self) -> DeviceHandle {
        DeviceHandle::new(self.serial.clone())
    }
}

/// Parse `adb devices [-l]` output, skipping the header and daemon chatter
pub fn parse_device_list(stdout: &str) -> Vec<DeviceInfo> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?.to_string();
            let state = parts.next()?.to_string();
            let model = parts
                .find_map(|part| part.strip_prefix("model:"))
                .map(str::to_string);

            Some(DeviceInfo {
                connection_type: ConnectionType::from_serial(&serial),
                serial,
                state,
                model,
            })
        })
        .collect()
}

/// Append the default TCP/IP port when an address has none
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    if address.contains(':') {
        address.to_string()
    } else {
        format!("{}:{}", address, DEFAULT_TCPIP_PORT)
    }
}
