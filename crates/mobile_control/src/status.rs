//! Parsed device status reports

use serde::Serialize;
use std::collections::BTreeMap;

/// `BatteryManager.BATTERY_STATUS_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingState {
    Unknown,
    Charging,
    Discharging,
    NotCharging,
    Full,
}

impl ChargingState {
    fn from_code(code: u32) -> Self {
        match code {
            2 => Self::Charging,
            3 => Self::Discharging,
            4 => Self::NotCharging,
            5 => Self::Full,
            _ => Self::Unknown,
        }
    }
}

/// `BatteryManager.BATTERY_HEALTH_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryHealth {
    Unknown,
    Good,
    Overheat,
    Dead,
    OverVoltage,
    Failure,
    Cold,
}

impl BatteryHealth {
    fn from_code(code: u32) -> Self {
        match code {
            2 => Self::Good,
            3 => Self::Overheat,
            4 => Self::Dead,
            5 => Self::OverVoltage,
            6 => Self::Failure,
            7 => Self::Cold,
            _ => Self::Unknown,
        }
    }
}

/// Battery report from `dumpsys battery`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatteryStatus {
    pub level: Option<u32>,
    pub scale: Option<u32>,
    pub voltage_mv: Option<u32>,
    pub temperature_celsius: Option<f32>,
    pub ac_powered: bool,
    pub usb_powered: bool,
    pub wireless_powered: bool,
    pub charging_state: Option<ChargingState>,
    pub health: Option<BatteryHealth>,
    pub technology: Option<String>,
    /// Every `key: value` line, keys lowercased with spaces as underscores
    pub raw: BTreeMap<String, String>,
}

impl BatteryStatus {
    /// Any power source attached
    pub fn is_charging(&self) -> bool {
        self.ac_powered || self.usb_powered || self.wireless_powered
    }

    /// Level as a percentage of `scale` (assumed 100 when absent)
    pub fn percent(&self) -> Option<f32> {
        let level = self.level? as f32;
        let scale = self.scale.filter(|s| *s > 0).unwrap_or(100) as f32;
        Some(level * 100.0 / scale)
    }
}

/// Parse `dumpsys battery`
///
/// Lines without a value (section headers) and values that fail to parse are
/// kept only in `raw`.
pub fn parse_battery(stdout: &str) -> BatteryStatus {
    let mut status = BatteryStatus::default();

    for line in stdout.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase().replace(' ', "_");
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        match key.as_str() {
            "level" => status.level = value.parse().ok(),
            "scale" => status.scale = value.parse().ok(),
            "voltage" => status.voltage_mv = value.parse().ok(),
            "temperature" => {
                status.temperature_celsius = value.parse::<i32>().ok().map(|t| t as f32 / 10.0)
            }
            "ac_powered" => status.ac_powered = value.eq_ignore_ascii_case("true"),
            "usb_powered" => status.usb_powered = value.eq_ignore_ascii_case("true"),
            "wireless_powered" => status.wireless_powered = value.eq_ignore_ascii_case("true"),
            "status" => status.charging_state = value.parse().ok().map(ChargingState::from_code),
            "health" => status.health = value.parse().ok().map(BatteryHealth::from_code),
            "technology" => status.technology = Some(value.to_string()),
            _ => {}
        }
        status.raw.insert(key, value.to_string());
    }

    status
}

/// Connectivity report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkStatus {
    /// The device answered a ping to a public address
    pub internet_connected: bool,
    pub wifi_connected: bool,
    pub mobile_data_connected: bool,
    #[serde(skip_serializing)]
    pub raw: String,
}

/// Fill the transport flags from `dumpsys connectivity`
///
/// A transport counts as connected when one line names it together with
/// `CONNECTED`, as in `NetworkAgentInfo{... ni{WIFI CONNECTED ...}}`.
pub fn parse_connectivity(stdout: &str, internet_connected: bool) -> NetworkStatus {
    let mut status = NetworkStatus {
        internet_connected,
        raw: stdout.to_string(),
        ..Default::default()
    };

    for line in stdout.lines() {
        let upper = line.to_uppercase();
        if !upper.contains("CONNECTED") || upper.contains("DISCONNECTED") {
            continue;
        }
        if upper.contains("WIFI") || upper.contains("WI-FI") {
            status.wifi_connected = true;
        }
        if upper.contains("MOBILE") || upper.contains("CELLULAR") {
            status.mobile_data_connected = true;
        }
    }

    status
}

/// System properties read with `getprop`
pub const DEVICE_PROPERTIES: &[(&str, &str)] = &[
    ("brand", "ro.product.brand"),
    ("model", "ro.product.model"),
    ("version", "ro.build.version.release"),
    ("sdk", "ro.build.version.sdk"),
    ("manufacturer", "ro.product.manufacturer"),
    ("serial", "ro.serialno"),
];

/// Placeholder for a property that could not be read
pub const UNKNOWN_PROPERTY: &str = "Unknown";

/// Identity of a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProperties {
    pub brand: String,
    pub model: String,
    pub version: String,
    pub sdk: String,
    pub manufacturer: String,
    pub serial: String,
}

impl DeviceProperties {
    /// Build from `(key, value)` pairs keyed like [`DEVICE_PROPERTIES`]
    pub fn from_pairs(pairs: &BTreeMap<&str, String>) -> Self {
        let get = |key: &str| {
            pairs
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PROPERTY.to_string())
        };
        Self {
            brand: get("brand"),
            model: get("model"),
            version: get("version"),
            sdk: get("sdk"),
            manufacturer: get("manufacturer"),
            serial: get("serial"),
        }
    }
}
