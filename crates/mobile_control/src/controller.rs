//! Device controller: high-level intents mapped onto bridge commands

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Span};

use crate::bridge::{self, Bridge, CommandRunner, ProcessRunner};
use crate::config::{keycode_for, AppRegistry, ControllerConfig, TIMING_CONFIG};
use crate::device::{normalize_address, parse_device_list, DeviceHandle, DeviceInfo};
use crate::error::{BridgeErrorKind, DeviceError, Result};
use crate::input::{escape_input_text, parse_launch_elapsed, validate_phone_number};
use crate::screenshot::{self, Screenshot};
use crate::status::{
    parse_battery, parse_connectivity, BatteryStatus, DeviceProperties, NetworkStatus,
    DEVICE_PROPERTIES,
};

const KEYCODE_WAKEUP: u32 = 224;
const KEYCODE_ENTER: u32 = 66;

/// Swipe used to dismiss the lock screen, in screen pixels
const UNLOCK_SWIPE_FROM: (u32, u32) = (400, 1000);
const UNLOCK_SWIPE_TO: (u32, u32) = (500, 300);
const UNLOCK_SWIPE_MS: u32 = 300;

/// Address pinged to decide internet reachability
const PING_TARGET: &str = "8.8.8.8";

/// Outcome of [`DeviceController::open_app`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchReport {
    pub app_name: String,
    pub package: String,
    /// Launch time reported by `monkey`
    pub elapsed_ms: Option<u64>,
}

/// Radio services that can be switched with `svc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radio {
    Wifi,
    Bluetooth,
    MobileData,
}

impl Radio {
    fn service(&self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Bluetooth => "bluetooth",
            Self::MobileData => "data",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Wifi => "Wi-Fi",
            Self::Bluetooth => "Bluetooth",
            Self::MobileData => "Mobile data",
        }
    }
}

/// Controls Android devices through the adb bridge
///
/// Every operation runs its bridge command(s) to completion before returning.
/// The controller only holds read-only state and can be shared between tasks.
#[derive(Debug, Clone)]
pub struct DeviceController {
    bridge: Bridge,
    registry: Arc<AppRegistry>,
    unlock_pin: Option<String>,
    span: Span,
}

impl DeviceController {
    /// Locate the bridge and load the app registry
    pub fn new(config: ControllerConfig) -> Result<Self> {
        let bridge_path = bridge::locate_bridge(&config)?;
        let registry = AppRegistry::load(&config.apps_path)?;
        let controller = Self::from_parts(bridge_path, registry, Arc::new(ProcessRunner), &config);
        info!(
            parent: &controller.span,
            "Loaded {} app configurations from {}",
            controller.registry.len(),
            config.apps_path.display()
        );
        Ok(controller)
    }

    /// Assemble a controller from already-resolved parts
    pub fn from_parts(
        bridge_path: PathBuf,
        registry: AppRegistry,
        runner: Arc<dyn CommandRunner>,
        config: &ControllerConfig,
    ) -> Self {
        let span = info_span!("device_controller", bridge = %bridge_path.display());
        Self {
            bridge: Bridge::new(bridge_path, runner, config.command_timeout, span.clone()),
            registry: Arc::new(registry),
            unlock_pin: config.unlock_pin.clone(),
            span,
        }
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    pub fn bridge_path(&self) -> &Path {
        self.bridge.path()
    }

    // ---- connection -------------------------------------------------------

    /// List devices known to the bridge
    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let output = self
            .bridge
            .run("list_devices", None, &["devices", "-l"])
            .await?;
        Ok(parse_device_list(&output.stdout))
    }

    /// Select a device to control
    ///
    /// Without an address the first online device is used. With an address
    /// (`host` or `host:port`) a TCP/IP connection is opened first.
    pub async fn connect_device(&self, address: Option<&str>) -> Result<DeviceHandle> {
        const OP: &str = "connect_device";

        let Some(address) = address else {
            let output = self.bridge.run(OP, None, &["devices", "-l"]).await?;
            let online = parse_device_list(&output.stdout)
                .into_iter()
                .find(DeviceInfo::is_online);
            return match online {
                Some(device) => {
                    info!(parent: &self.span, "Connected to device: {}", device.serial);
                    Ok(device.handle())
                }
                None => {
                    warn!(parent: &self.span, "No online devices found");
                    Err(bridge::failure(OP, BridgeErrorKind::NoDevice, output))
                }
            };
        };

        let address = normalize_address(address);
        let output = self
            .bridge
            .run(OP, None, &["connect", address.as_str()])
            .await?;

        let lower = output.combined().to_lowercase();
        if lower.contains("connected to") {
            info!(parent: &self.span, "Connected to device: {}", address);
            Ok(DeviceHandle::new(address))
        } else {
            Err(bridge::failure(OP, BridgeErrorKind::ConnectionRefused, output))
        }
    }

    /// Drop a TCP/IP connection, or all of them when `device` is `None`
    pub async fn disconnect_device(&self, device: Option<&DeviceHandle>) -> Result<()> {
        let mut args = vec!["disconnect"];
        if let Some(device) = device {
            args.push(device.serial());
        }
        self.bridge.run("disconnect_device", None, &args).await?;
        info!(parent: &self.span, "Device disconnected successfully");
        Ok(())
    }

    /// Restart the bridge server
    pub async fn restart_server(&self) -> Result<()> {
        // kill-server fails harmlessly when no server is running
        self.bridge
            .exec("restart_server", None, &["kill-server"])
            .await?;
        tokio::time::sleep(Duration::from_secs_f64(
            TIMING_CONFIG.connection.server_restart_delay,
        ))
        .await;
        self.bridge
            .run("restart_server", None, &["start-server"])
            .await?;
        Ok(())
    }

    /// Switch a USB device (or the only attached one) to TCP/IP mode
    pub async fn enable_tcpip(&self, device: Option<&DeviceHandle>, port: u16) -> Result<()> {
        let port = port.to_string();
        self.bridge
            .run(
                "enable_tcpip",
                device.map(DeviceHandle::serial),
                &["tcpip", port.as_str()],
            )
            .await?;
        tokio::time::sleep(Duration::from_secs_f64(TIMING_CONFIG.connection.tcpip_delay)).await;
        info!(parent: &self.span, "TCP/IP mode enabled on port {}", port);
        Ok(())
    }

    /// Restart the server and put the attached device in TCP/IP mode,
    /// ready for [`connect_device`](Self::connect_device) with its address
    pub async fn prepare_wireless(&self, port: u16) -> Result<()> {
        self.restart_server().await?;
        self.enable_tcpip(None, port).await
    }

    // ---- apps -------------------------------------------------------------

    /// Package identifiers installed on the device
    ///
    /// Each call queries the device again.
    pub async fn get_installed_apps(&self, device: &DeviceHandle) -> Result<Vec<String>> {
        let output = self
            .bridge
            .run(
                "get_installed_apps",
                Some(device.serial()),
                &["shell", "pm", "list", "packages"],
            )
            .await?;

        let apps: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.strip_prefix("package:").unwrap_or(line).to_string())
            .collect();

        info!(parent: &self.span, "Found {} installed apps", apps.len());
        Ok(apps)
    }

    /// Launch a registered app
    pub async fn open_app(&self, device: &DeviceHandle, app_name: &str) -> Result<LaunchReport> {
        let package = self.registry.resolve(app_name)?;

        let output = self
            .bridge
            .run(
                "open_app",
                Some(device.serial()),
                &[
                    "shell",
                    "monkey",
                    "-p",
                    package,
                    "-c",
                    "android.intent.category.LAUNCHER",
                    "1",
                ],
            )
            .await?;

        let elapsed_ms = parse_launch_elapsed(&output.stdout);
        match elapsed_ms {
            Some(ms) => info!(parent: &self.span, "App '{}' opened successfully in {}ms", app_name, ms),
            None => info!(parent: &self.span, "App '{}' opened successfully", app_name),
        }

        Ok(LaunchReport {
            app_name: app_name.to_string(),
            package: package.to_string(),
            elapsed_ms,
        })
    }

    /// Force-stop a registered app; stopping a stopped app succeeds
    pub async fn close_app(&self, device: &DeviceHandle, app_name: &str) -> Result<()> {
        let package = self.registry.resolve(app_name)?;
        self.bridge
            .run(
                "close_app",
                Some(device.serial()),
                &["shell", "am", "force-stop", package],
            )
            .await?;
        info!(parent: &self.span, "Closed app: {}", app_name);
        Ok(())
    }

    // ---- capture and calls ------------------------------------------------

    /// Save a PNG screenshot to `path`, creating parent directories
    pub async fn take_screenshot(
        &self,
        device: &DeviceHandle,
        path: impl AsRef<Path>,
    ) -> Result<Screenshot> {
        let shot = screenshot::capture(&self.bridge, device.serial(), path.as_ref(), &self.span)
            .await?;
        info!(parent: &self.span, "Screenshot saved to: {}", shot.path.display());
        Ok(shot)
    }

    /// Dispatch a call intent; success does not mean the call connected
    pub async fn make_call(&self, device: &DeviceHandle, number: &str) -> Result<()> {
        let number = validate_phone_number(number)?;
        let uri = format!("tel:{}", number);

        info!(parent: &self.span, "Dialing {}...", number);
        self.bridge
            .run(
                "make_call",
                Some(device.serial()),
                &[
                    "shell",
                    "am",
                    "start",
                    "-a",
                    "android.intent.action.CALL",
                    "-d",
                    uri.as_str(),
                ],
            )
            .await?;
        info!(parent: &self.span, "Call initiated to {}", number);
        Ok(())
    }

    // ---- status -----------------------------------------------------------

    pub async fn get_battery_status(&self, device: &DeviceHandle) -> Result<BatteryStatus> {
        let output = self
            .bridge
            .read(
                "get_battery_status",
                Some(device.serial()),
                &["shell", "dumpsys", "battery"],
            )
            .await?;
        Ok(parse_battery(&output.stdout))
    }

    /// Internet reachability plus Wi-Fi and mobile data state
    pub async fn get_network_status(&self, device: &DeviceHandle) -> Result<NetworkStatus> {
        const OP: &str = "get_network_status";

        // An unreachable host is a status, not a failure
        let ping = self
            .bridge
            .exec(OP, Some(device.serial()), &["shell", "ping", "-c", "1", PING_TARGET])
            .await?;

        let dump = self
            .bridge
            .read(OP, Some(device.serial()), &["shell", "dumpsys", "connectivity"])
            .await?;

        Ok(parse_connectivity(&dump.stdout, ping.success()))
    }

    /// Brand, model and build identity
    ///
    /// A property the device refuses to report reads as `"Unknown"`.
    pub async fn get_device_info(&self, device: &DeviceHandle) -> Result<DeviceProperties> {
        let mut values = BTreeMap::new();

        for &(key, prop) in DEVICE_PROPERTIES {
            match self
                .bridge
                .read("get_device_info", Some(device.serial()), &["shell", "getprop", prop])
                .await
            {
                Ok(output) => {
                    values.insert(key, output.stdout.trim().to_string());
                }
                Err(err @ DeviceError::Bridge { .. }) => {
                    warn!(parent: &self.span, "Could not read {}: {}", prop, err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(DeviceProperties::from_pairs(&values))
    }

    // ---- radios -----------------------------------------------------------

    /// Enable or disable a radio; always issues the command
    pub async fn set_radio(&self, device: &DeviceHandle, radio: Radio, enabled: bool) -> Result<()> {
        let action = if enabled { "enable" } else { "disable" };
        self.bridge
            .run(
                "set_radio",
                Some(device.serial()),
                &["shell", "svc", radio.service(), action],
            )
            .await?;
        info!(
            parent: &self.span,
            "{} {}",
            radio.label(),
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    pub async fn toggle_wifi(&self, device: &DeviceHandle, enabled: bool) -> Result<()> {
        self.set_radio(device, Radio::Wifi, enabled).await
    }

    pub async fn toggle_bluetooth(&self, device: &DeviceHandle, enabled: bool) -> Result<()> {
        self.set_radio(device, Radio::Bluetooth, enabled).await
    }

    pub async fn toggle_mobile_data(&self, device: &DeviceHandle, enabled: bool) -> Result<()> {
        self.set_radio(device, Radio::MobileData, enabled).await
    }

    // ---- input ------------------------------------------------------------

    /// Type text into the focused field
    pub async fn send_text(&self, device: &DeviceHandle, text: &str) -> Result<()> {
        let escaped = escape_input_text(text)?;
        self.bridge
            .run(
                "send_text",
                Some(device.serial()),
                &["shell", "input", "text", escaped.as_str()],
            )
            .await?;
        info!(parent: &self.span, "Sent text ({} chars)", text.chars().count());
        Ok(())
    }

    pub async fn send_keyevent(&self, device: &DeviceHandle, keycode: u32) -> Result<()> {
        let code = keycode.to_string();
        self.bridge
            .run(
                "send_keyevent",
                Some(device.serial()),
                &["shell", "input", "keyevent", code.as_str()],
            )
            .await?;
        info!(parent: &self.span, "Sent keyevent: {}", keycode);
        Ok(())
    }

    /// Send a key by name (`HOME`, `KEYCODE_BACK`, ...)
    pub async fn send_named_key(&self, device: &DeviceHandle, name: &str) -> Result<()> {
        let keycode = keycode_for(name)
            .ok_or_else(|| DeviceError::InvalidInput(format!("unknown key `{}`", name)))?;
        self.send_keyevent(device, keycode).await
    }

    pub async fn tap(&self, device: &DeviceHandle, x: u32, y: u32) -> Result<()> {
        let (x_arg, y_arg) = (x.to_string(), y.to_string());
        self.bridge
            .run(
                "tap",
                Some(device.serial()),
                &["shell", "input", "tap", x_arg.as_str(), y_arg.as_str()],
            )
            .await?;
        info!(parent: &self.span, "Tapped screen at ({}, {})", x, y);
        Ok(())
    }

    pub async fn swipe(
        &self,
        device: &DeviceHandle,
        from: (u32, u32),
        to: (u32, u32),
        duration_ms: Option<u32>,
    ) -> Result<()> {
        let mut args = vec![
            from.0.to_string(),
            from.1.to_string(),
            to.0.to_string(),
            to.1.to_string(),
        ];
        if let Some(ms) = duration_ms {
            args.push(ms.to_string());
        }

        let mut argv = vec!["shell", "input", "swipe"];
        argv.extend(args.iter().map(String::as_str));
        self.bridge
            .run("swipe", Some(device.serial()), &argv)
            .await?;
        Ok(())
    }

    /// Wake the screen, swipe the lock away and type the configured PIN
    ///
    /// Best-effort: the device offers no reliable unlocked-state query, so
    /// success means every step ran without error output.
    pub async fn unlock_device(&self, device: &DeviceHandle) -> Result<()> {
        self.send_keyevent(device, KEYCODE_WAKEUP).await?;
        tokio::time::sleep(Duration::from_secs_f64(TIMING_CONFIG.unlock.wake_delay)).await;

        self.swipe(device, UNLOCK_SWIPE_FROM, UNLOCK_SWIPE_TO, Some(UNLOCK_SWIPE_MS))
            .await?;
        tokio::time::sleep(Duration::from_secs_f64(TIMING_CONFIG.unlock.swipe_delay)).await;

        if let Some(pin) = &self.unlock_pin {
            self.send_text(device, pin).await?;
            self.send_keyevent(device, KEYCODE_ENTER).await?;
        }

        info!(parent: &self.span, "Unlock sequence sent to {}", device);
        Ok(())
    }
}
