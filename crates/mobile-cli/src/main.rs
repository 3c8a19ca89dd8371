//! mobile - command-line control of an Android device over adb
//!
//! Usage:
//!     mobile [OPTIONS] [COMMAND]
//!
//! Without a command the device is woken and unlocked.
//!
//! Environment Variables:
//!     MOBILE_CONTROL_ADB_PATH: adb executable (default: bundled copy, then PATH)
//!     MOBILE_CONTROL_APPS_PATH: app registry JSON (default: auto/assets/mobile_apps.json)
//!     MOBILE_CONTROL_DEVICE: device serial for multi-device setups
//!     MOBILE_CONTROL_COMMAND_TIMEOUT: per-command timeout in seconds
//!     MOBILE_CONTROL_UNLOCK_PIN: PIN typed by the unlock sequence

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use mobile_control::{
    keycode_for, list_key_names, ControllerConfig, DeviceController, DeviceHandle, Radio,
    DEFAULT_APPS_PATH,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Control an Android device through adb
#[derive(Parser, Debug)]
#[command(name = "mobile")]
#[command(about = "Control an Android device through adb")]
#[command(after_help = r#"Examples:
    # Wake and unlock the first connected device
    mobile

    # Launch an app from the registry
    mobile open YouTube

    # Connect over Wi-Fi after enabling TCP/IP on a USB device
    mobile connect 192.168.1.100 --tcpip 5555

    # Save a screenshot
    mobile screenshot shots/home.png

    # Battery report as JSON
    mobile --json battery
"#)]
struct Cli {
    /// adb executable
    #[arg(long, env = "MOBILE_CONTROL_ADB_PATH")]
    adb_path: Option<PathBuf>,

    /// Directory holding a bundled assets/platform-tools/adb
    #[arg(long, env = "MOBILE_CONTROL_TOOLS_DIR", default_value = ".")]
    tools_dir: PathBuf,

    /// App registry JSON file
    #[arg(long, env = "MOBILE_CONTROL_APPS_PATH", default_value = DEFAULT_APPS_PATH)]
    apps: PathBuf,

    /// Device serial (default: first online device)
    #[arg(short = 'd', long, env = "MOBILE_CONTROL_DEVICE")]
    device: Option<String>,

    /// Per-command timeout in seconds
    #[arg(long, env = "MOBILE_CONTROL_COMMAND_TIMEOUT")]
    timeout: Option<f64>,

    /// PIN typed after the unlock swipe
    #[arg(long, env = "MOBILE_CONTROL_UNLOCK_PIN", hide_env_values = true)]
    pin: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List devices known to adb
    Devices,
    /// Select a device, optionally over TCP/IP
    Connect {
        /// host or host:port
        address: Option<String>,
        /// Restart adb and switch the USB device to TCP/IP on this port first
        #[arg(long, value_name = "PORT", num_args = 0..=1, default_missing_value = "5555")]
        tcpip: Option<u16>,
    },
    /// Drop a TCP/IP connection (all when no address is given)
    Disconnect { address: Option<String> },
    /// List installed packages, with registered names where known
    Apps,
    /// List registered app names and their packages
    Registry,
    /// Launch a registered app
    Open { name: String },
    /// Force-stop a registered app
    Close { name: String },
    /// Save a screenshot (default: screenshot_<timestamp>.png)
    Screenshot { path: Option<PathBuf> },
    /// Dial a phone number
    Call { number: String },
    /// Battery report
    Battery,
    /// Network report
    Network,
    /// Device properties
    Info,
    /// Switch Wi-Fi
    Wifi { state: Toggle },
    /// Switch Bluetooth
    Bluetooth { state: Toggle },
    /// Switch mobile data
    Data { state: Toggle },
    /// Type text into the focused field
    Text { text: String },
    /// Tap at a screen position
    Tap { x: u32, y: u32 },
    /// Swipe between two screen positions
    Swipe {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        /// Gesture duration in milliseconds
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Send a key by name (see `mobile keys`) or numeric code
    Key { key: String },
    /// List the key names accepted by `key`
    Keys,
    /// Wake and unlock the screen
    Unlock,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Filter from `RUST_LOG`, or `info` (`warn` when quiet) if it is unset or invalid
fn log_filter(quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if quiet { "warn" } else { "info" })
    })
}

fn init_tracing(quiet: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(quiet))
        .init();
}

fn build_config(args: &Cli) -> ControllerConfig {
    let mut config = ControllerConfig::new()
        .with_tools_dir(&args.tools_dir)
        .with_apps_path(&args.apps);
    if let Some(path) = &args.adb_path {
        config = config.with_bridge_path(path);
    }
    if let Some(secs) = args.timeout.filter(|s| *s > 0.0) {
        config = config.with_command_timeout(Duration::from_secs_f64(secs));
    }
    if let Some(pin) = &args.pin {
        config = config.with_unlock_pin(pin);
    }
    config
}

/// Print a value as JSON or through its human-readable form
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

async fn target(controller: &DeviceController, args: &Cli) -> Result<DeviceHandle> {
    match &args.device {
        Some(serial) => Ok(DeviceHandle::new(serial.clone())),
        None => controller
            .connect_device(None)
            .await
            .context("no device selected"),
    }
}

async fn run(args: Cli) -> Result<()> {
    let controller = DeviceController::new(build_config(&args))?;
    debug!("Using bridge at {}", controller.bridge_path().display());

    let demo = Commands::Unlock;
    let command = args.command.as_ref().unwrap_or(&demo);

    match command {
        Commands::Devices => {
            let devices = controller.list_devices().await?;
            emit(args.json, &devices, |devices| {
                if devices.is_empty() {
                    println!("No devices connected.");
                }
                for device in devices {
                    let model = device.model.as_deref().unwrap_or("-");
                    println!("  {:<24} {:<14} {}", device.serial, device.state, model);
                }
            })?;
        }
        Commands::Connect { address, tcpip } => {
            if let Some(port) = tcpip {
                controller.prepare_wireless(*port).await?;
            }
            let handle = controller.connect_device(address.as_deref()).await?;
            emit(args.json, &handle, |handle| {
                println!("\u{2713} Connected to {}", handle)
            })?;
        }
        Commands::Disconnect { address } => {
            let handle = address.as_deref().map(DeviceHandle::new);
            controller.disconnect_device(handle.as_ref()).await?;
            println!("\u{2713} Disconnected");
        }
        Commands::Registry => {
            let apps: BTreeMap<&str, &str> = controller.registry().iter().collect();
            emit(args.json, &apps, |apps| {
                println!("Registered apps:");
                for (name, package) in apps {
                    println!("  - {} ({})", name, package);
                }
            })?;
        }
        Commands::Apps => {
            let device = target(&controller, &args).await?;
            let apps = controller.get_installed_apps(&device).await?;
            emit(args.json, &apps, |apps| {
                for app in apps {
                    match controller.registry().app_name_for(app) {
                        Some(name) => println!("{}  [{}]", app, name),
                        None => println!("{}", app),
                    }
                }
            })?;
        }
        Commands::Keys => {
            let keys = key_table();
            emit(args.json, &keys, |keys| {
                for (name, code) in keys {
                    println!("  {:<18} {}", name, code);
                }
            })?;
        }
        Commands::Open { name } => {
            let device = target(&controller, &args).await?;
            let report = controller.open_app(&device, name).await?;
            emit(args.json, &report, |report| match report.elapsed_ms {
                Some(ms) => println!("\u{2713} Opened {} in {}ms", report.package, ms),
                None => println!("\u{2713} Opened {}", report.package),
            })?;
        }
        Commands::Close { name } => {
            let device = target(&controller, &args).await?;
            controller.close_app(&device, name).await?;
            println!("\u{2713} Closed {}", name);
        }
        Commands::Screenshot { path } => {
            let device = target(&controller, &args).await?;
            let path = path.clone().unwrap_or_else(|| {
                PathBuf::from(format!(
                    "screenshot_{}.png",
                    Local::now().format("%Y-%m-%d_%H-%M-%S-%3f")
                ))
            });
            let shot = controller.take_screenshot(&device, &path).await?;
            emit(args.json, &shot, |shot| {
                println!(
                    "\u{2713} Saved {} ({}x{})",
                    shot.path.display(),
                    shot.width,
                    shot.height
                )
            })?;
        }
        Commands::Call { number } => {
            let device = target(&controller, &args).await?;
            controller.make_call(&device, number).await?;
            println!("\u{2713} Call intent sent to {}", number);
        }
        Commands::Battery => {
            let device = target(&controller, &args).await?;
            let status = controller.get_battery_status(&device).await?;
            emit(args.json, &status, |status| {
                match status.percent() {
                    Some(pct) => println!("Level:       {:.0}%", pct),
                    None => println!("Level:       unknown"),
                }
                println!("Charging:    {}", status.is_charging());
                if let Some(state) = status.charging_state {
                    println!("Status:      {:?}", state);
                }
                if let Some(health) = status.health {
                    println!("Health:      {:?}", health);
                }
                if let Some(temp) = status.temperature_celsius {
                    println!("Temperature: {:.1}\u{b0}C", temp);
                }
                if let Some(mv) = status.voltage_mv {
                    println!("Voltage:     {} mV", mv);
                }
            })?;
        }
        Commands::Network => {
            let device = target(&controller, &args).await?;
            let status = controller.get_network_status(&device).await?;
            emit(args.json, &status, |status| {
                println!("Internet:    {}", status.internet_connected);
                println!("Wi-Fi:       {}", status.wifi_connected);
                println!("Mobile data: {}", status.mobile_data_connected);
            })?;
        }
        Commands::Info => {
            let device = target(&controller, &args).await?;
            let info = controller.get_device_info(&device).await?;
            emit(args.json, &info, |info| {
                println!("Brand:        {}", info.brand);
                println!("Model:        {}", info.model);
                println!("Manufacturer: {}", info.manufacturer);
                println!("Android:      {} (SDK {})", info.version, info.sdk);
                println!("Serial:       {}", info.serial);
            })?;
        }
        Commands::Wifi { state } => set_radio(&controller, &args, Radio::Wifi, *state).await?,
        Commands::Bluetooth { state } => {
            set_radio(&controller, &args, Radio::Bluetooth, *state).await?
        }
        Commands::Data { state } => {
            set_radio(&controller, &args, Radio::MobileData, *state).await?
        }
        Commands::Text { text } => {
            let device = target(&controller, &args).await?;
            controller.send_text(&device, text).await?;
            println!("\u{2713} Text sent");
        }
        Commands::Tap { x, y } => {
            let device = target(&controller, &args).await?;
            controller.tap(&device, *x, *y).await?;
            println!("\u{2713} Tapped ({}, {})", x, y);
        }
        Commands::Swipe {
            x1,
            y1,
            x2,
            y2,
            duration,
        } => {
            let device = target(&controller, &args).await?;
            controller
                .swipe(&device, (*x1, *y1), (*x2, *y2), *duration)
                .await?;
            println!("\u{2713} Swiped ({}, {}) -> ({}, {})", x1, y1, x2, y2);
        }
        Commands::Key { key } => {
            let device = target(&controller, &args).await?;
            match key.parse::<u32>() {
                Ok(code) => controller.send_keyevent(&device, code).await?,
                Err(_) => controller.send_named_key(&device, key).await?,
            }
            println!("\u{2713} Sent {}", key);
        }
        Commands::Unlock => {
            let device = target(&controller, &args).await?;
            controller.unlock_device(&device).await?;
            println!("\u{2713} Unlock sequence sent to {}", device);
        }
    }

    Ok(())
}

/// Named keys with their codes, sorted by name
fn key_table() -> BTreeMap<&'static str, u32> {
    list_key_names()
        .into_iter()
        .filter_map(|name| keycode_for(name).map(|code| (name, code)))
        .collect()
}

async fn set_radio(
    controller: &DeviceController,
    args: &Cli,
    radio: Radio,
    state: Toggle,
) -> Result<()> {
    let device = target(controller, args).await?;
    controller.set_radio(&device, radio, state.enabled()).await?;
    println!(
        "\u{2713} {:?} {}",
        radio,
        if state.enabled() { "enabled" } else { "disabled" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.quiet);
    run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobile_control::DEFAULT_TCPIP_PORT;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_defaults_to_unlock() {
        let args = Cli::try_parse_from(["mobile"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_connect_tcpip_default_port() {
        let args = Cli::try_parse_from(["mobile", "connect", "10.0.0.2", "--tcpip"]).unwrap();
        match args.command {
            Some(Commands::Connect { address, tcpip }) => {
                assert_eq!(address.as_deref(), Some("10.0.0.2"));
                assert_eq!(tcpip, Some(DEFAULT_TCPIP_PORT));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_keys_command_lists_every_named_key() {
        let args = Cli::try_parse_from(["mobile", "keys"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Keys)));

        let keys = key_table();
        assert_eq!(keys.len(), mobile_control::KEYCODES.len());
        assert_eq!(keys.get("HOME"), Some(&3));
        assert_eq!(keys.get("WAKEUP"), Some(&224));
        assert_eq!(keys.keys().next(), Some(&"APP_SWITCH"));
    }

    #[test]
    fn test_log_filter_respects_rust_log() {
        use tracing::level_filters::LevelFilter;

        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter(false).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_build_config() {
        let args = Cli::try_parse_from([
            "mobile",
            "--adb-path",
            "/opt/adb",
            "--apps",
            "apps.json",
            "--timeout",
            "30",
            "--pin",
            "1234",
            "wifi",
            "off",
        ])
        .unwrap();

        let config = build_config(&args);
        assert_eq!(config.bridge_path, Some(PathBuf::from("/opt/adb")));
        assert_eq!(config.apps_path, PathBuf::from("apps.json"));
        assert_eq!(config.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.unlock_pin.as_deref(), Some("1234"));
        assert!(matches!(
            args.command,
            Some(Commands::Wifi { state: Toggle::Off })
        ));
    }
}
