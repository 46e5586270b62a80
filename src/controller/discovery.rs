//! # Controller Discovery
//!
//! Resolves the PS4 controller to its `/dev/input/eventX` node.
//!
//! The kernel lists input devices in `/proc/bus/input/devices`. A paired
//! DualShock 4 shows up as:
//!
//! ```text
//! I: Bus=0005 Vendor=054c Product=09cc Version=8100
//! N: Name="Wireless Controller"
//! P: Phys=00:17:e9:b2:4c:1f
//! H: Handlers=event4 js0
//! ```
//!
//! The touchpad and motion sensors are separate entries with their own
//! names, so the first `H:` line after the exact name match is the gamepad.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::error::{PadDriveError, Result};

/// Directory holding the event device nodes.
const INPUT_DIR: &str = "/dev/input";

/// Finds the event node for the device called `name` in a
/// `/proc/bus/input/devices` listing.
///
/// # Examples
///
/// ```
/// use pad_drive::controller::discovery::find_event_device;
/// use std::path::PathBuf;
///
/// let listing = "N: Name=\"Wireless Controller\"\nH: Handlers=event4 js0\n";
/// assert_eq!(
///     find_event_device(listing, "Wireless Controller"),
///     Some(PathBuf::from("/dev/input/event4"))
/// );
/// ```
#[must_use]
pub fn find_event_device(listing: &str, name: &str) -> Option<PathBuf> {
    let wanted = format!("N: Name=\"{}\"", name);
    let mut in_entry = false;

    for line in listing.lines() {
        let line = line.trim_end();

        if line.is_empty() {
            // Entries are separated by blank lines
            in_entry = false;
            continue;
        }

        if line.starts_with("N: Name=") {
            in_entry = line == wanted;
            continue;
        }

        if in_entry {
            if let Some(handlers) = line.strip_prefix("H: Handlers=") {
                let event = handlers
                    .split_whitespace()
                    .find(|h| h.starts_with("event"))?;
                return Some(Path::new(INPUT_DIR).join(event));
            }
        }
    }

    None
}

/// Resolves the controller's event node from configuration.
///
/// An explicit `device_path` wins; otherwise `devices_file` is searched for
/// `device_name`.
///
/// # Errors
///
/// - `ControllerNotFound`: no entry with that name (controller not connected)
/// - `DeviceUnavailable`: the listing itself cannot be read
pub fn resolve_input_path(config: &ControllerConfig) -> Result<PathBuf> {
    if !config.device_path.is_empty() {
        debug!("Using configured input device {}", config.device_path);
        return Ok(PathBuf::from(&config.device_path));
    }

    let listing = fs::read_to_string(&config.devices_file).map_err(|e| {
        PadDriveError::DeviceUnavailable(format!(
            "Failed to read {}: {}",
            config.devices_file, e
        ))
    })?;

    match find_event_device(&listing, &config.device_name) {
        Some(path) => {
            info!("Found '{}' at: {}", config.device_name, path.display());
            Ok(path)
        }
        None => Err(PadDriveError::ControllerNotFound(config.device_name.clone())),
    }
}

/// Opens the controller's event node for blocking reads.
///
/// # Errors
///
/// Returns `DeviceUnavailable` if the node cannot be opened (permissions,
/// controller disconnected between discovery and open).
pub fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        PadDriveError::DeviceUnavailable(format!("Failed to open {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LISTING: &str = r#"I: Bus=0019 Vendor=0001 Product=0001 Version=0100
N: Name="EV3 Brick Buttons"
P: Phys=gpio-keys/input0
H: Handlers=kbd event0
B: EV=100003

I: Bus=0005 Vendor=054c Product=09cc Version=8100
N: Name="Wireless Controller Touchpad"
P: Phys=00:17:e9:b2:4c:1f
H: Handlers=mouse0 event2
B: EV=b

I: Bus=0005 Vendor=054c Product=09cc Version=8100
N: Name="Wireless Controller Motion Sensors"
P: Phys=00:17:e9:b2:4c:1f
H: Handlers=event3
B: EV=19

I: Bus=0005 Vendor=054c Product=09cc Version=8100
N: Name="Wireless Controller"
P: Phys=00:17:e9:b2:4c:1f
S: Sysfs=/devices/platform/serial8250.2/tty/ttyS2/hci0/hci0:1/0005:054C:09CC.0001/input/input4
U: Uniq=a4:ae:12:9f:11:02
H: Handlers=event4 js0
B: EV=20000b
"#;

    fn controller_config(devices_file: &str) -> ControllerConfig {
        ControllerConfig {
            devices_file: devices_file.to_string(),
            ..ControllerConfig::default()
        }
    }

    #[test]
    fn test_find_exact_name_only() {
        assert_eq!(
            find_event_device(LISTING, "Wireless Controller"),
            Some(PathBuf::from("/dev/input/event4"))
        );
    }

    #[test]
    fn test_find_other_device() {
        assert_eq!(
            find_event_device(LISTING, "EV3 Brick Buttons"),
            Some(PathBuf::from("/dev/input/event0"))
        );
    }

    #[test]
    fn test_find_missing_device() {
        assert_eq!(find_event_device(LISTING, "Xbox Wireless Controller"), None);
        assert_eq!(find_event_device("", "Wireless Controller"), None);
    }

    #[test]
    fn test_handlers_without_event_node() {
        let listing = "N: Name=\"Wireless Controller\"\nH: Handlers=js0\n";
        assert_eq!(find_event_device(listing, "Wireless Controller"), None);
    }

    #[test]
    fn test_entry_boundary_resets_match() {
        // Name matched but its entry has no H: line; the next entry's
        // handlers must not be attributed to it.
        let listing = "N: Name=\"Wireless Controller\"\nP: Phys=x\n\nN: Name=\"Other\"\nH: Handlers=event9\n";
        assert_eq!(find_event_device(listing, "Wireless Controller"), None);
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let config = ControllerConfig {
            device_path: "/dev/input/event7".to_string(),
            devices_file: "/nonexistent".to_string(),
            ..ControllerConfig::default()
        };
        assert_eq!(
            resolve_input_path(&config).unwrap(),
            PathBuf::from("/dev/input/event7")
        );
    }

    #[test]
    fn test_resolve_from_devices_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LISTING.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = controller_config(file.path().to_str().unwrap());
        assert_eq!(
            resolve_input_path(&config).unwrap(),
            PathBuf::from("/dev/input/event4")
        );
    }

    #[test]
    fn test_resolve_controller_not_connected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"N: Name=\"EV3 Brick Buttons\"\nH: Handlers=kbd event0\n")
            .unwrap();
        file.flush().unwrap();

        let config = controller_config(file.path().to_str().unwrap());
        assert!(matches!(
            resolve_input_path(&config),
            Err(PadDriveError::ControllerNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_unreadable_listing() {
        let config = controller_config("/nonexistent/proc/bus/input/devices");
        assert!(matches!(
            resolve_input_path(&config),
            Err(PadDriveError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_open_input_missing_node() {
        let result = open_input(Path::new("/nonexistent/event99"));
        assert!(matches!(result, Err(PadDriveError::DeviceUnavailable(_))));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_resolve_with_real_hardware() {
        let path = resolve_input_path(&ControllerConfig::default()).unwrap();
        assert!(path.starts_with("/dev/input"));
    }
}
