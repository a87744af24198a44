//! Device discovery
//!
//! A paired DualShock 4 shows up as up to three evdev nodes. They share the
//! base name "Wireless Controller" (prefixed with the vendor when wired) and
//! differ by suffix:
//!
//! | Reported name                              | Role            |
//! |--------------------------------------------|-----------------|
//! | `Wireless Controller`                      | `Controller`    |
//! | `Wireless Controller Motion Sensors`       | `MotionSensors` |
//! | `Wireless Controller Touchpad`             | `Touchpad`      |

use std::fmt;
use tracing::{debug, info};

use super::device::{DeviceSource, EvdevSource, RawInputDevice};

const VENDOR_PREFIX: &str = "Sony Interactive Entertainment ";
const BASE_NAME: &str = "Wireless Controller";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Controller,
    MotionSensors,
    Touchpad,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceRole::Controller => "Controller",
            DeviceRole::MotionSensors => "MotionSensors",
            DeviceRole::Touchpad => "Touchpad",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to list input devices: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to find any controller inputs, is it paired and on?")]
    NotFound,
}

/// A discovered device together with its role
pub struct Input {
    pub device: Box<dyn RawInputDevice>,
    pub role: DeviceRole,
}

impl Input {
    pub fn name(&self) -> &str {
        self.device.name()
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.device.name())
            .field("path", &self.device.path())
            .field("role", &self.role)
            .finish()
    }
}

/// Removes every "[Sony Interactive Entertainment ]Wireless Controller" from `name`
fn strip_base_name(name: &str) -> String {
    let mut residual = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest
            .strip_prefix(VENDOR_PREFIX)
            .and_then(|r| r.strip_prefix(BASE_NAME))
        {
            rest = after;
        } else if let Some(after) = rest.strip_prefix(BASE_NAME) {
            rest = after;
        } else {
            residual.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    residual
}

/// Maps a kernel device name to its role, `None` for anything else
pub fn classify_name(name: &str) -> Option<DeviceRole> {
    match strip_base_name(name).trim() {
        "" => Some(DeviceRole::Controller),
        "Motion Sensors" => Some(DeviceRole::MotionSensors),
        "Touchpad" => Some(DeviceRole::Touchpad),
        _ => None,
    }
}

/// Discovers controller inputs under `/dev/input/event*`
pub fn discover() -> Result<Vec<Input>, DiscoveryError> {
    discover_with(&EvdevSource::default())
}

/// Discovers controller inputs from any device source
///
/// The result keeps the order the source reported the devices in.
///
/// # Errors
///
/// * [`DiscoveryError::Io`] - the source could not list its devices
/// * [`DiscoveryError::NotFound`] - nothing matched any of the three roles
pub fn discover_with(source: &dyn DeviceSource) -> Result<Vec<Input>, DiscoveryError> {
    let candidates = source.list_devices()?;
    debug!("Found {} candidate input devices", candidates.len());

    let mut inputs = Vec::new();
    for device in candidates {
        match classify_name(device.name()) {
            Some(role) => {
                info!(
                    "Found {} input: {} ({})",
                    role,
                    device.name(),
                    device.path().display()
                );
                inputs.push(Input { device, role });
            }
            None => info!(
                "Skipping: {} ({})",
                device.name(),
                device.path().display()
            ),
        }
    }

    if inputs.is_empty() {
        return Err(DiscoveryError::NotFound);
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::device::RawEvent;
    use std::io;
    use std::path::{Path, PathBuf};

    struct NamedDevice {
        name: String,
        path: PathBuf,
    }

    impl RawInputDevice for NamedDevice {
        fn name(&self) -> &str {
            &self.name
        }

        fn path(&self) -> &Path {
            &self.path
        }

        fn read_one(&mut self) -> io::Result<RawEvent> {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "no events"))
        }
    }

    struct FakeSource {
        names: Vec<&'static str>,
    }

    impl DeviceSource for FakeSource {
        fn list_devices(&self) -> io::Result<Vec<Box<dyn RawInputDevice>>> {
            Ok(self
                .names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    Box::new(NamedDevice {
                        name: name.to_string(),
                        path: PathBuf::from(format!("/dev/input/event{}", i)),
                    }) as Box<dyn RawInputDevice>
                })
                .collect())
        }
    }

    struct BrokenSource;

    impl DeviceSource for BrokenSource {
        fn list_devices(&self) -> io::Result<Vec<Box<dyn RawInputDevice>>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn roles(inputs: &[Input]) -> Vec<DeviceRole> {
        inputs.iter().map(|input| input.role).collect()
    }

    #[test]
    fn classifies_wired_and_wireless_names() {
        assert_eq!(
            classify_name("Wireless Controller"),
            Some(DeviceRole::Controller)
        );
        assert_eq!(
            classify_name("Sony Interactive Entertainment Wireless Controller"),
            Some(DeviceRole::Controller)
        );
        assert_eq!(
            classify_name("Sony Interactive Entertainment Wireless Controller Motion Sensors"),
            Some(DeviceRole::MotionSensors)
        );
        assert_eq!(
            classify_name("Wireless Controller Touchpad"),
            Some(DeviceRole::Touchpad)
        );
    }

    #[test]
    fn rejects_other_devices() {
        assert_eq!(classify_name("AT Translated Set 2 keyboard"), None);
        assert_eq!(classify_name("Xbox Wireless Controller"), None);
        assert_eq!(classify_name("Sony Interactive Entertainment Touchpad"), None);
        assert_eq!(classify_name(""), Some(DeviceRole::Controller));
    }

    #[test]
    fn keeps_host_order_and_skips_unknown_devices() {
        let source = FakeSource {
            names: vec![
                "Power Button",
                "Wireless Controller Touchpad",
                "Wireless Controller Motion Sensors",
                "Logitech USB Receiver",
                "Wireless Controller",
            ],
        };

        let inputs = discover_with(&source).unwrap();
        assert_eq!(
            roles(&inputs),
            vec![
                DeviceRole::Touchpad,
                DeviceRole::MotionSensors,
                DeviceRole::Controller
            ]
        );
        assert_eq!(inputs[2].device.path(), Path::new("/dev/input/event4"));
    }

    #[test]
    fn repeated_discovery_is_stable() {
        let source = FakeSource {
            names: vec!["Wireless Controller", "Wireless Controller Touchpad"],
        };

        let first = roles(&discover_with(&source).unwrap());
        let second = roles(&discover_with(&source).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn no_match_is_not_found() {
        let source = FakeSource {
            names: vec!["Power Button", "Video Bus"],
        };
        assert!(matches!(
            discover_with(&source),
            Err(DiscoveryError::NotFound)
        ));

        let empty = FakeSource { names: vec![] };
        assert!(matches!(discover_with(&empty), Err(DiscoveryError::NotFound)));
    }

    #[test]
    fn listing_failure_propagates() {
        match discover_with(&BrokenSource) {
            Err(DiscoveryError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
