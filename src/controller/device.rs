//! Raw input device capability
//!
//! Thin seam over the kernel's evdev nodes. Everything above this module only
//! sees [`RawInputDevice`] and [`DeviceSource`], so discovery and watching can
//! run against in-memory devices in tests.

use chrono::{DateTime, Local};
use evdev::raw_stream::RawDevice;
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::DiscoverySettings;

/// Kernel event category (`EV_*`) of a raw record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventKind(pub u16);

impl EventKind {
    pub const SYNC: EventKind = EventKind(0x00);
    pub const KEY: EventKind = EventKind(0x01);
    pub const ABSOLUTE: EventKind = EventKind(0x03);
    pub const MISC: EventKind = EventKind(0x04);
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EventKind::SYNC => write!(f, "EV_SYN"),
            EventKind::KEY => write!(f, "EV_KEY"),
            EventKind::ABSOLUTE => write!(f, "EV_ABS"),
            EventKind::MISC => write!(f, "EV_MSC"),
            EventKind(other) => write!(f, "EV_{:#04x}", other),
        }
    }
}

/// One record as read from the device node
#[derive(Clone, Debug, PartialEq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    pub timestamp: DateTime<Local>,
}

impl RawEvent {
    /// Builds a record stamped with the current local time
    pub fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self {
            kind,
            code,
            value,
            timestamp: Local::now(),
        }
    }
}

impl From<evdev::InputEvent> for RawEvent {
    fn from(event: evdev::InputEvent) -> Self {
        Self {
            kind: EventKind(event.event_type().0),
            code: event.code(),
            value: event.value(),
            timestamp: DateTime::<Local>::from(event.timestamp()),
        }
    }
}

/// An open input device that can be read one event at a time
pub trait RawInputDevice: Send {
    /// Name reported by the kernel driver
    fn name(&self) -> &str;

    /// Device node the handle was opened from
    fn path(&self) -> &Path;

    /// Blocks until the next raw record is available
    fn read_one(&mut self) -> io::Result<RawEvent>;
}

/// Lists the input devices present on the host
pub trait DeviceSource {
    fn list_devices(&self) -> io::Result<Vec<Box<dyn RawInputDevice>>>;
}

/// evdev-backed device node
pub struct EvdevDevice {
    device: RawDevice,
    name: String,
    path: PathBuf,
    pending: VecDeque<RawEvent>,
}

impl EvdevDevice {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = RawDevice::open(&path)?;
        let name = device.name().unwrap_or_default().to_string();
        Ok(Self {
            device,
            name,
            path,
            pending: VecDeque::new(),
        })
    }
}

impl fmt::Debug for EvdevDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvdevDevice")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl RawInputDevice for EvdevDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn read_one(&mut self) -> io::Result<RawEvent> {
        // fetch_events hands back a whole batch; keep the rest for later calls
        while self.pending.is_empty() {
            let batch = self.device.fetch_events()?;
            self.pending.extend(batch.map(RawEvent::from));
        }
        self.pending
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "empty event batch"))
    }
}

/// Scans a device directory (`/dev/input/event*` by default)
#[derive(Clone, Debug)]
pub struct EvdevSource {
    settings: DiscoverySettings,
}

impl EvdevSource {
    pub fn new(settings: DiscoverySettings) -> Self {
        Self { settings }
    }
}

impl Default for EvdevSource {
    fn default() -> Self {
        Self::new(DiscoverySettings::default())
    }
}

impl DeviceSource for EvdevSource {
    fn list_devices(&self) -> io::Result<Vec<Box<dyn RawInputDevice>>> {
        let dir = &self.settings.device_dir;
        info!(
            "Scanning {}/{}* for input devices",
            dir.display(),
            self.settings.device_prefix
        );

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            if file_name
                .to_string_lossy()
                .starts_with(&self.settings.device_prefix)
            {
                paths.push(entry.path());
            }
        }
        // read_dir order is unspecified, keep it stable between calls
        paths.sort();

        let mut devices: Vec<Box<dyn RawInputDevice>> = Vec::with_capacity(paths.len());
        for path in paths {
            match EvdevDevice::open(&path) {
                Ok(device) => {
                    debug!("Opened {} ({})", path.display(), device.name());
                    devices.push(Box::new(device));
                }
                Err(e) => debug!("Unable to open {}: {}", path.display(), e),
            }
        }

        Ok(devices)
    }
}
