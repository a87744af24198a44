//! DualShock 4 input subsystem
//!
//! Two stages, both over the kernel's evdev interface:
//!
//! 1. [`discovery`] - find the controller's evdev nodes and classify them
//! 2. [`watcher`] - stream one node's key and axis events to a consumer
//!
//! ```text
//! /dev/input/event* ──► discover() ──► Input ──► watch() ──► EventStream
//!                       (by name)               (blocking worker)
//! ```
//!
//! [`device`] holds the raw device seam, [`event`] the button table and the
//! events published on the stream.

pub mod device;
pub mod discovery;
pub mod event;
pub mod watcher;

pub use device::{DeviceSource, EvdevDevice, EvdevSource, EventKind, RawEvent, RawInputDevice};
pub use discovery::{classify_name, discover, discover_with, DeviceRole, DiscoveryError, Input};
pub use event::{AbsEvent, Button, ControllerEvent, KeyEvent, KeyState, Translation};
pub use watcher::{watch, watch_with, EventStream, WatchError};
