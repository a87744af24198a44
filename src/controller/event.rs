//! Domain events published by the watcher
//!
//! Codes come straight from the `hid-sony` driver. [`Button`] is a newtype
//! rather than an enum so codes outside the table survive translation.

use std::fmt;

use super::device::{EventKind, RawEvent};

/// Hardware code of a button or axis on the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Button(pub u16);

impl Button {
    // dpad
    pub const DPAD_X: Button = Button(16);
    pub const DPAD_Y: Button = Button(17);

    // sticks
    pub const LEFT_STICK_X: Button = Button(0);
    pub const LEFT_STICK_Y: Button = Button(1);
    pub const LEFT_STICK_CLICK: Button = Button(317);
    pub const RIGHT_STICK_X: Button = Button(3);
    pub const RIGHT_STICK_Y: Button = Button(4);
    pub const RIGHT_STICK_CLICK: Button = Button(318);

    // triggers
    pub const L1: Button = Button(310);
    pub const L2_CLICK: Button = Button(312);
    pub const L2: Button = Button(2);
    pub const R1: Button = Button(311);
    pub const R2_CLICK: Button = Button(313);
    pub const R2: Button = Button(5);

    // aux
    pub const SHARE: Button = Button(314);
    pub const OPTIONS: Button = Button(315);
    pub const PLAYSTATION: Button = Button(316);

    // shapes
    pub const TRIANGLE: Button = Button(307);
    pub const CIRCLE: Button = Button(305);
    pub const X: Button = Button(304);
    pub const SQUARE: Button = Button(308);

    /// Name of a known code, `None` for anything outside the table
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Button::DPAD_X => "DPadX",
            Button::DPAD_Y => "DPadY",
            Button::LEFT_STICK_X => "LeftStickX",
            Button::LEFT_STICK_Y => "LeftStickY",
            Button::LEFT_STICK_CLICK => "LeftStickClick",
            Button::RIGHT_STICK_X => "RightStickX",
            Button::RIGHT_STICK_Y => "RightStickY",
            Button::RIGHT_STICK_CLICK => "RightStickClick",
            Button::L1 => "L1",
            Button::L2_CLICK => "L2Click",
            Button::L2 => "L2",
            Button::R1 => "R1",
            Button::R2_CLICK => "R2Click",
            Button::R2 => "R2",
            Button::SHARE => "Share",
            Button::OPTIONS => "Options",
            Button::PLAYSTATION => "Playstation",
            Button::TRIANGLE => "Triangle",
            Button::CIRCLE => "Circle",
            Button::X => "X",
            Button::SQUARE => "Square",
            _ => return None,
        };
        Some(name)
    }

    /// True for the four analog stick axes
    pub fn is_stick_axis(self) -> bool {
        matches!(
            self,
            Button::LEFT_STICK_X
                | Button::LEFT_STICK_Y
                | Button::RIGHT_STICK_X
                | Button::RIGHT_STICK_Y
        )
    }
}

impl From<u16> for Button {
    fn from(code: u16) -> Self {
        Button(code)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Button({})", self.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    Up,
    Down,
}

impl From<i32> for KeyState {
    fn from(value: i32) -> Self {
        if value == 0 {
            KeyState::Up
        } else {
            KeyState::Down
        }
    }
}

/// A button press or release
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    pub raw: RawEvent,
    pub button: Button,
    pub state: KeyState,
}

/// An absolute position report (sticks, analog triggers and, oddly, the d-pad)
#[derive(Clone, Debug, PartialEq)]
pub struct AbsEvent {
    pub raw: RawEvent,
    pub button: Button,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    Key(KeyEvent),
    Abs(AbsEvent),
}

/// Outcome of translating one raw record
#[derive(Clone, Debug, PartialEq)]
pub enum Translation {
    Event(ControllerEvent),
    /// `EV_SYN` frame marker
    Sync,
    /// `EV_MSC`, only sent over USB and carries nothing useful
    Misc,
    Unrecognized(RawEvent),
}

impl ControllerEvent {
    pub fn from_raw(raw: RawEvent) -> Translation {
        match raw.kind {
            EventKind::SYNC => Translation::Sync,
            EventKind::KEY => Translation::Event(ControllerEvent::Key(KeyEvent {
                button: Button(raw.code),
                state: KeyState::from(raw.value),
                raw,
            })),
            EventKind::ABSOLUTE => Translation::Event(ControllerEvent::Abs(AbsEvent {
                button: Button(raw.code),
                value: raw.value,
                raw,
            })),
            EventKind::MISC => Translation::Misc,
            _ => Translation::Unrecognized(raw),
        }
    }

    pub fn button(&self) -> Button {
        match self {
            ControllerEvent::Key(event) => event.button,
            ControllerEvent::Abs(event) => event.button,
        }
    }
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerEvent::Key(event) => write!(
                f,
                "[{}] key {} {:?}",
                event.raw.timestamp.format("%H:%M:%S%.3f"),
                event.button,
                event.state
            ),
            ControllerEvent::Abs(event) => write!(
                f,
                "[{}] abs {} = {}",
                event.raw.timestamp.format("%H:%M:%S%.3f"),
                event.button,
                event.value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_record_becomes_key_event() {
        let translated = ControllerEvent::from_raw(RawEvent::new(EventKind::KEY, 304, 1));
        match translated {
            Translation::Event(ControllerEvent::Key(event)) => {
                assert_eq!(event.button, Button::X);
                assert_eq!(event.state, KeyState::Down);
            }
            other => panic!("expected key event, got {:?}", other),
        }

        let translated = ControllerEvent::from_raw(RawEvent::new(EventKind::KEY, 304, 0));
        match translated {
            Translation::Event(ControllerEvent::Key(event)) => {
                assert_eq!(event.state, KeyState::Up)
            }
            other => panic!("expected key event, got {:?}", other),
        }
    }

    #[test]
    fn abs_record_becomes_abs_event() {
        let translated = ControllerEvent::from_raw(RawEvent::new(EventKind::ABSOLUTE, 0, 127));
        match translated {
            Translation::Event(ControllerEvent::Abs(event)) => {
                assert_eq!(event.button, Button::LEFT_STICK_X);
                assert_eq!(event.value, 127);
            }
            other => panic!("expected abs event, got {:?}", other),
        }
    }

    #[test]
    fn sync_misc_and_unknown_categories_are_not_events() {
        assert_eq!(
            ControllerEvent::from_raw(RawEvent::new(EventKind::SYNC, 0, 0)),
            Translation::Sync
        );
        assert_eq!(
            ControllerEvent::from_raw(RawEvent::new(EventKind::MISC, 4, 589_825)),
            Translation::Misc
        );
        let relative = RawEvent::new(EventKind(0x02), 0, 5);
        assert_eq!(
            ControllerEvent::from_raw(relative.clone()),
            Translation::Unrecognized(relative)
        );
    }

    #[test]
    fn unknown_codes_pass_through() {
        let translated = ControllerEvent::from_raw(RawEvent::new(EventKind::KEY, 999, 2));
        match translated {
            Translation::Event(event) => {
                assert_eq!(event.button(), Button(999));
                assert_eq!(event.button().name(), None);
                assert_eq!(event.button().to_string(), "Button(999)");
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn button_table_matches_driver_codes() {
        let expected = [
            ("LeftStickX", 0),
            ("LeftStickY", 1),
            ("L2", 2),
            ("RightStickX", 3),
            ("RightStickY", 4),
            ("R2", 5),
            ("DPadX", 16),
            ("DPadY", 17),
            ("X", 304),
            ("Circle", 305),
            ("Triangle", 307),
            ("Square", 308),
            ("L1", 310),
            ("R1", 311),
            ("L2Click", 312),
            ("R2Click", 313),
            ("Share", 314),
            ("Options", 315),
            ("Playstation", 316),
            ("LeftStickClick", 317),
            ("RightStickClick", 318),
        ];
        for (name, code) in expected {
            assert_eq!(Button(code).name(), Some(name));
        }
        let named = (0..=u16::MAX).filter(|code| Button(*code).name().is_some());
        assert_eq!(named.count(), expected.len());
    }

    #[test]
    fn stick_axes_exclude_triggers_and_dpad() {
        assert!(Button::RIGHT_STICK_Y.is_stick_axis());
        assert!(!Button::L2.is_stick_axis());
        assert!(!Button::DPAD_X.is_stick_axis());
    }
}
