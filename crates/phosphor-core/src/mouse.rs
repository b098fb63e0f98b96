/// Which events are reported, selected by DEC private modes 9/1000/1002/1003
/// (§4.3 Mode set/reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    #[default]
    Off,
    /// Mode 9: press only, no release/motion.
    X10,
    /// Mode 1000: press and release.
    Normal,
    /// Mode 1002: press, release, and motion while a button is held.
    ButtonEvent,
    /// Mode 1003: every motion, button held or not.
    AnyEvent,
}

/// Wire encoding of a reported event, selected by modes 1005/1006/1015
/// (default is the X10 legacy encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseEncoding {
    #[default]
    X10,
    Sgr,
    Urxvt,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub mode: MouseMode,
    pub encoding: MouseEncoding,
}

impl MouseState {
    pub fn is_active(&self) -> bool {
        self.mode != MouseMode::Off
    }

    /// Encode a button-press/release event as the reply bytes sent through
    /// the host delegate, or `None` if the current mode doesn't report it.
    pub fn encode_event(&self, button: u8, x: u16, y: u16, pressed: bool) -> Option<Vec<u8>> {
        if self.mode == MouseMode::Off {
            return None;
        }
        Some(self.encode(button, x, y, pressed))
    }

    pub fn encode_motion(&self, button: u8, x: u16, y: u16) -> Option<Vec<u8>> {
        match self.mode {
            MouseMode::Off | MouseMode::X10 | MouseMode::Normal => None,
            MouseMode::ButtonEvent | MouseMode::AnyEvent => Some(self.encode(button + 32, x, y, true)),
        }
    }

    fn encode(&self, button: u8, x: u16, y: u16, pressed: bool) -> Vec<u8> {
        let col = x + 1;
        let row = y + 1;
        match self.encoding {
            MouseEncoding::X10 => {
                let cb = 32 + button;
                let cx = (col.min(223) as u8).saturating_add(32);
                let cy = (row.min(223) as u8).saturating_add(32);
                vec![0x1b, b'[', b'M', cb, cx, cy]
            }
            MouseEncoding::Sgr => {
                let letter = if pressed { b'M' } else { b'm' };
                format!("\x1b[<{};{};{}{}", button, col, row, letter as char).into_bytes()
            }
            MouseEncoding::Urxvt => format!("\x1b[{};{};{}M", 32 + button, col, row).into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgr_encoding_marks_release_with_lowercase_m() {
        let state = MouseState {
            mode: MouseMode::Normal,
            encoding: MouseEncoding::Sgr,
        };
        let press = state.encode_event(0, 9, 4, true).unwrap();
        let release = state.encode_event(0, 9, 4, false).unwrap();
        assert_eq!(press, b"\x1b[<0;10;5M");
        assert_eq!(release, b"\x1b[<0;10;5m");
    }

    #[test]
    fn off_mode_reports_nothing() {
        let state = MouseState::default();
        assert!(state.encode_event(0, 0, 0, true).is_none());
    }
}
