use std::collections::HashMap;

/// A G-slot translation table: ASCII codepoints below 127 map through this
/// table before being written to the grid (§4.3 Character set).
#[derive(Debug, Clone)]
pub struct CharsetTable(Option<HashMap<u8, char>>);

impl CharsetTable {
    pub fn ascii() -> Self {
        Self(None)
    }

    pub fn from_map(map: HashMap<u8, char>) -> Self {
        Self(Some(map))
    }

    pub fn translate(&self, ch: char) -> char {
        match &self.0 {
            None => ch,
            Some(map) => {
                if (ch as u32) < 128 {
                    map.get(&(ch as u8)).copied().unwrap_or(ch)
                } else {
                    ch
                }
            }
        }
    }

    /// DEC Special Graphics and Line Drawing Set (`ESC ( 0`), the
    /// line-drawing glyphs used by curses-style full-screen applications.
    pub fn dec_special_graphics() -> Self {
        let pairs: &[(u8, char)] = &[
            (b'`', '\u{25c6}'),
            (b'a', '\u{2592}'),
            (b'b', '\u{2409}'),
            (b'c', '\u{240c}'),
            (b'd', '\u{240d}'),
            (b'e', '\u{240a}'),
            (b'f', '\u{00b0}'),
            (b'g', '\u{00b1}'),
            (b'h', '\u{2424}'),
            (b'i', '\u{240b}'),
            (b'j', '\u{2518}'),
            (b'k', '\u{2510}'),
            (b'l', '\u{250c}'),
            (b'm', '\u{2514}'),
            (b'n', '\u{253c}'),
            (b'o', '\u{23ba}'),
            (b'p', '\u{23bb}'),
            (b'q', '\u{2500}'),
            (b'r', '\u{23bc}'),
            (b's', '\u{23bd}'),
            (b't', '\u{251c}'),
            (b'u', '\u{2524}'),
            (b'v', '\u{2534}'),
            (b'w', '\u{252c}'),
            (b'x', '\u{2502}'),
            (b'y', '\u{2264}'),
            (b'z', '\u{2265}'),
            (b'{', '\u{03c0}'),
            (b'|', '\u{2260}'),
            (b'}', '\u{00a3}'),
            (b'~', '\u{00b7}'),
        ];
        Self::from_map(pairs.iter().copied().collect())
    }

    /// United Kingdom set (`ESC ( A`): identical to ASCII except `#` → `£`.
    pub fn uk() -> Self {
        Self::from_map(HashMap::from([(b'#', '\u{00a3}')]))
    }
}

/// Designated charset slot (`ESC ( / ) / * / +`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GSlot {
    G0,
    G1,
    G2,
    G3,
}

impl GSlot {
    pub fn from_designator(byte: u8) -> Option<Self> {
        match byte {
            b'(' => Some(GSlot::G0),
            b')' => Some(GSlot::G1),
            b'*' => Some(GSlot::G2),
            b'+' => Some(GSlot::G3),
            _ => None,
        }
    }
}

/// The four G-slots and the currently active one (§3 TerminalState).
#[derive(Debug, Clone)]
pub struct Charsets {
    slots: [CharsetTable; 4],
    g_level: u8,
}

impl Default for Charsets {
    fn default() -> Self {
        Self {
            slots: [
                CharsetTable::ascii(),
                CharsetTable::ascii(),
                CharsetTable::ascii(),
                CharsetTable::ascii(),
            ],
            g_level: 0,
        }
    }
}

impl Charsets {
    pub fn designate(&mut self, slot: GSlot, table: CharsetTable) {
        self.slots[slot as usize] = table;
    }

    pub fn lock_shift(&mut self, level: u8) {
        self.g_level = level.min(3);
    }

    pub fn g_level(&self) -> u8 {
        self.g_level
    }

    pub fn translate(&self, ch: char) -> char {
        self.slots[self.g_level as usize].translate(ch)
    }
}

pub fn table_for_final(byte: u8) -> CharsetTable {
    match byte {
        b'0' => CharsetTable::dec_special_graphics(),
        b'A' => CharsetTable::uk(),
        _ => CharsetTable::ascii(),
    }
}
