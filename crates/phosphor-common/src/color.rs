use serde::{Deserialize, Serialize};

/// A 9-bit palette slot: 0-255 index into the active palette, or `DEFAULT`
/// to mean "whatever the host considers the default foreground/background".
///
/// True-color SGR (`38;2;r;g;b`) is matched to the nearest palette entry at
/// set time (see `palette::nearest`); the cell itself never stores raw RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor(u16);

impl PaletteColor {
    pub const DEFAULT: PaletteColor = PaletteColor(256);

    pub fn indexed(index: u8) -> Self {
        Self(index as u16)
    }

    pub fn is_default(self) -> bool {
        self.0 == Self::DEFAULT.0
    }

    pub fn index(self) -> Option<u8> {
        if self.is_default() {
            None
        } else {
            Some(self.0 as u8)
        }
    }

    pub(crate) fn raw(self) -> u16 {
        self.0
    }

    pub(crate) fn from_raw(raw: u16) -> Self {
        Self(raw & 0x1ff)
    }
}

impl Default for PaletteColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// RGB888 triple, used only for palette construction and true-color matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn distance_sq(self, other: Rgb) -> i32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        dr * dr + dg * dg + db * db
    }
}

/// The 256-entry xterm-compatible color table: 16 ANSI colors, a 6x6x6 cube,
/// and a 24-step grayscale ramp.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: [Rgb; 256],
}

impl Palette {
    pub fn xterm256() -> Self {
        let mut entries = [Rgb::new(0, 0, 0); 256];

        const ANSI16: [Rgb; 16] = [
            Rgb::new(0, 0, 0),
            Rgb::new(205, 0, 0),
            Rgb::new(0, 205, 0),
            Rgb::new(205, 205, 0),
            Rgb::new(0, 0, 238),
            Rgb::new(205, 0, 205),
            Rgb::new(0, 205, 205),
            Rgb::new(229, 229, 229),
            Rgb::new(127, 127, 127),
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(255, 255, 0),
            Rgb::new(92, 92, 255),
            Rgb::new(255, 0, 255),
            Rgb::new(0, 255, 255),
            Rgb::new(255, 255, 255),
        ];
        entries[0..16].copy_from_slice(&ANSI16);

        let mut idx = 16;
        const STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];
        for r in STEPS {
            for g in STEPS {
                for b in STEPS {
                    entries[idx] = Rgb::new(r, g, b);
                    idx += 1;
                }
            }
        }

        for i in 0..24u8 {
            let gray = 8 + i * 10;
            entries[idx] = Rgb::new(gray, gray, gray);
            idx += 1;
        }

        Self { entries }
    }

    pub fn get(&self, index: u8) -> Rgb {
        self.entries[index as usize]
    }

    /// Nearest-palette match by squared Euclidean distance in RGB space.
    pub fn nearest(&self, target: Rgb) -> u8 {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, rgb)| rgb.distance_sq(target))
            .map(|(i, _)| i as u8)
            .unwrap_or(0)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::xterm256()
    }
}
