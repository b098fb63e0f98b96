use crate::color::PaletteColor;
use bitflags::bitflags;

bitflags! {
    /// Flag bits of the packed style word (§3 DATA MODEL).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttrFlags: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const BLINK     = 0b0001_0000;
        const INVERSE   = 0b0010_0000;
        const INVISIBLE = 0b0100_0000;
    }
}

/// The packed attribute word: 9 bits foreground index, 9 bits background
/// index, and the flag bits above. Stored as a plain `u32` value so that
/// copying a cell never chases a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAttr(u32);

const FG_SHIFT: u32 = 0;
const BG_SHIFT: u32 = 9;
const FLAGS_SHIFT: u32 = 18;
const COLOR_MASK: u32 = 0x1ff;

impl CellAttr {
    pub fn new(fg: PaletteColor, bg: PaletteColor, flags: AttrFlags) -> Self {
        let packed = (fg.raw() as u32) << FG_SHIFT
            | (bg.raw() as u32) << BG_SHIFT
            | (flags.bits() as u32) << FLAGS_SHIFT;
        Self(packed)
    }

    pub fn fg(self) -> PaletteColor {
        PaletteColor::from_raw(((self.0 >> FG_SHIFT) & COLOR_MASK) as u16)
    }

    pub fn bg(self) -> PaletteColor {
        PaletteColor::from_raw(((self.0 >> BG_SHIFT) & COLOR_MASK) as u16)
    }

    pub fn flags(self) -> AttrFlags {
        AttrFlags::from_bits_truncate((self.0 >> FLAGS_SHIFT) as u8)
    }

    pub fn with_fg(self, fg: PaletteColor) -> Self {
        Self::new(fg, self.bg(), self.flags())
    }

    pub fn with_bg(self, bg: PaletteColor) -> Self {
        Self::new(self.fg(), bg, self.flags())
    }

    pub fn with_flag(self, flag: AttrFlags, enabled: bool) -> Self {
        let mut flags = self.flags();
        flags.set(flag, enabled);
        Self::new(self.fg(), self.bg(), flags)
    }

    /// The erase-cell attribute carries the current background but the
    /// default foreground, per §4.3 Erase.
    pub fn as_erase_attr(self) -> Self {
        Self::new(PaletteColor::DEFAULT, self.bg(), AttrFlags::empty())
    }
}

impl Default for CellAttr {
    fn default() -> Self {
        Self::new(PaletteColor::DEFAULT, PaletteColor::DEFAULT, AttrFlags::empty())
    }
}
