use crate::grid::Buffer;
use phosphor_common::CellAttr;

/// Owns the normal and alternate screens and tracks which is active
/// (§3 DATA MODEL, BufferSet). Switching does not destroy the other buffer;
/// the normal buffer alone retains scrollback.
pub struct BufferSet {
    normal: Buffer,
    alternate: Buffer,
    using_alt: bool,
}

impl BufferSet {
    pub fn new(cols: u16, rows: u16, scrollback: usize, attr: CellAttr) -> Self {
        Self {
            normal: Buffer::new(cols, rows, scrollback, attr),
            alternate: Buffer::new(cols, rows, 0, attr),
            using_alt: false,
        }
    }

    pub fn active(&self) -> &Buffer {
        if self.using_alt {
            &self.alternate
        } else {
            &self.normal
        }
    }

    pub fn active_mut(&mut self) -> &mut Buffer {
        if self.using_alt {
            &mut self.alternate
        } else {
            &mut self.normal
        }
    }

    pub fn is_alt(&self) -> bool {
        self.using_alt
    }

    /// Activate the alternate buffer, blanking it with `attr` (§4.4).
    pub fn activate_alt(&mut self, attr: CellAttr) {
        if self.using_alt {
            return;
        }
        self.alternate.erase_all(attr);
        self.alternate.set_cursor(0, 0);
        self.using_alt = true;
    }

    /// Switch back to the normal buffer; its contents are untouched.
    pub fn activate_normal(&mut self) {
        self.using_alt = false;
    }

    pub fn resize_both(&mut self, cols: u16, rows: u16, scrollback: usize, attr: CellAttr) {
        self.normal.resize(cols, rows, scrollback, attr);
        self.alternate.resize(cols, rows, 0, attr);
    }
}
