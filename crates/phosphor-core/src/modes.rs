use crate::charset::Charsets;
use crate::mouse::MouseState;
use phosphor_common::CellAttr;

/// The dispatcher's own process-wide fields (§3 DATA MODEL, TerminalState),
/// distinct from grid content which lives in `Buffer`/`BufferSet`.
pub struct TerminalState {
    pub wraparound: bool,
    pub origin_mode: bool,
    pub insert_mode: bool,
    pub application_cursor: bool,
    pub application_keypad: bool,
    pub bracketed_paste: bool,
    pub cursor_hidden: bool,
    pub cursor_blink: bool,
    pub reverse_video: bool,
    pub auto_newline: bool,
    pub focus_reporting: bool,
    pub cur_attr: CellAttr,
    pub charsets: Charsets,
    pub mouse: MouseState,
    /// Column count saved across a 132-column toggle (mode 3).
    pub saved_cols: Option<u16>,
}

impl TerminalState {
    pub fn new(default_attr: CellAttr) -> Self {
        Self {
            wraparound: true,
            origin_mode: false,
            insert_mode: false,
            application_cursor: false,
            application_keypad: false,
            bracketed_paste: false,
            cursor_hidden: false,
            cursor_blink: true,
            reverse_video: false,
            auto_newline: false,
            focus_reporting: false,
            cur_attr: default_attr,
            charsets: Charsets::default(),
            mouse: MouseState::default(),
            saved_cols: None,
        }
    }

    /// DECSTR: clear the modes this dispatches over, without touching grid
    /// content (§4.3 Soft/hard reset).
    pub fn soft_reset(&mut self, default_attr: CellAttr) {
        self.wraparound = true;
        self.origin_mode = false;
        self.insert_mode = false;
        self.application_cursor = false;
        self.application_keypad = false;
        self.bracketed_paste = false;
        self.cursor_hidden = false;
        self.cur_attr = default_attr;
        self.charsets = Charsets::default();
        self.mouse = MouseState::default();
    }
}
