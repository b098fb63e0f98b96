//! Synchronous VT100/xterm-compatible terminal core (§1 PURPOSE & SCOPE).
//!
//! `Terminal` owns the grid, modes, and escape-sequence parser and exposes a
//! single-threaded, non-reentrant `feed` entry point (§5 CONCURRENCY &
//! RESOURCE MODEL). Byte transport (PTY spawning, async I/O) is a host
//! concern layered on top, not part of this crate.

pub mod buffer_set;
pub mod charset;
pub mod decrqss;
pub mod dispatch;
pub mod grid;
pub mod modes;
pub mod mouse;

use dispatch::Dispatcher;
use phosphor_common::{HostDelegate, TerminalConfig};
use phosphor_parser::EscapeSequenceParser;

pub use buffer_set::BufferSet;
pub use grid::{Buffer, Line, RingOfLines, TabStops};
pub use modes::TerminalState;
pub use mouse::{MouseEncoding, MouseMode};

/// The public entry point: one terminal instance, one owner, one `feed` at a
/// time (§5).
pub struct Terminal {
    parser: EscapeSequenceParser<Dispatcher>,
    dispatcher: Dispatcher,
}

impl Terminal {
    pub fn new(config: TerminalConfig, delegate: Box<dyn HostDelegate>) -> Self {
        let mut parser = EscapeSequenceParser::new();
        Dispatcher::install_handlers(&mut parser);
        Self {
            parser,
            dispatcher: Dispatcher::new(config, delegate),
        }
    }

    /// Append bytes to the parser. Not reentrant; the caller serializes
    /// calls (§5).
    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.advance_all(&mut self.dispatcher, bytes);
    }

    pub fn feed_str(&mut self, text: &str) {
        self.feed(text.as_bytes());
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.dispatcher.apply_resize(cols, rows);
    }

    pub fn cols(&self) -> u16 {
        self.dispatcher.buffers.active().cols()
    }

    pub fn rows(&self) -> u16 {
        self.dispatcher.buffers.active().rows()
    }

    pub fn buffers(&self) -> &BufferSet {
        &self.dispatcher.buffers
    }

    pub fn state(&self) -> &TerminalState {
        &self.dispatcher.modes
    }

    pub fn get_update_range(&self) -> Option<(u16, u16)> {
        self.dispatcher.get_update_range()
    }

    pub fn clear_update_range(&mut self) {
        self.dispatcher.clear_update_range();
    }

    /// Encode and deliver a button press/release through the host delegate,
    /// per the currently active mouse mode/encoding (§6).
    pub fn send_event(&mut self, button: u8, x: u16, y: u16, pressed: bool) {
        if let Some(bytes) = self.dispatcher.modes.mouse.encode_event(button, x, y, pressed) {
            self.dispatcher.delegate.send(&bytes);
        }
    }

    pub fn send_motion(&mut self, button: u8, x: u16, y: u16) {
        if let Some(bytes) = self.dispatcher.modes.mouse.encode_motion(button, x, y) {
            self.dispatcher.delegate.send(&bytes);
        }
    }

    /// Out-of-band host-to-terminal reply, bypassing the parser (§6
    /// `sendResponse`).
    pub fn send_response(&mut self, text: &str) {
        self.dispatcher.delegate.send(text.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_common::NullDelegate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn terminal() -> Terminal {
        Terminal::new(TerminalConfig::default(), Box::new(NullDelegate))
    }

    fn cell_char(term: &Terminal, row: u16, col: usize) -> char {
        term.buffers().active().viewport_line(row).get(col).ch
    }

    #[derive(Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl HostDelegate for Capture {
        fn send(&mut self, bytes: &[u8]) {
            self.0.borrow_mut().extend_from_slice(bytes);
        }
        fn set_terminal_title(&mut self, _title: &str) {}
        fn bell(&mut self) {}
        fn linefeed(&mut self) {}
        fn show_cursor(&mut self, _visible: bool) {}
        fn scrolled(&mut self, _y_disp: usize) {}
        fn buffer_activated(&mut self) {}
        fn size_changed(&mut self) {}
    }

    #[derive(Default)]
    struct ScrollCapture(Rc<RefCell<Vec<usize>>>);

    impl HostDelegate for ScrollCapture {
        fn send(&mut self, _bytes: &[u8]) {}
        fn set_terminal_title(&mut self, _title: &str) {}
        fn bell(&mut self) {}
        fn linefeed(&mut self) {}
        fn show_cursor(&mut self, _visible: bool) {}
        fn scrolled(&mut self, y_disp: usize) {
            self.0.borrow_mut().push(y_disp);
        }
        fn buffer_activated(&mut self) {}
        fn size_changed(&mut self) {}
    }

    #[test]
    fn hello_crlf_places_text_and_homes_cursor_to_next_line() {
        let mut term = terminal();
        term.feed_str("Hello\r\n");
        assert_eq!(cell_char(&term, 0, 0), 'H');
        assert_eq!(cell_char(&term, 0, 4), 'o');
        assert_eq!(cell_char(&term, 0, 5), ' ');
        assert_eq!(term.buffers().active().x, 0);
        assert_eq!(term.buffers().active().y, 1);
    }

    #[test]
    fn clear_screen_and_home_blanks_all_cells() {
        let mut term = terminal();
        term.feed_str("Hello\r\n\x1b[2J\x1b[H");
        assert_eq!(cell_char(&term, 0, 0), ' ');
        assert_eq!(term.buffers().active().x, 0);
        assert_eq!(term.buffers().active().y, 0);
    }

    #[test]
    fn sgr_color_applies_to_one_cell_and_resets_for_the_next() {
        let mut term = terminal();
        term.feed_str("\x1b[31mA\x1b[0mB");
        let line = term.buffers().active().viewport_line(0);
        assert_eq!(line.get(0).ch, 'A');
        assert_eq!(line.get(0).attr.fg().index(), Some(1));
        assert_eq!(line.get(1).ch, 'B');
        assert_eq!(line.get(1).attr.fg(), phosphor_common::PaletteColor::DEFAULT);
    }

    #[test]
    fn alt_buffer_round_trip_leaves_normal_buffer_untouched() {
        let mut term = terminal();
        term.feed_str("\x1b[?1049h");
        term.feed_str("ALT");
        assert_eq!(cell_char(&term, 0, 0), 'A');
        term.feed_str("\x1b[?1049l");
        assert_eq!(cell_char(&term, 0, 0), ' ');
        assert!(!term.buffers().is_alt());
    }

    #[test]
    fn cup_then_dsr_reports_cursor_position() {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let mut term = Terminal::new(TerminalConfig::default(), Box::new(Capture(sent.clone())));
        term.feed_str("\x1b[5;10H");
        assert_eq!(term.buffers().active().x, 9);
        assert_eq!(term.buffers().active().y, 4);
        term.feed_str("\x1b[6n");
        assert_eq!(*sent.borrow(), b"\x1b[5;10R".to_vec());
    }

    #[test]
    fn scroll_region_shift_keeps_row_below_margin_untouched() {
        let mut term = terminal();
        term.feed_str("\x1b[1;3r\x1b[3HX\nY");
        let buf = term.buffers().active();
        assert_eq!(buf.scroll_top, 0);
        assert_eq!(buf.scroll_bottom, 2);
        assert_eq!(buf.viewport_line(1).get(0).ch, 'X');
        assert_eq!(buf.viewport_line(2).get(1).ch, 'Y');
        assert_eq!(buf.x, 2);
        assert_eq!(buf.y, 2);
    }

    #[test]
    fn il_dl_outside_scroll_region_is_a_no_op_not_a_panic() {
        let mut term = terminal();
        // Region rows 0-2; CUP clamps the cursor to row 19 (rows-1), which
        // is below the margin — IL/DL there must no-op, not underflow.
        term.feed_str("\x1b[1;3r\x1b[20H");
        assert_eq!(term.buffers().active().y, 19);
        term.feed_str("\x1b[L");
        term.feed_str("\x1b[M");
        assert_eq!(term.buffers().active().scroll_top, 0);
        assert_eq!(term.buffers().active().scroll_bottom, 2);
    }

    #[test]
    fn scrolling_past_the_margin_notifies_the_delegate() {
        let scrolls = Rc::new(RefCell::new(Vec::new()));
        let mut term = Terminal::new(TerminalConfig::default(), Box::new(ScrollCapture(scrolls.clone())));
        term.feed_str("\x1b[S");
        assert_eq!(*scrolls.borrow(), vec![term.buffers().active().y_disp]);
    }

    #[test]
    fn ed_mode_0_clears_wrap_flag_on_fully_erased_trailing_lines() {
        let mut term = terminal();
        // Wrap row 0 onto row 1 by filling a line past the column count.
        term.feed_str(&"a".repeat(term.cols() as usize + 1));
        assert!(term.buffers().active().viewport_line(1).is_wrapped);
        term.feed_str("\x1b[H\x1b[J");
        assert!(!term.buffers().active().viewport_line(1).is_wrapped);
    }

    #[test]
    fn sgr_38_5_with_missing_index_does_not_leak_into_blink() {
        let mut term = terminal();
        term.feed_str("\x1b[38;5mA");
        let attr = term.buffers().active().viewport_line(0).get(0).attr;
        assert!(!attr.flags().contains(phosphor_common::AttrFlags::BLINK));
    }

    #[test]
    fn sgr_38_2_with_missing_components_does_not_leak_into_flags() {
        let mut term = terminal();
        term.feed_str("\x1b[38;2;10mA");
        let attr = term.buffers().active().viewport_line(0).get(0).attr;
        assert!(!attr.flags().contains(phosphor_common::AttrFlags::BOLD));
        assert!(!attr.flags().contains(phosphor_common::AttrFlags::ITALIC));
    }
}
