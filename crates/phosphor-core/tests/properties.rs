//! Property tests for the invariants named in spec §8 TESTABLE PROPERTIES.

use phosphor_common::{NullDelegate, TerminalConfig};
use phosphor_core::Terminal;
use proptest::prelude::*;

fn terminal_with(cols: u16, rows: u16, scrollback: usize) -> Terminal {
    let config = TerminalConfig {
        cols,
        rows,
        scrollback,
        ..TerminalConfig::default()
    };
    Terminal::new(config, Box::new(NullDelegate))
}

proptest! {
    /// Cursor `(x,y)` stays in `[0, cols] x [0, rows)` no matter what bytes
    /// arrive, including the deferred-wrap sentinel `x == cols` (§3, §4.1).
    #[test]
    fn cursor_stays_in_bounds(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut term = terminal_with(80, 25, 100);
        term.feed(&bytes);
        let buf = term.buffers().active();
        prop_assert!(buf.x <= buf.cols());
        prop_assert!(buf.y < buf.rows());
    }

    /// The scroll region stays ordered and within the grid through any
    /// sequence of bytes, including malformed DECSTBM parameters (§4.3).
    #[test]
    fn scroll_region_stays_ordered(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut term = terminal_with(80, 25, 100);
        term.feed(&bytes);
        let buf = term.buffers().active();
        prop_assert!(buf.scroll_top <= buf.scroll_bottom);
        prop_assert!(buf.scroll_bottom < buf.rows());
    }

    /// Printable ASCII no longer than the column count, followed by CR LF,
    /// reproduces verbatim in row 0 (§8 boundary scenario 1 generalized).
    #[test]
    fn ascii_crlf_round_trips(text in "[a-zA-Z0-9 ]{0,80}") {
        let mut term = terminal_with(80, 25, 100);
        term.feed_str(&text);
        term.feed_str("\r\n");
        let line = term.buffers().active().viewport_line(0);
        for (i, expected) in text.chars().enumerate() {
            prop_assert_eq!(line.get(i).ch, expected);
        }
    }

    /// `CSI 0 m` is idempotent: applying it twice leaves `curAttr` unchanged
    /// from applying it once (§8).
    #[test]
    fn sgr_reset_is_idempotent(prefix in prop::collection::vec(1u8..=9, 0..6)) {
        let mut term = terminal_with(80, 25, 100);
        for code in &prefix {
            term.feed_str(&format!("\x1b[{code}m"));
        }
        term.feed_str("\x1b[0m");
        let once = term.state().cur_attr;
        term.feed_str("\x1b[0m");
        let twice = term.state().cur_attr;
        prop_assert_eq!(once, twice);
    }

    /// After feeding any number of lines, the ring never exceeds
    /// `rows + scrollback` (§8).
    #[test]
    fn scrollback_is_bounded(n in 0usize..40) {
        let mut term = terminal_with(80, 25, 10);
        for _ in 0..n {
            term.feed_str("x\r\n");
        }
        let buf = term.buffers().active();
        prop_assert!(buf.total_lines() <= buf.rows() as usize + 10);
    }
}
