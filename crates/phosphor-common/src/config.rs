use serde::{Deserialize, Serialize};

/// Construction-time configuration for a `Terminal` (§6 Configuration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    pub cols: u16,
    pub rows: u16,
    pub scrollback: usize,
    pub term_name: TermName,
    /// Map LF to CRLF on the reply path.
    pub convert_eol: bool,
    /// Emit a per-character callback on print, for screen readers.
    pub screen_reader_mode: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 25,
            scrollback: 200,
            term_name: TermName::XtermColor256,
            convert_eol: false,
            screen_reader_mode: false,
        }
    }
}

/// Recognized `termName` values; each drives a distinct device-attribute
/// reply table (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermName {
    XtermColor256,
    RxvtUnicode,
    Screen,
    Linux,
}

impl TermName {
    pub fn as_str(self) -> &'static str {
        match self {
            TermName::XtermColor256 => "xterm-256color",
            TermName::RxvtUnicode => "rxvt-unicode",
            TermName::Screen => "screen",
            TermName::Linux => "linux",
        }
    }
}
