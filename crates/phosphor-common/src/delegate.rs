/// The narrow, synchronous interface a host (UI + transport) implements to
/// receive callbacks from a `Terminal` (§6 EXTERNAL INTERFACES, §9 design
/// note on dynamic dispatch). Every method is invoked synchronously from
/// within `feed` or the originating public call and must not re-enter it.
pub trait HostDelegate {
    /// Terminal-originated reply bytes: device attributes, DSR, mouse
    /// events, DECRQSS replies.
    fn send(&mut self, bytes: &[u8]);

    /// OSC 0/2 set the window title (OSC 1 may alias to this).
    fn set_terminal_title(&mut self, title: &str);

    fn bell(&mut self);

    fn linefeed(&mut self);

    fn show_cursor(&mut self, visible: bool);

    /// The first displayed line (`yDisp`) changed, e.g. from scrollback
    /// navigation or new output.
    fn scrolled(&mut self, y_disp: usize);

    /// The active buffer (normal/alternate) was switched.
    fn buffer_activated(&mut self);

    fn size_changed(&mut self);

    /// Per-character accessibility callback for `screenReaderMode` (§6
    /// Configuration). Default is a no-op so existing delegates keep
    /// compiling.
    fn announce(&mut self, _ch: char) {}
}

/// A delegate that discards every callback, for headless use and tests.
#[derive(Debug, Default)]
pub struct NullDelegate;

impl HostDelegate for NullDelegate {
    fn send(&mut self, _bytes: &[u8]) {}
    fn set_terminal_title(&mut self, _title: &str) {}
    fn bell(&mut self) {}
    fn linefeed(&mut self) {}
    fn show_cursor(&mut self, _visible: bool) {}
    fn scrolled(&mut self, _y_disp: usize) {}
    fn buffer_activated(&mut self) {}
    fn size_changed(&mut self) {}
}
