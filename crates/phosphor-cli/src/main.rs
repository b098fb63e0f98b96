use anyhow::{anyhow, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use phosphor_common::{AttrFlags, HostDelegate, TerminalConfig};
use phosphor_core::Terminal;
use portable_pty::{native_pty_system, CommandBuilder, MasterPty, PtySize};
use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Phosphor Terminal CLI Test Tool", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Terminal rows (defaults to current terminal size)
    #[arg(long)]
    rows: Option<u16>,

    /// Terminal columns (defaults to current terminal size)
    #[arg(long)]
    cols: Option<u16>,

    /// Override shell to use (e.g., /bin/sh, /bin/bash)
    #[arg(long)]
    shell: Option<String>,

    /// Use minimal environment (env -i)
    #[arg(long)]
    minimal_env: bool,
}

/// Writes reply bytes (DA, DSR, mouse reports, DECRQSS) straight back into
/// the PTY master, as if the user had typed them (§6 `HostDelegate::send`).
/// `portable_pty::MasterPty::take_writer` may only be called once, so this
/// handle is shared with the key-forwarding loop in `main` via `Rc<RefCell>`
/// rather than taken a second time.
struct PtyDelegate {
    writer: Rc<RefCell<Box<dyn Write>>>,
}

impl HostDelegate for PtyDelegate {
    fn send(&mut self, bytes: &[u8]) {
        let mut writer = self.writer.borrow_mut();
        if let Err(e) = writer.write_all(bytes) {
            error!("failed to write reply to PTY: {e}");
        }
        let _ = writer.flush();
    }

    fn set_terminal_title(&mut self, title: &str) {
        debug!("title changed: {title}");
    }

    fn bell(&mut self) {
        debug!("bell");
    }

    fn linefeed(&mut self) {}

    fn show_cursor(&mut self, _visible: bool) {}

    fn scrolled(&mut self, _y_disp: usize) {}

    fn buffer_activated(&mut self) {}

    fn size_changed(&mut self) {}
}

fn spawn_shell(
    cols: u16,
    rows: u16,
    shell_override: Option<&str>,
    minimal_env: bool,
) -> Result<(Box<dyn MasterPty + Send>, Box<dyn portable_pty::Child + Send + Sync>)> {
    let pty_system = native_pty_system();
    let pair = pty_system.openpty(PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    })?;

    let shell = shell_override.map(String::from).unwrap_or_else(|| {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    });

    let mut cmd = if minimal_env {
        let mut env_cmd = CommandBuilder::new("env");
        env_cmd.arg("-i");
        env_cmd.arg(format!(
            "PATH={}",
            std::env::var("PATH").unwrap_or_else(|_| "/usr/local/bin:/usr/bin:/bin".to_string())
        ));
        env_cmd.arg("TERM=xterm-256color");
        env_cmd.arg(&shell);
        env_cmd
    } else {
        let mut cmd = CommandBuilder::new(&shell);
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");
        cmd
    };

    if let Ok(cwd) = std::env::current_dir() {
        cmd.cwd(cwd);
    }

    info!("spawning shell: {shell}");
    let child = pair.slave.spawn_command(cmd)?;
    drop(pair.slave);

    Ok((pair.master, child))
}

/// Translate a crossterm key event to the bytes a real terminal would send,
/// honoring application-cursor mode for the arrow keys (§6).
fn encode_key(key: KeyEvent, application_cursor: bool) -> Option<Vec<u8>> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let arrow = |letter: u8| -> Vec<u8> {
        if application_cursor {
            vec![0x1b, b'O', letter]
        } else {
            vec![0x1b, b'[', letter]
        }
    };
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(vec![0x03]),
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let upper = c.to_ascii_uppercase() as u8;
            if upper.is_ascii_alphabetic() {
                Some(vec![upper & 0x1f])
            } else {
                Some(vec![c as u8])
            }
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
        }
        KeyCode::Enter => Some(vec![b'\r']),
        KeyCode::Tab => Some(vec![b'\t']),
        KeyCode::Backspace => Some(vec![0x7f]),
        KeyCode::Esc => Some(vec![0x1b]),
        KeyCode::Up => Some(arrow(b'A')),
        KeyCode::Down => Some(arrow(b'B')),
        KeyCode::Right => Some(arrow(b'C')),
        KeyCode::Left => Some(arrow(b'D')),
        KeyCode::Home => Some(vec![0x1b, b'[', b'H']),
        KeyCode::End => Some(vec![0x1b, b'[', b'F']),
        KeyCode::Delete => Some(vec![0x1b, b'[', b'3', b'~']),
        _ => None,
    }
}

fn palette_color(index: Option<u8>) -> Color {
    match index {
        Some(i) => Color::AnsiValue(i),
        None => Color::Reset,
    }
}

/// Redraw viewport rows `[from, to]` (inclusive) from the active buffer.
fn render_rows(stdout: &mut io::Stdout, term: &Terminal, from: u16, to: u16) -> Result<()> {
    let buf = term.buffers().active();
    for row in from..=to.min(buf.rows().saturating_sub(1)) {
        queue!(stdout, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
        let line = buf.viewport_line(row);
        let mut last_fg = None;
        let mut last_bold = false;
        for col in 0..line.len() {
            let cell = line.get(col);
            let fg = cell.attr.fg().index();
            let bold = cell.attr.flags().contains(AttrFlags::BOLD);
            if Some(fg) != last_fg {
                queue!(stdout, SetForegroundColor(palette_color(fg)))?;
                last_fg = Some(fg);
            }
            if bold != last_bold {
                queue!(
                    stdout,
                    SetAttribute(if bold { Attribute::Bold } else { Attribute::NormalIntensity })
                )?;
                last_bold = bold;
            }
            write!(stdout, "{}", cell.ch)?;
        }
        queue!(stdout, SetAttribute(Attribute::Reset))?;
    }
    let buf = term.buffers().active();
    queue!(stdout, MoveTo(buf.x, buf.y))?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        "phosphor_cli=debug,phosphor_core=debug"
    } else {
        "phosphor_cli=info,phosphor_core=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let (width, height) = terminal::size().unwrap_or((80, 24));
    let cols = args.cols.unwrap_or(if width > 0 { width } else { 80 });
    let rows = args.rows.unwrap_or(if height > 0 { height } else { 24 });
    if cols == 0 || rows == 0 {
        return Err(anyhow!("terminal must have non-zero size"));
    }

    let (master, mut child) = spawn_shell(cols, rows, args.shell.as_deref(), args.minimal_env)?;
    let writer: Rc<RefCell<Box<dyn Write>>> =
        Rc::new(RefCell::new(Box::new(master.take_writer()?)));
    let mut reader = master.try_clone_reader()?;

    let config = TerminalConfig {
        cols,
        rows,
        ..TerminalConfig::default()
    };
    let mut term = Terminal::new(
        config,
        Box::new(PtyDelegate { writer: writer.clone() }),
    );

    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    std::thread::spawn(move || loop {
        let mut buf = [0u8; 4096];
        match reader.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    });

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), Hide)?;

    let result = (|| -> Result<()> {
        loop {
            if child.try_wait()?.is_some() {
                break;
            }

            let mut dirty = false;
            while let Ok(bytes) = rx.try_recv() {
                term.feed(&bytes);
                dirty = true;
            }
            if dirty {
                if let Some((from, to)) = term.get_update_range() {
                    render_rows(&mut stdout, &term, from, to)?;
                }
                term.clear_update_range();
            }

            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(bytes) = encode_key(key, term.state().application_cursor) {
                            let mut w = writer.borrow_mut();
                            w.write_all(&bytes)?;
                            w.flush()?;
                        }
                    }
                    Event::Resize(new_cols, new_rows) => {
                        term.resize(new_cols, new_rows);
                        master.resize(PtySize {
                            rows: new_rows,
                            cols: new_cols,
                            pixel_width: 0,
                            pixel_height: 0,
                        })?;
                        execute!(stdout, Clear(ClearType::All))?;
                        render_rows(&mut stdout, &term, 0, new_rows.saturating_sub(1))?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    })();

    execute!(stdout, Show)?;
    terminal::disable_raw_mode()?;
    result
}
