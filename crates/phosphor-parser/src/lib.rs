//! A table-driven DEC/ANSI escape sequence parser (§4.1).
//!
//! [`EscapeSequenceParser`] is a thin handler-registration layer over
//! [`vte::Parser`], which already implements Paul Williams' state machine
//! (`Ground`, `Escape`, `CsiEntry`, `OscString`, `DcsPassthrough`, ...).
//! Handlers are registered as plain function pointers keyed by final byte
//! (CSI, execute) or by a short collect-string / numeric code (ESC, OSC,
//! DCS), so the parser never captures the dispatch context itself — it is
//! threaded through explicitly on every `advance` call. This sidesteps the
//! self-referential "dictionary of closures" shape entirely.

mod dcs;
mod params;

pub use dcs::DcsHandler;
pub use params::Params;

use std::collections::HashMap;

pub type PrintHandlerFn<T> = fn(&mut T, char);
pub type ExecuteHandlerFn<T> = fn(&mut T, u8);
pub type CsiHandlerFn<T> = fn(&mut T, &Params<'_>, &[u8], u8);
pub type EscHandlerFn<T> = fn(&mut T, &[u8], u8);
pub type OscHandlerFn<T> = fn(&mut T, &[&[u8]]);
pub type ErrorHandlerFn<T> = fn(&mut T, &str);

struct Tables<T> {
    print: Option<PrintHandlerFn<T>>,
    execute: HashMap<u8, ExecuteHandlerFn<T>>,
    execute_fallback: Option<ExecuteHandlerFn<T>>,
    csi: HashMap<u8, CsiHandlerFn<T>>,
    csi_fallback: Option<CsiHandlerFn<T>>,
    esc: HashMap<String, EscHandlerFn<T>>,
    esc_fallback: Option<EscHandlerFn<T>>,
    osc: HashMap<u32, OscHandlerFn<T>>,
    osc_fallback: Option<OscHandlerFn<T>>,
    dcs: HashMap<String, Box<dyn DcsHandler<T>>>,
    active_dcs: Option<String>,
    error: Option<ErrorHandlerFn<T>>,
}

impl<T> Default for Tables<T> {
    fn default() -> Self {
        Self {
            print: None,
            execute: HashMap::new(),
            execute_fallback: None,
            csi: HashMap::new(),
            csi_fallback: None,
            esc: HashMap::new(),
            esc_fallback: None,
            osc: HashMap::new(),
            osc_fallback: None,
            dcs: HashMap::new(),
            active_dcs: None,
            error: None,
        }
    }
}

fn esc_key(collect: &[u8], final_byte: u8) -> String {
    let mut key = String::with_capacity(collect.len() + 1);
    for &b in collect {
        key.push(b as char);
    }
    key.push(final_byte as char);
    key
}

/// Byte-level state machine producing typed dispatch calls (§4.1).
pub struct EscapeSequenceParser<T> {
    vte: vte::Parser,
    tables: Tables<T>,
}

impl<T> Default for EscapeSequenceParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EscapeSequenceParser<T> {
    pub fn new() -> Self {
        Self {
            vte: vte::Parser::new(),
            tables: Tables::default(),
        }
    }

    pub fn set_print_handler(&mut self, f: PrintHandlerFn<T>) {
        self.tables.print = Some(f);
    }

    pub fn set_execute_handler(&mut self, byte: u8, f: ExecuteHandlerFn<T>) {
        self.tables.execute.insert(byte, f);
    }

    pub fn set_execute_fallback(&mut self, f: ExecuteHandlerFn<T>) {
        self.tables.execute_fallback = Some(f);
    }

    pub fn set_csi_handler(&mut self, final_byte: u8, f: CsiHandlerFn<T>) {
        self.tables.csi.insert(final_byte, f);
    }

    pub fn set_csi_fallback(&mut self, f: CsiHandlerFn<T>) {
        self.tables.csi_fallback = Some(f);
    }

    /// `key` concatenates collect-bytes (e.g. `?`, intermediates) and the
    /// final byte, matching §4.1's `escHandlers[key string]`.
    pub fn set_esc_handler(&mut self, key: &str, f: EscHandlerFn<T>) {
        self.tables.esc.insert(key.to_string(), f);
    }

    pub fn set_esc_fallback(&mut self, f: EscHandlerFn<T>) {
        self.tables.esc_fallback = Some(f);
    }

    pub fn set_osc_handler(&mut self, code: u32, f: OscHandlerFn<T>) {
        self.tables.osc.insert(code, f);
    }

    pub fn set_osc_fallback(&mut self, f: OscHandlerFn<T>) {
        self.tables.osc_fallback = Some(f);
    }

    pub fn set_dcs_handler(&mut self, key: &str, handler: Box<dyn DcsHandler<T>>) {
        self.tables.dcs.insert(key.to_string(), handler);
    }

    pub fn set_error_handler(&mut self, f: ErrorHandlerFn<T>) {
        self.tables.error = Some(f);
    }

    /// Restart the byte-level state machine. No handler registrations are
    /// lost; no parsing state survives.
    pub fn reset(&mut self) {
        self.vte = vte::Parser::new();
        self.tables.active_dcs = None;
    }

    /// Feed one byte. 8-bit C1 introducers (0x80-0x9F) are expanded to
    /// their two-byte ESC equivalent before reaching the state machine.
    pub fn advance(&mut self, ctx: &mut T, byte: u8) {
        if (0x80..=0x9f).contains(&byte) {
            let mut adapter = Adapter {
                ctx,
                tables: &mut self.tables,
            };
            self.vte.advance(&mut adapter, 0x1b);
            let mut adapter = Adapter {
                ctx,
                tables: &mut self.tables,
            };
            self.vte.advance(&mut adapter, byte - 0x40);
            return;
        }
        let mut adapter = Adapter {
            ctx,
            tables: &mut self.tables,
        };
        self.vte.advance(&mut adapter, byte);
    }

    pub fn advance_all(&mut self, ctx: &mut T, bytes: &[u8]) {
        for &byte in bytes {
            self.advance(ctx, byte);
        }
    }
}

struct Adapter<'a, T> {
    ctx: &'a mut T,
    tables: &'a mut Tables<T>,
}

impl<T> vte::Perform for Adapter<'_, T> {
    fn print(&mut self, c: char) {
        // vte substitutes U+FFFD on invalid UTF-8; §4.3 wants U+0020 instead.
        let c = if c == '\u{fffd}' { ' ' } else { c };
        if let Some(f) = self.tables.print {
            f(self.ctx, c);
        }
    }

    fn execute(&mut self, byte: u8) {
        match self.tables.execute.get(&byte) {
            Some(f) => f(self.ctx, byte),
            None => {
                if let Some(f) = self.tables.execute_fallback {
                    f(self.ctx, byte);
                }
            }
        }
    }

    fn hook(&mut self, params: &vte::Params, intermediates: &[u8], ignore: bool, action: char) {
        if ignore {
            if let Some(f) = self.tables.error {
                f(self.ctx, "dcs-hook-overflow");
            }
        }
        let key = esc_key(intermediates, action as u8);
        if self.tables.dcs.contains_key(&key) {
            let params = Params(params);
            if let Some(handler) = self.tables.dcs.get_mut(&key) {
                handler.hook(self.ctx, &params, intermediates, action as u8);
            }
            self.tables.active_dcs = Some(key);
        } else {
            self.tables.active_dcs = None;
        }
    }

    fn put(&mut self, byte: u8) {
        if let Some(key) = self.tables.active_dcs.clone() {
            if let Some(handler) = self.tables.dcs.get_mut(&key) {
                handler.put(self.ctx, byte);
            }
        }
    }

    fn unhook(&mut self) {
        if let Some(key) = self.tables.active_dcs.take() {
            if let Some(handler) = self.tables.dcs.get_mut(&key) {
                handler.unhook(self.ctx);
            }
        }
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        let code = params
            .first()
            .and_then(|p| std::str::from_utf8(p).ok())
            .and_then(|s| s.parse::<u32>().ok());
        match code.and_then(|c| self.tables.osc.get(&c)) {
            Some(f) => f(self.ctx, params),
            None => {
                if let Some(f) = self.tables.osc_fallback {
                    f(self.ctx, params);
                }
            }
        }
    }

    fn csi_dispatch(&mut self, params: &vte::Params, intermediates: &[u8], ignore: bool, action: char) {
        if ignore {
            if let Some(f) = self.tables.error {
                f(self.ctx, "csi-param-overflow");
            }
            return;
        }
        let params = Params(params);
        match self.tables.csi.get(&(action as u8)) {
            Some(f) => f(self.ctx, &params, intermediates, action as u8),
            None => {
                if let Some(f) = self.tables.csi_fallback {
                    f(self.ctx, &params, intermediates, action as u8);
                }
            }
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        if ignore {
            if let Some(f) = self.tables.error {
                f(self.ctx, "esc-intermediate-overflow");
            }
            return;
        }
        let key = esc_key(intermediates, byte);
        match self.tables.esc.get(key.as_str()) {
            Some(f) => f(self.ctx, intermediates, byte),
            None => {
                if let Some(f) = self.tables.esc_fallback {
                    f(self.ctx, intermediates, byte);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        text: String,
        csi_hits: Vec<(u8, Vec<u16>)>,
        unknown_csi: Vec<u8>,
        executed: Vec<u8>,
    }

    fn print(ctx: &mut Ctx, c: char) {
        ctx.text.push(c);
    }

    fn csi_cuu(ctx: &mut Ctx, params: &Params<'_>, _collect: &[u8], final_byte: u8) {
        ctx.csi_hits.push((final_byte, params.to_vec()));
    }

    fn csi_fallback(ctx: &mut Ctx, _params: &Params<'_>, _collect: &[u8], final_byte: u8) {
        ctx.unknown_csi.push(final_byte);
    }

    fn exec_bs(ctx: &mut Ctx, byte: u8) {
        ctx.executed.push(byte);
    }

    fn new_parser() -> EscapeSequenceParser<Ctx> {
        let mut p = EscapeSequenceParser::new();
        p.set_print_handler(print);
        p.set_csi_handler(b'A', csi_cuu);
        p.set_csi_fallback(csi_fallback);
        p.set_execute_handler(0x08, exec_bs);
        p
    }

    #[test]
    fn print_and_execute() {
        let mut parser = new_parser();
        let mut ctx = Ctx::default();
        parser.advance_all(&mut ctx, b"Hello");
        assert_eq!(ctx.text, "Hello");
    }

    #[test]
    fn csi_dispatch_hits_registered_handler_exactly_once() {
        let mut parser = new_parser();
        let mut ctx = Ctx::default();
        parser.advance_all(&mut ctx, b"\x1b[5A");
        assert_eq!(ctx.csi_hits, vec![(b'A', vec![5])]);
    }

    #[test]
    fn unknown_csi_hits_fallback_exactly_once() {
        let mut parser = new_parser();
        let mut ctx = Ctx::default();
        parser.advance_all(&mut ctx, b"\x1b[5Z");
        assert_eq!(ctx.unknown_csi, vec![b'Z']);
    }

    #[test]
    fn interleaved_c0_during_csi_executes_and_continues() {
        let mut parser = new_parser();
        let mut ctx = Ctx::default();
        parser.advance_all(&mut ctx, b"\x1b[1\x082m");
        assert_eq!(ctx.executed, vec![0x08]);
    }

    #[test]
    fn c1_introducer_is_treated_as_esc_equivalent() {
        let mut parser = new_parser();
        let mut ctx = Ctx::default();
        // 0x9b is CSI in the 8-bit C1 set.
        parser.advance_all(&mut ctx, &[0x9b, b'3', b'A']);
        assert_eq!(ctx.csi_hits, vec![(b'A', vec![3])]);
    }

    #[test]
    fn reset_restarts_state_machine_without_losing_handlers() {
        let mut parser = new_parser();
        let mut ctx = Ctx::default();
        parser.advance_all(&mut ctx, b"\x1b[");
        parser.reset();
        parser.advance_all(&mut ctx, b"AB");
        assert_eq!(ctx.text, "AB");
    }
}
