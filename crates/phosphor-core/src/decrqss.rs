use crate::dispatch::Dispatcher;
use phosphor_parser::{DcsHandler, Params};

/// `DCS $ q <Pt> ST` (DECRQSS): accumulates the queried setting name across
/// `put` calls and replies on `unhook` (§4.3).
#[derive(Default)]
pub struct DecrqssHandler {
    request: String,
}

impl DcsHandler<Dispatcher> for DecrqssHandler {
    fn hook(&mut self, _ctx: &mut Dispatcher, _params: &Params<'_>, _collect: &[u8], _final_byte: u8) {
        self.request.clear();
    }

    fn put(&mut self, _ctx: &mut Dispatcher, byte: u8) {
        self.request.push(byte as char);
    }

    fn unhook(&mut self, ctx: &mut Dispatcher) {
        ctx.decrqss_reply(&self.request);
    }
}
