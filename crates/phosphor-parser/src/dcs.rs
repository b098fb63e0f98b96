use crate::params::Params;

/// A DCS sub-handler, selected by `hook` and fed byte-by-byte via `put`
/// until `unhook` (§4.1). Implementations receive the dispatch context `T`
/// on every call rather than capturing it, keeping ownership one-way:
/// parser -> context, never the reverse (§9 design note on cyclic
/// ownership).
pub trait DcsHandler<T> {
    fn hook(&mut self, ctx: &mut T, params: &Params<'_>, collect: &[u8], final_byte: u8);
    fn put(&mut self, ctx: &mut T, byte: u8);
    fn unhook(&mut self, ctx: &mut T);
}
