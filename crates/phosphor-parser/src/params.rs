/// A thin, crate-agnostic view over a CSI/DCS parameter list.
///
/// Wraps `vte::Params` so that callers of `phosphor-parser` never need to
/// depend on `vte` directly — only this crate does. Mirrors §4.1's
/// `params: sequence of integers` working state, including the "missing
/// params default to 0" rule.
pub struct Params<'a>(pub(crate) &'a vte::Params);

impl<'a> Params<'a> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value of the parameter group at `index`, or `default` when the
    /// group is absent *or* its value is the ANSI-standard zero-means-default
    /// sentinel.
    pub fn get(&self, index: usize, default: u16) -> u16 {
        self.0
            .iter()
            .nth(index)
            .map(|group| group[0])
            .filter(|&v| v != 0)
            .unwrap_or(default)
    }

    /// First value of the parameter group at `index`, with no zero
    /// substitution — used where 0 is itself meaningful (e.g. SGR, erase
    /// modes).
    pub fn get_raw(&self, index: usize) -> Option<u16> {
        self.0.iter().nth(index).map(|group| group[0])
    }

    /// Flat iterator over each group's first value, in order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().map(|group| group[0])
    }

    /// The full (possibly colon-separated) subparameter group at `index`.
    pub fn subparams(&self, index: usize) -> Option<&[u16]> {
        self.0.iter().nth(index)
    }

    pub fn to_vec(&self) -> Vec<u16> {
        self.iter().collect()
    }
}
