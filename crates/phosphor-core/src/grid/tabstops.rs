/// A bitset over columns marking tab stops (§3 DATA MODEL, Buffer.tabStops).
#[derive(Debug, Clone)]
pub struct TabStops {
    stops: Vec<bool>,
}

impl TabStops {
    pub fn new(cols: u16) -> Self {
        let mut stops = Self {
            stops: vec![false; cols as usize],
        };
        stops.reset_default(0);
        stops
    }

    /// (Re)establish stops every 8 columns, starting at `from_col`. Used on
    /// construction and after a column-count resize, per §4.2.
    pub fn reset_default(&mut self, from_col: u16) {
        let mut col = (from_col / 8) * 8;
        if col < from_col {
            col += 8;
        }
        while (col as usize) < self.stops.len() {
            self.stops[col as usize] = true;
            col += 8;
        }
    }

    pub fn clear_all(&mut self) {
        self.stops.iter_mut().for_each(|s| *s = false);
    }

    pub fn set(&mut self, col: u16) {
        if let Some(s) = self.stops.get_mut(col as usize) {
            *s = true;
        }
    }

    pub fn clear(&mut self, col: u16) {
        if let Some(s) = self.stops.get_mut(col as usize) {
            *s = false;
        }
    }

    pub fn resize(&mut self, cols: u16) {
        let old_len = self.stops.len() as u16;
        self.stops.resize(cols as usize, false);
        if cols > old_len {
            self.reset_default(old_len);
        }
    }

    /// Next stop strictly after `from_col`, or the last column if none.
    pub fn next_stop(&self, from_col: u16) -> u16 {
        let last = self.stops.len().saturating_sub(1) as u16;
        for col in (from_col + 1)..=last {
            if self.stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
        }
        last
    }

    /// Previous stop strictly before `from_col`, or column 0 if none.
    pub fn prev_stop(&self, from_col: u16) -> u16 {
        for col in (0..from_col).rev() {
            if self.stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
        }
        0
    }
}
