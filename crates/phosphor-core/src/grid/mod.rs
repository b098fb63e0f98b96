pub mod buffer;
pub mod line;
pub mod ring;
pub mod tabstops;

pub use buffer::Buffer;
pub use line::Line;
pub use ring::RingOfLines;
pub use tabstops::TabStops;
